//! Command line consumer for the profile cache.
//!
//! Loads the profile collections of the given users and renders them once
//! they settle. Stands in for a host application's presentation layer: it
//! treats a pending slot as "loading", an empty settled list as a failed or
//! unknown user, and failed entries within a non-empty list as individual
//! load failures.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, ValueEnum};

use zoo_profiles::caching::ProfileCache;
use zoo_profiles::config::Config;
use zoo_profiles::events::{EventBus, ProfileEvent};
use zoo_profiles::logging;
use zoo_profiles::types::{CacheEntry, ProfileResult, UserId};

#[derive(Parser)]
#[command(name = "zoo-profiles", about = "Fetch and display Zoo profiles")]
struct Cli {
    /// User identifiers to load profiles for.
    #[arg(required = true)]
    users: Vec<String>,

    /// Path to the configuration file.
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Forwards cache events to the logs.
struct LoggingBus;

impl EventBus for LoggingBus {
    fn dispatch(&self, event: ProfileEvent) {
        match event {
            ProfileEvent::Loaded { user_id } => tracing::debug!(%user_id, "profiles loaded"),
            ProfileEvent::Failed { user_id } => tracing::debug!(%user_id, "profile load failed"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::get(cli.config.as_deref())?;

    // SAFETY: we are in the main thread and no other threads have been
    // spawned at this point.
    unsafe { logging::init_logging(&config) };

    let cache = ProfileCache::new(&config, Arc::new(LoggingBus));

    for user in &cli.users {
        cache.request_load(UserId::new(user.as_str()));
    }

    let mut loaded = Vec::with_capacity(cli.users.len());
    for user in &cli.users {
        let user_id = UserId::new(user.as_str());
        let results = wait_settled(&cache, &user_id).await;
        loaded.push((user_id, results));
    }

    match cli.format {
        OutputFormat::Text => {
            for (user_id, results) in &loaded {
                render_text(user_id, results);
            }
        }
        OutputFormat::Json => {
            let document: serde_json::Map<String, serde_json::Value> = loaded
                .iter()
                .map(|(user_id, results)| {
                    let results = serde_json::to_value(&results[..])?;
                    Ok((user_id.to_string(), results))
                })
                .collect::<Result<_>>()?;
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
    }

    Ok(())
}

/// Polls the cache until the user's slot settles.
///
/// The cache provides no synchronous completion signal, polling is the
/// consumer's job.
async fn wait_settled(cache: &ProfileCache, user_id: &UserId) -> Arc<[ProfileResult]> {
    loop {
        if let CacheEntry::Settled(results) = cache.read(user_id) {
            return results;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

fn render_text(user_id: &UserId, results: &[ProfileResult]) {
    if results.is_empty() {
        println!("{user_id}: no profiles (unknown user or fetch failure)");
        return;
    }

    println!("{user_id}:");
    for result in results {
        match result {
            ProfileResult::Unviewable(profile) => {
                println!(
                    "  {} [not viewable] score {}{}",
                    profile.name,
                    profile.score,
                    if profile.is_private { ", private" } else { "" },
                );
            }
            ProfileResult::Full(detail) => {
                println!(
                    "  {} score {}, {:.1}% complete, {}/{} animals, {} items",
                    detail.name,
                    detail.score,
                    detail.completion,
                    detail.unique_animals.total,
                    detail.total_animals.common + detail.total_animals.rare,
                    detail.total_items,
                );
            }
            ProfileResult::Failed { id } => {
                println!("  {id}: failed to load");
            }
        }
    }
}
