//! A fetch-and-cache coordinator for per-user Zoo profile collections.
//!
//! Concurrent requests for the same user collapse into a single network
//! round-trip sequence (one list fetch, then one detail fetch per viewable
//! entry, in parallel), and consumers observe a consistent, eventually
//! settled result. See [`caching::ProfileCache`] for the contract.

pub mod caching;
pub mod config;
pub mod download;
pub mod events;
pub mod logging;
pub mod types;
