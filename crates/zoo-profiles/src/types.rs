//! Public types for the Zoo profile API.
//!
//! These models mirror the JSON shapes served by the remote profile API. The
//! remote side is a black box, so the models are tolerant: absent fields fall
//! back to their defaults and unknown fields are ignored. The wire format is
//! camelCase, with a couple of legacy spellings (`userID`, `profileID`) kept
//! as explicit renames.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A user identifier, the key of the profile cache.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(Arc<str>);

impl UserId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// The state of a user's slot in the profile cache.
///
/// A slot moves `Absent → Pending → Settled` exactly once per process
/// lifetime. `Settled` with an empty list means the list fetch failed or the
/// user has no profiles, which is distinct from the user never having been
/// requested.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CacheEntry {
    /// The user was never requested.
    #[default]
    Absent,
    /// A load sequence is in flight. No partial data is exposed.
    Pending,
    /// The finished, immutable result of one load sequence.
    Settled(Arc<[ProfileResult]>),
}

impl CacheEntry {
    /// Returns the settled results if the slot has settled.
    pub fn settled(&self) -> Option<&[ProfileResult]> {
        match self {
            CacheEntry::Settled(results) => Some(results),
            _ => None,
        }
    }
}

/// One element of the profile list response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileSummary {
    pub id: String,
    pub name: String,
    /// Numeric RGB color, when the profile has a custom one.
    pub color: Option<u32>,
    #[serde(rename = "private")]
    pub is_private: bool,
    /// Whether the full profile can be fetched. Absent means it can not.
    pub viewable: Option<bool>,
    /// Marks the profile the user is currently playing on.
    pub current: bool,
    pub score: i64,
    pub icon: Option<ProfileIcon>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileIcon {
    pub emoji: String,
    pub parsed: String,
}

/// The settled outcome for one list entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProfileResult {
    /// Synthesized from the summary alone, without a detail fetch.
    Unviewable(UnviewableProfile),
    /// The complete detail payload.
    Full(Box<ProfileDetail>),
    /// The detail for this entry could not be loaded.
    Failed { id: String },
}

impl ProfileResult {
    /// The identifier of the list entry this result belongs to.
    pub fn id(&self) -> &str {
        match self {
            ProfileResult::Unviewable(profile) => &profile.id,
            ProfileResult::Full(detail) => &detail.id,
            ProfileResult::Failed { id } => id,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ProfileResult::Failed { .. })
    }
}

/// The minimal public view of a profile that can not be viewed in full.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnviewableProfile {
    pub id: String,
    #[serde(rename = "userID")]
    pub user_id: UserId,
    pub name: String,
    /// Lower-hex rendition of the summary's numeric color.
    pub color: Option<String>,
    #[serde(rename = "private")]
    pub is_private: bool,
    pub score: i64,
    pub cosmetic_icon: Option<String>,
}

impl UnviewableProfile {
    pub fn from_summary(user_id: UserId, summary: &ProfileSummary) -> Self {
        Self {
            id: summary.id.clone(),
            user_id,
            name: summary.name.clone(),
            color: summary.color.map(|color| format!("{color:x}")),
            is_private: summary.is_private,
            score: summary.score,
            cosmetic_icon: summary.icon.as_ref().map(|icon| icon.emoji.clone()),
        }
    }
}

/// The full detail payload of a viewable profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileDetail {
    pub id: String,
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "profileID")]
    pub profile_id: String,
    pub selected_profile: String,
    pub profiles: Vec<String>,
    pub name: String,
    pub nickname: String,
    pub color: Option<String>,
    pub owner: bool,
    #[serde(rename = "private")]
    pub is_private: bool,
    pub score: i64,
    pub completion: f64,
    pub unique_animals: AnimalTotals,
    pub total_animals: AnimalTotals,
    pub total_items: u64,
    pub total_cosmetics: u64,
    pub total_trophies: u64,
    pub equipped_relic: Option<String>,
    pub equipped_cosmetic: Option<String>,
    pub equipped_leader: Option<String>,
    pub cosmetic_icon: Option<String>,
    pub notifications: u64,
    pub auto_rescues: u64,
    pub animals: Vec<AnimalRecord>,
    pub items: Vec<ItemRecord>,
    pub relics: Vec<RelicRecord>,
    pub cosmetics: Vec<CosmeticRecord>,
    pub leaders: Vec<LeaderRecord>,
    pub quests: Vec<QuestRecord>,
    pub goals: Vec<GoalRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimalTotals {
    pub common: u64,
    pub rare: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimalRecord {
    pub name: String,
    pub amount: u64,
    pub emoji: String,
    pub emoji_name: String,
    pub family: String,
    pub rare: bool,
    pub pinned: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemRecord {
    pub name: String,
    pub amount: u64,
    pub emoji: String,
    pub highlight: bool,
    pub description: String,
    pub times_used: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelicRecord {
    pub name: String,
    pub emoji: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CosmeticRecord {
    pub name: String,
    pub emoji: String,
    pub trophy: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderRecord {
    pub name: String,
    pub emoji: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub emoji: String,
    pub days: u32,
    pub completed: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoalRecord {
    pub name: String,
    pub emoji: String,
    pub tier: String,
    pub tier_number: u32,
    pub target: u64,
    pub desc: String,
    pub count: u64,
    pub complete: bool,
}
