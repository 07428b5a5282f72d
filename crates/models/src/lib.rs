//! Canonical record shapes for the Nuance subnet API.
//!
//! Upstream responses carry inconsistent field names (`handle` vs
//! `username`, `node_hotkey` vs `hotkey`) and two divergent
//! `processing_status` enumerations. Everything here is the normalized
//! shape consumers see; the raw wire shapes live in `nuance_client::wire`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Unified processing status across both upstream enumerations.
///
/// The stats endpoints emit `PENDING|PROCESSING|ACCEPTED|REJECTED`, the
/// verification endpoints emit `new|accepted|rejected|error`. One mapping
/// table, one enum; unknown values are a deserialization error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Accepted,
    Rejected,
    Error,
}

impl ProcessingStatus {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        // Canonical lowercase names parse too, so serialized records
        // round-trip through the cache.
        match s {
            "PENDING" | "new" | "pending" => Some(Self::Pending),
            "PROCESSING" | "processing" => Some(Self::Processing),
            "ACCEPTED" | "accepted" => Some(Self::Accepted),
            "REJECTED" | "rejected" => Some(Self::Rejected),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Error => "error",
        }
    }
}

impl Serialize for ProcessingStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProcessingStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_str(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!("unknown processing status: {}", raw))
        })
    }
}

/// Typed interaction edge from an account to a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    Reply,
    Quote,
    Retweet,
}

impl InteractionKind {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("REPLY") {
            Some(Self::Reply)
        } else if s.eq_ignore_ascii_case("QUOTE") {
            Some(Self::Quote)
        } else if s.eq_ignore_ascii_case("RETWEET") {
            Some(Self::Retweet)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reply => "reply",
            Self::Quote => "quote",
            Self::Retweet => "retweet",
        }
    }
}

impl Serialize for InteractionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for InteractionKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_str(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!("unknown interaction type: {}", raw))
        })
    }
}

/// Per-post engagement counters. Upstream omits fields that are zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngagementStats {
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub reply_count: u64,
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub quote_count: u64,
    #[serde(default)]
    pub bookmark_count: u64,
}

/// One miner on the leaderboard.
///
/// `rank` is assigned from response order by the client and recomputed on
/// every fetch; it is `None` for the single-miner stats endpoint.
/// `total_posts`/`total_interactions` are derived from the counters the
/// upstream does supply and are a best-effort approximation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinerStats {
    pub uid: u32,
    pub hotkey: String,
    pub username: String,
    pub score: f64,
    pub retweet_count: u64,
    pub reply_count: u64,
    pub total_posts: u64,
    pub total_interactions: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
}

/// A social account a miner has committed to the subnet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialAccount {
    pub platform_type: String,
    pub account_id: String,
    pub account_username: String,
    #[serde(default)]
    pub verification_post_id: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub extra_data: AccountExtra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountExtra {
    #[serde(default)]
    pub followers_count: Option<u64>,
    #[serde(default)]
    pub following_count: Option<u64>,
    #[serde(default)]
    pub verified: Option<bool>,
}

/// A scored post, reshaped from the raw `{date, handle, text, stats}`
/// wire record (see `nuance_client::wire::normalize_posts`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub post_id: String,
    pub platform_type: String,
    pub author: String,
    pub content: String,
    pub created_at: String,
    pub topics: Vec<String>,
    pub processing_status: ProcessingStatus,
    pub stats: EngagementStats,
    pub score: u64,
    pub interactions_count: u64,
}

/// An interaction record. Covers both the miner-interactions shape and
/// the verification-feed shape; fields only one of them carries are
/// optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub platform_type: String,
    pub interaction_id: String,
    pub interaction_type: InteractionKind,
    pub account_id: String,
    pub post_id: String,
    #[serde(default)]
    pub content: Option<String>,
    pub processing_status: ProcessingStatus,
    #[serde(default)]
    pub processing_note: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub stats: Option<EngagementStats>,
}

/// A post from the verification pipeline (`/posts/{platform}/...`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedPost {
    pub platform_type: String,
    pub post_id: String,
    pub account_id: String,
    pub content: String,
    #[serde(default)]
    pub topics: Vec<String>,
    pub processing_status: ProcessingStatus,
    #[serde(default)]
    pub processing_note: Option<String>,
    #[serde(default)]
    pub interaction_count: u64,
    pub created_at: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub profile_pic_url: Option<String>,
    #[serde(default)]
    pub stats: Option<EngagementStats>,
}

/// Aggregate network counters.
///
/// `active_miners`, `avg_quality_score` and `network_activity` are
/// derived client-side because the upstream does not supply them; the
/// `approximated` flag marks them as such and is always `true` until the
/// upstream grows real time-windowed metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubnetStats {
    pub account_count: u64,
    pub post_count: u64,
    pub interaction_count: u64,
    pub engagement_stats: EngagementStats,
    pub total_miners: u64,
    pub active_miners: u64,
    pub total_posts: u64,
    pub total_interactions: u64,
    pub avg_quality_score: f64,
    pub network_activity: NetworkActivity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkActivity {
    pub posts_24h: u64,
    pub interactions_24h: u64,
    /// True when the 24h counters merely echo the lifetime totals.
    pub approximated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinerScore {
    #[serde(alias = "node_hotkey")]
    pub hotkey: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinerScores {
    pub miner_scores: Vec<MinerScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScoreItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub platform: String,
    pub raw_score: f64,
    pub normalized_contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub normalized_score: f64,
    pub items: Vec<CategoryScoreItem>,
}

/// Final score plus the per-category contributions behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinerScoreBreakdown {
    #[serde(alias = "node_hotkey")]
    pub hotkey: String,
    pub final_score: f64,
    pub total_items: u64,
    pub categories: BTreeMap<String, CategoryBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountVerification {
    pub platform_type: String,
    pub account_id: String,
    pub username: String,
    #[serde(default, alias = "node_hotkey")]
    pub hotkey: Option<String>,
    #[serde(default, alias = "node_netuid")]
    pub netuid: Option<u16>,
    pub is_verified: bool,
}

/// Everything the dashboard view needs, fetched concurrently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    pub stats: SubnetStats,
    pub leaderboard: Vec<MinerStats>,
    pub featured_content: Vec<Post>,
}

/// A miner's profile view. `score_breakdown` is best-effort: the
/// breakdown endpoint may fail without failing the profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinerProfile {
    pub stats: MinerStats,
    pub social_accounts: Vec<SocialAccount>,
    pub recent_posts: Vec<Post>,
    pub recent_interactions: Vec<Interaction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_breakdown: Option<MinerScoreBreakdown>,
}
