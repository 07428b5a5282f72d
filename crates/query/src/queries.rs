//! One query per dashboard data need, each with its own cache policy.
//!
//! A query wraps a source call (or a concurrent fan-out of several) in a
//! cached, deduplicated fetch keyed by the call's distinguishing
//! parameters. Queries whose identity parameter may be absent take it as
//! an `Option` and report `Ok(None)` ("not loaded") without touching the
//! network.

use crate::cache::{CachePolicy, QueryCache};
use crate::source::NuanceSource;
use anyhow::Result;
use nuance_client::{PostFilter, RecentInteractionsParams, RecentPostsParams, Timeframe};
use nuance_models::{
    AccountVerification, DashboardData, Interaction, MinerProfile, MinerScoreBreakdown,
    MinerScores, MinerStats, Post, SubnetStats, VerifiedPost,
};
use serde_json::Value;
use std::time::Duration;

// Stale window / eviction window per query, mirroring how often each
// dataset actually moves.
const DASHBOARD: CachePolicy = CachePolicy::new(30_000, 300_000);
const TOP_MINERS: CachePolicy = CachePolicy::new(30_000, 300_000);
const ALL_MINERS: CachePolicy = CachePolicy::new(60_000, 600_000);
const MINER_PROFILE: CachePolicy = CachePolicy::new(30_000, 300_000);
const ENHANCED_PROFILE: CachePolicy = CachePolicy::new(60_000, 600_000);
const SUBNET_STATS: CachePolicy = CachePolicy::new(30_000, 300_000);
const TOP_POSTS: CachePolicy = CachePolicy::new(30_000, 300_000);
const MINER_SCORES: CachePolicy = CachePolicy::new(60_000, 600_000);
const SCORE_BREAKDOWN: CachePolicy = CachePolicy::new(60_000, 600_000);
const RECENT_POSTS: CachePolicy = CachePolicy::new(30_000, 300_000);
const POST: CachePolicy = CachePolicy::new(60_000, 600_000);
const POST_INTERACTIONS: CachePolicy = CachePolicy::new(30_000, 300_000);
const RECENT_INTERACTIONS: CachePolicy = CachePolicy::new(30_000, 300_000);
const INTERACTION: CachePolicy = CachePolicy::new(60_000, 600_000);
const ACCOUNT_VERIFICATION: CachePolicy = CachePolicy::new(300_000, 1_800_000);
// Content analysis results do not change; cache them for a year.
const TOPIC_CHECK: CachePolicy = CachePolicy::new(31_536_000_000, 31_536_000_000);

/// Background refetch interval for the dashboard composite.
pub const DASHBOARD_REFRESH: Duration = Duration::from_secs(60);

fn timeframe_key(timeframe: Option<Timeframe>) -> &'static str {
    timeframe.map(|t| t.as_str()).unwrap_or("default")
}

// FNV-1a, for keys built from free-form text.
fn fnv1a(s: &str) -> u64 {
    let mut hash: u64 = 14695981039346656037;
    for byte in s.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(1099511628211);
    }
    hash
}

/// Dashboard composite: subnet stats + leaderboard + featured posts,
/// fetched concurrently. All three are required; any failure fails the
/// composite.
pub async fn dashboard<S: NuanceSource>(source: &S, cache: &QueryCache) -> Result<DashboardData> {
    cache
        .fetch_with("dashboard", DASHBOARD, move || async move {
            let (stats, leaderboard, featured_content) = tokio::try_join!(
                source.subnet_stats(),
                source.top_miners(Some(Timeframe::ThirtyDays), 10),
                source.top_posts(Some(PostFilter::Top), 10),
            )?;
            Ok(DashboardData {
                stats,
                leaderboard,
                featured_content,
            })
        })
        .await
}

pub async fn top_miners<S: NuanceSource>(
    source: &S,
    cache: &QueryCache,
    timeframe: Option<Timeframe>,
    limit: usize,
) -> Result<Vec<MinerStats>> {
    let key = format!("topMiners:{}:{}", timeframe_key(timeframe), limit);
    cache
        .fetch_with(&key, TOP_MINERS, move || async move {
            source.top_miners(timeframe, limit).await
        })
        .await
}

/// Full miner list for search; cached longer since it is a larger pull.
pub async fn all_miners<S: NuanceSource>(
    source: &S,
    cache: &QueryCache,
    timeframe: Option<Timeframe>,
) -> Result<Vec<MinerStats>> {
    let key = format!("allMiners:{}", timeframe_key(timeframe));
    cache
        .fetch_with(&key, ALL_MINERS, move || async move {
            source.all_miners(timeframe).await
        })
        .await
}

pub async fn subnet_stats<S: NuanceSource>(
    source: &S,
    cache: &QueryCache,
) -> Result<SubnetStats> {
    cache
        .fetch_with("subnetStats", SUBNET_STATS, move || async move {
            source.subnet_stats().await
        })
        .await
}

pub async fn top_posts<S: NuanceSource>(
    source: &S,
    cache: &QueryCache,
    filter: Option<PostFilter>,
    limit: usize,
) -> Result<Vec<Post>> {
    let filter_key = filter.map(|f| f.as_str()).unwrap_or("default");
    let key = format!("topPosts:{}:{}", filter_key, limit);
    cache
        .fetch_with(&key, TOP_POSTS, move || async move {
            source.top_posts(filter, limit).await
        })
        .await
}

pub async fn miner_scores<S: NuanceSource>(
    source: &S,
    cache: &QueryCache,
) -> Result<MinerScores> {
    cache
        .fetch_with("allMinerScores", MINER_SCORES, move || async move {
            source.miner_scores().await
        })
        .await
}

/// Miner profile composite: stats, accounts, recent posts and recent
/// interactions, fetched concurrently. `None` when no hotkey is known
/// yet.
pub async fn miner_profile<S: NuanceSource>(
    source: &S,
    cache: &QueryCache,
    hotkey: Option<&str>,
) -> Result<Option<MinerProfile>> {
    let Some(hotkey) = hotkey.filter(|h| !h.is_empty()) else {
        return Ok(None);
    };
    let key = format!("minerProfile:{}", hotkey);
    let profile = cache
        .fetch_with(&key, MINER_PROFILE, move || async move {
            let (stats, social_accounts, recent_posts, recent_interactions) = tokio::try_join!(
                source.miner_stats(hotkey),
                source.miner_accounts(hotkey),
                source.miner_posts(hotkey, 1, 10),
                source.miner_interactions(hotkey, 1),
            )?;
            Ok(MinerProfile {
                stats,
                social_accounts,
                recent_posts,
                recent_interactions,
                score_breakdown: None,
            })
        })
        .await?;
    Ok(Some(profile))
}

/// Profile composite plus the score breakdown. The breakdown endpoint is
/// flaky for miners with no scored items, so its failure is swallowed
/// and reported as an absent value; the other four calls are required.
pub async fn enhanced_miner_profile<S: NuanceSource>(
    source: &S,
    cache: &QueryCache,
    hotkey: Option<&str>,
) -> Result<Option<MinerProfile>> {
    let Some(hotkey) = hotkey.filter(|h| !h.is_empty()) else {
        return Ok(None);
    };
    let key = format!("enhancedMinerProfile:{}", hotkey);
    let profile = cache
        .fetch_with(&key, ENHANCED_PROFILE, move || async move {
            let (stats, social_accounts, recent_posts, recent_interactions, breakdown) = tokio::join!(
                source.miner_stats(hotkey),
                source.miner_accounts(hotkey),
                source.miner_posts(hotkey, 1, 10),
                source.miner_interactions(hotkey, 1),
                source.score_breakdown(hotkey),
            );
            let score_breakdown = match breakdown {
                Ok(b) => Some(b),
                Err(e) => {
                    tracing::warn!("score breakdown unavailable for {}: {:#}", hotkey, e);
                    None
                }
            };
            Ok(MinerProfile {
                stats: stats?,
                social_accounts: social_accounts?,
                recent_posts: recent_posts?,
                recent_interactions: recent_interactions?,
                score_breakdown,
            })
        })
        .await?;
    Ok(Some(profile))
}

pub async fn score_breakdown<S: NuanceSource>(
    source: &S,
    cache: &QueryCache,
    hotkey: Option<&str>,
) -> Result<Option<MinerScoreBreakdown>> {
    let Some(hotkey) = hotkey.filter(|h| !h.is_empty()) else {
        return Ok(None);
    };
    let key = format!("minerScoreBreakdown:{}", hotkey);
    let breakdown = cache
        .fetch_with(&key, SCORE_BREAKDOWN, move || async move {
            source.score_breakdown(hotkey).await
        })
        .await?;
    Ok(Some(breakdown))
}

pub async fn recent_posts<S: NuanceSource>(
    source: &S,
    cache: &QueryCache,
    platform: &str,
    params: &RecentPostsParams,
) -> Result<Vec<VerifiedPost>> {
    let params_key = serde_json::to_string(params).unwrap_or_default();
    let key = format!("recentPosts:{}:{}", platform, params_key);
    cache
        .fetch_with(&key, RECENT_POSTS, move || async move {
            source.recent_posts(platform, params).await
        })
        .await
}

pub async fn post<S: NuanceSource>(
    source: &S,
    cache: &QueryCache,
    platform: &str,
    post_id: Option<&str>,
    include_stats: bool,
) -> Result<Option<VerifiedPost>> {
    let Some(post_id) = post_id.filter(|p| !p.is_empty()) else {
        return Ok(None);
    };
    let key = format!("post:{}:{}:{}", platform, post_id, include_stats);
    let post = cache
        .fetch_with(&key, POST, move || async move {
            source.post(platform, post_id, include_stats).await
        })
        .await?;
    Ok(Some(post))
}

pub async fn post_interactions<S: NuanceSource>(
    source: &S,
    cache: &QueryCache,
    platform: &str,
    post_id: Option<&str>,
    skip: u64,
    limit: usize,
) -> Result<Option<Vec<Interaction>>> {
    let Some(post_id) = post_id.filter(|p| !p.is_empty()) else {
        return Ok(None);
    };
    let key = format!("postInteractions:{}:{}:{}:{}", platform, post_id, skip, limit);
    let interactions = cache
        .fetch_with(&key, POST_INTERACTIONS, move || async move {
            source.post_interactions(platform, post_id, skip, limit).await
        })
        .await?;
    Ok(Some(interactions))
}

pub async fn recent_interactions<S: NuanceSource>(
    source: &S,
    cache: &QueryCache,
    platform: &str,
    params: &RecentInteractionsParams,
) -> Result<Vec<Interaction>> {
    let params_key = serde_json::to_string(params).unwrap_or_default();
    let key = format!("recentInteractions:{}:{}", platform, params_key);
    cache
        .fetch_with(&key, RECENT_INTERACTIONS, move || async move {
            source.recent_interactions(platform, params).await
        })
        .await
}

pub async fn interaction<S: NuanceSource>(
    source: &S,
    cache: &QueryCache,
    platform: &str,
    interaction_id: Option<&str>,
) -> Result<Option<Interaction>> {
    let Some(interaction_id) = interaction_id.filter(|i| !i.is_empty()) else {
        return Ok(None);
    };
    let key = format!("interaction:{}:{}", platform, interaction_id);
    let interaction = cache
        .fetch_with(&key, INTERACTION, move || async move {
            source.interaction(platform, interaction_id).await
        })
        .await?;
    Ok(Some(interaction))
}

/// Verification status moves rarely; cached for five minutes.
pub async fn account_verification<S: NuanceSource>(
    source: &S,
    cache: &QueryCache,
    platform: &str,
    account_id: Option<&str>,
) -> Result<Option<AccountVerification>> {
    let Some(account_id) = account_id.filter(|a| !a.is_empty()) else {
        return Ok(None);
    };
    let key = format!("accountVerification:{}:{}", platform, account_id);
    let verification = cache
        .fetch_with(&key, ACCOUNT_VERIFICATION, move || async move {
            source.verify_account(platform, account_id).await
        })
        .await?;
    Ok(Some(verification))
}

/// Topic relevance check. Only runs when the caller supplies both inputs
/// — the upstream rate limit is 2 requests/minute, so invocation is
/// caller-gated. One retry, then the error propagates.
pub async fn topic_check<S: NuanceSource>(
    source: &S,
    cache: &QueryCache,
    content: &str,
    topic: &str,
) -> Result<Option<Value>> {
    if content.is_empty() || topic.is_empty() {
        return Ok(None);
    }
    let key = format!("topicCheck:{:016x}:{:016x}", fnv1a(content), fnv1a(topic));
    let value = cache
        .fetch_with(&key, TOPIC_CHECK, move || async move {
            match source.check_topic(content, topic).await {
                Ok(v) => Ok(v),
                Err(e) => {
                    tracing::warn!("topic check failed, retrying once: {:#}", e);
                    source.check_topic(content, topic).await
                }
            }
        })
        .await?;
    Ok(Some(value))
}

/// Uncached passthrough; the result is only meaningful for the exact
/// content submitted.
pub async fn nuance_check<S: NuanceSource>(source: &S, content: &str) -> Result<bool> {
    source.check_nuance(content).await
}

/// Client-side miner search over an already-fetched list.
pub fn search_miners(query: &str, miners: &[MinerStats]) -> Vec<MinerStats> {
    if query.is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    miners
        .iter()
        .filter(|m| {
            m.username.to_lowercase().contains(&needle)
                || m.hotkey.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}
