//! Raw upstream shapes and the normalization step into canonical records.
//!
//! Normalization is where field aliasing is resolved (`node_hotkey` →
//! `hotkey`, `handle` → `username`), ranks are assigned from response
//! order, and counters absent upstream are derived from the ones present.

use nuance_models::{
    EngagementStats, MinerStats, NetworkActivity, Post, ProcessingStatus, SubnetStats,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct MinerList {
    #[serde(default)]
    pub miners: Vec<RawMiner>,
}

/// A miner as the stats endpoints emit it.
#[derive(Debug, Deserialize)]
pub struct RawMiner {
    pub uid: u32,
    pub handle: String,
    pub node_hotkey: String,
    pub score: f64,
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub reply_count: u64,
}

pub fn normalize_miner(raw: RawMiner, rank: Option<u32>) -> MinerStats {
    // Upstream sends no total_posts/total_interactions; approximate both
    // from the counters it does send.
    let derived = raw.retweet_count + raw.reply_count;
    MinerStats {
        uid: raw.uid,
        hotkey: raw.node_hotkey,
        username: raw.handle,
        score: raw.score,
        retweet_count: raw.retweet_count,
        reply_count: raw.reply_count,
        total_posts: derived,
        total_interactions: derived,
        rank,
    }
}

/// Rank is a pure function of response order: index + 1, no re-sort.
pub fn normalize_miners(raw: Vec<RawMiner>) -> Vec<MinerStats> {
    raw.into_iter()
        .enumerate()
        .map(|(index, miner)| normalize_miner(miner, Some(index as u32 + 1)))
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct PostList {
    #[serde(default)]
    pub posts: Vec<RawPost>,
}

/// A post as the stats endpoints emit it: no id, no status, no topics.
#[derive(Debug, Deserialize)]
pub struct RawPost {
    pub date: String,
    pub handle: String,
    pub text: String,
    #[serde(default)]
    pub stats: EngagementStats,
}

pub fn normalize_post(raw: RawPost, index: usize) -> Post {
    let score = raw.stats.like_count + raw.stats.retweet_count;
    let interactions_count = raw.stats.reply_count + raw.stats.retweet_count + raw.stats.like_count;
    Post {
        // Upstream sends no id; synthesize a stable-enough one.
        post_id: format!("{}-{}-{}", raw.handle, raw.date, index),
        platform_type: "X".to_string(),
        author: raw.handle,
        content: raw.text,
        created_at: raw.date,
        topics: Vec::new(),
        // Only accepted posts make it into the ranked feeds.
        processing_status: ProcessingStatus::Accepted,
        stats: raw.stats,
        score,
        interactions_count,
    }
}

pub fn normalize_posts(raw: Vec<RawPost>) -> Vec<Post> {
    raw.into_iter()
        .enumerate()
        .map(|(index, post)| normalize_post(post, index))
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct RawSubnetStats {
    pub account_count: u64,
    pub post_count: u64,
    pub interaction_count: u64,
    #[serde(default)]
    pub engagement_stats: EngagementStats,
}

/// The upstream supplies lifetime totals only. The activity fields are
/// echoes of those totals, flagged `approximated` so consumers cannot
/// mistake them for real 24-hour windows.
pub fn normalize_subnet_stats(raw: RawSubnetStats) -> SubnetStats {
    let avg_quality_score = raw.engagement_stats.like_count as f64 / raw.post_count.max(1) as f64;
    SubnetStats {
        total_miners: raw.account_count,
        active_miners: raw.account_count,
        total_posts: raw.post_count,
        total_interactions: raw.interaction_count,
        avg_quality_score,
        network_activity: NetworkActivity {
            posts_24h: raw.post_count,
            interactions_24h: raw.interaction_count,
            approximated: true,
        },
        account_count: raw.account_count,
        post_count: raw.post_count,
        interaction_count: raw.interaction_count,
        engagement_stats: raw.engagement_stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn miner(hotkey: &str, handle: &str, retweets: u64, replies: u64) -> RawMiner {
        RawMiner {
            uid: 1,
            handle: handle.to_string(),
            node_hotkey: hotkey.to_string(),
            score: 1.5,
            retweet_count: retweets,
            reply_count: replies,
        }
    }

    #[test]
    fn test_normalize_miner_resolves_aliases_and_derives_counters() {
        let raw: MinerList = serde_json::from_str(
            r#"{"miners":[{"uid":1,"node_hotkey":"abc","handle":"foo","score":1.5,"retweet_count":2,"reply_count":3}]}"#,
        )
        .unwrap();
        let miners = normalize_miners(raw.miners);

        assert_eq!(miners.len(), 1);
        let m = &miners[0];
        assert_eq!(m.rank, Some(1));
        assert_eq!(m.hotkey, "abc");
        assert_eq!(m.username, "foo");
        assert_eq!(m.total_posts, 5);
        assert_eq!(m.total_interactions, 5);
        assert_eq!(m.score, 1.5);
    }

    #[test]
    fn test_rank_is_pure_function_of_response_order() {
        let build = || vec![miner("a", "ua", 0, 0), miner("b", "ub", 0, 0), miner("c", "uc", 0, 0)];

        let first = normalize_miners(build());
        let second = normalize_miners(build());

        for (i, m) in first.iter().enumerate() {
            assert_eq!(m.rank, Some(i as u32 + 1));
        }
        assert_eq!(first, second, "same input order must yield identical ranks");
    }

    #[test]
    fn test_single_miner_has_no_rank() {
        let m = normalize_miner(miner("abc", "foo", 1, 1), None);
        assert_eq!(m.rank, None);
    }

    #[test]
    fn test_normalize_post_reshapes_wire_record() {
        let raw = RawPost {
            date: "2025-06-01".to_string(),
            handle: "foo".to_string(),
            text: "hello".to_string(),
            stats: EngagementStats {
                view_count: 100,
                reply_count: 3,
                retweet_count: 2,
                like_count: 10,
                quote_count: 0,
                bookmark_count: 1,
            },
        };
        let post = normalize_post(raw, 4);

        assert_eq!(post.post_id, "foo-2025-06-01-4");
        assert_eq!(post.author, "foo");
        assert_eq!(post.content, "hello");
        assert_eq!(post.created_at, "2025-06-01");
        assert_eq!(post.score, 12); // likes + retweets
        assert_eq!(post.interactions_count, 15); // replies + retweets + likes
        assert_eq!(post.processing_status, ProcessingStatus::Accepted);
        assert!(post.topics.is_empty());
    }

    #[test]
    fn test_subnet_stats_marks_approximations() {
        let raw = RawSubnetStats {
            account_count: 40,
            post_count: 200,
            interaction_count: 600,
            engagement_stats: EngagementStats {
                like_count: 500,
                ..Default::default()
            },
        };
        let stats = normalize_subnet_stats(raw);

        assert_eq!(stats.total_miners, 40);
        assert_eq!(stats.active_miners, 40);
        assert_eq!(stats.avg_quality_score, 2.5);
        // The 24h window is a placeholder echoing the lifetime totals.
        assert!(stats.network_activity.approximated);
        assert_eq!(stats.network_activity.posts_24h, stats.total_posts);
        assert_eq!(stats.network_activity.interactions_24h, stats.total_interactions);
    }

    #[test]
    fn test_subnet_stats_avg_quality_guards_zero_posts() {
        let raw = RawSubnetStats {
            account_count: 0,
            post_count: 0,
            interaction_count: 0,
            engagement_stats: EngagementStats::default(),
        };
        let stats = normalize_subnet_stats(raw);
        assert_eq!(stats.avg_quality_score, 0.0);
    }
}
