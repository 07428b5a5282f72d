//! Typed client for the Nuance API, speaking the proxy wire format.
//!
//! Every request goes through the proxy route as
//! `GET {base}?endpoint=/stats/top-miners&limit=10`, so the same client
//! works against any deployment of the proxy. Calls carry a fixed 10 s
//! timeout; non-2xx responses become errors carrying the upstream status
//! text. The client does not retry and does not catch — failures
//! propagate to the query layer.

pub mod wire;

use anyhow::{Context, Result};
use nuance_models::{
    AccountVerification, Interaction, MinerScoreBreakdown, MinerScores, MinerStats, Post,
    SocialAccount, SubnetStats, VerifiedPost,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Leaderboard window accepted by the stats endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    SevenDays,
    ThirtyDays,
    All,
}

impl Timeframe {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "7d" => Some(Self::SevenDays),
            "30d" => Some(Self::ThirtyDays),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SevenDays => "7d",
            Self::ThirtyDays => "30d",
            Self::All => "all",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    Recent,
    Top,
    Trending,
}

impl PostFilter {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "recent" => Some(Self::Recent),
            "top" => Some(Self::Top),
            "trending" => Some(Self::Trending),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recent => "recent",
            Self::Top => "top",
            Self::Trending => "trending",
        }
    }
}

/// Optional filters for the recent-posts feed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecentPostsParams {
    pub cutoff_date: Option<String>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub min_interactions: Option<u64>,
    pub only_scored: Option<bool>,
    pub include_stats: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RecentInteractionsParams {
    pub cutoff_date: Option<String>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct NuanceClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl NuanceClient {
    /// `base_url` is the proxy route itself, e.g.
    /// `http://127.0.0.1:3000/api/nuance`.
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        tracing::debug!("GET {} via {}", endpoint, self.base_url);

        let mut req = self
            .http
            .get(&self.base_url)
            .timeout(self.timeout)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("endpoint", endpoint)]);
        for (key, value) in params {
            req = req.query(&[(*key, value.as_str())]);
        }

        let res = req
            .send()
            .await
            .with_context(|| format!("Request failed: {}", endpoint))?;

        if !res.status().is_success() {
            let status = res.status();
            anyhow::bail!(
                "API request failed: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown")
            );
        }

        res.json::<T>()
            .await
            .with_context(|| format!("Failed to parse response: {}", endpoint))
    }

    async fn post_json<T: DeserializeOwned>(&self, endpoint: &str, body: &Value) -> Result<T> {
        tracing::debug!("POST {} via {}", endpoint, self.base_url);

        let res = self
            .http
            .post(&self.base_url)
            .timeout(self.timeout)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("endpoint", endpoint)])
            .json(body)
            .send()
            .await
            .with_context(|| format!("Request failed: {}", endpoint))?;

        if !res.status().is_success() {
            let status = res.status();
            anyhow::bail!(
                "API request failed: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown")
            );
        }

        res.json::<T>()
            .await
            .with_context(|| format!("Failed to parse response: {}", endpoint))
    }

    /// Leaderboard, ranked by response order.
    pub async fn top_miners(
        &self,
        timeframe: Option<Timeframe>,
        limit: usize,
    ) -> Result<Vec<MinerStats>> {
        let mut params = Vec::new();
        if let Some(tf) = timeframe {
            params.push(("timeframe", tf.as_str().to_string()));
        }
        params.push(("limit", limit.to_string()));

        let list: wire::MinerList = self.get_json("/stats/top-miners", &params).await?;
        Ok(wire::normalize_miners(list.miners))
    }

    /// Full miner list for search; a high limit covers the whole subnet.
    pub async fn all_miners(&self, timeframe: Option<Timeframe>) -> Result<Vec<MinerStats>> {
        self.top_miners(timeframe, 500).await
    }

    pub async fn miner_stats(&self, hotkey: &str) -> Result<MinerStats> {
        let endpoint = format!("/miners/{}/stats", hotkey);
        let raw: wire::RawMiner = self.get_json(&endpoint, &[]).await?;
        Ok(wire::normalize_miner(raw, None))
    }

    pub async fn miner_accounts(&self, hotkey: &str) -> Result<Vec<SocialAccount>> {
        let endpoint = format!("/miners/{}/accounts", hotkey);
        self.get_json(&endpoint, &[]).await
    }

    pub async fn miner_posts(&self, hotkey: &str, page: u32, limit: usize) -> Result<Vec<Post>> {
        let endpoint = format!("/miners/{}/posts", hotkey);
        let params = [
            ("page", page.to_string()),
            ("limit", limit.to_string()),
        ];
        let raw: Vec<wire::RawPost> = self.get_json(&endpoint, &params).await?;
        Ok(wire::normalize_posts(raw))
    }

    pub async fn miner_interactions(&self, hotkey: &str, page: u32) -> Result<Vec<Interaction>> {
        let endpoint = format!("/miners/{}/interactions", hotkey);
        let params = [("page", page.to_string())];
        self.get_json(&endpoint, &params).await
    }

    pub async fn top_posts(&self, filter: Option<PostFilter>, limit: usize) -> Result<Vec<Post>> {
        let mut params = Vec::new();
        if let Some(f) = filter {
            params.push(("filter", f.as_str().to_string()));
        }
        params.push(("limit", limit.to_string()));

        let list: wire::PostList = self.get_json("/stats/top-posts", &params).await?;
        Ok(wire::normalize_posts(list.posts))
    }

    pub async fn subnet_stats(&self) -> Result<SubnetStats> {
        let raw: wire::RawSubnetStats = self.get_json("/stats/subnet-stats", &[]).await?;
        Ok(wire::normalize_subnet_stats(raw))
    }

    pub async fn miner_scores(&self) -> Result<MinerScores> {
        self.get_json("/miners/scores", &[]).await
    }

    pub async fn score_breakdown(&self, hotkey: &str) -> Result<MinerScoreBreakdown> {
        let endpoint = format!("/miners/{}/score-breakdown", hotkey);
        self.get_json(&endpoint, &[]).await
    }

    pub async fn recent_posts(
        &self,
        platform: &str,
        params: &RecentPostsParams,
    ) -> Result<Vec<VerifiedPost>> {
        let endpoint = format!("/posts/{}/recent", platform);
        let mut query = Vec::new();
        if let Some(ref cutoff) = params.cutoff_date {
            query.push(("cutoff_date", cutoff.clone()));
        }
        if let Some(skip) = params.skip {
            query.push(("skip", skip.to_string()));
        }
        if let Some(limit) = params.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(min) = params.min_interactions {
            query.push(("min_interactions", min.to_string()));
        }
        if let Some(only_scored) = params.only_scored {
            query.push(("only_scored", only_scored.to_string()));
        }
        if let Some(include_stats) = params.include_stats {
            query.push(("include_stats", include_stats.to_string()));
        }
        self.get_json(&endpoint, &query).await
    }

    pub async fn post(
        &self,
        platform: &str,
        post_id: &str,
        include_stats: bool,
    ) -> Result<VerifiedPost> {
        let endpoint = format!("/posts/{}/{}", platform, post_id);
        let mut params = Vec::new();
        if include_stats {
            params.push(("include_stats", "true".to_string()));
        }
        self.get_json(&endpoint, &params).await
    }

    pub async fn post_interactions(
        &self,
        platform: &str,
        post_id: &str,
        skip: u64,
        limit: usize,
    ) -> Result<Vec<Interaction>> {
        let endpoint = format!("/posts/{}/{}/interactions", platform, post_id);
        let params = [("skip", skip.to_string()), ("limit", limit.to_string())];
        self.get_json(&endpoint, &params).await
    }

    pub async fn recent_interactions(
        &self,
        platform: &str,
        params: &RecentInteractionsParams,
    ) -> Result<Vec<Interaction>> {
        let endpoint = format!("/interactions/{}/recent", platform);
        let mut query = Vec::new();
        if let Some(ref cutoff) = params.cutoff_date {
            query.push(("cutoff_date", cutoff.clone()));
        }
        if let Some(skip) = params.skip {
            query.push(("skip", skip.to_string()));
        }
        if let Some(limit) = params.limit {
            query.push(("limit", limit.to_string()));
        }
        self.get_json(&endpoint, &query).await
    }

    pub async fn interaction(&self, platform: &str, interaction_id: &str) -> Result<Interaction> {
        let endpoint = format!("/interactions/{}/{}", platform, interaction_id);
        self.get_json(&endpoint, &[]).await
    }

    pub async fn verify_account(
        &self,
        platform: &str,
        account_id: &str,
    ) -> Result<AccountVerification> {
        let endpoint = format!("/accounts/verify/{}/{}", platform, account_id);
        self.get_json(&endpoint, &[]).await
    }

    /// Topic relevance check. Upstream rate-limits this to 2 requests per
    /// minute; callers gate invocation, the client does not throttle.
    pub async fn check_topic(&self, content: &str, topic: &str) -> Result<Value> {
        let body = serde_json::json!({ "content": content, "topic": topic });
        self.post_json("/topic/check", &body).await
    }

    pub async fn check_nuance(&self, content: &str) -> Result<bool> {
        let body = serde_json::json!({ "content": content });
        self.post_json("/nuance/check", &body).await
    }
}
