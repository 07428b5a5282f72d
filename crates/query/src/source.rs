//! The upstream resource surface the query layer fetches from.
//!
//! `NuanceClient` is the real implementation; tests mock the trait.

use anyhow::Result;
use async_trait::async_trait;
use nuance_client::{
    NuanceClient, PostFilter, RecentInteractionsParams, RecentPostsParams, Timeframe,
};
use nuance_models::{
    AccountVerification, Interaction, MinerScoreBreakdown, MinerScores, MinerStats, Post,
    SocialAccount, SubnetStats, VerifiedPost,
};
use serde_json::Value;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NuanceSource: Send + Sync {
    async fn top_miners(
        &self,
        timeframe: Option<Timeframe>,
        limit: usize,
    ) -> Result<Vec<MinerStats>>;
    async fn all_miners(&self, timeframe: Option<Timeframe>) -> Result<Vec<MinerStats>>;
    async fn miner_stats(&self, hotkey: &str) -> Result<MinerStats>;
    async fn miner_accounts(&self, hotkey: &str) -> Result<Vec<SocialAccount>>;
    async fn miner_posts(&self, hotkey: &str, page: u32, limit: usize) -> Result<Vec<Post>>;
    async fn miner_interactions(&self, hotkey: &str, page: u32) -> Result<Vec<Interaction>>;
    async fn top_posts(&self, filter: Option<PostFilter>, limit: usize) -> Result<Vec<Post>>;
    async fn subnet_stats(&self) -> Result<SubnetStats>;
    async fn miner_scores(&self) -> Result<MinerScores>;
    async fn score_breakdown(&self, hotkey: &str) -> Result<MinerScoreBreakdown>;
    async fn recent_posts(
        &self,
        platform: &str,
        params: &RecentPostsParams,
    ) -> Result<Vec<VerifiedPost>>;
    async fn post(&self, platform: &str, post_id: &str, include_stats: bool)
        -> Result<VerifiedPost>;
    async fn post_interactions(
        &self,
        platform: &str,
        post_id: &str,
        skip: u64,
        limit: usize,
    ) -> Result<Vec<Interaction>>;
    async fn recent_interactions(
        &self,
        platform: &str,
        params: &RecentInteractionsParams,
    ) -> Result<Vec<Interaction>>;
    async fn interaction(&self, platform: &str, interaction_id: &str) -> Result<Interaction>;
    async fn verify_account(&self, platform: &str, account_id: &str)
        -> Result<AccountVerification>;
    async fn check_topic(&self, content: &str, topic: &str) -> Result<Value>;
    async fn check_nuance(&self, content: &str) -> Result<bool>;
}

#[async_trait]
impl NuanceSource for NuanceClient {
    async fn top_miners(
        &self,
        timeframe: Option<Timeframe>,
        limit: usize,
    ) -> Result<Vec<MinerStats>> {
        NuanceClient::top_miners(self, timeframe, limit).await
    }

    async fn all_miners(&self, timeframe: Option<Timeframe>) -> Result<Vec<MinerStats>> {
        NuanceClient::all_miners(self, timeframe).await
    }

    async fn miner_stats(&self, hotkey: &str) -> Result<MinerStats> {
        NuanceClient::miner_stats(self, hotkey).await
    }

    async fn miner_accounts(&self, hotkey: &str) -> Result<Vec<SocialAccount>> {
        NuanceClient::miner_accounts(self, hotkey).await
    }

    async fn miner_posts(&self, hotkey: &str, page: u32, limit: usize) -> Result<Vec<Post>> {
        NuanceClient::miner_posts(self, hotkey, page, limit).await
    }

    async fn miner_interactions(&self, hotkey: &str, page: u32) -> Result<Vec<Interaction>> {
        NuanceClient::miner_interactions(self, hotkey, page).await
    }

    async fn top_posts(&self, filter: Option<PostFilter>, limit: usize) -> Result<Vec<Post>> {
        NuanceClient::top_posts(self, filter, limit).await
    }

    async fn subnet_stats(&self) -> Result<SubnetStats> {
        NuanceClient::subnet_stats(self).await
    }

    async fn miner_scores(&self) -> Result<MinerScores> {
        NuanceClient::miner_scores(self).await
    }

    async fn score_breakdown(&self, hotkey: &str) -> Result<MinerScoreBreakdown> {
        NuanceClient::score_breakdown(self, hotkey).await
    }

    async fn recent_posts(
        &self,
        platform: &str,
        params: &RecentPostsParams,
    ) -> Result<Vec<VerifiedPost>> {
        NuanceClient::recent_posts(self, platform, params).await
    }

    async fn post(
        &self,
        platform: &str,
        post_id: &str,
        include_stats: bool,
    ) -> Result<VerifiedPost> {
        NuanceClient::post(self, platform, post_id, include_stats).await
    }

    async fn post_interactions(
        &self,
        platform: &str,
        post_id: &str,
        skip: u64,
        limit: usize,
    ) -> Result<Vec<Interaction>> {
        NuanceClient::post_interactions(self, platform, post_id, skip, limit).await
    }

    async fn recent_interactions(
        &self,
        platform: &str,
        params: &RecentInteractionsParams,
    ) -> Result<Vec<Interaction>> {
        NuanceClient::recent_interactions(self, platform, params).await
    }

    async fn interaction(&self, platform: &str, interaction_id: &str) -> Result<Interaction> {
        NuanceClient::interaction(self, platform, interaction_id).await
    }

    async fn verify_account(
        &self,
        platform: &str,
        account_id: &str,
    ) -> Result<AccountVerification> {
        NuanceClient::verify_account(self, platform, account_id).await
    }

    async fn check_topic(&self, content: &str, topic: &str) -> Result<Value> {
        NuanceClient::check_topic(self, content, topic).await
    }

    async fn check_nuance(&self, content: &str) -> Result<bool> {
        NuanceClient::check_nuance(self, content).await
    }
}
