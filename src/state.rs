use nuance_client::NuanceClient;
use nuance_query::QueryCache;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Upstream API the proxy forwards to.
    pub upstream_base: String,
}

pub type SharedState = AppState;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub http_client: reqwest::Client,
    /// Typed client the view handlers fetch through. Points at this
    /// server's own proxy route so views and external consumers share
    /// one code path to the upstream.
    pub api: NuanceClient,
    pub cache: Arc<QueryCache>,
}

#[derive(Debug, Deserialize)]
pub struct MinersQuery {
    pub timeframe: Option<String>,
    pub limit: Option<usize>,
    /// Substring filter over username and hotkey.
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    /// When true the profile includes the score breakdown.
    pub enhanced: Option<bool>,
}
