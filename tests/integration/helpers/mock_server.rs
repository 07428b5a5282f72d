use axum::{
    extract::{Path, RawQuery},
    routing::{get, post},
    Json, Router,
};
use tokio::sync::oneshot;

/// Stand-in for the upstream Nuance API.
pub struct MockServer {
    pub port: u16,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockServer {
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/stats/top-miners", get(handle_top_miners))
            .route("/stats/subnet-stats", get(handle_subnet_stats))
            .route("/stats/top-posts", get(handle_top_posts))
            .route("/miners/:hotkey/stats", get(handle_miner_stats))
            .route("/miners/:hotkey/accounts", get(handle_empty_list))
            .route("/miners/:hotkey/posts", get(handle_empty_list))
            .route("/miners/:hotkey/interactions", get(handle_empty_list))
            .route("/miners/:hotkey/score-breakdown", get(handle_breakdown_down))
            .route("/accounts/verify/slow/:account", get(handle_slow))
            .route("/echo", get(handle_echo).post(handle_echo))
            .route("/topic/check", post(handle_topic_check));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    rx.await.ok();
                })
                .await
                .unwrap();
        });

        MockServer {
            port,
            shutdown_tx: Some(tx),
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn handle_top_miners() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "miners": [
            {
                "uid": 1,
                "handle": "foo",
                "node_hotkey": "abc",
                "score": 1.5,
                "retweet_count": 2,
                "reply_count": 3
            }
        ]
    }))
}

async fn handle_subnet_stats() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "account_count": 10,
        "post_count": 100,
        "interaction_count": 300,
        "engagement_stats": {
            "like_count": 400,
            "retweet_count": 150,
            "reply_count": 50
        }
    }))
}

async fn handle_top_posts() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "posts": [
            {
                "date": "2024-06-01T00:00:00Z",
                "handle": "foo",
                "text": "decentralized inference is here",
                "stats": {
                    "like_count": 3,
                    "retweet_count": 2,
                    "reply_count": 1
                }
            }
        ]
    }))
}

async fn handle_miner_stats(Path(hotkey): Path<String>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "uid": 1,
        "handle": "foo",
        "node_hotkey": hotkey,
        "score": 1.5,
        "retweet_count": 2,
        "reply_count": 3
    }))
}

async fn handle_empty_list() -> Json<serde_json::Value> {
    Json(serde_json::json!([]))
}

async fn handle_breakdown_down() -> (axum::http::StatusCode, Json<serde_json::Value>) {
    (
        axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "detail": "no scored items" })),
    )
}

async fn handle_slow() -> Json<serde_json::Value> {
    tokio::time::sleep(std::time::Duration::from_secs(2)).await;
    Json(serde_json::json!({}))
}

/// Echoes the raw query string so forwarding order is observable.
async fn handle_echo(RawQuery(raw): RawQuery) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "query": raw.unwrap_or_default() }))
}

async fn handle_topic_check(Json(body): Json<serde_json::Value>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "relevant": true,
        "received": body
    }))
}
