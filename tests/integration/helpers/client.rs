use super::mock_server::MockServer;
use nuance_client::NuanceClient;
use nuance_query::QueryCache;
use nuance_tracker::{
    app,
    state::{AppConfig, AppState},
};
use std::sync::Arc;
use tokio::sync::oneshot;

/// The tracker bound on a real port, backed by a mock upstream. The
/// data views fetch through the server's own proxy route, so they need
/// an actual listener rather than an in-process `oneshot` call.
pub struct TestApp {
    pub port: u16,
    pub http: reqwest::Client,
    pub api: NuanceClient,
    _upstream: MockServer,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestApp {
    pub async fn start() -> Self {
        let upstream = MockServer::start().await;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let http = reqwest::Client::new();
        let api = NuanceClient::new(
            http.clone(),
            format!("http://127.0.0.1:{}/api/nuance", port),
        );

        let state = AppState {
            config: AppConfig {
                upstream_base: upstream.base_url(),
            },
            http_client: http.clone(),
            api: api.clone(),
            cache: Arc::new(QueryCache::new()),
        };

        let (tx, rx) = oneshot::channel();
        let router = app(state);
        tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    rx.await.ok();
                })
                .await
                .unwrap();
        });

        TestApp {
            port,
            http,
            api,
            _upstream: upstream,
            shutdown_tx: Some(tx),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    pub async fn get_json(&self, path: &str) -> (reqwest::StatusCode, serde_json::Value) {
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .expect("Request failed");
        let status = response.status();
        let body = response.json().await.expect("Body was not JSON");
        (status, body)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
