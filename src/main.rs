use nuance_client::NuanceClient;
use nuance_query::{queries, spawn_refresh, QueryCache};
use nuance_tracker::app;
use nuance_tracker::state::{AppConfig, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let upstream_base =
        std::env::var("NUANCE_API_URL").unwrap_or_else(|_| "https://api.nuance.info".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    tracing::info!("Upstream API: {}", upstream_base);

    let http_client = reqwest::Client::builder()
        .user_agent("Nuance-Tracker/1.0")
        .build()?;

    // The typed client calls this server's own proxy route, so the data
    // views exercise the same path external consumers do.
    let proxy_base = format!("http://127.0.0.1:{}/api/nuance", port);
    let api = NuanceClient::new(http_client.clone(), proxy_base);
    let cache = Arc::new(QueryCache::new());

    let app_state = AppState {
        config: AppConfig { upstream_base },
        http_client,
        api: api.clone(),
        cache: cache.clone(),
    };

    // Keep the dashboard composite warm.
    {
        let api = api.clone();
        let cache = cache.clone();
        spawn_refresh(queries::DASHBOARD_REFRESH, move || {
            let api = api.clone();
            let cache = cache.clone();
            async move {
                queries::dashboard(&api, &cache).await?;
                Ok(())
            }
        });
    }

    // Sweep expired cache entries hourly.
    {
        let cache = cache.clone();
        spawn_refresh(Duration::from_secs(3600), move || {
            let cache = cache.clone();
            async move {
                let removed = cache.cleanup();
                if removed > 0 {
                    tracing::info!("Evicted {} expired cache entries", removed);
                }
                Ok::<(), anyhow::Error>(())
            }
        });
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Nuance tracker listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let router = app(app_state);
    axum::serve(listener, router).await?;

    Ok(())
}
