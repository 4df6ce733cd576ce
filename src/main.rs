use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use news_alert_ui::api::ApiClient;
use news_alert_ui::config::{Config, DEFAULT_CONFIG_PATH};
use news_alert_ui::routes::{self, AppState};
use news_alert_ui::store::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "news_alert_ui=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path =
        std::env::var("NEWS_ALERT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load_or_default(&config_path)?
        .with_api_url_override(std::env::var("NEWS_ALERT_API_URL").ok());
    info!("Using backend API at {}", config.api_base_url);

    let api = ApiClient::new(
        &config.api_base_url,
        config.request_timeout_secs.map(Duration::from_secs),
    )?;

    let state = Arc::new(AppState {
        store: Store::new(api),
        actions: config.actions.clone(),
    });
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("Server starting on http://{}", config.listen_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
