use std::sync::Arc;

use linequiz::config::Config;
use linequiz::images::ImageService;
use linequiz::line::client::{LineClient, MessagingApi};
use linequiz::quiz::script::QuizScript;
use linequiz::quiz::tracker::QuizTracker;
use linequiz::server::{AppState, router};
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = Arc::new(Config::from_env()?);
    let messaging: Arc<dyn MessagingApi> =
        Arc::new(LineClient::new(config.access_token.clone()));
    let tracker = Arc::new(QuizTracker::new(QuizScript::standard()));
    let images = Arc::new(ImageService::new(config.images_dir.clone()));

    let state = AppState {
        config: Arc::clone(&config),
        tracker,
        images,
        messaging,
    };
    let app = router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, host = %config.host, "linequiz listening");
    axum::serve(listener, app).await?;

    Ok(())
}
