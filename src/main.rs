use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use arcade_scores::bootstrap::init_state;
use arcade_scores::config::Config;
use arcade_scores::routes::build_router;
use arcade_scores::store::{CollectionStore, HttpCollectionStore};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arcade_scores=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting arcade high-score server");

    let config = Config::load();
    let store: Option<Arc<dyn CollectionStore>> = config
        .store_url
        .as_deref()
        .map(|url| Arc::new(HttpCollectionStore::new(url)) as Arc<dyn CollectionStore>);

    let state = init_state(store, config.api_password.clone()).await;
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    info!("Server running on http://localhost:{}", config.port);
    axum::serve(listener, app).await.unwrap();
}
