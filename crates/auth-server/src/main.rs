use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use auth_core::{
    config::Settings,
    mailer::{HttpMailer, Mailer},
    routes,
    store::FlatFileUserStore,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize configuration, falling back to the bundled defaults file
    let settings = Settings::load().or_else(|e| {
        eprintln!("config.toml not usable ({e}), trying config/default.toml");
        Settings::load_from("config/default.toml")
    })?;
    let bind_addr = settings.bind_addr;

    // Initialize tracing; RUST_LOG wins over the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(settings.log_level.clone())),
        )
        .init();

    // Wire storage and the outbound mail transport
    let store = FlatFileUserStore::new(&settings.data_dir)?;
    let mailer: Arc<dyn Mailer> = Arc::new(HttpMailer::new(&settings.mailer));

    let state = Arc::new(AppState::new(store, settings, mailer));

    // Hourly sweep of expired sessions and reset tokens
    let sweeper = Arc::clone(&state.service);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60 * 60));
        loop {
            interval.tick().await;
            sweeper.sweep_expired().await;
        }
    });

    let app = routes::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
