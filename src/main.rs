use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;

use xerppy_api::{
    build_router,
    config::AppConfig,
    db,
    error::AppError,
    initialize_plugins,
    observability::init_tracing,
    services::{AuthService, AuthStore, Database, JwtService},
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // Load configuration - fail fast if invalid
    let config = AppConfig::from_env()?;

    init_tracing(&config.log_level);

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting Xerppy API"
    );

    // Initialize database connection pool and schema
    let pool = db::create_pool(&config.database).await?;
    db::run_migrations(&pool).await?;
    tracing::info!("Database initialized successfully");

    let store: Arc<dyn AuthStore> = Arc::new(Database::new(pool));

    let jwt = JwtService::new(&config.jwt).map_err(AppError::ConfigError)?;
    tracing::info!("JWT service initialized");

    let auth = AuthService::new(store.clone(), jwt.clone());

    let state = AppState {
        config: config.clone(),
        store,
        jwt,
        auth,
    };

    // Seed roles/permissions and the bootstrap admin before serving
    initialize_plugins(&state).await?;

    let app = build_router(state).await?;

    let host: std::net::IpAddr = config
        .host
        .parse()
        .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Invalid HOST: {}", e)))?;
    let addr = SocketAddr::new(host, config.port);

    tracing::info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
