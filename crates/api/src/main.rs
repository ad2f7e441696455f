use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hatch_api::config::ServerConfig;
use hatch_api::router::build_app_router;
use hatch_api::state::AppState;
use hatch_api::webhooks::WebhookRouter;
use hatch_crm::{CrmClient, CrmConfig, OwnershipCache, TokenResolver};
use hatch_events::{start_keepalive, AnalyticsClient, StatusBroker};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hatch_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = hatch_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    hatch_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    hatch_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- CRM integration ---
    let crm_config = CrmConfig::from_env();
    if crm_config.client_id.is_none() || crm_config.client_secret.is_none() {
        tracing::warn!("OAuth client credentials not configured, token refresh is disabled");
    }
    let crm = Arc::new(CrmClient::new(&crm_config));
    let ownership = Arc::new(OwnershipCache::new(pool.clone(), Arc::clone(&crm)));
    let tokens = Arc::new(TokenResolver::new(
        pool.clone(),
        Arc::clone(&crm),
        crm_config,
        Arc::clone(&ownership),
    ));

    // --- Status broker + keep-alive ---
    let broker = Arc::new(StatusBroker::new(pool.clone()));
    let _keepalive_handle = start_keepalive(Arc::clone(&broker));
    tracing::info!("Status broker started");

    // --- Webhook router ---
    let analytics = Arc::new(AnalyticsClient::from_env());
    let webhook_router = Arc::new(WebhookRouter::new(
        pool.clone(),
        Arc::clone(&broker),
        Arc::clone(&analytics),
    ));

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        crm,
        tokens,
        broker,
        webhook_router,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Serve ---
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid HOST/PORT combination");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");
    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
