//! enrollment-gate server binary.

use std::str::FromStr;
use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue, Method};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use enrollment_gate::adapters::postgres::{
    PostgresCourseCatalog, PostgresEnrollmentStore, PostgresProfileDirectory,
    PostgresReconciliationLog, PostgresWebhookEventRepository,
};
use enrollment_gate::adapters::stripe::{StripeConfig, StripePaymentAdapter};
use enrollment_gate::adapters::{enrollment_router, EnrollmentAppState};
use enrollment_gate::application::CheckoutSettings;
use enrollment_gate::config::{AppConfig, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config.server);

    tracing::info!(
        environment = ?config.server.environment,
        stripe_test_mode = config.payment.is_test_mode(),
        "enrollment-gate starting"
    );

    // Server-side bound matches the client-side store timeout
    let connect_options = PgConnectOptions::from_str(&config.database.url)?.options([(
        "statement_timeout",
        config.database.statement_timeout_ms.to_string(),
    )]);

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .idle_timeout(config.database.idle_timeout())
        .connect_with(connect_options)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let payment_provider = StripePaymentAdapter::new(StripeConfig::from_payment_config(&config.payment));

    let state = EnrollmentAppState::new(
        Arc::new(PostgresEnrollmentStore::new(pool.clone())),
        Arc::new(PostgresCourseCatalog::new(pool.clone())),
        Arc::new(PostgresProfileDirectory::new(pool.clone())),
        Arc::new(payment_provider),
        Arc::new(PostgresReconciliationLog::new(pool.clone())),
        Arc::new(PostgresWebhookEventRepository::new(pool)),
        CheckoutSettings::new(config.server.base_url(), config.payment.currency.clone()),
    )
    .with_store_timeout(config.database.store_timeout());

    let app = enrollment_router(state)
        .layer(cors_layer(&config.server))
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// JSON logs in production, pretty logs elsewhere. `RUST_LOG` wins over config.
fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if server.is_production() {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().pretty()).init();
    }
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-user-id"),
        ])
}
