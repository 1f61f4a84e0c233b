//! WallSt Subscriptions server.

use std::error::Error;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wallst_subscriptions::adapters::http::{app, BillingAppState};
use wallst_subscriptions::adapters::postgres::{
    PostgresCustomerRepository, PostgresPaymentMethodRepository, PostgresSubscriptionRepository,
};
use wallst_subscriptions::adapters::stripe::{StripeConfig, StripePaymentAdapter};
use wallst_subscriptions::config::{AppConfig, ConfigError};
use wallst_subscriptions::domain::billing::PriceCatalog;
use wallst_subscriptions::domain::foundation::PriceId;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    config.validate().map_err(ConfigError::from)?;

    init_tracing(&config);

    tracing::info!(
        environment = ?config.server.environment,
        stripe_mode = config.payment.stripe_mode(),
        verifies_webhooks = config.payment.verifies_webhooks(),
        "Starting WallSt subscriptions"
    );

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let catalog = PriceCatalog::standard(PriceId::new(config.payment.standard_price_id.clone())?);
    let provider = StripePaymentAdapter::new(StripeConfig::from_payment_config(&config.payment));

    let state = BillingAppState {
        payment_provider: Arc::new(provider),
        payment_methods: Arc::new(PostgresPaymentMethodRepository::new(pool.clone())),
        customers: Arc::new(PostgresCustomerRepository::new(pool.clone())),
        subscriptions: Arc::new(PostgresSubscriptionRepository::new(pool.clone())),
        catalog: Arc::new(catalog),
    };

    let router = app(state, config.server.request_timeout());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.server.json_logs() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}
