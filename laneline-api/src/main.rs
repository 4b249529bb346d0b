use std::net::SocketAddr;
use std::sync::Arc;

use laneline_api::{app, mail, stripe::StripeAdapter, AppState};
use laneline_core::payment::{MockPaymentAdapter, PaymentAdapter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "laneline_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = laneline_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Laneline API on port {}", config.server.port);

    let db = laneline_store::DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let payments: Arc<dyn PaymentAdapter> = match &config.payments.stripe_secret_key {
        Some(key) => Arc::new(StripeAdapter::new(key.clone())),
        None => {
            tracing::warn!("No payment provider key configured; using mock adapter");
            Arc::new(MockPaymentAdapter)
        }
    };

    if config.payments.webhook_secret.is_none() {
        tracing::warn!("No webhook secret configured; payment events will not be signature-checked");
    }

    let mailer = mail::build_mailer(&config.mail).expect("Failed to configure mailer");

    let app_state = AppState::new(
        db,
        payments,
        mailer,
        config.payments.webhook_secret.clone(),
        config.payments.currency.clone(),
        config.business_rules.clone(),
    );

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
