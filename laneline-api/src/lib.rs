use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod availability;
pub mod bookings;
pub mod error;
pub mod mail;
pub mod packages;
pub mod payments;
pub mod state;
pub mod stripe;
pub mod webhooks;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // All endpoints are consumed by a browser widget on a different origin.
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    Router::new()
        .route("/v1/health", get(admin::health))
        .route("/v1/availability", get(availability::get_availability))
        .route("/v1/payments/intent", post(payments::create_payment_intent))
        .route("/v1/packages/validate", get(packages::validate_package))
        .route("/v1/packages/free", post(packages::create_free_package))
        .route("/v1/bookings", post(bookings::create_booking))
        .route("/v1/webhooks/payments", post(webhooks::handle_payment_webhook))
        .route("/v1/admin/packages/test", post(packages::create_test_package))
        .route("/v1/admin/slots/initialize", post(admin::initialize_slots))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
