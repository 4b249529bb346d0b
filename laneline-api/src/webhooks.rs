use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::mail;
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Deserialize)]
pub struct PaymentEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub data: EventData,
}

#[derive(Debug, Deserialize)]
pub struct EventData {
    pub object: IntentObject,
}

#[derive(Debug, Deserialize)]
pub struct IntentObject {
    pub id: String,
    pub status: Option<String>,
    pub receipt_email: Option<String>,
    pub charges: Option<Charges>,
}

#[derive(Debug, Deserialize)]
pub struct Charges {
    #[serde(default)]
    pub data: Vec<Charge>,
}

#[derive(Debug, Deserialize)]
pub struct Charge {
    pub billing_details: Option<BillingDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BillingDetails {
    pub email: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// Verify the provider's signature header (`t=<unix>,v1=<hex>`): HMAC-SHA256
/// of `{t}.{raw body}` under the shared webhook secret.
pub fn verify_signature(secret: &str, header: &str, body: &[u8]) -> bool {
    let mut timestamp = None;
    let mut candidates = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", v)) => timestamp = Some(v),
            Some(("v1", v)) => candidates.push(v),
            _ => {}
        }
    }
    let Some(timestamp) = timestamp else {
        return false;
    };

    for candidate in candidates {
        let Ok(expected) = hex::decode(candidate) else {
            continue;
        };
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(body);
        if mac.verify_slice(&expected).is_ok() {
            return true;
        }
    }
    false
}

/// POST /v1/webhooks/payments
/// Payment-confirmation events. Domain no-ops (unknown reference, unhandled
/// type) are acknowledged with 200 so the event source does not redeliver
/// forever; only storage failures return 500 to request redelivery.
pub async fn handle_payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, StatusCode> {
    if let Some(secret) = &state.webhook_secret {
        let signature = headers
            .get("stripe-signature")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if !verify_signature(secret, signature, &body) {
            tracing::warn!("Webhook signature verification failed");
            return Err(StatusCode::BAD_REQUEST);
        }
    } else {
        tracing::warn!("Accepting webhook without signature check (no secret configured)");
    }

    let event: PaymentEvent = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!("Unparseable webhook payload: {}", e);
        StatusCode::BAD_REQUEST
    })?;

    tracing::info!("Received webhook: {} for intent {}", event.type_, event.data.object.id);

    match event.type_.as_str() {
        "payment_intent.succeeded" => handle_payment_success(&state, &event.data.object).await,
        "payment_intent.payment_failed" => handle_payment_failure(&state, &event.data.object).await,
        other => {
            tracing::debug!("Unhandled event type {}", other);
            Ok(StatusCode::OK)
        }
    }
}

async fn handle_payment_success(
    state: &AppState,
    intent: &IntentObject,
) -> Result<StatusCode, StatusCode> {
    let package = state
        .packages
        .find_by_payment_reference(&intent.id)
        .await
        .map_err(|e| {
            tracing::error!("Package lookup failed for intent {}: {}", intent.id, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let Some(package) = package else {
        // Nothing to flip; acknowledge so the event is not redelivered.
        tracing::warn!("Package not found for payment intent {}", intent.id);
        return Ok(StatusCode::OK);
    };

    // Idempotent under redelivery: re-setting paid changes nothing. A
    // repeated confirmation email is the accepted, documented cost.
    state.packages.mark_paid(package.id).await.map_err(|e| {
        tracing::error!("Failed to mark package {} paid: {}", package.code, e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let billing = intent
        .charges
        .as_ref()
        .and_then(|c| c.data.first())
        .and_then(|c| c.billing_details.clone())
        .unwrap_or_default();
    let email = intent.receipt_email.clone().or(billing.email.clone());

    if let Some(email) = &email {
        if let Err(e) = state
            .packages
            .backfill_customer(package.id, email, billing.name.as_deref(), billing.phone.as_deref())
            .await
        {
            tracing::warn!("Contact backfill failed for package {}: {}", package.code, e);
        }
        if let Err(e) = state
            .customers
            .upsert(email, billing.name.as_deref().unwrap_or(""), billing.phone.as_deref())
            .await
        {
            tracing::warn!("Customer upsert failed for {}: {}", email, e);
        }
    }

    tracing::info!("Package {} marked as paid", package.code);

    let mut paid = package;
    paid.status = laneline_core::PackageStatus::Paid;
    if paid.customer_email.is_none() {
        paid.customer_email = email;
    }
    if let Some(message) = mail::package_confirmation(&paid) {
        if let Err(e) = state.mailer.send(message).await {
            tracing::warn!("Package confirmation email failed: {:#}", e);
        }
    } else {
        tracing::info!("No email on file for package {}; skipping confirmation", paid.code);
    }

    Ok(StatusCode::OK)
}

async fn handle_payment_failure(
    state: &AppState,
    intent: &IntentObject,
) -> Result<StatusCode, StatusCode> {
    let cancelled = state
        .packages
        .mark_cancelled_by_reference(&intent.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to cancel package for intent {}: {}", intent.id, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    if cancelled {
        tracing::info!("Package for intent {} cancelled after failed payment", intent.id);
    } else {
        tracing::warn!("No package to cancel for failed intent {}", intent.id);
    }
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, timestamp: &str, body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn valid_signature_verifies() {
        let body = br#"{"id":"evt_1","type":"payment_intent.succeeded"}"#;
        let sig = sign("whsec_test", "1759680000", body);
        let header = format!("t=1759680000,v1={sig}");
        assert!(verify_signature("whsec_test", &header, body));
    }

    #[test]
    fn wrong_secret_fails() {
        let body = b"{}";
        let sig = sign("whsec_other", "1759680000", body);
        let header = format!("t=1759680000,v1={sig}");
        assert!(!verify_signature("whsec_test", &header, body));
    }

    #[test]
    fn tampered_body_fails() {
        let sig = sign("whsec_test", "1759680000", b"{\"amount\":100}");
        let header = format!("t=1759680000,v1={sig}");
        assert!(!verify_signature("whsec_test", &header, b"{\"amount\":999}"));
    }

    #[test]
    fn tampered_timestamp_fails() {
        let body = b"{}";
        let sig = sign("whsec_test", "1759680000", body);
        let header = format!("t=1759680001,v1={sig}");
        assert!(!verify_signature("whsec_test", &header, body));
    }

    #[test]
    fn malformed_header_fails() {
        assert!(!verify_signature("whsec_test", "", b"{}"));
        assert!(!verify_signature("whsec_test", "v1=deadbeef", b"{}"));
        assert!(!verify_signature("whsec_test", "t=1,v1=nothex", b"{}"));
    }

    #[test]
    fn second_v1_candidate_is_accepted() {
        // Providers send multiple v1 entries during secret rotation.
        let body = b"{}";
        let good = sign("whsec_test", "1", body);
        let header = format!("t=1,v1={},v1={}", "00".repeat(32), good);
        assert!(verify_signature("whsec_test", &header, body));
    }

    #[test]
    fn event_envelope_parses() {
        let body = br#"{
            "id": "evt_1",
            "type": "payment_intent.succeeded",
            "data": {
                "object": {
                    "id": "pi_123",
                    "status": "succeeded",
                    "receipt_email": "parent@example.com",
                    "charges": {
                        "data": [{
                            "billing_details": {
                                "email": "parent@example.com",
                                "name": "Alex",
                                "phone": null
                            }
                        }]
                    },
                    "metadata": {"packageCode": "SPL-6L-123456-ABC"}
                }
            }
        }"#;
        let event: PaymentEvent = serde_json::from_slice(body).unwrap();
        assert_eq!(event.type_, "payment_intent.succeeded");
        assert_eq!(event.data.object.id, "pi_123");
        let billing = event.data.object.charges.unwrap().data[0]
            .billing_details
            .clone()
            .unwrap();
        assert_eq!(billing.name.as_deref(), Some("Alex"));
    }
}
