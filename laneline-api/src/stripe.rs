use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::Deserialize;

use laneline_core::payment::{
    IntentMetadata, PaymentAdapter, PaymentError, PaymentIntent, PaymentStatus,
};

const API_BASE: &str = "https://api.stripe.com";

/// Stripe over its form-encoded REST API.
pub struct StripeAdapter {
    http: reqwest::Client,
    secret_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct IntentBody {
    id: String,
    amount: i64,
    currency: String,
    status: String,
    client_secret: Option<String>,
    receipt_email: Option<String>,
    created: i64,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

fn parse_status(status: &str) -> PaymentStatus {
    match status {
        "requires_payment_method" => PaymentStatus::RequiresPaymentMethod,
        "requires_confirmation" | "requires_action" | "requires_capture" | "processing" => {
            PaymentStatus::Processing
        }
        "succeeded" => PaymentStatus::Succeeded,
        "canceled" => PaymentStatus::Canceled,
        _ => PaymentStatus::Failed,
    }
}

impl StripeAdapter {
    pub fn new(secret_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key,
            base_url: API_BASE.to_string(),
        }
    }

    #[cfg(test)]
    fn with_base_url(secret_key: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key,
            base_url,
        }
    }
}

#[async_trait]
impl PaymentAdapter for StripeAdapter {
    async fn create_intent(
        &self,
        amount_cents: i32,
        currency: &str,
        metadata: &IntentMetadata,
    ) -> Result<PaymentIntent, PaymentError> {
        let mut form: Vec<(&str, String)> = vec![
            ("amount", amount_cents.to_string()),
            ("currency", currency.to_string()),
            ("automatic_payment_methods[enabled]", "true".to_string()),
            ("metadata[program]", metadata.program.to_string()),
            ("metadata[lessons]", metadata.lessons.to_string()),
            ("metadata[packageCode]", metadata.package_code.clone()),
        ];
        if let Some(email) = &metadata.customer_email {
            form.push(("metadata[customerEmail]", email.clone()));
            form.push(("receipt_email", email.clone()));
        }

        let response = self
            .http
            .post(format!("{}/v1/payment_intents", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(|e| PaymentError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|b| b.error.message)
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(PaymentError::Provider(message));
        }

        let body: IntentBody = response
            .json()
            .await
            .map_err(|e| PaymentError::Provider(e.to_string()))?;

        Ok(PaymentIntent {
            id: body.id,
            amount_cents: body.amount as i32,
            currency: body.currency,
            status: parse_status(&body.status),
            client_secret: body.client_secret,
            receipt_email: body.receipt_email,
            created_at: Utc
                .timestamp_opt(body.created, 0)
                .single()
                .unwrap_or_else(Utc::now),
        })
    }

    fn is_test_mode(&self) -> bool {
        self.secret_key.starts_with("sk_test")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_map_to_domain_statuses() {
        assert_eq!(parse_status("requires_payment_method"), PaymentStatus::RequiresPaymentMethod);
        assert_eq!(parse_status("processing"), PaymentStatus::Processing);
        assert_eq!(parse_status("requires_action"), PaymentStatus::Processing);
        assert_eq!(parse_status("succeeded"), PaymentStatus::Succeeded);
        assert_eq!(parse_status("canceled"), PaymentStatus::Canceled);
        assert_eq!(parse_status("exploded"), PaymentStatus::Failed);
    }

    #[test]
    fn test_mode_follows_the_key_prefix() {
        assert!(StripeAdapter::new("sk_test_abc".to_string()).is_test_mode());
        assert!(!StripeAdapter::new("sk_live_abc".to_string()).is_test_mode());
    }

    #[tokio::test]
    async fn provider_error_surfaces_as_payment_error() {
        // Unroutable base URL: the request itself fails, which must come back
        // as a Provider error rather than a panic.
        let adapter =
            StripeAdapter::with_base_url("sk_test_abc".to_string(), "http://127.0.0.1:1".to_string());
        let metadata = IntentMetadata {
            program: laneline_core::Program::Droplet,
            lessons: 1,
            customer_email: None,
            package_code: "DRO-1L-000000-AAA".to_string(),
        };
        let err = adapter.create_intent(4000, "usd", &metadata).await.unwrap_err();
        assert!(matches!(err, PaymentError::Provider(_)));
    }
}
