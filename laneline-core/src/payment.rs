use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::program::Program;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    RequiresPaymentMethod,
    Processing,
    Succeeded,
    Canceled,
    Failed,
}

/// A payment intent as reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub amount_cents: i32,
    pub currency: String,
    pub status: PaymentStatus,
    pub client_secret: Option<String>,
    pub receipt_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Metadata attached to an intent so the webhook side can reconcile it.
#[derive(Debug, Clone)]
pub struct IntentMetadata {
    pub program: Program,
    pub lessons: i32,
    pub customer_email: Option<String>,
    pub package_code: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("payment provider error: {0}")]
    Provider(String),

    #[error("payment provider not configured")]
    NotConfigured,
}

#[async_trait]
pub trait PaymentAdapter: Send + Sync {
    /// Create a payment intent with the provider.
    async fn create_intent(
        &self,
        amount_cents: i32,
        currency: &str,
        metadata: &IntentMetadata,
    ) -> Result<PaymentIntent, PaymentError>;

    /// Whether the configured credentials point at the provider's test mode.
    fn is_test_mode(&self) -> bool;
}

/// In-process adapter for tests and local development.
pub struct MockPaymentAdapter;

#[async_trait]
impl PaymentAdapter for MockPaymentAdapter {
    async fn create_intent(
        &self,
        amount_cents: i32,
        currency: &str,
        metadata: &IntentMetadata,
    ) -> Result<PaymentIntent, PaymentError> {
        Ok(PaymentIntent {
            id: format!("mock_pi_{}", metadata.package_code),
            amount_cents,
            currency: currency.to_string(),
            status: PaymentStatus::RequiresPaymentMethod,
            client_secret: Some(format!("mock_secret_{}", metadata.package_code)),
            receipt_email: metadata.customer_email.clone(),
            created_at: Utc::now(),
        })
    }

    fn is_test_mode(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_adapter_echoes_metadata() {
        let adapter = MockPaymentAdapter;
        let metadata = IntentMetadata {
            program: Program::Droplet,
            lessons: 4,
            customer_email: Some("parent@example.com".to_string()),
            package_code: "DRO-4L-000000-AAA".to_string(),
        };

        let intent = adapter.create_intent(11200, "usd", &metadata).await.unwrap();
        assert_eq!(intent.amount_cents, 11200);
        assert_eq!(intent.status, PaymentStatus::RequiresPaymentMethod);
        assert!(intent.client_secret.unwrap().contains("DRO-4L"));
        assert!(adapter.is_test_mode());
    }
}
