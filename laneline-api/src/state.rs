use std::sync::Arc;

use laneline_core::payment::PaymentAdapter;
use laneline_store::app_config::BusinessRules;
use laneline_store::{
    BookingRepository, CustomerRepository, DbClient, PackageRepository, SlotRepository,
};

use crate::mail::Mailer;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbClient>,
    pub packages: Arc<PackageRepository>,
    pub slots: Arc<SlotRepository>,
    pub bookings: Arc<BookingRepository>,
    pub customers: Arc<CustomerRepository>,
    pub payments: Arc<dyn PaymentAdapter>,
    pub mailer: Arc<dyn Mailer>,
    pub webhook_secret: Option<String>,
    pub currency: String,
    pub rules: BusinessRules,
}

impl AppState {
    pub fn new(
        db: DbClient,
        payments: Arc<dyn PaymentAdapter>,
        mailer: Arc<dyn Mailer>,
        webhook_secret: Option<String>,
        currency: String,
        rules: BusinessRules,
    ) -> Self {
        let pool = db.pool.clone();
        Self {
            db: Arc::new(db),
            packages: Arc::new(PackageRepository::new(pool.clone())),
            slots: Arc::new(SlotRepository::new(pool.clone())),
            bookings: Arc::new(BookingRepository::new(pool.clone())),
            customers: Arc::new(CustomerRepository::new(pool)),
            payments,
            mailer,
            webhook_secret,
            currency,
            rules,
        }
    }
}
