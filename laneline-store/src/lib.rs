pub mod app_config;
pub mod booking_repo;
pub mod customer_repo;
pub mod database;
pub mod error;
pub mod package_repo;
pub mod slot_repo;

pub use booking_repo::BookingRepository;
pub use customer_repo::CustomerRepository;
pub use database::DbClient;
pub use error::{ConflictKind, StoreError};
pub use package_repo::{NewPackage, PackageRepository};
pub use slot_repo::{InsertOutcome, SlotRepository};
