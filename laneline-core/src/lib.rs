pub mod booking;
pub mod customer;
pub mod package;
pub mod payment;
pub mod pricing;
pub mod program;
pub mod slot;
pub mod wizard;

pub use booking::{Booking, BookingStatus, NewBooking};
pub use customer::Customer;
pub use package::{BookingDenied, Package, PackageStatus};
pub use program::Program;
pub use slot::{SlotStatus, TimeSlot};
