pub mod generator;
pub mod template;
pub mod window;

pub use generator::{generate_slots, NewSlot};
pub use template::WEEKLY_TEMPLATE;
pub use window::{filter_open, resolve_window, WindowError, DEFAULT_WINDOW_DAYS};
