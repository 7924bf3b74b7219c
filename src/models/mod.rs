pub mod alert;
pub mod trigger;

pub use alert::{Alert, Condition};
pub use trigger::TriggerEvent;
