//! Output drivers and task helpers.

pub mod pixel;
pub mod relay;
pub mod status_led;
pub mod task_pin;
pub mod watchdog;
