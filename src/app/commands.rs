//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (the web UI
//! today) that the [`AppService`](super::service::AppService) interprets
//! and acts upon.

use crate::config::DutyCycleConfig;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Replace both cycle durations. Does not touch `running` or phase.
    SetTimers(DutyCycleConfig),

    /// Flip between running and stopped. Turning on restarts from ON.
    ToggleTimer,

    /// Start (or restart) the cycle from the ON phase.
    Start,

    /// Stop cycling and de-energize the relay.
    Stop,
}
