//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other
//! side decide what to do with them; today they are written to the log.

use crate::config::DutyCycleConfig;
use crate::engine::Phase;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The application service has booted with the loaded durations.
    Started(DutyCycleConfig),

    /// The timer was started (or restarted) at `at_ms`.
    TimerStarted { at_ms: u64 },

    /// The timer was stopped.
    TimerStopped,

    /// The engine moved into `phase` at `at_ms`.
    PhaseChanged { phase: Phase, at_ms: u64 },

    /// New durations were applied.
    ConfigUpdated(DutyCycleConfig),
}
