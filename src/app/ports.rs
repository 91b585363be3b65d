//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (relay, indicator, timer store, clock, event sink)
//! implement these traits. The [`AppService`](super::service::AppService)
//! and [`Controller`](super::controller::Controller) consume them via
//! generics, so the domain core never touches hardware directly.

use crate::config::DutyCycleConfig;
use crate::indicator::IndicatorSignal;

// ───────────────────────────────────────────────────────────────
// Relay port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the relay coil.
pub trait RelayPort {
    /// Drive the relay. `true` energizes the coil.
    fn set_energized(&mut self, energized: bool);

    /// Last level written.
    fn is_energized(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Indicator port (driven adapter: domain → LED / pixel)
// ───────────────────────────────────────────────────────────────

/// Renders an [`IndicatorSignal`] on whatever hardware is fitted.
pub trait IndicatorPort {
    fn show(&mut self, signal: IndicatorSignal);
}

/// No indicator hardware. Accepts and discards every signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoIndicator;

impl IndicatorPort for NoIndicator {
    fn show(&mut self, _signal: IndicatorSignal) {}
}

/// Drive two indicators with the same signal (e.g. LED + RGB pixel).
impl<A: IndicatorPort, B: IndicatorPort> IndicatorPort for (A, B) {
    fn show(&mut self, signal: IndicatorSignal) {
        self.0.show(signal);
        self.1.show(signal);
    }
}

impl<P: IndicatorPort + ?Sized> IndicatorPort for Box<P> {
    fn show(&mut self, signal: IndicatorSignal) {
        (**self).show(signal);
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.
pub trait ClockPort {
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Timer store port (driven adapter: domain ↔ durable record)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the [`DutyCycleConfig`] record.
pub trait TimerStore {
    /// Read the stored durations.
    fn load(&self) -> Result<DutyCycleConfig, StoreError>;

    /// Overwrite the stored durations.
    fn save(&mut self, config: &DutyCycleConfig) -> Result<(), StoreError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`TimerStore`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// No record has been written yet (first boot).
    NotFound,
    /// The record exists but does not parse.
    Malformed,
    /// The storage backend could not be mounted or opened.
    Unavailable,
    /// Read or write failed in the storage backend.
    Io,
}

impl core::fmt::Display for StoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "record not found"),
            Self::Malformed => write!(f, "record malformed"),
            Self::Unavailable => write!(f, "storage unavailable"),
            Self::Io => write!(f, "I/O error"),
        }
    }
}
