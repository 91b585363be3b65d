//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the duty-cycle engine. It exposes a clean,
//! hardware-agnostic API. All I/O flows through port traits injected at
//! call sites, making the entire service testable with mock adapters.
//!
//! ```text
//!   AppCommand ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                  │       AppService       │
//!    RelayPort ◀── │    DutyCycleEngine     │
//!                  └────────────────────────┘
//! ```

use log::info;

use crate::config::DutyCycleConfig;
use crate::engine::{DutyCycleEngine, EngineState};

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{EventSink, RelayPort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    engine: DutyCycleEngine,
    tick_count: u64,
}

impl AppService {
    /// Construct a stopped service with the loaded durations.
    ///
    /// Does **not** touch the relay; call [`boot`](Self::boot) next.
    pub fn new(config: DutyCycleConfig) -> Self {
        Self {
            engine: DutyCycleEngine::new(config),
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive the relay to its power-on level and announce the config.
    pub fn boot(&mut self, relay: &mut impl RelayPort, sink: &mut impl EventSink) {
        relay.set_energized(false);
        let config = self.engine.config();
        sink.emit(&AppEvent::Started(config));
        info!(
            "AppService started (on={}s off={}s, stopped)",
            config.on_secs(),
            config.off_secs()
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Advance the engine to `now_ms` and mirror the result onto the relay.
    pub fn tick(&mut self, now_ms: u64, relay: &mut impl RelayPort, sink: &mut impl EventSink) {
        self.tick_count += 1;

        if let Some(phase) = self.engine.tick(now_ms) {
            sink.emit(&AppEvent::PhaseChanged {
                phase,
                at_ms: now_ms,
            });
        }

        self.apply_relay(relay);
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command.
    ///
    /// The relay is updated before returning, so a stop takes effect
    /// without waiting for the next tick.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now_ms: u64,
        relay: &mut impl RelayPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::SetTimers(config) => {
                self.engine.set_config(config);
                sink.emit(&AppEvent::ConfigUpdated(config));
            }
            AppCommand::ToggleTimer => {
                if self.engine.is_running() {
                    self.stop(sink);
                } else {
                    self.start(now_ms, sink);
                }
            }
            AppCommand::Start => self.start(now_ms, sink),
            AppCommand::Stop => self.stop(sink),
        }

        self.apply_relay(relay);
    }

    // ── Queries ───────────────────────────────────────────────

    /// Durations currently in effect.
    pub fn timer_values(&self) -> DutyCycleConfig {
        self.engine.config()
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    /// Full engine state snapshot.
    pub fn engine_state(&self) -> EngineState {
        self.engine.state()
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // ── Internal ──────────────────────────────────────────────

    fn start(&mut self, now_ms: u64, sink: &mut impl EventSink) {
        self.engine.start(now_ms);
        sink.emit(&AppEvent::TimerStarted { at_ms: now_ms });
    }

    fn stop(&mut self, sink: &mut impl EventSink) {
        if self.engine.is_running() {
            self.engine.stop();
            sink.emit(&AppEvent::TimerStopped);
        }
    }

    /// Write the derived relay level, skipping redundant writes.
    fn apply_relay(&self, relay: &mut impl RelayPort) {
        let want = self.engine.relay_energized();
        if relay.is_energized() != want {
            relay.set_energized(want);
        }
    }
}
