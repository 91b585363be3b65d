//! Duty-cycle engine.
//!
//! Two-phase state machine that alternates the relay between ON and OFF
//! according to a [`DutyCycleConfig`]:
//!
//! ```text
//!                   elapsed >= on_ms
//!        ┌──────────────────────────────────────┐
//!        │                                      ▼
//!   ┌─────────┐                            ┌─────────┐
//!   │   ON    │                            │   OFF   │
//!   │ relay ▲ │                            │ relay ▽ │
//!   └─────────┘                            └─────────┘
//!        ▲                                      │
//!        └──────────────────────────────────────┘
//!                   elapsed >= off_ms
//! ```
//!
//! The engine owns no clock and touches no hardware. The host loop passes
//! a monotonic `now_ms` into [`DutyCycleEngine::tick`] and derives the
//! relay level from [`EngineState::relay_energized`]. Every operation is
//! total; there are no error paths.
//!
//! ## Zero durations
//!
//! A zero duration disables its phase: the engine never enters it, not
//! even for a single tick. With `on_ms == 0` the cycle starts in OFF and
//! each expiry restarts OFF, so the relay is never energized. With
//! `off_ms == 0` each ON expiry restarts ON and the relay never drops
//! out. With both at zero the engine parks in OFF with `running` still
//! true, and cycling resumes as soon as either duration becomes non-zero.

use log::debug;

use crate::config::DutyCycleConfig;

/// Half of the duty cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Phase {
    Off = 0,
    On = 1,
}

impl Phase {
    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }

    const fn toggled(self) -> Self {
        match self {
            Self::On => Self::Off,
            Self::Off => Self::On,
        }
    }
}

/// Mutable engine state. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineState {
    pub running: bool,
    pub phase: Phase,
    /// Monotonic timestamp at which `phase` was entered.
    pub phase_start_ms: u64,
}

impl EngineState {
    /// Power-on state: stopped, OFF.
    pub const fn stopped() -> Self {
        Self {
            running: false,
            phase: Phase::Off,
            phase_start_ms: 0,
        }
    }

    /// Relay level derived from state alone.
    pub const fn relay_energized(&self) -> bool {
        self.running && self.phase.is_on()
    }
}

impl Default for EngineState {
    fn default() -> Self {
        Self::stopped()
    }
}

/// The duty-cycle state machine.
#[derive(Debug, Clone)]
pub struct DutyCycleEngine {
    config: DutyCycleConfig,
    state: EngineState,
}

impl DutyCycleEngine {
    /// Construct a stopped engine with the given durations.
    pub fn new(config: DutyCycleConfig) -> Self {
        Self {
            config,
            state: EngineState::stopped(),
        }
    }

    /// Replace the durations. Leaves `running`, `phase` and the phase
    /// start time untouched; a shorter duration takes effect on the next
    /// tick.
    pub fn set_config(&mut self, config: DutyCycleConfig) {
        self.config = config;
    }

    /// Start (or restart) the cycle from the beginning of the ON phase,
    /// or of the OFF phase when ON is disabled.
    pub fn start(&mut self, now_ms: u64) {
        let phase = if self.config.on_duration_ms == 0 {
            Phase::Off
        } else {
            Phase::On
        };
        self.state = EngineState {
            running: true,
            phase,
            phase_start_ms: now_ms,
        };
    }

    /// Stop cycling. The relay is de-energized regardless of phase.
    pub fn stop(&mut self) {
        self.state.running = false;
    }

    /// Advance the state machine to `now_ms`.
    ///
    /// Returns the new phase if a transition happened. At most one
    /// transition is taken per call. When the expiring phase would hand
    /// over to a disabled one, the current phase restarts at `now_ms`
    /// instead and `None` is returned.
    pub fn tick(&mut self, now_ms: u64) -> Option<Phase> {
        if !self.state.running {
            return None;
        }

        if self.config.is_degenerate() {
            return match self.state.phase {
                Phase::On => Some(self.enter(Phase::Off, now_ms)),
                Phase::Off => None,
            };
        }

        let phase = self.state.phase;
        let next = phase.toggled();

        // Disabled by `set_config` while active: leave right away.
        if self.dwell_ms(phase) == 0 {
            return Some(self.enter(next, now_ms));
        }

        let elapsed_ms = now_ms.saturating_sub(self.state.phase_start_ms);
        if elapsed_ms < self.dwell_ms(phase) {
            return None;
        }

        if self.dwell_ms(next) == 0 {
            self.state.phase_start_ms = now_ms;
            None
        } else {
            Some(self.enter(next, now_ms))
        }
    }

    fn dwell_ms(&self, phase: Phase) -> u64 {
        match phase {
            Phase::On => self.config.on_duration_ms,
            Phase::Off => self.config.off_duration_ms,
        }
    }

    fn enter(&mut self, phase: Phase, now_ms: u64) -> Phase {
        debug!(
            "engine: {:?} -> {:?} at {}ms",
            self.state.phase, phase, now_ms
        );
        self.state.phase = phase;
        self.state.phase_start_ms = now_ms;
        phase
    }

    /// `(running, phase_is_on)` snapshot.
    pub fn get_state(&self) -> (bool, bool) {
        (self.state.running, self.state.phase.is_on())
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn config(&self) -> DutyCycleConfig {
        self.config
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn relay_energized(&self) -> bool {
        self.state.relay_energized()
    }
}
