//! Status indicator.
//!
//! Reflects the engine state onto whatever indicator hardware is fitted,
//! on its own schedule and independent of the control tick.
//!
//! | Engine state        | Signal       | LED   | RGB pixel         |
//! |---------------------|--------------|-------|-------------------|
//! | running, ON phase   | `RunningOn`  | lit   | green `(0,255,0)` |
//! | running, OFF phase  | `RunningOff` | unlit | red `(255,0,0)`   |
//! | stopped             | `Idle`       | unlit | black             |
//!
//! The refresh task only ever reads the [`StateSnapshot`] atomic, so it
//! can neither block nor be blocked by the web handlers.

use std::sync::Arc;
use std::time::Duration;

use log::info;

use crate::app::controller::StateSnapshot;
use crate::app::ports::IndicatorPort;

/// Colour as (R, G, B) tuple, each 0–255.
pub type Rgb = (u8, u8, u8);

pub const COLOUR_ON: Rgb = (0, 255, 0);
pub const COLOUR_OFF_PHASE: Rgb = (255, 0, 0);
pub const COLOUR_IDLE: Rgb = (0, 0, 0);

/// What the indicator should currently show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorSignal {
    RunningOn,
    RunningOff,
    Idle,
}

impl IndicatorSignal {
    pub const fn from_state(running: bool, phase_on: bool) -> Self {
        match (running, phase_on) {
            (true, true) => Self::RunningOn,
            (true, false) => Self::RunningOff,
            (false, _) => Self::Idle,
        }
    }

    /// Single-LED rendering.
    pub const fn led_lit(self) -> bool {
        matches!(self, Self::RunningOn)
    }

    /// RGB pixel rendering.
    pub const fn colour(self) -> Rgb {
        match self {
            Self::RunningOn => COLOUR_ON,
            Self::RunningOff => COLOUR_OFF_PHASE,
            Self::Idle => COLOUR_IDLE,
        }
    }
}

/// Pushes the current signal to an [`IndicatorPort`] on change.
pub struct IndicatorDriver<P> {
    port: P,
    shown: Option<IndicatorSignal>,
}

impl<P: IndicatorPort> IndicatorDriver<P> {
    pub fn new(port: P) -> Self {
        Self { port, shown: None }
    }

    /// Sample the snapshot and update the hardware if the signal moved.
    ///
    /// Returns the signal now being shown.
    pub fn refresh(&mut self, snapshot: &StateSnapshot) -> IndicatorSignal {
        let (running, phase_on) = snapshot.load();
        let signal = IndicatorSignal::from_state(running, phase_on);
        if self.shown != Some(signal) {
            self.port.show(signal);
            self.shown = Some(signal);
        }
        signal
    }

    pub fn port(&self) -> &P {
        &self.port
    }
}

/// Indicator task body. Never returns.
pub fn run<P: IndicatorPort>(
    mut driver: IndicatorDriver<P>,
    snapshot: Arc<StateSnapshot>,
    refresh_ms: u32,
) -> ! {
    info!("Indicator: refreshing every {}ms", refresh_ms);
    let period = Duration::from_millis(u64::from(refresh_ms));
    loop {
        driver.refresh(&snapshot);
        std::thread::sleep(period);
    }
}
