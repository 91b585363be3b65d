//! WS2812 RGB pixel indicator.
//!
//! One addressable pixel on an RMT channel. The pixel takes 24 bits in
//! GRB order, MSB first:
//!
//! ```text
//!   bit 1: ▔▔▔▔▔▔▔╲▁▁▁▁▁▁    T1H 0.7µs, T1L 0.6µs
//!   bit 0: ▔▔▔╲▁▁▁▁▁▁▁▁▁▁    T0H 0.35µs, T0L 0.8µs
//! ```
//!
//! ## Dual-target design
//!
//! On ESP-IDF: `TxRmtDriver` with a `FixedLengthSignal<24>`.
//! On host/test: tracks the last colour in memory only.

use crate::app::ports::IndicatorPort;
use crate::indicator::{IndicatorSignal, Rgb};

/// Pack a colour into the 24-bit word the pixel shifts in.
pub const fn grb_word((r, g, b): Rgb) -> u32 {
    ((g as u32) << 16) | ((r as u32) << 8) | b as u32
}

pub struct PixelIndicator {
    #[cfg(target_os = "espidf")]
    tx: esp_idf_hal::rmt::TxRmtDriver<'static>,
    current: Rgb,
}

#[cfg(target_os = "espidf")]
impl PixelIndicator {
    /// Wrap an RMT transmitter already bound to the pixel's data pin.
    pub fn new(tx: esp_idf_hal::rmt::TxRmtDriver<'static>) -> Self {
        let mut px = Self {
            tx,
            current: (0, 0, 0),
        };
        px.set_colour((0, 0, 0));
        px
    }

    pub fn set_colour(&mut self, colour: Rgb) {
        match self.transmit(grb_word(colour)) {
            Ok(()) => self.current = colour,
            Err(e) => log::warn!("Pixel: RMT write failed: {}", e),
        }
    }

    fn transmit(&mut self, word: u32) -> Result<(), esp_idf_hal::sys::EspError> {
        use core::time::Duration;
        use esp_idf_hal::rmt::{FixedLengthSignal, PinState, Pulse};

        let ticks_hz = self.tx.counter_clock()?;
        let pulse = |state, ns| Pulse::new_with_duration(ticks_hz, state, &Duration::from_nanos(ns));
        let t0 = (pulse(PinState::High, 350)?, pulse(PinState::Low, 800)?);
        let t1 = (pulse(PinState::High, 700)?, pulse(PinState::Low, 600)?);

        let mut signal = FixedLengthSignal::<24>::new();
        for i in 0..24 {
            let bit = word & (1 << (23 - i)) != 0;
            signal.set(i, if bit { &t1 } else { &t0 })?;
        }
        self.tx.start_blocking(&signal)
    }
}

#[cfg(not(target_os = "espidf"))]
impl PixelIndicator {
    pub fn new() -> Self {
        Self { current: (0, 0, 0) }
    }

    pub fn set_colour(&mut self, colour: Rgb) {
        self.current = colour;
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for PixelIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl PixelIndicator {
    pub fn current_colour(&self) -> Rgb {
        self.current
    }
}

impl IndicatorPort for PixelIndicator {
    fn show(&mut self, signal: IndicatorSignal) {
        self.set_colour(signal.colour());
    }
}
