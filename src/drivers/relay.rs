//! Relay coil driver.
//!
//! One digital output through a transistor stage. Boards differ in
//! polarity, so the active level is a constructor argument.
//!
//! ## Dual-target design
//!
//! Generic over [`embedded_hal::digital::OutputPin`]: on ESP-IDF this is a
//! `PinDriver<Output>`, on host tests any mock pin.

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::RelayPort;

pub struct RelayDriver<P> {
    pin: P,
    active_high: bool,
    energized: bool,
}

impl<P: OutputPin> RelayDriver<P> {
    /// Take the pin and drive it to the de-energized level immediately.
    pub fn new(pin: P, active_high: bool) -> Self {
        let mut relay = Self {
            pin,
            active_high,
            energized: true,
        };
        relay.write(false);
        relay
    }

    fn write(&mut self, energized: bool) {
        let result = if energized == self.active_high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        match result {
            Ok(()) => self.energized = energized,
            Err(e) => warn!("Relay: GPIO write failed: {:?}", e),
        }
    }
}

impl<P: OutputPin> RelayPort for RelayDriver<P> {
    fn set_energized(&mut self, energized: bool) {
        self.write(energized);
    }

    fn is_energized(&self) -> bool {
        self.energized
    }
}
