//! Single discrete status LED.
//!
//! Lit during the ON phase, dark otherwise.

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::IndicatorPort;
use crate::indicator::IndicatorSignal;

pub struct StatusLed<P> {
    pin: P,
    lit: bool,
}

impl<P: OutputPin> StatusLed<P> {
    /// Take the pin and switch the LED off.
    pub fn new(pin: P) -> Self {
        let mut led = Self { pin, lit: true };
        led.set(false);
        led
    }

    pub fn set(&mut self, lit: bool) {
        let result = if lit {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        match result {
            Ok(()) => self.lit = lit,
            Err(e) => warn!("StatusLed: GPIO write failed: {:?}", e),
        }
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}

impl<P: OutputPin> IndicatorPort for StatusLed<P> {
    fn show(&mut self, signal: IndicatorSignal) {
        self.set(signal.led_lit());
    }
}
