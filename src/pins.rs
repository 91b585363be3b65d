//! GPIO / peripheral pin assignments for the relay board.
//!
//! Single source of truth. `main` takes the matching `Peripherals::pins`
//! fields by name and checks them against these numbers at compile time;
//! changing a pin here without updating `main` fails the build.

// ---------------------------------------------------------------------------
// Relay
// ---------------------------------------------------------------------------

/// Relay coil driver input (active HIGH on the reference board).
pub const RELAY_GPIO: i32 = 15;

// ---------------------------------------------------------------------------
// Indicators
// ---------------------------------------------------------------------------

/// Discrete status LED.
pub const STATUS_LED_GPIO: i32 = 13;

/// WS2812 data line (on-board RGB pixel of the ESP32-S3 dev kit).
pub const PIXEL_GPIO: i32 = 38;
/// RMT channel driving the pixel.
pub const PIXEL_RMT_CHANNEL: u8 = 0;
