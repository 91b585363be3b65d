//! System configuration parameters
//!
//! Compiled-in tunables for the relay timer. The only runtime-mutable
//! configuration is the [`DutyCycleConfig`], which is persisted by the
//! timer store and edited from the web UI.

use serde::{Deserialize, Serialize};

/// The two cycle durations, in milliseconds.
///
/// A zero duration disables that phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutyCycleConfig {
    pub on_duration_ms: u64,
    pub off_duration_ms: u64,
}

impl DutyCycleConfig {
    pub const fn new(on_duration_ms: u64, off_duration_ms: u64) -> Self {
        Self {
            on_duration_ms,
            off_duration_ms,
        }
    }

    /// Build from whole seconds, as entered in the web UI.
    pub const fn from_secs(on_secs: u32, off_secs: u32) -> Self {
        Self::new(on_secs as u64 * 1000, off_secs as u64 * 1000)
    }

    /// On-duration truncated to whole seconds.
    pub const fn on_secs(&self) -> u64 {
        self.on_duration_ms / 1000
    }

    /// Off-duration truncated to whole seconds.
    pub const fn off_secs(&self) -> u64 {
        self.off_duration_ms / 1000
    }

    /// Both phases have zero width.
    pub const fn is_degenerate(&self) -> bool {
        self.on_duration_ms == 0 && self.off_duration_ms == 0
    }
}

/// Which status indicator hardware is fitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndicatorKind {
    /// No indicator; the refresh task is not spawned.
    None,
    /// Single discrete LED.
    StatusLed,
    /// One WS2812 RGB pixel.
    Pixel,
    /// Discrete LED and RGB pixel driven together.
    Both,
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Timing ---
    /// Control loop interval (milliseconds)
    pub tick_interval_ms: u32,
    /// Indicator refresh interval (milliseconds)
    pub indicator_refresh_ms: u32,
    /// Task watchdog timeout for the control loop (milliseconds)
    pub watchdog_timeout_ms: u32,

    // --- Network ---
    /// Soft-AP SSID
    pub ap_ssid: heapless::String<32>,
    /// Soft-AP WPA2 password (8-64 bytes)
    pub ap_password: heapless::String<64>,
    /// Soft-AP channel
    pub ap_channel: u8,
    /// HTTP server port
    pub http_port: u16,

    // --- Hardware ---
    /// Fitted indicator hardware
    pub indicator: IndicatorKind,
    /// Relay coil is energized by a HIGH level
    pub relay_active_high: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 10,       // 100 Hz
            indicator_refresh_ms: 100,  // 10 Hz
            watchdog_timeout_ms: 10_000,

            ap_ssid: heapless_str("RELAY BOARD"),
            ap_password: heapless_str("123456789"),
            ap_channel: 1,
            http_port: 80,

            indicator: IndicatorKind::Both,
            relay_active_high: true,
        }
    }
}

impl SystemConfig {
    /// Reject configurations the firmware cannot run with.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.tick_interval_ms == 0 {
            return Err("tick_interval_ms must be > 0");
        }
        if self.indicator_refresh_ms < self.tick_interval_ms {
            return Err("indicator_refresh_ms must be >= tick_interval_ms");
        }
        if self.watchdog_timeout_ms <= self.tick_interval_ms {
            return Err("watchdog_timeout_ms must exceed tick_interval_ms");
        }
        if self.ap_ssid.is_empty() {
            return Err("ap_ssid must not be empty");
        }
        if !self.ap_password.is_empty() && self.ap_password.len() < 8 {
            return Err("ap_password must be empty or 8-64 bytes");
        }
        Ok(())
    }
}

fn heapless_str<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    let _ = out.push_str(&s[..s.len().min(N)]);
    out
}
