//! Task watchdog for the control loop.
//!
//! If the loop stops feeding, the TWDT panics and the device reboots with
//! the relay released, instead of hanging with the relay latched on.

use log::info;

pub struct Watchdog {
    timeout_ms: u32,
    subscribed: bool,
}

impl Watchdog {
    /// Set the TWDT timeout and subscribe the calling task.
    ///
    /// A failed subscription is logged and `feed` becomes a no-op.
    pub fn new(timeout_ms: u32) -> Self {
        #[cfg(target_os = "espidf")]
        let subscribed = match subscribe_current_task(timeout_ms) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("watchdog: not subscribed ({})", e);
                false
            }
        };
        #[cfg(not(target_os = "espidf"))]
        let subscribed = false;

        info!(
            "watchdog: timeout={}ms subscribed={}",
            timeout_ms, subscribed
        );
        Self {
            timeout_ms,
            subscribed,
        }
    }

    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        if self.subscribed {
            // SAFETY: resets the calling task's own TWDT entry.
            unsafe {
                esp_idf_svc::sys::esp_task_wdt_reset();
            }
        }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }
}

#[cfg(target_os = "espidf")]
fn subscribe_current_task(timeout_ms: u32) -> Result<(), esp_idf_svc::sys::EspError> {
    use esp_idf_svc::sys::{esp, esp_task_wdt_add, esp_task_wdt_config_t, esp_task_wdt_reconfigure};

    let cfg = esp_task_wdt_config_t {
        timeout_ms,
        idle_core_mask: 0,
        trigger_panic: true,
    };
    // SAFETY: stack-local config; a null handle is the current task.
    if let Err(e) = esp!(unsafe { esp_task_wdt_reconfigure(&cfg) }) {
        // The TWDT may not be initialised by sdkconfig yet.
        log::warn!("watchdog: reconfigure failed ({})", e);
    }
    esp!(unsafe { esp_task_wdt_add(core::ptr::null_mut()) })
}
