//! Core-pinned background tasks.
//!
//! ESP-IDF backs `std::thread` with pthreads on top of FreeRTOS tasks.
//! `esp_pthread_set_cfg()` stores a per-thread config that the *next*
//! `pthread_create()` from the same thread picks up, which is how a
//! [`TaskSpec`] gets its core, priority and stack. Host builds spawn a
//! plain named thread.

use core::ffi::CStr;
use std::io;
use std::thread::{self, JoinHandle};

/// ESP32-S3 CPU cores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Core {
    /// Core 0, shared with WiFi, lwIP and httpd.
    Pro = 0,
    /// Core 1, runs the control loop.
    App = 1,
}

/// Placement and sizing for one long-lived task.
#[derive(Debug, Clone, Copy)]
pub struct TaskSpec {
    pub name: &'static CStr,
    pub core: Core,
    pub priority: u8,
    pub stack_bytes: usize,
}

/// Status indicator refresh task.
pub const INDICATOR_TASK: TaskSpec = TaskSpec {
    name: c"indicator",
    core: Core::Pro,
    priority: 1,
    stack_bytes: 4 * 1024,
};

impl TaskSpec {
    fn label(&self) -> &'static str {
        self.name.to_str().unwrap_or("task")
    }

    /// Start `f` on a new thread placed according to this spec.
    ///
    /// A rejected pthread config is logged and the thread starts unpinned.
    pub fn spawn<F>(&self, f: F) -> io::Result<JoinHandle<()>>
    where
        F: FnOnce() + Send + 'static,
    {
        #[cfg(target_os = "espidf")]
        self.apply_pthread_cfg();

        log::info!(
            "task '{}': core={:?} prio={} stack={}B",
            self.label(),
            self.core,
            self.priority,
            self.stack_bytes
        );

        thread::Builder::new()
            .name(self.label().to_owned())
            .stack_size(self.stack_bytes)
            .spawn(f)
    }

    #[cfg(target_os = "espidf")]
    fn apply_pthread_cfg(&self) {
        use esp_idf_svc::sys::{esp, esp_create_default_pthread_config, esp_pthread_set_cfg};

        // SAFETY: esp_pthread_set_cfg copies the struct; `name` is 'static.
        let ret = esp!(unsafe {
            let mut cfg = esp_create_default_pthread_config();
            cfg.pin_to_core = self.core as i32;
            cfg.prio = i32::from(self.priority);
            cfg.stack_size = self.stack_bytes as _;
            cfg.thread_name = self.name.as_ptr();
            esp_pthread_set_cfg(&cfg)
        });
        if let Err(e) = ret {
            log::warn!("task '{}': pthread config rejected ({}), unpinned", self.label(), e);
        }
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    #[test]
    fn spawned_thread_carries_task_name() {
        let spec = TaskSpec {
            name: c"relay-test",
            core: Core::App,
            priority: 2,
            stack_bytes: 64 * 1024,
        };
        let h = spec
            .spawn(|| assert_eq!(thread::current().name(), Some("relay-test")))
            .unwrap();
        h.join().unwrap();
    }

    #[test]
    fn indicator_task_runs_on_protocol_core() {
        assert_eq!(INDICATOR_TASK.core, Core::Pro);
        assert_eq!(INDICATOR_TASK.label(), "indicator");
    }
}
