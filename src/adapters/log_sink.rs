//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(cfg) => {
                info!(
                    "STATE | boot, stopped | on={}s off={}s",
                    cfg.on_secs(),
                    cfg.off_secs()
                );
            }
            AppEvent::TimerStarted { at_ms } => {
                info!("TIMER | started at {}ms", at_ms);
            }
            AppEvent::TimerStopped => {
                info!("TIMER | stopped");
            }
            AppEvent::PhaseChanged { phase, at_ms } => {
                info!("STATE | {:?} at {}ms", phase, at_ms);
            }
            AppEvent::ConfigUpdated(cfg) => {
                info!("CONFIG | on={}s off={}s", cfg.on_secs(), cfg.off_secs());
            }
        }
    }
}
