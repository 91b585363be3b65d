//! Mock hardware adapters for integration tests.
//!
//! Every mock keeps its state behind an `Arc` so tests can hand one clone
//! to the [`Controller`](relay_timer::app::controller::Controller) and
//! keep another for assertions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use relay_timer::app::events::AppEvent;
use relay_timer::app::ports::{ClockPort, EventSink, RelayPort, StoreError, TimerStore};
use relay_timer::config::DutyCycleConfig;
use relay_timer::record;

// ── MockRelay ─────────────────────────────────────────────────

/// Records every level written to the relay.
#[derive(Clone, Default)]
pub struct MockRelay {
    pub writes: Arc<Mutex<Vec<bool>>>,
}

#[allow(dead_code)]
impl MockRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }
}

impl RelayPort for MockRelay {
    fn set_energized(&mut self, energized: bool) {
        self.writes.lock().unwrap().push(energized);
    }

    fn is_energized(&self) -> bool {
        self.writes.lock().unwrap().last().copied().unwrap_or(false)
    }
}

// ── MockClock ─────────────────────────────────────────────────

/// Manually advanced millisecond clock.
#[derive(Clone, Default)]
pub struct MockClock {
    now: Arc<AtomicU64>,
}

#[allow(dead_code)]
impl MockClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl ClockPort for MockClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

// ── MockStore ─────────────────────────────────────────────────

#[derive(Default)]
pub struct StoreState {
    /// Raw record bytes, exactly as the firmware would write them.
    pub record: Option<Vec<u8>>,
    pub unavailable: bool,
    pub fail_writes: bool,
    pub loads: u32,
    pub saves: u32,
}

/// Byte-level timer store using the real record codec.
#[derive(Clone, Default)]
pub struct MockStore {
    pub state: Arc<Mutex<StoreState>>,
}

#[allow(dead_code)]
impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(bytes: &[u8]) -> Self {
        let s = Self::default();
        s.state.lock().unwrap().record = Some(bytes.to_vec());
        s
    }

    pub fn unavailable() -> Self {
        let s = Self::default();
        s.state.lock().unwrap().unavailable = true;
        s
    }

    pub fn record_text(&self) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .record
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    pub fn saves(&self) -> u32 {
        self.state.lock().unwrap().saves
    }
}

impl TimerStore for MockStore {
    fn load(&self) -> Result<DutyCycleConfig, StoreError> {
        let mut st = self.state.lock().unwrap();
        st.loads += 1;
        if st.unavailable {
            return Err(StoreError::Unavailable);
        }
        let bytes = st.record.as_ref().ok_or(StoreError::NotFound)?;
        record::decode(bytes)
    }

    fn save(&mut self, config: &DutyCycleConfig) -> Result<(), StoreError> {
        let mut st = self.state.lock().unwrap();
        st.saves += 1;
        if st.unavailable {
            return Err(StoreError::Unavailable);
        }
        if st.fail_writes {
            return Err(StoreError::Io);
        }
        st.record = Some(record::encode(config).as_bytes().to_vec());
        Ok(())
    }
}

// ── LogSink ───────────────────────────────────────────────────

/// Collects emitted events.
#[derive(Clone, Default)]
pub struct LogSink {
    pub events: Arc<Mutex<Vec<AppEvent>>>,
}

#[allow(dead_code)]
impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AppEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.lock().unwrap().push(*event);
    }
}
