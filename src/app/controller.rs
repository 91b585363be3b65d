//! Shared controller: serialized access to the [`AppService`].
//!
//! The control loop, the HTTP handlers and the indicator task all touch
//! the same engine. [`Controller`] is the one place that arbitrates:
//!
//! ```text
//!  control loop ──tick()──┐
//!                         ▼
//!  HTTP handlers ──▶ ┌──────────────────────────┐     ┌──────────────┐
//!   set_timers       │ critical section         │     │ store mutex  │
//!   toggle_timer     │  AppService + RelayPort  │     │  TimerStore  │
//!                    └────────────┬─────────────┘     └──────────────┘
//!                                 │ publish
//!                                 ▼
//!                         StateSnapshot (AtomicU8) ──▶ indicator task
//! ```
//!
//! Engine mutation and the relay write happen together inside the
//! critical section. Events produced there are buffered and emitted after
//! the section is released. Persistence runs under its own mutex and is
//! never entered from [`Controller::tick`].

use core::cell::RefCell;
use core::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use log::{info, warn};

use crate::config::DutyCycleConfig;
use crate::control::ControlTarget;
use crate::engine::EngineState;
use crate::error::{self, Error};

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{ClockPort, EventSink, RelayPort, StoreError, TimerStore};
use super::service::AppService;

// ───────────────────────────────────────────────────────────────
// Lock-free state snapshot
// ───────────────────────────────────────────────────────────────

const BIT_RUNNING: u8 = 1 << 0;
const BIT_PHASE_ON: u8 = 1 << 1;

/// Packed `(running, phase_is_on)` published after every mutation.
///
/// Readers never block writers.
#[derive(Debug, Default)]
pub struct StateSnapshot(AtomicU8);

impl StateSnapshot {
    pub const fn new() -> Self {
        Self(AtomicU8::new(0))
    }

    pub fn publish(&self, state: EngineState) {
        let mut bits = 0;
        if state.running {
            bits |= BIT_RUNNING;
        }
        if state.phase.is_on() {
            bits |= BIT_PHASE_ON;
        }
        self.0.store(bits, Ordering::Release);
    }

    /// `(running, phase_is_on)`.
    pub fn load(&self) -> (bool, bool) {
        let bits = self.0.load(Ordering::Acquire);
        (bits & BIT_RUNNING != 0, bits & BIT_PHASE_ON != 0)
    }
}

// ───────────────────────────────────────────────────────────────
// Event buffering
// ───────────────────────────────────────────────────────────────

/// Holds events raised inside the critical section.
struct EventBuffer(heapless::Vec<AppEvent, 4>);

impl EventSink for EventBuffer {
    fn emit(&mut self, event: &AppEvent) {
        if self.0.push(*event).is_err() {
            warn!("event buffer full, dropping {:?}", event);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

struct Core<R> {
    app: AppService,
    relay: R,
}

/// Thread-safe owner of the application service and its adapters.
pub struct Controller<R, S, E, C> {
    core: Mutex<CriticalSectionRawMutex, RefCell<Core<R>>>,
    store: StdMutex<S>,
    sink: StdMutex<E>,
    clock: C,
    snapshot: Arc<StateSnapshot>,
}

impl<R, S, E, C> Controller<R, S, E, C>
where
    R: RelayPort,
    S: TimerStore,
    E: EventSink,
    C: ClockPort,
{
    /// Load the stored durations, force the relay off and announce boot.
    ///
    /// A missing or unreadable record falls back to `{0, 0}`.
    pub fn new(relay: R, store: S, sink: E, clock: C) -> Self {
        let config = load_timers(&store);

        let this = Self {
            core: Mutex::new(RefCell::new(Core {
                app: AppService::new(config),
                relay,
            })),
            store: StdMutex::new(store),
            sink: StdMutex::new(sink),
            clock,
            snapshot: Arc::new(StateSnapshot::new()),
        };
        this.with_core(|core, events| core.app.boot(&mut core.relay, events));
        this
    }

    /// Handle to the published state for the indicator task.
    pub fn snapshot(&self) -> Arc<StateSnapshot> {
        Arc::clone(&self.snapshot)
    }

    /// One control-loop step.
    pub fn tick(&self) {
        let now = self.clock.now_ms();
        self.with_core(|core, events| core.app.tick(now, &mut core.relay, events));
    }

    /// Apply a command. `SetTimers` applied this way is not persisted;
    /// use [`set_timers`](Self::set_timers) for that.
    pub fn command(&self, cmd: AppCommand) {
        let now = self.clock.now_ms();
        self.with_core(|core, events| {
            core.app.handle_command(cmd, now, &mut core.relay, events);
        });
    }

    /// Apply new durations and persist them.
    ///
    /// Writers are serialized on the store lock so the record always
    /// matches the last config applied. On [`Error::Storage`] the
    /// in-memory config is still in effect.
    pub fn set_timers(&self, config: DutyCycleConfig) -> error::Result<()> {
        let mut store = lock(&self.store);
        self.command(AppCommand::SetTimers(config));

        store.save(&config).map_err(|e| {
            warn!("timers not saved: {}", e);
            Error::Storage(e)
        })?;
        info!(
            "timers saved (on={}s off={}s)",
            config.on_secs(),
            config.off_secs()
        );
        Ok(())
    }

    pub fn toggle_timer(&self) {
        self.command(AppCommand::ToggleTimer);
    }

    pub fn timer_values(&self) -> DutyCycleConfig {
        self.core.lock(|c| c.borrow().app.timer_values())
    }

    pub fn is_running(&self) -> bool {
        self.core.lock(|c| c.borrow().app.is_running())
    }

    pub fn engine_state(&self) -> EngineState {
        self.core.lock(|c| c.borrow().app.engine_state())
    }

    /// Level last written to the relay.
    pub fn relay_energized(&self) -> bool {
        self.core.lock(|c| c.borrow().relay.is_energized())
    }

    /// Run `f` on the store without touching the engine.
    pub fn with_store<T>(&self, f: impl FnOnce(&mut S) -> T) -> T {
        f(&mut lock(&self.store))
    }

    // ── Internal ──────────────────────────────────────────────

    fn with_core<T>(&self, f: impl FnOnce(&mut Core<R>, &mut EventBuffer) -> T) -> T {
        let mut events = EventBuffer(heapless::Vec::new());

        let out = self.core.lock(|cell| {
            let mut core = cell.borrow_mut();
            let out = f(&mut *core, &mut events);
            self.snapshot.publish(core.app.engine_state());
            out
        });

        if !events.0.is_empty() {
            let mut sink = lock(&self.sink);
            for event in &events.0 {
                sink.emit(event);
            }
        }
        out
    }
}

impl<R, S, E, C> ControlTarget for Controller<R, S, E, C>
where
    R: RelayPort,
    S: TimerStore,
    E: EventSink,
    C: ClockPort,
{
    fn set_timers(&self, config: DutyCycleConfig) -> error::Result<()> {
        Controller::set_timers(self, config)
    }

    fn toggle_timer(&self) {
        Controller::toggle_timer(self);
    }

    fn timer_values(&self) -> DutyCycleConfig {
        Controller::timer_values(self)
    }

    fn timer_running(&self) -> bool {
        self.is_running()
    }
}

fn lock<T>(m: &StdMutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Read the stored durations, falling back to `{0, 0}`.
fn load_timers(store: &impl TimerStore) -> DutyCycleConfig {
    match store.load() {
        Ok(config) => {
            info!(
                "timers loaded (on={}s off={}s)",
                config.on_secs(),
                config.off_secs()
            );
            config
        }
        Err(StoreError::NotFound) => {
            info!("no stored timers, using 0/0");
            DutyCycleConfig::default()
        }
        Err(e) => {
            warn!("timer load failed ({}), using 0/0", e);
            DutyCycleConfig::default()
        }
    }
}
