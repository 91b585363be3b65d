//! Controller integration tests.
//!
//! Drive the full `Controller -> AppService -> DutyCycleEngine` stack
//! with mock relay, clock, store and sink, the same wiring `main.rs`
//! builds on the device.

use std::sync::Arc;
use std::thread;

use relay_timer::adapters::nvs::NvsTimerStore;
use relay_timer::app::commands::AppCommand;
use relay_timer::app::controller::Controller;
use relay_timer::app::events::AppEvent;
use relay_timer::app::ports::{RelayPort, StoreError, TimerStore};
use relay_timer::config::DutyCycleConfig;
use relay_timer::engine::Phase;
use relay_timer::error::Error;

use crate::mock_hw::{LogSink, MockClock, MockRelay, MockStore};

type Ctl = Controller<MockRelay, MockStore, LogSink, MockClock>;

struct Rig {
    ctl: Ctl,
    relay: MockRelay,
    store: MockStore,
    sink: LogSink,
    clock: MockClock,
}

fn rig(store: MockStore) -> Rig {
    let relay = MockRelay::new();
    let sink = LogSink::new();
    let clock = MockClock::new();
    let ctl = Controller::new(relay.clone(), store.clone(), sink.clone(), clock.clone());
    Rig {
        ctl,
        relay,
        store,
        sink,
        clock,
    }
}

/// Tick every 10 ms from the current clock up to `until_ms`.
fn run_until(r: &Rig, until_ms: u64) {
    use relay_timer::app::ports::ClockPort;
    while r.clock.now_ms() < until_ms {
        r.clock.advance(10);
        r.ctl.tick();
    }
}

// ── Boot ──────────────────────────────────────────────────────

#[test]
fn boot_restores_stored_record() {
    let r = rig(MockStore::with_record(b"5\n3\n"));

    assert_eq!(r.ctl.timer_values(), DutyCycleConfig::from_secs(5, 3));
    assert!(!r.ctl.is_running());
    assert_eq!(r.relay.writes.lock().unwrap().as_slice(), &[false]);
    assert_eq!(
        r.sink.events(),
        vec![AppEvent::Started(DutyCycleConfig::from_secs(5, 3))]
    );
}

#[test]
fn boot_with_corrupt_record_falls_back_to_zero() {
    let r = rig(MockStore::with_record(b"five\nthree\n"));
    assert_eq!(r.ctl.timer_values(), DutyCycleConfig::default());
    assert!(!r.relay.is_energized());
}

#[test]
fn boot_with_unavailable_store_still_runs() {
    let r = rig(MockStore::unavailable());
    assert_eq!(r.ctl.timer_values(), DutyCycleConfig::default());

    assert_eq!(
        r.ctl.set_timers(DutyCycleConfig::from_secs(2, 2)),
        Err(Error::Storage(StoreError::Unavailable))
    );
    r.ctl.toggle_timer();
    assert!(r.ctl.relay_energized());
    assert_eq!(r.store.saves(), 1);
    assert_eq!(r.store.record_text(), None);
}

// ── Cycling ───────────────────────────────────────────────────

#[test]
fn relay_follows_duty_cycle() {
    let r = rig(MockStore::with_record(b"5\n3\n"));
    r.ctl.toggle_timer();
    assert!(r.ctl.relay_energized());

    run_until(&r, 4990);
    assert!(r.ctl.relay_energized());
    run_until(&r, 5000);
    assert!(!r.ctl.relay_energized());
    assert_eq!(r.ctl.engine_state().phase, Phase::Off);

    run_until(&r, 7990);
    assert!(!r.ctl.relay_energized());
    run_until(&r, 8000);
    assert!(r.ctl.relay_energized());

    // boot(false), start(true), off at 5s, on at 8s
    assert_eq!(
        r.relay.writes.lock().unwrap().as_slice(),
        &[false, true, false, true]
    );
}

#[test]
fn phase_changes_are_reported_with_timestamps() {
    let r = rig(MockStore::with_record(b"1\n1\n"));
    r.ctl.toggle_timer();
    run_until(&r, 2000);

    let phases: Vec<_> = r
        .sink
        .events()
        .into_iter()
        .filter_map(|e| match e {
            AppEvent::PhaseChanged { phase, at_ms } => Some((phase, at_ms)),
            _ => None,
        })
        .collect();
    assert_eq!(phases, vec![(Phase::Off, 1000), (Phase::On, 2000)]);
}

#[test]
fn toggle_stops_immediately_mid_phase() {
    let r = rig(MockStore::with_record(b"60\n60\n"));
    r.ctl.toggle_timer();
    run_until(&r, 1000);
    assert!(r.ctl.relay_energized());

    r.ctl.toggle_timer();
    assert!(!r.ctl.is_running());
    assert!(!r.ctl.relay_energized());

    run_until(&r, 200_000);
    assert!(!r.ctl.relay_energized());
}

#[test]
fn restart_begins_with_on_phase() {
    let r = rig(MockStore::with_record(b"1\n10\n"));
    r.ctl.toggle_timer();
    run_until(&r, 1500);
    assert_eq!(r.ctl.engine_state().phase, Phase::Off);

    r.ctl.toggle_timer();
    r.ctl.toggle_timer();
    let s = r.ctl.engine_state();
    assert_eq!(s.phase, Phase::On);
    assert_eq!(s.phase_start_ms, 1500);
    assert!(r.ctl.relay_energized());
}

#[test]
fn zero_zero_keeps_relay_off_while_running() {
    let r = rig(MockStore::new());
    r.ctl.toggle_timer();
    assert!(r.ctl.is_running());
    assert!(!r.ctl.relay_energized());
    assert_eq!(r.ctl.snapshot().load(), (true, false));

    run_until(&r, 1000);
    assert!(r.ctl.is_running());
    assert!(!r.ctl.relay_energized());
    assert_eq!(r.ctl.snapshot().load(), (true, false));

    // Only the boot write: the relay never moves.
    assert_eq!(r.relay.writes.lock().unwrap().as_slice(), &[false]);
}

#[test]
fn zero_on_duration_never_energizes_relay() {
    let r = rig(MockStore::with_record(b"0\n3\n"));
    r.ctl.toggle_timer();
    assert_eq!(r.ctl.snapshot().load(), (true, false));

    run_until(&r, 10_000);
    assert!(r.ctl.is_running());
    assert_eq!(r.relay.writes.lock().unwrap().as_slice(), &[false]);
}

#[test]
fn zero_off_duration_never_drops_relay() {
    let r = rig(MockStore::with_record(b"3\n0\n"));
    r.ctl.toggle_timer();

    run_until(&r, 10_000);
    assert!(r.ctl.relay_energized());
    assert_eq!(r.relay.writes.lock().unwrap().as_slice(), &[false, true]);
}

#[test]
fn explicit_start_and_stop_commands() {
    let r = rig(MockStore::with_record(b"3\n3\n"));
    r.ctl.command(AppCommand::Start);
    assert!(r.ctl.is_running());
    r.ctl.command(AppCommand::Stop);
    r.ctl.command(AppCommand::Stop);
    assert!(!r.ctl.is_running());

    let stops = r
        .sink
        .events()
        .iter()
        .filter(|e| **e == AppEvent::TimerStopped)
        .count();
    assert_eq!(stops, 1);
}

// ── Persistence ───────────────────────────────────────────────

#[test]
fn set_timers_writes_whole_second_record() {
    let r = rig(MockStore::new());
    r.ctl.set_timers(DutyCycleConfig::from_secs(12, 34)).unwrap();
    assert_eq!(r.store.record_text().as_deref(), Some("12\n34\n"));
}

#[test]
fn set_timers_while_running_keeps_phase() {
    let r = rig(MockStore::with_record(b"10\n10\n"));
    r.ctl.toggle_timer();
    run_until(&r, 3000);

    r.ctl.set_timers(DutyCycleConfig::from_secs(2, 2)).unwrap();
    let s = r.ctl.engine_state();
    assert!(s.running);
    assert_eq!(s.phase, Phase::On);
    assert_eq!(s.phase_start_ms, 0);

    // The shorter ON duration has already elapsed.
    r.clock.advance(10);
    r.ctl.tick();
    assert!(!r.ctl.relay_energized());
}

#[test]
fn failed_save_keeps_new_durations_in_effect() {
    let r = rig(MockStore::with_record(b"5\n5\n"));
    r.store.state.lock().unwrap().fail_writes = true;

    assert_eq!(
        r.ctl.set_timers(DutyCycleConfig::from_secs(9, 1)),
        Err(Error::Storage(StoreError::Io))
    );
    assert_eq!(r.ctl.timer_values(), DutyCycleConfig::from_secs(9, 1));
    assert_eq!(r.store.record_text().as_deref(), Some("5\n5\n"));
}

#[test]
fn durations_survive_reboot_through_nvs_store() {
    let store = {
        let ctl = Controller::new(
            MockRelay::new(),
            NvsTimerStore::new(),
            LogSink::new(),
            MockClock::new(),
        );
        ctl.set_timers(DutyCycleConfig::from_secs(45, 15)).unwrap();
        ctl.toggle_timer();
        // Hand the store to the next boot, as flash would.
        ctl.with_store(|s| std::mem::take(s))
    };
    assert_eq!(store.load(), Ok(DutyCycleConfig::from_secs(45, 15)));

    let relay = MockRelay::new();
    let ctl = Controller::new(relay.clone(), store, LogSink::new(), MockClock::new());
    assert_eq!(ctl.timer_values(), DutyCycleConfig::from_secs(45, 15));
    // Running state is not persisted.
    assert!(!ctl.is_running());
    assert!(!relay.is_energized());
}

#[test]
fn detached_nvs_store_boots_with_zero() {
    let ctl = Controller::new(
        MockRelay::new(),
        NvsTimerStore::detached(),
        LogSink::new(),
        MockClock::new(),
    );
    assert_eq!(ctl.timer_values(), DutyCycleConfig::default());
    assert_eq!(
        ctl.set_timers(DutyCycleConfig::from_secs(1, 1)),
        Err(Error::Storage(StoreError::Unavailable))
    );
    assert_eq!(ctl.timer_values(), DutyCycleConfig::from_secs(1, 1));
}

// ── Concurrency ───────────────────────────────────────────────

#[test]
fn concurrent_writers_leave_record_matching_engine() {
    let r = rig(MockStore::new());
    let ctl = Arc::new(r.ctl);

    let writers: Vec<_> = (1..=8u32)
        .map(|n| {
            let ctl = Arc::clone(&ctl);
            thread::spawn(move || {
                for i in 0..50 {
                    ctl.set_timers(DutyCycleConfig::from_secs(n, i)).unwrap();
                    ctl.toggle_timer();
                }
            })
        })
        .collect();

    let ticker = {
        let ctl = Arc::clone(&ctl);
        let clock = r.clock.clone();
        thread::spawn(move || {
            for _ in 0..2000 {
                clock.advance(10);
                ctl.tick();
            }
        })
    };

    for w in writers {
        w.join().unwrap();
    }
    ticker.join().unwrap();

    let in_memory = ctl.timer_values();
    let text = r.store.record_text().unwrap();
    assert_eq!(text, format!("{}\n{}\n", in_memory.on_secs(), in_memory.off_secs()));
    assert_eq!(r.store.saves(), 8 * 50);

    // 400 toggles in total: back where we started.
    assert!(!ctl.is_running());
    assert!(!ctl.relay_energized());
}
