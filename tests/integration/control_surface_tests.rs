//! Control surface integration tests.
//!
//! Route requests through `control::handle` into a real `Controller`, the
//! way the HTTP adapter does on the device.

use relay_timer::app::controller::Controller;
use relay_timer::control::ota::{self, OtaManager, OtaState};
use relay_timer::control::{self, ControlResponse, Method};
use relay_timer::config::DutyCycleConfig;

use crate::mock_hw::{LogSink, MockClock, MockRelay, MockStore};

type Ctl = Controller<MockRelay, MockStore, LogSink, MockClock>;

fn controller(store: MockStore) -> (Ctl, MockStore, MockClock) {
    let clock = MockClock::new();
    let ctl = Controller::new(MockRelay::new(), store.clone(), LogSink::new(), clock.clone());
    (ctl, store, clock)
}

fn get(ctl: &Ctl, path: &str) -> ControlResponse {
    control::handle(ctl, Method::Get, path, &[])
}

fn post(ctl: &Ctl, path: &str, body: &str) -> ControlResponse {
    control::handle(ctl, Method::Post, path, body.as_bytes())
}

fn json(r: &ControlResponse) -> serde_json::Value {
    assert_eq!(r.status(), 200);
    serde_json::from_slice(r.body()).unwrap()
}

#[test]
fn page_load_reports_stored_values() {
    let (ctl, _, _) = controller(MockStore::with_record(b"5\n3\n"));

    let v = json(&get(&ctl, "/getTimerValues"));
    assert_eq!(v["relayOnTimer"], 5);
    assert_eq!(v["relayOffTimer"], 3);

    let v = json(&get(&ctl, "/getTimerState"));
    assert_eq!(v["timerRunning"], false);
}

#[test]
fn form_submit_applies_persists_and_redirects() {
    let (ctl, store, _) = controller(MockStore::new());

    let r = post(&ctl, "/setTimers", "relay_on=30&relay_off=90");
    assert_eq!(r.status(), 302);
    assert_eq!(r, ControlResponse::Redirect("/"));

    assert_eq!(ctl.timer_values(), DutyCycleConfig::from_secs(30, 90));
    assert_eq!(store.record_text().as_deref(), Some("30\n90\n"));

    let v = json(&get(&ctl, "/getTimerValues"));
    assert_eq!(v["relayOnTimer"], 30);
    assert_eq!(v["relayOffTimer"], 90);
}

#[test]
fn rejected_form_changes_nothing() {
    let (ctl, store, _) = controller(MockStore::with_record(b"5\n3\n"));

    for body in ["relay_on=&relay_off=3", "relay_off=3", "relay_on=1.5&relay_off=3", "relay_on=x&relay_off=3"] {
        let r = post(&ctl, "/setTimers", body);
        assert_eq!(r.status(), 400, "{body}");
        assert_eq!(r.content_type(), Some("application/json"));
    }

    assert_eq!(ctl.timer_values(), DutyCycleConfig::from_secs(5, 3));
    assert_eq!(store.saves(), 0);
}

#[test]
fn out_of_range_input_is_clamped() {
    let (ctl, store, _) = controller(MockStore::new());

    post(&ctl, "/setTimers", "relay_on=-7&relay_off=99999999999");
    assert_eq!(ctl.timer_values(), DutyCycleConfig::from_secs(0, u32::MAX));
    assert_eq!(
        store.record_text(),
        Some(format!("0\n{}\n", u32::MAX))
    );
}

#[test]
fn toggle_round_trip_through_state_endpoint() {
    let (ctl, _, clock) = controller(MockStore::with_record(b"1\n1\n"));

    assert_eq!(post(&ctl, "/toggleTimer", "").status(), 302);
    assert_eq!(json(&get(&ctl, "/getTimerState"))["timerRunning"], true);
    assert!(ctl.relay_energized());

    clock.advance(1000);
    ctl.tick();
    assert!(!ctl.relay_energized());
    // Still running while in the OFF phase.
    assert_eq!(json(&get(&ctl, "/getTimerState"))["timerRunning"], true);

    post(&ctl, "/toggleTimer", "");
    assert_eq!(json(&get(&ctl, "/getTimerState"))["timerRunning"], false);
}

#[test]
fn sub_second_values_are_reported_truncated() {
    let (ctl, _, _) = controller(MockStore::new());
    ctl.set_timers(DutyCycleConfig::new(2500, 999)).unwrap();

    let v = json(&get(&ctl, "/getTimerValues"));
    assert_eq!(v["relayOnTimer"], 2);
    assert_eq!(v["relayOffTimer"], 0);
}

#[test]
fn url_encoded_form_values_are_decoded() {
    let (ctl, _, _) = controller(MockStore::new());
    let r = post(&ctl, "/setTimers", "relay_on=+15+&relay_off=%32%30");
    assert_eq!(r.status(), 302);
    assert_eq!(ctl.timer_values(), DutyCycleConfig::from_secs(15, 20));
}

#[test]
fn index_page_posts_to_known_routes() {
    let (ctl, _, _) = controller(MockStore::new());
    let r = get(&ctl, "/");
    let html = std::str::from_utf8(r.body()).unwrap();
    assert!(html.contains("/setTimers"));
    assert!(html.contains("/toggleTimer"));
    assert!(html.contains("relay_on"));
    assert!(html.contains("relay_off"));
    assert!(html.contains(ota::OTA_ROUTE));
}

#[test]
fn failed_save_still_redirects() {
    let store = MockStore::new();
    store.state.lock().unwrap().fail_writes = true;
    let (ctl, store, _) = controller(store);

    let r = post(&ctl, "/setTimers", "relay_on=8&relay_off=2");
    assert_eq!(r, ControlResponse::Redirect("/"));
    assert_eq!(ctl.timer_values(), DutyCycleConfig::from_secs(8, 2));
    assert_eq!(store.record_text(), None);
}

#[test]
fn upload_does_not_disturb_running_timer() {
    let (ctl, _, clock) = controller(MockStore::with_record(b"1
1
"));
    post(&ctl, "/toggleTimer", "");

    let image = vec![0xE9_u8; 10_000];
    let mut sent = 0;
    let mut manager = OtaManager::new();
    let r = ota::handle_upload(&mut manager, Some(image.len()), |buf: &mut [u8]| {
        // Ticks keep running between chunks, as on the device.
        clock.advance(250);
        ctl.tick();
        let n = buf.len().min(image.len() - sent);
        buf[..n].copy_from_slice(&image[sent..sent + n]);
        sent += n;
        Ok::<_, ()>(n)
    });

    assert_eq!(json(&r)["bytes"], 10_000);
    assert_eq!(manager.state(), OtaState::ReadyToReboot);
    assert_eq!(manager.staged(), image.as_slice());
    assert!(ctl.is_running());
}

#[test]
fn truncated_upload_is_rejected() {
    let mut manager = OtaManager::new();
    let mut reads = 0;
    let r = ota::handle_upload(&mut manager, Some(4096), |buf: &mut [u8]| {
        reads += 1;
        Ok::<_, ()>(if reads <= 3 { buf.len().min(100) } else { 0 })
    });
    assert_eq!(r.status(), 400);
    assert_eq!(
        r.body(),
        br#"{"error":"body shorter than Content-Length"}"#
    );
    assert_eq!(manager.state(), OtaState::Idle);
}
