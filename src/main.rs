//! Relay Timer Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  RelayDriver   NvsTimerStore   LogEventSink   Esp32TimeAdapter │
//! │  (RelayPort)   (TimerStore)    (EventSink)    (ClockPort)      │
//! │  SoftApAdapter   http_server   StatusLed / PixelIndicator      │
//! │                                (IndicatorPort)                 │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │   Controller ─▶ AppService ─▶ DutyCycleEngine          │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Control loop (APP core, 10 ms) · Indicator task (PRO core)    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::gpio::PinDriver;
use esp_idf_svc::hal::prelude::Peripherals;
use esp_idf_svc::hal::rmt::TxRmtDriver;
use esp_idf_svc::hal::rmt::config::TransmitConfig;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{error, info, warn};

use relay_timer::adapters::log_sink::LogEventSink;
use relay_timer::adapters::nvs::NvsTimerStore;
use relay_timer::adapters::time::Esp32TimeAdapter;
use relay_timer::adapters::wifi::SoftApAdapter;
use relay_timer::adapters::{http_server, platform};
use relay_timer::app::controller::Controller;
use relay_timer::app::ports::IndicatorPort;
use relay_timer::config::{IndicatorKind, SystemConfig};
use relay_timer::drivers::pixel::PixelIndicator;
use relay_timer::drivers::relay::RelayDriver;
use relay_timer::drivers::status_led::StatusLed;
use relay_timer::drivers::task_pin::INDICATOR_TASK;
use relay_timer::drivers::watchdog::Watchdog;
use relay_timer::error::Error;
use relay_timer::indicator::{self, IndicatorDriver};
use relay_timer::pins;

// `Peripherals` hands out pins as typed fields, so `main` names them
// literally. These keep the literals below in step with `pins.rs`.
const _: () = assert!(pins::RELAY_GPIO == 15, "relay: update gpio15 below");
const _: () = assert!(pins::STATUS_LED_GPIO == 13, "status LED: update gpio13 below");
const _: () = assert!(pins::PIXEL_GPIO == 38, "pixel: update gpio38 below");
const _: () = assert!(pins::PIXEL_RMT_CHANNEL == 0, "pixel: update rmt.channel0 below");

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Relay Timer v{}                  ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = SystemConfig::default();
    config.validate().map_err(Error::Init)?;

    // ── 2. Outputs off before anything else ───────────────────
    let peripherals = Peripherals::take()?;
    let relay = RelayDriver::new(
        PinDriver::output(peripherals.pins.gpio15)?,
        config.relay_active_high,
    );
    let led = StatusLed::new(PinDriver::output(peripherals.pins.gpio13)?);
    info!(
        "Pins: relay=GPIO{} led=GPIO{} pixel=GPIO{} (RMT{})",
        pins::RELAY_GPIO,
        pins::STATUS_LED_GPIO,
        pins::PIXEL_GPIO,
        pins::PIXEL_RMT_CHANNEL
    );

    // ── 3. Platform checks ────────────────────────────────────
    platform::check_rollback();
    platform::log_psram();

    // ── 4. Persistence ────────────────────────────────────────
    let (nvs_partition, store) = match EspDefaultNvsPartition::take() {
        Ok(partition) => (Some(partition.clone()), NvsTimerStore::new(partition)),
        Err(e) => {
            warn!("NVS partition unavailable ({}), timers will not persist", e);
            (None, NvsTimerStore::detached())
        }
    };

    // ── 5. Application core ───────────────────────────────────
    let ctl = Arc::new(Controller::new(
        relay,
        store,
        LogEventSink::new(),
        Esp32TimeAdapter::new(),
    ));

    // ── 6. Indicator task ─────────────────────────────────────
    let port: Option<Box<dyn IndicatorPort + Send>> = match config.indicator {
        IndicatorKind::None => None,
        IndicatorKind::StatusLed => Some(Box::new(led)),
        IndicatorKind::Pixel => Some(Box::new(PixelIndicator::new(TxRmtDriver::new(
            peripherals.rmt.channel0,
            peripherals.pins.gpio38,
            &TransmitConfig::new().clock_divider(1),
        )?))),
        IndicatorKind::Both => Some(Box::new((
            led,
            PixelIndicator::new(TxRmtDriver::new(
                peripherals.rmt.channel0,
                peripherals.pins.gpio38,
                &TransmitConfig::new().clock_divider(1),
            )?),
        ))),
    };

    if let Some(port) = port {
        let snapshot = ctl.snapshot();
        let refresh_ms = config.indicator_refresh_ms;
        INDICATOR_TASK.spawn(move || {
            indicator::run(IndicatorDriver::new(port), snapshot, refresh_ms);
        })?;
    } else {
        info!("Indicator: none fitted");
    }

    // ── 7. Network: soft AP + web UI ──────────────────────────
    let sysloop = EspSystemEventLoop::take()?;
    let mut ap = SoftApAdapter::new(&config)?;
    if let Err(e) = ap.start(peripherals.modem, sysloop, nvs_partition) {
        // The timer keeps running on the stored durations.
        error!("WiFi AP unavailable: {:#}", e);
    }
    let _server = http_server::start(Arc::clone(&ctl), config.http_port)?;

    // ── 8. Control loop ───────────────────────────────────────
    let watchdog = Watchdog::new(config.watchdog_timeout_ms);
    let period = Duration::from_millis(u64::from(config.tick_interval_ms));
    info!("System ready. Entering control loop ({}ms tick).", config.tick_interval_ms);

    loop {
        ctl.tick();
        watchdog.feed();
        std::thread::sleep(period);
    }
}
