//! Control surface: the web UI's view of the timer.
//!
//! Transport-independent request handling. The HTTP adapter feeds
//! `(method, path, body)` in and writes the [`ControlResponse`] back out,
//! so the whole route table is testable on the host.
//!
//! | Method | Path              | Effect                          | Response                                 |
//! |--------|-------------------|---------------------------------|------------------------------------------|
//! | GET    | `/`               | -                               | `index.html`                             |
//! | GET    | `/style.css`      | -                               | stylesheet                               |
//! | GET    | `/getTimerValues` | -                               | `{"relayOnTimer":s,"relayOffTimer":s}`   |
//! | GET    | `/getTimerState`  | -                               | `{"timerRunning":bool}`                  |
//! | POST   | `/setTimers`      | apply + persist durations       | 302 → `/`                                |
//! | POST   | `/toggleTimer`    | start/stop                      | 302 → `/`                                |
//! | POST   | `/update`         | stream firmware image to flash  | `{"status":"ok","bytes":n}`, then reboot |
//!
//! `/update` streams its body instead of buffering it, so it is not in
//! [`ROUTES`]; the adapter registers it through [`ota::handle_upload`].

pub mod form;
pub mod ota;

use log::{info, warn};
use serde::Serialize;

use crate::config::DutyCycleConfig;
use crate::error::Error;

// ───────────────────────────────────────────────────────────────
// Target trait
// ───────────────────────────────────────────────────────────────

/// What the control surface needs from the rest of the firmware.
///
/// Implemented by [`Controller`](crate::app::controller::Controller).
/// Methods take `&self` because handlers run concurrently.
pub trait ControlTarget {
    /// Apply and persist. On `Err` the new durations are already in
    /// effect; only the save failed.
    fn set_timers(&self, config: DutyCycleConfig) -> crate::error::Result<()>;
    fn toggle_timer(&self);
    fn timer_values(&self) -> DutyCycleConfig;
    fn timer_running(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Wire types
// ───────────────────────────────────────────────────────────────

/// `GET /getTimerValues` body. Whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerValues {
    pub relay_on_timer: u64,
    pub relay_off_timer: u64,
}

impl From<DutyCycleConfig> for TimerValues {
    fn from(c: DutyCycleConfig) -> Self {
        Self {
            relay_on_timer: c.on_secs(),
            relay_off_timer: c.off_secs(),
        }
    }
}

/// `GET /getTimerState` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub timer_running: bool,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

// ───────────────────────────────────────────────────────────────
// Requests and responses
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

pub const INDEX_HTML: &[u8] = include_bytes!("../../assets/index.html");
pub const STYLE_CSS: &[u8] = include_bytes!("../../assets/style.css");

pub const CONTENT_HTML: &str = "text/html";
pub const CONTENT_CSS: &str = "text/css";
pub const CONTENT_JSON: &str = "application/json";

/// Every route the surface answers, for adapter registration.
pub const ROUTES: &[(Method, &str)] = &[
    (Method::Get, "/"),
    (Method::Get, "/style.css"),
    (Method::Get, "/getTimerValues"),
    (Method::Get, "/getTimerState"),
    (Method::Post, "/setTimers"),
    (Method::Post, "/toggleTimer"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlResponse {
    /// Static file.
    Asset {
        content_type: &'static str,
        body: &'static [u8],
    },
    /// 200 with a JSON body.
    Json(String),
    /// 302 to the given location.
    Redirect(&'static str),
    /// 400 with a JSON `{"error": ...}` body.
    BadRequest(String),
    /// 404.
    NotFound,
    /// 500: serialisation or a device-side failure.
    ServerError,
}

impl ControlResponse {
    pub fn status(&self) -> u16 {
        match self {
            Self::Asset { .. } | Self::Json(_) => 200,
            Self::Redirect(_) => 302,
            Self::BadRequest(_) => 400,
            Self::NotFound => 404,
            Self::ServerError => 500,
        }
    }

    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::Asset { content_type, .. } => Some(*content_type),
            Self::Json(_) | Self::BadRequest(_) => Some(CONTENT_JSON),
            Self::Redirect(_) | Self::NotFound | Self::ServerError => None,
        }
    }

    pub fn body(&self) -> &[u8] {
        match self {
            Self::Asset { body, .. } => *body,
            Self::Json(s) | Self::BadRequest(s) => s.as_bytes(),
            Self::Redirect(_) | Self::NotFound | Self::ServerError => &[],
        }
    }

    fn json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(s) => Self::Json(s),
            Err(_) => Self::ServerError,
        }
    }

    /// 400 with the bare message for client errors, 500 otherwise.
    pub fn from_error(err: &Error) -> Self {
        if !err.is_client_error() {
            return Self::ServerError;
        }
        let msg = match err {
            Error::Input(e) => e.to_string(),
            Error::Ota(e) => e.to_string(),
            other => other.to_string(),
        };
        match serde_json::to_string(&ErrorBody { error: &msg }) {
            Ok(s) => Self::BadRequest(s),
            Err(_) => Self::ServerError,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Dispatch
// ───────────────────────────────────────────────────────────────

/// Route one request. Any query string on `path` is ignored.
pub fn handle(
    target: &impl ControlTarget,
    method: Method,
    path: &str,
    body: &[u8],
) -> ControlResponse {
    let path = path.split_once('?').map_or(path, |(p, _)| p);

    match (method, path) {
        (Method::Get, "/") => ControlResponse::Asset {
            content_type: CONTENT_HTML,
            body: INDEX_HTML,
        },
        (Method::Get, "/style.css") => ControlResponse::Asset {
            content_type: CONTENT_CSS,
            body: STYLE_CSS,
        },
        (Method::Get, "/getTimerValues") => {
            ControlResponse::json(&TimerValues::from(target.timer_values()))
        }
        (Method::Get, "/getTimerState") => ControlResponse::json(&TimerState {
            timer_running: target.timer_running(),
        }),
        (Method::Post, "/setTimers") => match form::parse_set_timers(body) {
            Ok(config) => {
                info!(
                    "HTTP: set timers on={}s off={}s",
                    config.on_secs(),
                    config.off_secs()
                );
                // The new durations run either way; only persistence failed.
                if let Err(e) = target.set_timers(config) {
                    warn!("HTTP: /setTimers applied but not saved ({})", e);
                }
                ControlResponse::Redirect("/")
            }
            Err(e) => {
                warn!("HTTP: rejected /setTimers ({})", e);
                ControlResponse::from_error(&e.into())
            }
        },
        (Method::Post, "/toggleTimer") => {
            target.toggle_timer();
            info!("HTTP: timer toggled (running={})", target.timer_running());
            ControlResponse::Redirect("/")
        }
        _ => ControlResponse::NotFound,
    }
}
