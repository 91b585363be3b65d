//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements       | Connects to                    |
//! |----------------|------------------|--------------------------------|
//! | `http_server`  | -                | EspHttpServer → control module |
//! | `log_sink`     | EventSink        | Serial log output              |
//! | `nvs`          | TimerStore       | NVS / in-memory store          |
//! | `platform`     | -                | OTA rollback/restart, PSRAM    |
//! | `time`         | ClockPort        | ESP32 system timer             |
//! | `wifi`         | -                | ESP-IDF WiFi soft AP           |

#[cfg(target_os = "espidf")]
pub mod http_server;
pub mod log_sink;
pub mod nvs;
pub mod platform;
pub mod time;
pub mod wifi;
