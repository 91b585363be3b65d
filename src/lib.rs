//! Relay timer firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod engine;
pub mod error;
pub mod indicator;
pub mod pins;
pub mod record;

pub mod adapters;
pub mod drivers;

mod esp_link_shims;
