//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules for the relay timer: the
//! duty-cycle orchestration in [`service`] and the shared, lock-guarded
//! [`controller`] that the control loop, web handlers and indicator task
//! all go through. All interaction with hardware happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod commands;
pub mod controller;
pub mod events;
pub mod ports;
pub mod service;
