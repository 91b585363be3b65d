//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`TimerStore`] for the relay timer. The record is the
//! two-line text produced by [`record::encode`], kept as a string under
//! `relaytimer/timers`.
//!
//! - **`target_os = "espidf"`**: `EspNvs` on the default NVS partition.
//!   The namespace is opened per operation, so the partition handle can be
//!   shared with the Wi-Fi driver.
//! - **all other targets**: in-memory map for host-side tests.
//!
//! A store built with [`NvsTimerStore::detached`] has no backend; every
//! operation reports [`StoreError::Unavailable`] and the firmware keeps
//! running on in-memory durations.

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

use log::{debug, warn};

#[cfg(target_os = "espidf")]
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs};

use crate::app::ports::{StoreError, TimerStore};
use crate::config::DutyCycleConfig;
use crate::record::{self, RECORD_CAPACITY};

pub const NAMESPACE: &str = "relaytimer";
pub const KEY: &str = "timers";

pub struct NvsTimerStore {
    #[cfg(target_os = "espidf")]
    partition: Option<EspDefaultNvsPartition>,
    #[cfg(not(target_os = "espidf"))]
    store: Option<HashMap<String, Vec<u8>>>,
}

impl NvsTimerStore {
    /// Store backed by the default NVS partition.
    #[cfg(target_os = "espidf")]
    pub fn new(partition: EspDefaultNvsPartition) -> Self {
        log::info!("NvsTimerStore: using default partition, namespace '{}'", NAMESPACE);
        Self {
            partition: Some(partition),
        }
    }

    /// Empty in-memory store (simulation).
    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        log::info!("NvsTimerStore: simulation backend");
        Self {
            store: Some(HashMap::new()),
        }
    }

    /// Store with no backend. Used when the partition cannot be taken.
    pub fn detached() -> Self {
        warn!("NvsTimerStore: running detached, timers will not persist");
        Self {
            #[cfg(target_os = "espidf")]
            partition: None,
            #[cfg(not(target_os = "espidf"))]
            store: None,
        }
    }

    pub fn is_attached(&self) -> bool {
        #[cfg(target_os = "espidf")]
        {
            self.partition.is_some()
        }
        #[cfg(not(target_os = "espidf"))]
        {
            self.store.is_some()
        }
    }

    /// Overwrite the raw record bytes (simulation only).
    #[cfg(not(target_os = "espidf"))]
    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<(), StoreError> {
        let store = self.store.as_mut().ok_or(StoreError::Unavailable)?;
        store.insert(composite_key(), bytes.to_vec());
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn open(&self) -> Result<EspNvs<esp_idf_svc::nvs::NvsDefault>, StoreError> {
        let partition = self.partition.as_ref().ok_or(StoreError::Unavailable)?;
        EspNvs::new(partition.clone(), NAMESPACE, true).map_err(|e| {
            warn!("NvsTimerStore: open '{}' failed: {}", NAMESPACE, e);
            StoreError::Unavailable
        })
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for NvsTimerStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_os = "espidf"))]
fn composite_key() -> String {
    format!("{}::{}", NAMESPACE, KEY)
}

impl TimerStore for NvsTimerStore {
    fn load(&self) -> Result<DutyCycleConfig, StoreError> {
        #[cfg(target_os = "espidf")]
        {
            let nvs = self.open()?;
            // get_str needs room for the terminating NUL.
            let mut buf = [0u8; RECORD_CAPACITY + 1];
            match nvs.get_str(KEY, &mut buf) {
                Ok(Some(text)) => {
                    debug!("NvsTimerStore: read {} bytes", text.len());
                    record::decode(text.as_bytes())
                }
                Ok(None) => Err(StoreError::NotFound),
                Err(e) => {
                    warn!("NvsTimerStore: read failed: {}", e);
                    Err(StoreError::Io)
                }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            let store = self.store.as_ref().ok_or(StoreError::Unavailable)?;
            let bytes = store.get(&composite_key()).ok_or(StoreError::NotFound)?;
            if bytes.len() > RECORD_CAPACITY {
                return Err(StoreError::Malformed);
            }
            debug!("NvsTimerStore(sim): read {} bytes", bytes.len());
            record::decode(bytes)
        }
    }

    fn save(&mut self, config: &DutyCycleConfig) -> Result<(), StoreError> {
        let text = record::encode(config);

        #[cfg(target_os = "espidf")]
        {
            let mut nvs = self.open()?;
            nvs.set_str(KEY, &text).map_err(|e| {
                warn!("NvsTimerStore: write failed: {}", e);
                StoreError::Io
            })
        }

        #[cfg(not(target_os = "espidf"))]
        {
            let store = self.store.as_mut().ok_or(StoreError::Unavailable)?;
            store.insert(composite_key(), text.as_bytes().to_vec());
            debug!("NvsTimerStore(sim): wrote {:?}", text.as_str());
            Ok(())
        }
    }
}
