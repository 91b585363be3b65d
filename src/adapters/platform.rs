//! Platform hooks: OTA rollback and PSRAM detection at boot, and the
//! restart that follows a firmware upload.

use std::time::Duration;

use log::{info, warn};

/// Mark the running image valid so the bootloader does not roll back.
#[cfg(target_os = "espidf")]
pub fn check_rollback() {
    match esp_ota::mark_app_valid() {
        Ok(()) => info!("OTA: firmware marked valid (rollback cancelled)"),
        Err(e) => warn!("OTA: mark_app_valid failed: {:?}", e),
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn check_rollback() {
    info!("OTA rollback check (simulation): skipped");
}

/// Total external RAM in bytes, 0 if none is fitted or initialised.
#[cfg(target_os = "espidf")]
pub fn psram_bytes() -> usize {
    use esp_idf_svc::sys::{MALLOC_CAP_SPIRAM, heap_caps_get_total_size};
    // SAFETY: read-only query of the heap allocator's region table.
    unsafe { heap_caps_get_total_size(MALLOC_CAP_SPIRAM) }
}

#[cfg(not(target_os = "espidf"))]
pub fn psram_bytes() -> usize {
    0
}

/// Log whether PSRAM is available.
pub fn log_psram() {
    let bytes = psram_bytes();
    if bytes > 0 {
        info!("PSRAM found and initialised ({} KB)", bytes / 1024);
    } else {
        warn!("PSRAM not found");
    }
}

/// Restart into the newly flashed image `delay` from now.
///
/// Runs on a detached thread; returns immediately.
#[cfg(target_os = "espidf")]
pub fn restart_after(delay: Duration) {
    let spawned = std::thread::Builder::new()
        .name("ota-restart".into())
        .stack_size(2048)
        .spawn(move || {
            std::thread::sleep(delay);
            info!("OTA: rebooting into new firmware");
            esp_ota::restart();
        });
    if let Err(e) = spawned {
        warn!("OTA: restart thread failed ({}), rebooting now", e);
        esp_ota::restart();
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn restart_after(delay: Duration) {
    info!("OTA restart in {}ms (simulation): skipped", delay.as_millis());
}
