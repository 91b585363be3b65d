//! WiFi soft access point adapter.
//!
//! The relay board hosts its own network; phones and laptops join it and
//! open the web UI at the gateway address.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `EspWifi` in AP mode, wrapped in `BlockingWifi`.
//! - **all other targets**: simulation stub for host-side tests.

use core::fmt;
use log::{error, info};

#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::modem::Modem,
    nvs::EspDefaultNvsPartition,
    wifi::{AccessPointConfiguration, AuthMethod, BlockingWifi, Configuration, EspWifi},
};

use crate::config::SystemConfig;

// ───────────────────────────────────────────────────────────────
// Errors
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApError {
    InvalidSsid,
    InvalidPassword,
    StartFailed,
}

impl fmt::Display for ApError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)"),
            Self::StartFailed => write!(f, "access point failed to start"),
        }
    }
}

impl std::error::Error for ApError {}

// ───────────────────────────────────────────────────────────────
// State
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApState {
    Stopped,
    Running,
    Failed,
}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ApError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(ApError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ApError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ApError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Adapter
// ───────────────────────────────────────────────────────────────

pub struct SoftApAdapter {
    state: ApState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    channel: u8,
    #[cfg(target_os = "espidf")]
    wifi: Option<BlockingWifi<EspWifi<'static>>>,
}

impl SoftApAdapter {
    /// Validate the AP settings from `config`.
    pub fn new(config: &SystemConfig) -> Result<Self, ApError> {
        validate_ssid(&config.ap_ssid)?;
        validate_password(&config.ap_password)?;
        Ok(Self {
            state: ApState::Stopped,
            ssid: config.ap_ssid.clone(),
            password: config.ap_password.clone(),
            channel: config.ap_channel,
            #[cfg(target_os = "espidf")]
            wifi: None,
        })
    }

    pub fn state(&self) -> ApState {
        self.state
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    fn auth_is_open(&self) -> bool {
        self.password.is_empty()
    }

    /// Bring the access point up. Blocks until the AP netif is up.
    #[cfg(target_os = "espidf")]
    pub fn start(
        &mut self,
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
    ) -> anyhow::Result<()> {
        match self.platform_start(modem, sysloop, nvs) {
            Ok(()) => {
                self.state = ApState::Running;
                Ok(())
            }
            Err(e) => {
                error!("WiFi AP: start failed: {:#}", e);
                self.state = ApState::Failed;
                Err(e)
            }
        }
    }

    /// Bring the access point up (simulation).
    #[cfg(not(target_os = "espidf"))]
    pub fn start(&mut self) -> anyhow::Result<()> {
        if self.state == ApState::Running {
            error!("WiFi AP(sim): already running");
            return Err(ApError::StartFailed.into());
        }
        info!(
            "WiFi AP(sim): '{}' on channel {} ({})",
            self.ssid,
            self.channel,
            if self.auth_is_open() { "open" } else { "WPA2" }
        );
        self.state = ApState::Running;
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_start(
        &mut self,
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
    ) -> anyhow::Result<()> {
        let esp_wifi = EspWifi::new(modem, sysloop.clone(), nvs)?;
        let mut wifi = BlockingWifi::wrap(esp_wifi, sysloop)?;

        let auth_method = if self.auth_is_open() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };

        wifi.set_configuration(&Configuration::AccessPoint(AccessPointConfiguration {
            ssid: self
                .ssid
                .as_str()
                .try_into()
                .map_err(|()| ApError::InvalidSsid)?,
            password: self
                .password
                .as_str()
                .try_into()
                .map_err(|()| ApError::InvalidPassword)?,
            auth_method,
            channel: self.channel,
            ..Default::default()
        }))?;

        wifi.start()?;
        wifi.wait_netif_up()?;

        let ip = wifi.wifi().ap_netif().get_ip_info()?;
        info!(
            "WiFi AP: '{}' up on channel {}, UI at http://{}/",
            self.ssid, self.channel, ip.ip
        );

        self.wifi = Some(wifi);
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
