//! WiFi station-mode adapter.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver via
//!   `esp_idf_svc::wifi`.
//! - **all other targets**: only the credential validation and backoff
//!   logic, which are host-tested.
//!
//! ## Reconnection policy
//!
//! Boot blocks on the first connection attempt; if it fails the
//! controller runs offline.  Once connected, the link
//! is checked from the control loop and a lost connection is
//! re-initiated *without blocking*, waiting an exponential backoff
//! (2 s → 4 s → 8 s … capped at 60 s) between attempts.  The interlock
//! never waits on the network.

use log::info;

use crate::error::CommsError;

/// DHCP hostname announced by the station.
pub const HOSTNAME: &str = "flowguard";

const INITIAL_BACKOFF_MS: u32 = 2_000;
const MAX_BACKOFF_MS: u32 = 60_000;

// ───────────────────────────────────────────────────────────────
// Credentials
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), CommsError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(CommsError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), CommsError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(CommsError::InvalidPassword);
    }
    Ok(())
}

/// Validated station credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    ssid: heapless::String<32>,
    password: heapless::String<64>,
}

impl core::fmt::Debug for WifiCredentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WifiCredentials")
            .field("ssid", &self.ssid)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl WifiCredentials {
    pub fn new(ssid: &str, password: &str) -> Result<Self, CommsError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        let mut creds = Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
        };
        creds
            .ssid
            .push_str(ssid)
            .map_err(|_| CommsError::InvalidSsid)?;
        creds
            .password
            .push_str(password)
            .map_err(|_| CommsError::InvalidPassword)?;
        Ok(creds)
    }

    /// Credentials baked in at build time (`WIFI_SSID`, `WIFI_PASSWORD`).
    pub fn from_build_env() -> Result<Self, CommsError> {
        let ssid = option_env!("WIFI_SSID").ok_or(CommsError::NoCredentials)?;
        let password = option_env!("WIFI_PASSWORD").unwrap_or("");
        Self::new(ssid, password)
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Open network (no passphrase).
    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }
}

// ───────────────────────────────────────────────────────────────
// Reconnect backoff
// ───────────────────────────────────────────────────────────────

/// Schedules non-blocking reconnect attempts.
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    delay_ms: u32,
    /// Time of the last attempt; `None` while connected.
    last_attempt_ms: Option<u32>,
    attempts: u32,
}

impl Default for ReconnectBackoff {
    fn default() -> Self {
        Self::new()
    }
}

impl ReconnectBackoff {
    pub fn new() -> Self {
        Self {
            delay_ms: INITIAL_BACKOFF_MS,
            last_attempt_ms: None,
            attempts: 0,
        }
    }

    /// Called while the link is down.  Returns `true` when a new connect
    /// attempt should be started now, and schedules the next one.
    pub fn poll_disconnected(&mut self, now_ms: u32) -> bool {
        match self.last_attempt_ms {
            None => {
                self.last_attempt_ms = Some(now_ms);
                self.attempts = 1;
                true
            }
            Some(last) if now_ms.wrapping_sub(last) >= self.delay_ms => {
                self.last_attempt_ms = Some(now_ms);
                self.attempts += 1;
                self.delay_ms = self.delay_ms.saturating_mul(2).min(MAX_BACKOFF_MS);
                true
            }
            Some(_) => false,
        }
    }

    /// Link is up: reset the schedule.
    pub fn on_connected(&mut self) {
        if self.attempts > 0 {
            info!("WiFi: reconnected after {} attempt(s)", self.attempts);
        }
        *self = Self::new();
    }

    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF station
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod esp {
    use anyhow::{Context, anyhow};
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::hal::modem::Modem;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::wifi::{
        AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi,
    };
    use log::{info, warn};

    use super::{HOSTNAME, ReconnectBackoff, WifiCredentials};

    /// Connected station plus its reconnect schedule.
    pub struct WifiLink {
        wifi: BlockingWifi<EspWifi<'static>>,
        backoff: ReconnectBackoff,
        was_connected: bool,
    }

    impl WifiLink {
        /// Bring up the station and block until the network interface is
        /// up.
        pub fn connect(
            modem: Modem,
            sysloop: EspSystemEventLoop,
            nvs: EspDefaultNvsPartition,
            creds: &WifiCredentials,
        ) -> anyhow::Result<Self> {
            let mut wifi = BlockingWifi::wrap(
                EspWifi::new(modem, sysloop.clone(), Some(nvs))?,
                sysloop,
            )?;

            let auth_method = if creds.is_open() {
                AuthMethod::None
            } else {
                AuthMethod::WPA2Personal
            };
            wifi.set_configuration(&Configuration::Client(ClientConfiguration {
                ssid: creds
                    .ssid()
                    .try_into()
                    .map_err(|_| anyhow!("SSID too long"))?,
                password: creds
                    .password()
                    .try_into()
                    .map_err(|_| anyhow!("password too long"))?,
                auth_method,
                ..Default::default()
            }))?;
            wifi.wifi_mut()
                .sta_netif_mut()
                .set_hostname(HOSTNAME)
                .context("set hostname")?;

            wifi.start()?;
            info!("WiFi: connecting to '{}'", creds.ssid());
            wifi.connect()?;
            wifi.wait_netif_up()?;

            let ip = wifi.wifi().sta_netif().get_ip_info()?;
            info!("WiFi: connected, IP {} ({}.local)", ip.ip, HOSTNAME);

            Ok(Self {
                wifi,
                backoff: ReconnectBackoff::new(),
                was_connected: true,
            })
        }

        /// Check the link and start a reconnect when due.  Never blocks.
        pub fn poll(&mut self, now_ms: u32) {
            let connected = self.wifi.is_connected().unwrap_or(false);
            if connected {
                if !self.was_connected {
                    self.backoff.on_connected();
                }
                self.was_connected = true;
                return;
            }
            if self.was_connected {
                warn!("WiFi: connection lost");
                self.was_connected = false;
            }
            if self.backoff.poll_disconnected(now_ms) {
                info!(
                    "WiFi: reconnect attempt {} (next in {} ms)",
                    self.backoff.attempts(),
                    self.backoff.delay_ms()
                );
                // Non-blocking connect on the inner driver.
                if let Err(e) = self.wifi.wifi_mut().connect() {
                    warn!("WiFi: reconnect request failed: {e}");
                }
            }
        }

        pub fn is_connected(&self) -> bool {
            self.was_connected
        }
    }
}

#[cfg(target_os = "espidf")]
pub use esp::WifiLink;

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
