//! BLE Connection Module
//!
//! Owns the single link to the light: permission check, scan, connect,
//! discovery, the disconnect watcher and packet writes.

use crate::domain::connection::ConnectionTracker;
use crate::domain::errors::ControllerError;
use crate::domain::models::{
    AppEvent, Color, ConnectionStatus, DeviceInfo, DeviceNameFilter, MessageSeverity,
    StatusMessage,
};
use crate::domain::packet::{PacketEncoder, PacketString};
use crate::domain::settings::Settings;
use crate::infrastructure::bluetooth::protocol::{
    self, DEFAULT_DEVICE_NAME, DEFAULT_SCAN_TIMEOUT_MS,
};
use crate::infrastructure::bluetooth::scanner::{self, ScanOutcome};
use crate::infrastructure::bluetooth::transport::{BleLink, BleTransport};
use crate::infrastructure::permissions::PermissionRequester;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Configuration for connection behavior
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Which advertisement to connect to
    pub name_filter: DeviceNameFilter,
    /// Scan window
    pub scan_timeout: Duration,
    /// Service holding the command characteristic
    pub service_uuid: Uuid,
    /// Characteristic packets are written to
    pub command_char_uuid: Uuid,
    pub encoder: PacketEncoder,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            name_filter: DeviceNameFilter::new(DEFAULT_DEVICE_NAME, Default::default()),
            scan_timeout: Duration::from_millis(DEFAULT_SCAN_TIMEOUT_MS),
            service_uuid: protocol::SERVICE_UUID,
            command_char_uuid: protocol::COMMAND_CHAR_UUID,
            encoder: PacketEncoder::default(),
        }
    }
}

impl ConnectionConfig {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Ok(Self {
            name_filter: DeviceNameFilter::new(
                settings.device_name_pattern.clone(),
                settings.name_match,
            ),
            scan_timeout: Duration::from_millis(settings.scan_timeout_ms),
            service_uuid: protocol::parse_uuid(&settings.ble_service_uuid)?,
            command_char_uuid: protocol::parse_uuid(&settings.ble_command_char_uuid)?,
            encoder: PacketEncoder::new(settings.mode_prefix_policy, settings.channel_policy),
        })
    }
}

/// Result of a scan-and-connect attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connected(DeviceInfo),
    /// Nothing matching was heard before the scan timeout
    TimedOut,
    Cancelled,
}

/// The open link. Dropping it without [`release`](Self::release) still
/// stops the watcher and schedules a disconnect on the current runtime.
struct ActiveLink<L: BleLink> {
    link: Arc<L>,
    device: DeviceInfo,
    generation: u64,
    watcher: JoinHandle<()>,
    released: bool,
}

impl<L: BleLink> ActiveLink<L> {
    async fn release(mut self) {
        self.released = true;
        self.watcher.abort();
        if let Err(e) = self.link.disconnect().await {
            warn!("Disconnect from {} failed: {}", self.device.address, e);
        }
    }

    /// The peripheral is already gone; nothing to tear down on the radio.
    fn lost(mut self) {
        self.released = true;
        self.watcher.abort();
    }
}

impl<L: BleLink> Drop for ActiveLink<L> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.watcher.abort();
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let link = self.link.clone();
            let address = self.device.address.clone();
            handle.spawn(async move {
                if let Err(e) = link.disconnect().await {
                    warn!("Disconnect from {} failed: {}", address, e);
                }
            });
        }
    }
}

/// Connection manager for the light.
///
/// Disconnects observed by the watcher task are reported as link generations
/// on `lost_tx`; the owner feeds them back through
/// [`handle_link_lost`](Self::handle_link_lost).
pub struct ConnectionManager<T: BleTransport> {
    transport: Arc<T>,
    permissions: PermissionRequester,
    config: ConnectionConfig,
    tracker: ConnectionTracker,
    active: Option<ActiveLink<T::Link>>,
    event_sender: mpsc::UnboundedSender<AppEvent>,
    lost_tx: mpsc::UnboundedSender<u64>,
}

impl<T: BleTransport> ConnectionManager<T> {
    pub fn new(
        transport: Arc<T>,
        permissions: PermissionRequester,
        config: ConnectionConfig,
        event_sender: mpsc::UnboundedSender<AppEvent>,
        lost_tx: mpsc::UnboundedSender<u64>,
    ) -> Self {
        Self {
            transport,
            permissions,
            config,
            tracker: ConnectionTracker::new(),
            active: None,
            event_sender,
            lost_tx,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.tracker.status()
    }

    pub fn set_config(&mut self, config: ConnectionConfig) {
        self.config = config;
    }

    pub async fn request_permissions(&self) -> Result<(), ControllerError> {
        self.permissions.request_permissions().await
    }

    /// Scan for the configured device, connect and discover its services.
    pub async fn scan_and_connect(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<ConnectOutcome, ControllerError> {
        if let Some(active) = &self.active {
            info!("Already connected to {}", active.device.name);
            return Ok(ConnectOutcome::Connected(active.device.clone()));
        }

        if let Err(e) = self.request_permissions().await {
            warn!("Permissions not granted: {}", e);
            self.abort_attempt();
            return Err(e);
        }

        self.tracker.begin_scan();
        self.emit_status();
        self.send_log("Scanning for BLE device...", MessageSeverity::Info);

        let transport = Arc::clone(&self.transport);
        let scan = scanner::scan_for_device(
            transport.as_ref(),
            &self.config.name_filter,
            self.config.scan_timeout,
            cancel,
        )
        .await;

        let adv = match scan {
            Ok(ScanOutcome::Found(adv)) => adv,
            Ok(ScanOutcome::TimedOut) => {
                info!("No matching device within {:?}", self.config.scan_timeout);
                self.abort_attempt();
                self.send_log("No BLE device found.", MessageSeverity::Warning);
                return Ok(ConnectOutcome::TimedOut);
            }
            Ok(ScanOutcome::Cancelled) => {
                self.abort_attempt();
                return Ok(ConnectOutcome::Cancelled);
            }
            Err(e) => {
                error!("Scan failed: {}", e);
                self.abort_attempt();
                return Err(ControllerError::ScanError(e.to_string()));
            }
        };

        self.tracker.begin_connect();
        self.emit_status();
        self.send_log("Connecting to device...", MessageSeverity::Info);

        let connected = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = transport.connect(&adv.id) => Some(result),
        };
        let link = match connected {
            None => {
                // The connect future is dropped here; btleplug abandons the
                // pending connection with it.
                self.abort_attempt();
                return Ok(ConnectOutcome::Cancelled);
            }
            Some(Err(e)) => {
                error!("Connection failed: {}", e);
                self.abort_attempt();
                return Err(ControllerError::ConnectError(e.to_string()));
            }
            Some(Ok(link)) => Arc::new(link),
        };

        let discovered = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = link.discover() => Some(result),
        };
        match discovered {
            Some(Ok(())) => {}
            other => {
                if let Err(e) = link.disconnect().await {
                    warn!("Cleanup disconnect failed: {}", e);
                }
                self.abort_attempt();
                return match other {
                    Some(Err(e)) => {
                        error!("Service discovery failed: {}", e);
                        Err(ControllerError::DiscoveryError(e.to_string()))
                    }
                    _ => Ok(ConnectOutcome::Cancelled),
                };
            }
        }

        let device = DeviceInfo {
            name: adv.local_name.unwrap_or_default(),
            address: adv.address,
            rssi: adv.rssi,
        };
        let generation = self.tracker.connected();
        let watcher = self.spawn_watcher(link.clone(), generation);
        self.active = Some(ActiveLink {
            link,
            device: device.clone(),
            generation,
            watcher,
            released: false,
        });

        info!("Connected to {} ({})", device.name, device.address);
        self.emit_status();
        Ok(ConnectOutcome::Connected(device))
    }

    fn spawn_watcher(&self, link: Arc<T::Link>, generation: u64) -> JoinHandle<()> {
        let lost_tx = self.lost_tx.clone();
        tokio::spawn(async move {
            match link.disconnected().await {
                Ok(()) => {
                    let _ = lost_tx.send(generation);
                }
                Err(e) => warn!("Cannot watch for disconnects: {}", e),
            }
        })
    }

    /// Apply a disconnect reported by a watcher. Returns `true` when the
    /// user should be told the connection was lost.
    pub fn handle_link_lost(&mut self, generation: u64) -> bool {
        if !self.tracker.disconnected(generation) {
            return false;
        }
        if let Some(active) = self.active.take() {
            info!("Device {} disconnected", active.device.address);
            active.lost();
        }
        self.emit_status();
        true
    }

    /// Manager-initiated disconnect. Returns `true` if a link was closed.
    pub async fn disconnect(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        let generation = active.generation;
        info!("Disconnecting from {}", active.device.address);
        active.release().await;
        let changed = self.tracker.disconnected(generation);
        if changed {
            self.emit_status();
        }
        changed
    }

    /// Encode and write one command packet.
    pub async fn send_packet(
        &self,
        mode: &str,
        color: Color,
    ) -> Result<PacketString, ControllerError> {
        let active = match &self.active {
            Some(active) if self.tracker.is_connected() => active,
            _ => return Err(ControllerError::NoDeviceConnected),
        };

        let packet = self.config.encoder.encode(mode, color)?;
        let payload = packet.transport_encode();
        active
            .link
            .write_without_response(
                self.config.service_uuid,
                self.config.command_char_uuid,
                &payload,
            )
            .await
            .map_err(|e| {
                error!("Write failed: {}", e);
                ControllerError::WriteError(e.to_string())
            })?;

        info!("Sent packet {} as {}", packet, payload);
        Ok(packet)
    }

    fn abort_attempt(&mut self) {
        self.tracker.abort();
        self.emit_status();
    }

    fn emit_status(&self) {
        let _ = self
            .event_sender
            .send(AppEvent::ConnectionStatus(self.tracker.status()));
    }

    fn send_log(&self, message: &str, severity: MessageSeverity) {
        let _ = self.event_sender.send(AppEvent::LogMessage(StatusMessage {
            message: message.to_string(),
            severity,
        }));
    }
}
