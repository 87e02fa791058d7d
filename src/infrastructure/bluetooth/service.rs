//! Bluetooth Service Module
//!
//! Command loop running on the BLE thread. Translates UI commands into
//! connection manager calls and results into UI events.

use crate::domain::errors::ControllerError;
use crate::domain::models::{
    Alert, AppEvent, BluetoothCommand, ConnectionStatus, MessageSeverity, StatusMessage,
};
use crate::domain::settings::SettingsService;
use crate::infrastructure::bluetooth::connection::{
    ConnectOutcome, ConnectionConfig, ConnectionManager,
};
use crate::infrastructure::bluetooth::platform::BtleplugTransport;
use crate::infrastructure::bluetooth::transport::BleTransport;
use crate::infrastructure::permissions::PermissionRequester;
use anyhow::Result;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Main Bluetooth service coordinating all BLE operations
pub struct BluetoothService<T: BleTransport> {
    manager: ConnectionManager<T>,
    lost_rx: mpsc::UnboundedReceiver<u64>,
    event_sender: mpsc::UnboundedSender<AppEvent>,
    settings: Arc<Mutex<SettingsService>>,
}

impl<T: BleTransport> BluetoothService<T> {
    pub fn new(
        transport: Arc<T>,
        permissions: PermissionRequester,
        event_sender: mpsc::UnboundedSender<AppEvent>,
        settings: Arc<Mutex<SettingsService>>,
    ) -> Self {
        let (lost_tx, lost_rx) = mpsc::unbounded_channel();
        let manager = ConnectionManager::new(
            transport,
            permissions,
            ConnectionConfig::default(),
            event_sender.clone(),
            lost_tx,
        );
        Self {
            manager,
            lost_rx,
            event_sender,
            settings,
        }
    }

    /// Process commands until `Shutdown` or until the UI side goes away.
    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<BluetoothCommand>) {
        if let Err(e) = self.manager.request_permissions().await {
            self.alert(e.to_alert());
        }

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    None | Some(BluetoothCommand::Shutdown) => break,
                    Some(command) => self.handle(command).await,
                },
                Some(generation) = self.lost_rx.recv() => self.on_link_lost(generation),
            }
        }

        info!("Bluetooth service shutting down");
        self.manager.disconnect().await;
    }

    async fn handle(&mut self, command: BluetoothCommand) {
        match command {
            BluetoothCommand::Connect(cancel) => self.connect(cancel).await,
            BluetoothCommand::Send { mode, color } => {
                match self.manager.send_packet(mode.id(), color).await {
                    Ok(packet) => self.alert(Alert::new(
                        "Command sent",
                        format!("Sent packet: {}", packet),
                        MessageSeverity::Success,
                    )),
                    Err(e) => self.alert(e.to_alert()),
                }
            }
            BluetoothCommand::Disconnect => {
                if self.manager.disconnect().await {
                    self.send_log("Disconnected from device", MessageSeverity::Info);
                }
            }
            BluetoothCommand::Shutdown => {}
        }
    }

    async fn connect(&mut self, cancel: CancellationToken) {
        match self.load_config() {
            Ok(config) => self.manager.set_config(config),
            Err(e) => {
                error!("Invalid connection settings: {}", e);
                self.send_status(self.manager.status());
                self.alert(Alert::new(
                    "Invalid settings",
                    e.to_string(),
                    MessageSeverity::Error,
                ));
                return;
            }
        }

        match self.manager.scan_and_connect(&cancel).await {
            Ok(ConnectOutcome::Connected(device)) => {
                let message = format!("Connected device: {}", device.name);
                let _ = self.event_sender.send(AppEvent::Connected(device));
                self.alert(Alert::new("BLE connected", message, MessageSeverity::Success));
            }
            Ok(ConnectOutcome::TimedOut) => {}
            Ok(ConnectOutcome::Cancelled) => {
                self.send_log("Scan cancelled.", MessageSeverity::Info);
            }
            Err(e) => self.alert(e.to_alert()),
        }
    }

    fn on_link_lost(&mut self, generation: u64) {
        if self.manager.handle_link_lost(generation) {
            warn!("BLE connection lost");
            self.alert(Alert::new(
                "BLE connection lost",
                "Please reconnect.",
                MessageSeverity::Warning,
            ));
        }
    }

    fn load_config(&self) -> Result<ConnectionConfig> {
        let settings = self.settings.lock().map_err(|_| anyhow::anyhow!("Lock error"))?;
        ConnectionConfig::from_settings(settings.get())
    }

    fn alert(&self, alert: Alert) {
        let _ = self.event_sender.send(AppEvent::Alert(alert));
    }

    fn send_status(&self, status: ConnectionStatus) {
        let _ = self.event_sender.send(AppEvent::ConnectionStatus(status));
    }

    fn send_log(&self, message: &str, severity: MessageSeverity) {
        let _ = self.event_sender.send(AppEvent::LogMessage(StatusMessage {
            message: message.to_string(),
            severity,
        }));
    }
}

/// Entry point of the BLE thread: open the host adapter and serve commands.
pub async fn run_host_service(
    settings: Arc<Mutex<SettingsService>>,
    event_sender: mpsc::UnboundedSender<AppEvent>,
    commands: mpsc::UnboundedReceiver<BluetoothCommand>,
) {
    let transport = match BtleplugTransport::new().await {
        Ok(transport) => transport,
        Err(e) => {
            error!("Bluetooth unavailable: {}", e);
            let unavailable = ControllerError::ScanError(e.to_string());
            serve_without_adapter(unavailable, event_sender, commands).await;
            return;
        }
    };

    BluetoothService::new(
        Arc::new(transport),
        PermissionRequester::host(),
        event_sender,
        settings,
    )
    .run(commands)
    .await;
}

/// Answer commands when no adapter could be opened, so every connect attempt
/// ends back in `Disconnected` with the reason shown.
async fn serve_without_adapter(
    unavailable: ControllerError,
    event_sender: mpsc::UnboundedSender<AppEvent>,
    mut commands: mpsc::UnboundedReceiver<BluetoothCommand>,
) {
    let _ = event_sender.send(AppEvent::Alert(unavailable.to_alert()));
    while let Some(command) = commands.recv().await {
        match command {
            BluetoothCommand::Shutdown => break,
            BluetoothCommand::Connect(_) => {
                let idle = AppEvent::ConnectionStatus(ConnectionStatus::Disconnected);
                let _ = event_sender.send(idle);
                let _ = event_sender.send(AppEvent::Alert(unavailable.to_alert()));
            }
            BluetoothCommand::Send { .. } => {
                let _ = event_sender.send(AppEvent::Alert(
                    ControllerError::NoDeviceConnected.to_alert(),
                ));
            }
            BluetoothCommand::Disconnect => {}
        }
    }
}
