use crate::domain::models::{
    Alert, AppEvent, BluetoothCommand, Color, ColorPreset, ConnectionStatus, DeviceInfo, Mode,
    StatusMessage,
};
use std::collections::VecDeque;
use tokio_util::sync::CancellationToken;

/// Everything the main screen shows, fed by [`AppEvent`]s.
#[derive(Debug)]
pub struct ScreenState {
    pub connection_status: ConnectionStatus,
    pub device: Option<DeviceInfo>,
    pub status_message: Option<StatusMessage>,
    pub alerts: VecDeque<Alert>,
    pub mode: Mode,
    pub color: Color,
    scan_cancel: Option<CancellationToken>,
}

impl Default for ScreenState {
    fn default() -> Self {
        Self {
            connection_status: ConnectionStatus::Disconnected,
            device: None,
            status_message: None,
            alerts: VecDeque::new(),
            mode: Mode::ExplicitColor,
            color: ColorPreset::Red.color(),
            scan_cancel: None,
        }
    }
}

impl ScreenState {
    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::ConnectionStatus(status) => {
                self.connection_status = status;
                if !status.is_busy() {
                    self.scan_cancel = None;
                }
                if status == ConnectionStatus::Disconnected {
                    self.device = None;
                }
            }
            AppEvent::Connected(device) => self.device = Some(device),
            AppEvent::Alert(alert) => self.alerts.push_back(alert),
            AppEvent::LogMessage(msg) => self.status_message = Some(msg),
        }
    }

    /// Controls stay disabled while a dialog is waiting for acknowledgment.
    pub fn is_blocked(&self) -> bool {
        !self.alerts.is_empty()
    }

    pub fn current_alert(&self) -> Option<&Alert> {
        self.alerts.front()
    }

    pub fn dismiss_alert(&mut self) {
        self.alerts.pop_front();
    }

    /// Command for the connect button, `None` while an attempt is running.
    pub fn connect(&mut self) -> Option<BluetoothCommand> {
        if self.connection_status != ConnectionStatus::Disconnected || self.scan_cancel.is_some() {
            return None;
        }
        let cancel = CancellationToken::new();
        self.scan_cancel = Some(cancel.clone());
        self.connection_status = ConnectionStatus::Scanning;
        Some(BluetoothCommand::Connect(cancel))
    }

    /// Stop the running attempt and unlock the connect button.
    pub fn cancel_connect(&mut self) {
        if let Some(cancel) = self.scan_cancel.take() {
            cancel.cancel();
        }
        if self.connection_status.is_busy() {
            self.connection_status = ConnectionStatus::Disconnected;
        }
    }

    pub fn select_preset(&mut self, preset: ColorPreset) {
        self.color = preset.color();
    }

    pub fn send(&self) -> BluetoothCommand {
        BluetoothCommand::Send {
            mode: self.mode,
            color: self.color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::MessageSeverity;

    fn device() -> DeviceInfo {
        DeviceInfo {
            name: "Jake".to_string(),
            address: "AA:01".to_string(),
            rssi: None,
        }
    }

    #[test]
    fn test_initial_selection() {
        let state = ScreenState::default();
        assert_eq!(state.mode, Mode::ExplicitColor);
        assert_eq!(state.color, Color::new(255, 0, 0));
        assert!(!state.is_blocked());
    }

    #[test]
    fn test_connect_once() {
        let mut state = ScreenState::default();
        assert!(matches!(state.connect(), Some(BluetoothCommand::Connect(_))));
        assert_eq!(state.connection_status, ConnectionStatus::Scanning);
        assert!(state.connect().is_none());
    }

    #[test]
    fn test_cancel_connect_cancels_token() {
        let mut state = ScreenState::default();
        let Some(BluetoothCommand::Connect(token)) = state.connect() else {
            panic!("expected connect command");
        };
        state.cancel_connect();
        assert!(token.is_cancelled());
        assert_eq!(state.connection_status, ConnectionStatus::Disconnected);
        assert!(state.connect().is_some());
    }

    #[test]
    fn test_cancel_without_token_unlocks_connect() {
        let mut state = ScreenState::default();
        state.apply(AppEvent::ConnectionStatus(ConnectionStatus::Connecting));
        state.cancel_connect();
        assert_eq!(state.connection_status, ConnectionStatus::Disconnected);
        assert!(state.connect().is_some());
    }

    #[test]
    fn test_cancel_keeps_connected() {
        let mut state = ScreenState::default();
        state.apply(AppEvent::ConnectionStatus(ConnectionStatus::Connected));
        state.cancel_connect();
        assert_eq!(state.connection_status, ConnectionStatus::Connected);
    }

    #[test]
    fn test_disconnect_clears_device() {
        let mut state = ScreenState::default();
        state.apply(AppEvent::ConnectionStatus(ConnectionStatus::Connected));
        state.apply(AppEvent::Connected(device()));
        assert_eq!(state.device, Some(device()));

        state.apply(AppEvent::ConnectionStatus(ConnectionStatus::Disconnected));
        assert!(state.device.is_none());
        assert!(state.connect().is_some());
    }

    #[test]
    fn test_alerts_queue_in_order() {
        let mut state = ScreenState::default();
        state.apply(AppEvent::Alert(Alert::new("a", "1", MessageSeverity::Info)));
        state.apply(AppEvent::Alert(Alert::new("b", "2", MessageSeverity::Error)));
        assert!(state.is_blocked());
        assert_eq!(state.current_alert().unwrap().title, "a");
        state.dismiss_alert();
        assert_eq!(state.current_alert().unwrap().title, "b");
        state.dismiss_alert();
        assert!(!state.is_blocked());
    }

    #[test]
    fn test_send_uses_selection() {
        let mut state = ScreenState::default();
        state.mode = Mode::Rainbow;
        state.select_preset(ColorPreset::Green);
        match state.send() {
            BluetoothCommand::Send { mode, color } => {
                assert_eq!(mode, Mode::Rainbow);
                assert_eq!(color, Color::new(0, 255, 0));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
