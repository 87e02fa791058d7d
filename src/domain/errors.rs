use crate::domain::models::{Alert, MessageSeverity};
use thiserror::Error;

/// Everything that can end a user-triggered operation.
///
/// Messages coming from the transport or the OS are carried verbatim so the
/// alert shows exactly what the lower layer reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("{0}")]
    PermissionDenied(String),
    #[error("{0}")]
    ScanError(String),
    #[error("{0}")]
    ConnectError(String),
    #[error("{0}")]
    DiscoveryError(String),
    #[error("{0}")]
    WriteError(String),
    #[error("Connect to a BLE device first.")]
    NoDeviceConnected,
    #[error("Channel {channel} is {value}, expected 0-255")]
    InvalidChannel { channel: char, value: i32 },
}

impl ControllerError {
    pub fn title(&self) -> &'static str {
        match self {
            Self::PermissionDenied(_) => "Missing BLE permissions",
            Self::ScanError(_) => "Scan error",
            Self::ConnectError(_) => "Connection failed",
            Self::DiscoveryError(_) => "Service discovery failed",
            Self::WriteError(_) => "Send failed",
            Self::NoDeviceConnected => "No BLE device",
            Self::InvalidChannel { .. } => "Invalid color",
        }
    }

    pub fn to_alert(&self) -> Alert {
        let severity = match self {
            Self::NoDeviceConnected => MessageSeverity::Warning,
            _ => MessageSeverity::Error,
        };
        Alert::new(self.title(), self.to_string(), severity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_passthrough() {
        let err = ControllerError::ConnectError("Device 12:34 was disconnected".to_string());
        let alert = err.to_alert();
        assert_eq!(alert.title, "Connection failed");
        assert_eq!(alert.message, "Device 12:34 was disconnected");
        assert_eq!(alert.severity, MessageSeverity::Error);
    }

    #[test]
    fn test_distinct_titles() {
        let errors = [
            ControllerError::PermissionDenied(String::new()),
            ControllerError::ScanError(String::new()),
            ControllerError::ConnectError(String::new()),
            ControllerError::DiscoveryError(String::new()),
            ControllerError::WriteError(String::new()),
            ControllerError::NoDeviceConnected,
        ];
        let mut titles: Vec<_> = errors.iter().map(|e| e.title()).collect();
        titles.sort();
        titles.dedup();
        assert_eq!(titles.len(), errors.len());
    }
}
