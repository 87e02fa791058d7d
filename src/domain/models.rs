use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// An RGB color as sent to the light.
///
/// Channels are nominally in `0..=255` but are deliberately left as `i32`:
/// the packet encoder pads whatever it is given unless the channel policy
/// says otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: i32,
    pub g: i32,
    pub b: i32,
}

impl Color {
    pub const fn new(r: i32, g: i32, b: i32) -> Self {
        Self { r, g, b }
    }

    pub fn channels(&self) -> [(char, i32); 3] {
        [('r', self.r), ('g', self.g), ('b', self.b)]
    }
}

/// The three colors offered on the main screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorPreset {
    Red,
    Green,
    Blue,
}

impl ColorPreset {
    pub const ALL: [ColorPreset; 3] = [ColorPreset::Red, ColorPreset::Green, ColorPreset::Blue];

    pub fn color(&self) -> Color {
        match self {
            Self::Red => Color::new(255, 0, 0),
            Self::Green => Color::new(0, 255, 0),
            Self::Blue => Color::new(0, 0, 255),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Red => "RED",
            Self::Green => "GREEN",
            Self::Blue => "BLUE",
        }
    }
}

/// Light modes selectable in the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Firmware-driven color cycling
    Rainbow,
    /// Show the color carried in the packet
    #[default]
    ExplicitColor,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Rainbow, Mode::ExplicitColor];

    /// Identifier handed to the packet encoder
    pub fn id(&self) -> &'static str {
        match self {
            Self::Rainbow => "01",
            Self::ExplicitColor => "02",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Rainbow => "Rainbow mode",
            Self::ExplicitColor => "Pick a color mode",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Scanning,
    Connecting,
    Connected,
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Scanning | Self::Connecting)
    }
}

/// What the user sees about the peripheral we connected to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: String,
    pub address: String,
    pub rssi: Option<i16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSeverity {
    Info,
    Success,
    Warning,
    Error,
}

/// Non-blocking line shown under the connection banner.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub message: String,
    pub severity: MessageSeverity,
}

/// Blocking dialog the user has to acknowledge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub severity: MessageSeverity,
}

impl Alert {
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        severity: MessageSeverity,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity,
        }
    }
}

/// Events flowing from the BLE thread to the UI.
#[derive(Debug, Clone)]
pub enum AppEvent {
    ConnectionStatus(ConnectionStatus),
    Connected(DeviceInfo),
    Alert(Alert),
    LogMessage(StatusMessage),
}

/// Commands flowing from the UI to the BLE thread.
#[derive(Debug, Clone)]
pub enum BluetoothCommand {
    /// Scan for the configured device and connect. Cancelling the token
    /// aborts the scan or an in-flight connect.
    Connect(CancellationToken),
    Send { mode: Mode, color: Color },
    Disconnect,
    Shutdown,
}

/// How the mode identifier becomes the two-character packet prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModePrefixPolicy {
    /// Only "02" keeps its own prefix; everything else, "01" included, is "04".
    /// This is what shipped firmware expects today.
    #[default]
    Observed,
    /// "01" and "02" keep their own prefixes; anything else is "04".
    Distinct,
}

/// What to do with channel values outside `0..=255`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelPolicy {
    /// Zero-pad the decimal text only; wide or negative values widen the packet.
    #[default]
    Pad,
    /// Refuse to encode a packet with an out-of-range channel.
    Reject,
}

/// How an advertised name is compared against the configured pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameMatch {
    #[default]
    Contains,
    Prefix,
    Exact,
}

/// Predicate deciding which advertisement we connect to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceNameFilter {
    pub pattern: String,
    pub kind: NameMatch,
}

impl DeviceNameFilter {
    pub fn new(pattern: impl Into<String>, kind: NameMatch) -> Self {
        Self {
            pattern: pattern.into(),
            kind,
        }
    }

    /// Peripherals that advertise no name never match.
    pub fn matches(&self, name: Option<&str>) -> bool {
        let Some(name) = name else {
            return false;
        };
        match self.kind {
            NameMatch::Contains => name.contains(&self.pattern),
            NameMatch::Prefix => name.starts_with(&self.pattern),
            NameMatch::Exact => name == self.pattern,
        }
    }
}
