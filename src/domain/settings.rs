use crate::domain::models::{ChannelPolicy, ModePrefixPolicy, NameMatch};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogRotation {
    Minutely,
    Hourly,
    #[default]
    Daily,
    Never,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_level")]
    pub level: String, // "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_false")]
    pub file_logging_enabled: bool,
    #[serde(default = "default_true")]
    pub console_logging_enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_prefix")]
    pub file_name_prefix: String,
    #[serde(default = "default_false")]
    pub show_file_line: bool,
    #[serde(default = "default_true")]
    pub show_target: bool,
    #[serde(default = "default_true")]
    pub ansi_colors: bool,
    #[serde(default)]
    pub rotation: LogRotation,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            file_logging_enabled: default_false(),
            console_logging_enabled: default_true(),
            log_dir: default_log_dir(),
            file_name_prefix: default_prefix(),
            show_file_line: default_false(),
            show_target: default_true(),
            ansi_colors: default_true(),
            rotation: LogRotation::default(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_log_dir() -> String {
    "logs".to_string()
}
fn default_prefix() -> String {
    "jake_ble_controller".to_string()
}

/// Application configuration. The mode and color picked on screen are
/// intentionally not part of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // Discovery
    #[serde(default = "default_device_name_pattern")]
    pub device_name_pattern: String,
    #[serde(default)]
    pub name_match: NameMatch,
    #[serde(default = "default_scan_timeout_ms")]
    pub scan_timeout_ms: u64,

    // GATT addresses, must match the peripheral firmware
    #[serde(default = "default_service_uuid")]
    pub ble_service_uuid: String,
    #[serde(default = "default_command_uuid")]
    pub ble_command_char_uuid: String,

    // Packet encoding
    #[serde(default)]
    pub mode_prefix_policy: ModePrefixPolicy,
    #[serde(default)]
    pub channel_policy: ChannelPolicy,

    #[serde(default)]
    pub log_settings: LogSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            device_name_pattern: default_device_name_pattern(),
            name_match: NameMatch::default(),
            scan_timeout_ms: default_scan_timeout_ms(),
            ble_service_uuid: default_service_uuid(),
            ble_command_char_uuid: default_command_uuid(),
            mode_prefix_policy: ModePrefixPolicy::default(),
            channel_policy: ChannelPolicy::default(),
            log_settings: LogSettings::default(),
        }
    }
}

fn default_device_name_pattern() -> String {
    "Jake".to_string()
}
fn default_scan_timeout_ms() -> u64 {
    10_000
}
fn default_service_uuid() -> String {
    "71c46861-691a-4b1e-9ddb-d722fa9ad632".to_string()
}
fn default_command_uuid() -> String {
    "71c46862-691a-4b1e-9ddb-d722fa9ad632".to_string()
}

pub struct SettingsService {
    settings: Settings,
    settings_path: PathBuf,
}

impl SettingsService {
    pub fn new() -> anyhow::Result<Self> {
        let settings_path = Self::get_settings_path()?;
        Ok(Self::at_path(settings_path))
    }

    /// Load from an explicit file; a missing or malformed file yields defaults.
    pub fn at_path(settings_path: PathBuf) -> Self {
        let settings = match Self::load_from_file(&settings_path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::debug!(
                    "Using default settings ({}): {}",
                    settings_path.display(),
                    e
                );
                Settings::default()
            }
        };

        Self {
            settings,
            settings_path,
        }
    }

    fn get_settings_path() -> anyhow::Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        path.push("JakeBleController");
        path.push("settings.json");
        Ok(path)
    }

    fn load_from_file(path: &Path) -> anyhow::Result<Settings> {
        let contents = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&contents)?;
        Ok(settings)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(dir) = self.settings_path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(&self.settings)?;
        fs::write(&self.settings_path, json)?;
        Ok(())
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    pub fn get_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.device_name_pattern, "Jake");
        assert_eq!(settings.name_match, NameMatch::Contains);
        assert_eq!(settings.scan_timeout_ms, 10_000);
        assert_eq!(settings.mode_prefix_policy, ModePrefixPolicy::Observed);
        assert_eq!(settings.channel_policy, ChannelPolicy::Pad);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "scan_timeout_ms": 2500, "name_match": "exact" }"#).unwrap();
        assert_eq!(settings.scan_timeout_ms, 2500);
        assert_eq!(settings.name_match, NameMatch::Exact);
        assert_eq!(settings.ble_service_uuid, default_service_uuid());
        assert_eq!(settings.log_settings.rotation, LogRotation::Daily);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let service = SettingsService::at_path(dir.path().join("absent.json"));
        assert_eq!(service.get().device_name_pattern, "Jake");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut service = SettingsService::at_path(path.clone());
        service.get_mut().device_name_pattern = "Lamp".to_string();
        service.get_mut().channel_policy = ChannelPolicy::Reject;
        service.save().unwrap();

        let reloaded = SettingsService::at_path(path);
        assert_eq!(reloaded.get().device_name_pattern, "Lamp");
        assert_eq!(reloaded.get().channel_policy, ChannelPolicy::Reject);
    }
}
