use crate::domain::models::{Alert, AppEvent, BluetoothCommand, MessageSeverity, StatusMessage};
use crate::domain::settings::SettingsService;
use crate::infrastructure::bluetooth::run_host_service;
use crate::infrastructure::logging::{init_logger, LoggingGuard};
use crate::presentation::components::Components;
use crate::presentation::state::ScreenState;
use crate::presentation::{home, theme};
use eframe::egui;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};

pub struct ControllerApp {
    pub(crate) settings: Arc<Mutex<SettingsService>>,

    // Bluetooth
    pub(crate) bluetooth_tx: mpsc::UnboundedSender<BluetoothCommand>,
    pub(crate) event_rx: mpsc::UnboundedReceiver<AppEvent>,

    pub(crate) state: ScreenState,

    // Editable copies of the settings shown in the settings panel
    pub(crate) name_pattern_input: String,
    pub(crate) scan_timeout_input: u64,

    pub(crate) is_dark_mode: bool,

    _logging_guard: Option<LoggingGuard>,
}

impl ControllerApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        theme::apply_theme(&cc.egui_ctx, false);

        let settings_service = SettingsService::new().unwrap_or_else(|e| {
            eprintln!("Failed to locate settings directory: {}", e);
            SettingsService::at_path(PathBuf::from("settings.json"))
        });

        let logging_guard = init_logger(&settings_service.get().log_settings)
            .map_err(|e| eprintln!("Failed to initialize logging: {}", e))
            .ok();

        info!("Starting Jake BLE Controller");

        let name_pattern_input = settings_service.get().device_name_pattern.clone();
        let scan_timeout_input = settings_service.get().scan_timeout_ms;

        let settings = Arc::new(Mutex::new(settings_service));
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (bt_cmd_tx, bt_cmd_rx) = mpsc::unbounded_channel();
        let bt_settings = settings.clone();

        std::thread::spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    error!("Failed to create tokio runtime for Bluetooth: {}", e);
                    let _ = event_tx.send(AppEvent::Alert(Alert::new(
                        "Bluetooth unavailable",
                        e.to_string(),
                        MessageSeverity::Error,
                    )));
                    return;
                }
            };
            rt.block_on(run_host_service(bt_settings, event_tx, bt_cmd_rx));
        });

        Self {
            settings,
            bluetooth_tx: bt_cmd_tx,
            event_rx,
            state: ScreenState::default(),
            name_pattern_input,
            scan_timeout_input,
            is_dark_mode: false,
            _logging_guard: logging_guard,
        }
    }

    pub(crate) fn send_command(&self, command: BluetoothCommand) {
        if self.bluetooth_tx.send(command).is_err() {
            error!("Bluetooth thread is gone");
        }
    }

    /// Write the settings panel inputs back to disk.
    pub(crate) fn save_settings(&mut self) {
        let result = match self.settings.lock() {
            Ok(mut settings) => {
                let current = settings.get_mut();
                current.device_name_pattern = self.name_pattern_input.trim().to_string();
                current.scan_timeout_ms = self.scan_timeout_input;
                settings.save()
            }
            Err(_) => Err(anyhow::anyhow!("Lock error")),
        };

        self.state.status_message = Some(match result {
            Ok(()) => StatusMessage {
                message: "Settings saved".to_string(),
                severity: MessageSeverity::Success,
            },
            Err(e) => {
                error!("Failed to save settings: {}", e);
                StatusMessage {
                    message: format!("Failed to save settings: {}", e),
                    severity: MessageSeverity::Error,
                }
            }
        });
    }
}

impl eframe::App for ControllerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.state.apply(event);
        }

        if self.state.connection_status.is_busy() {
            ctx.request_repaint();
        } else {
            ctx.request_repaint_after(Duration::from_millis(200));
        }

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.label(egui::RichText::new("Jake BLE Controller").strong());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let switch_icon = if self.is_dark_mode {
                        "☀ Light"
                    } else {
                        "🌙 Dark"
                    };
                    if ui.button(switch_icon).clicked() {
                        self.is_dark_mode = !self.is_dark_mode;
                        theme::apply_theme(ctx, self.is_dark_mode);
                    }
                });
            });
        });

        let blocked = self.state.is_blocked();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(!blocked, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.set_max_width(640.0);
                        ui.add_space(20.0);
                        home::render(self, ui);
                        ui.add_space(40.0);
                    });
                });
            });
        });

        if let Some(alert) = self.state.current_alert() {
            if Components::alert_dialog(ctx, alert) {
                self.state.dismiss_alert();
            }
        }
    }
}

impl Drop for ControllerApp {
    fn drop(&mut self) {
        self.state.cancel_connect();
        let _ = self.bluetooth_tx.send(BluetoothCommand::Shutdown);
    }
}
