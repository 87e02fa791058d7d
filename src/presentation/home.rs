use crate::domain::models::{BluetoothCommand, ColorPreset, ConnectionStatus, Mode};
use crate::presentation::app::ControllerApp;
use crate::presentation::components::Components;
use crate::presentation::theme;
use eframe::egui;

pub fn render(app: &mut ControllerApp, ui: &mut egui::Ui) {
    Components::heading(ui, "Jake BLE Controller");
    ui.add_space(20.0);

    ui_connection_panel(app, ui);
    ui.add_space(15.0);

    if app.state.connection_status.is_connected() {
        ui_light_panel(app, ui);
        ui.add_space(15.0);
    }

    ui_status_panel(app, ui);
    ui.add_space(15.0);

    ui_settings_panel(app, ui);
}

fn ui_connection_panel(app: &mut ControllerApp, ui: &mut egui::Ui) {
    Components::card(ui, "Connection", |ui| {
        let (text, bg, fg) = theme::status_colors(app.state.connection_status);
        Components::status_banner(ui, text, bg, fg);
        ui.add_space(8.0);

        match app.state.connection_status {
            ConnectionStatus::Disconnected => {
                if ui.button("Scan and connect").clicked() {
                    if let Some(command) = app.state.connect() {
                        app.send_command(command);
                    }
                }
            }
            ConnectionStatus::Scanning | ConnectionStatus::Connecting => {
                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        app.state.cancel_connect();
                    }
                    ui.spinner();
                });
            }
            ConnectionStatus::Connected => {
                if let Some(device) = &app.state.device {
                    ui.label(format!("Device: {} ({})", device.name, device.address));
                    if let Some(rssi) = device.rssi {
                        ui.label(format!("Signal: {} dBm", rssi));
                    }
                }
                if ui.button("Disconnect").clicked() {
                    app.send_command(BluetoothCommand::Disconnect);
                }
            }
        }
    });
}

fn ui_light_panel(app: &mut ControllerApp, ui: &mut egui::Ui) {
    Components::card(ui, "Light", |ui| {
        ui.horizontal(|ui| {
            ui.label("Mode:");
            egui::ComboBox::from_id_salt("mode_picker")
                .selected_text(app.state.mode.label())
                .show_ui(ui, |ui| {
                    for mode in Mode::ALL {
                        ui.selectable_value(&mut app.state.mode, mode, mode.label());
                    }
                });
        });

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            for preset in ColorPreset::ALL {
                let selected = app.state.color == preset.color();
                let fill = theme::preset_color(preset);
                if Components::swatch_button(ui, preset.label(), fill, selected).clicked() {
                    app.state.select_preset(preset);
                }
            }
        });

        let color = app.state.color;
        ui.label(format!("Selected color: R {} G {} B {}", color.r, color.g, color.b));

        ui.add_space(6.0);
        if ui.button("Send").clicked() {
            let command = app.state.send();
            app.send_command(command);
        }
    });
}

fn ui_status_panel(app: &mut ControllerApp, ui: &mut egui::Ui) {
    if let Some(msg) = &app.state.status_message {
        Components::card(ui, "Status", |ui| {
            ui.label(
                egui::RichText::new(&msg.message)
                    .color(theme::severity_color(msg.severity))
                    .strong(),
            );
        });
    }
}

fn ui_settings_panel(app: &mut ControllerApp, ui: &mut egui::Ui) {
    egui::CollapsingHeader::new("Settings")
        .id_salt("settings_panel")
        .show(ui, |ui| {
            egui::Grid::new("settings_grid")
                .num_columns(2)
                .spacing([30.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Device name:");
                    ui.text_edit_singleline(&mut app.name_pattern_input);
                    ui.end_row();

                    ui.label("Scan timeout:");
                    ui.add(
                        egui::Slider::new(&mut app.scan_timeout_input, 1_000..=60_000)
                            .suffix(" ms"),
                    );
                    ui.end_row();
                });

            ui.label(
                egui::RichText::new("Changes apply to the next connection attempt.").small(),
            );
            if ui.button("Save").clicked() {
                app.save_settings();
            }
        });
}
