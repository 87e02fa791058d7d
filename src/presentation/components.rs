use crate::domain::models::Alert;
use crate::presentation::theme;
use eframe::egui;

pub struct Components;

impl Components {
    pub fn heading(ui: &mut egui::Ui, text: &str) {
        ui.label(egui::RichText::new(text).heading().strong());
    }

    pub fn card<R>(
        ui: &mut egui::Ui,
        title: &str,
        add_contents: impl FnOnce(&mut egui::Ui) -> R,
    ) -> R {
        let stroke = ui.style().visuals.widgets.noninteractive.bg_stroke;
        let bg = ui.style().visuals.widgets.noninteractive.bg_fill;

        egui::Frame::none()
            .inner_margin(egui::Margin::same(14.0))
            .stroke(stroke)
            .fill(bg)
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.label(egui::RichText::new(title).strong().size(18.0));
                    ui.add_space(6.0);
                    add_contents(ui)
                })
                .inner
            })
            .inner
    }

    pub fn status_banner(
        ui: &mut egui::Ui,
        text: &str,
        bg_color: egui::Color32,
        text_color: egui::Color32,
    ) {
        ui.add_sized(
            [ui.available_width(), 35.0],
            egui::Label::new(
                egui::RichText::new(text)
                    .color(text_color)
                    .background_color(bg_color)
                    .size(16.0)
                    .strong(),
            )
            .wrap_mode(egui::TextWrapMode::Extend),
        );
    }

    /// Filled button with a border, used for the color presets.
    pub fn swatch_button(
        ui: &mut egui::Ui,
        label: &str,
        fill: egui::Color32,
        selected: bool,
    ) -> egui::Response {
        let stroke_width = if selected { 4.0 } else { 2.0 };
        let stroke = ui.style().visuals.widgets.inactive.bg_stroke.color;
        ui.add(
            egui::Button::new(
                egui::RichText::new(label)
                    .strong()
                    .color(egui::Color32::WHITE),
            )
            .fill(fill)
            .stroke(egui::Stroke::new(stroke_width, stroke))
            .min_size(egui::vec2(90.0, 40.0)),
        )
    }

    /// Modal dialog for an alert. Returns true once the user acknowledges it.
    pub fn alert_dialog(ctx: &egui::Context, alert: &Alert) -> bool {
        let mut acknowledged = false;
        egui::Window::new(egui::RichText::new(&alert.title).strong())
            .id(egui::Id::new("alert_dialog"))
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.set_min_width(260.0);
                let color = theme::severity_color(alert.severity);
                ui.label(egui::RichText::new(&alert.message).color(color));
                ui.add_space(8.0);
                ui.vertical_centered(|ui| {
                    if ui.button("OK").clicked() {
                        acknowledged = true;
                    }
                });
            });
        acknowledged
    }
}
