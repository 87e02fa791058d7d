use crate::domain::models::{ColorPreset, ConnectionStatus, MessageSeverity};
use eframe::egui::{self, Color32};

pub struct Palette {
    pub bg: Color32,
    pub fg: Color32,
    pub stroke: Color32,
    pub highlight: Color32,
    pub pressed: Color32,
    pub selection: Color32,
}

impl Palette {
    pub fn new(is_dark: bool) -> Self {
        if is_dark {
            Self {
                bg: Color32::from_rgb(22, 22, 26),
                fg: Color32::from_gray(235),
                stroke: Color32::from_gray(235),
                highlight: Color32::from_rgb(255, 196, 0),
                pressed: Color32::from_rgb(0, 230, 140),
                selection: Color32::from_rgb(0, 190, 255),
            }
        } else {
            Self {
                bg: Color32::from_rgb(246, 244, 240),
                fg: Color32::BLACK,
                stroke: Color32::BLACK,
                highlight: Color32::from_rgb(255, 214, 0),
                pressed: Color32::from_rgb(0, 235, 120),
                selection: Color32::from_rgb(0, 180, 250),
            }
        }
    }
}

/// Banner text and colors for a connection state.
pub fn status_colors(status: ConnectionStatus) -> (&'static str, Color32, Color32) {
    match status {
        ConnectionStatus::Connected => ("CONNECTED", Color32::from_rgb(0, 200, 0), Color32::BLACK),
        ConnectionStatus::Connecting => (
            "CONNECTING...",
            Color32::from_rgb(255, 200, 0),
            Color32::BLACK,
        ),
        ConnectionStatus::Scanning => (
            "SCANNING...",
            Color32::from_rgb(0, 200, 255),
            Color32::BLACK,
        ),
        ConnectionStatus::Disconnected => {
            ("DISCONNECTED", Color32::from_gray(100), Color32::WHITE)
        }
    }
}

pub fn severity_color(severity: MessageSeverity) -> Color32 {
    match severity {
        MessageSeverity::Info => Color32::from_rgb(40, 90, 220),
        MessageSeverity::Success => Color32::from_rgb(0, 150, 0),
        MessageSeverity::Warning => Color32::from_rgb(200, 150, 0),
        MessageSeverity::Error => Color32::from_rgb(220, 40, 40),
    }
}

pub fn preset_color(preset: ColorPreset) -> Color32 {
    let color = preset.color();
    let channel = |v: i32| v.clamp(0, 255) as u8;
    Color32::from_rgb(channel(color.r), channel(color.g), channel(color.b))
}

pub fn apply_theme(ctx: &egui::Context, is_dark: bool) {
    let mut style = (*ctx.style()).clone();
    let palette = Palette::new(is_dark);

    for (text_style, font_id) in style.text_styles.iter_mut() {
        font_id.size = match text_style {
            egui::TextStyle::Heading => 26.0,
            egui::TextStyle::Body | egui::TextStyle::Button => 15.0,
            _ => font_id.size,
        };
    }

    style.spacing.item_spacing = egui::vec2(10.0, 10.0);
    style.spacing.button_padding = egui::vec2(14.0, 8.0);

    let widgets = &mut style.visuals.widgets;
    for visuals in [
        &mut widgets.noninteractive,
        &mut widgets.inactive,
        &mut widgets.hovered,
        &mut widgets.active,
    ] {
        visuals.rounding = egui::Rounding::ZERO;
        visuals.bg_stroke = egui::Stroke::new(2.0, palette.stroke);
        visuals.fg_stroke = egui::Stroke::new(1.0, palette.fg);
    }
    widgets.noninteractive.bg_fill = palette.bg;
    widgets.inactive.bg_fill = if is_dark {
        Color32::from_gray(34)
    } else {
        Color32::WHITE
    };
    widgets.hovered.bg_fill = palette.highlight;
    widgets.hovered.fg_stroke = egui::Stroke::new(1.0, Color32::BLACK);
    widgets.hovered.expansion = 1.5;
    widgets.active.bg_fill = palette.pressed;
    widgets.active.bg_stroke = egui::Stroke::new(3.0, palette.stroke);
    widgets.active.fg_stroke = egui::Stroke::new(1.0, Color32::BLACK);

    style.visuals.selection.bg_fill = palette.selection;
    style.visuals.selection.stroke = egui::Stroke::new(1.0, palette.stroke);

    style.visuals.window_rounding = egui::Rounding::ZERO;
    style.visuals.window_stroke = egui::Stroke::new(2.0, palette.stroke);
    style.visuals.window_shadow = egui::Shadow {
        offset: egui::vec2(6.0, 6.0),
        blur: 0.0,
        spread: 0.0,
        color: palette.stroke,
    };
    style.visuals.window_fill = palette.bg;
    style.visuals.panel_fill = palette.bg;
    style.visuals.override_text_color = Some(palette.fg);

    ctx.set_style(style);
}
