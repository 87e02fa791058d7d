mod domain;
mod infrastructure;
mod presentation;

use eframe::egui;
use presentation::app::ControllerApp;

fn main() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([520.0, 640.0])
            .with_title("Jake BLE Controller"),
        ..Default::default()
    };

    eframe::run_native(
        "Jake BLE Controller",
        options,
        Box::new(|cc| Ok(Box::new(ControllerApp::new(cc)))),
    )
}
