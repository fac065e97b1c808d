#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]

mod app;
mod branding;
mod config;
mod dialog;
mod drag;
mod engine;
mod events;
mod menu;
mod prefs;
mod widget;

use crate::app::MascotApp;
use crate::branding::APP_DISPLAY_NAME;
use eframe::egui;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_maximized(true)
            .with_decorations(false)
            .with_transparent(true)
            .with_always_on_top()
            .with_taskbar(false)
            .with_visible(true),
        ..Default::default()
    };

    eframe::run_native(
        APP_DISPLAY_NAME,
        options,
        Box::new(|cc| Ok(Box::new(MascotApp::new(cc)))),
    )
}
