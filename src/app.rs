mod runtime;
mod style;
mod ui;

use crate::config::WidgetConfig;
use crate::engine::VectorEngine;
use crate::events::{LoadRequest, UserEvent};
use crate::menu::MenuAction;
use crate::prefs::PrefStore;
use crate::widget::{HostContext, WidgetController};
use eframe::egui;
use log::error;
use std::sync::mpsc::{Receiver, Sender};
use std::time::Instant;
use style::MascotTheme;

pub const NARROW_VIEWPORT_WIDTH: f32 = 500.0;

pub struct MascotApp {
    controller: WidgetController,
    rx: Receiver<UserEvent>,
    load_tx: Sender<LoadRequest>,
    theme: MascotTheme,
    hovered_action: Option<MenuAction>,
}

impl MascotApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let config = WidgetConfig::load();
        let prefs = PrefStore::open_default();
        let narrow_viewport = cc.egui_ctx.screen_rect().width() < NARROW_VIEWPORT_WIDTH;

        let night_ctx = cc.egui_ctx.clone();
        let host = HostContext {
            narrow_viewport,
            referrer: std::env::var("MASCOT_REFERRER").ok(),
            night_toggle: Some(Box::new(move || {
                let dark = night_ctx.style().visuals.dark_mode;
                night_ctx.set_visuals(if dark {
                    egui::Visuals::light()
                } else {
                    egui::Visuals::dark()
                });
            })),
        };

        let runtime = runtime::spawn_loader(Box::new(VectorEngine), cc.egui_ctx.clone());
        let controller = WidgetController::new(config, host, prefs, Instant::now());

        Self {
            controller,
            rx: runtime.rx,
            load_tx: runtime.load_tx,
            theme: MascotTheme::default(),
            hovered_action: None,
        }
    }

    fn pump_events(&mut self, now: Instant) {
        while let Ok(event) = self.rx.try_recv() {
            match event {
                UserEvent::ModelReady(result) => self.controller.model_ready(result, now),
            }
        }
        for request in self.controller.take_load_requests() {
            if self.load_tx.send(request).is_err() {
                error!("model loader worker is gone");
            }
        }
    }
}

impl eframe::App for MascotApp {
    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        [0.0, 0.0, 0.0, 0.0]
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.pump_events(now);
        self.controller.tick(now);

        self.draw(ctx, now);

        // Wake up exactly when the next dialog deadline lands.
        if let Some(deadline) = self.controller.dialog().next_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(now));
        }
    }
}
