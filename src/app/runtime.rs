use crate::engine::RenderEngine;
use crate::events::{LoadRequest, ModelResult, UserEvent};
use eframe::egui;
use log::{error, info};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

pub struct RuntimeHandles {
    pub rx: Receiver<UserEvent>,
    pub load_tx: Sender<LoadRequest>,
}

/// Model loads run off the UI thread; each request gets exactly one
/// completion event, success or not, and a repaint to deliver it.
pub fn spawn_loader(engine: Box<dyn RenderEngine>, ctx: egui::Context) -> RuntimeHandles {
    let (load_tx, load_rx) = mpsc::channel::<LoadRequest>();
    let (ui_tx, ui_rx) = mpsc::channel::<UserEvent>();

    thread::spawn(move || {
        while let Ok(request) = load_rx.recv() {
            let handle = match engine.load_model(&request.surface, &request.asset) {
                Ok(handle) => {
                    info!("model loaded: {}", request.name);
                    Some(handle)
                }
                Err(err) => {
                    error!("failed to load model {}: {err}", request.name);
                    None
                }
            };
            let _ = ui_tx.send(UserEvent::ModelReady(ModelResult {
                model_index: request.model_index,
                name: request.name,
                handle,
            }));
            ctx.request_repaint();
        }
    });

    RuntimeHandles { rx: ui_rx, load_tx }
}
