use eframe::egui::{vec2, Vec2};
use std::fmt;
use std::time::{Duration, Instant};

/// Contract against the model rendering engine. The controller only ever
/// drives this narrow surface; asset formats and animation blending live on
/// the other side of it.
pub trait RenderEngine: Send {
    fn load_model(&self, surface: &str, asset: &str) -> Result<Box<dyn ModelHandle>, EngineError>;
}

pub trait ModelHandle: Send {
    /// Intrinsic size before scaling.
    fn size(&self) -> Vec2;
    fn set_scale(&mut self, factor: f32);
    fn set_position(&mut self, x: f32, y: f32);
    fn play_motion(&mut self, name: &str);
    fn is_motion_playing(&self) -> bool;
    /// Region names under a point in model coordinates, e.g. "head", "body".
    fn hit_regions_at(&self, point: Vec2) -> Vec<String>;
}

#[derive(Debug)]
pub struct EngineError {
    message: String,
}

impl EngineError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EngineError {}

const MOTION_DURATION: Duration = Duration::from_millis(1200);
const HEAD_FRACTION: f32 = 0.35;

/// Built-in stand-in engine: a vector-drawn character the shell can paint
/// without any asset pipeline. Good enough to exercise the full controller.
pub struct VectorEngine;

impl RenderEngine for VectorEngine {
    fn load_model(&self, _surface: &str, asset: &str) -> Result<Box<dyn ModelHandle>, EngineError> {
        if asset.trim().is_empty() {
            return Err(EngineError::new("empty asset reference"));
        }
        Ok(Box::new(VectorModel::new()))
    }
}

pub struct VectorModel {
    size: Vec2,
    scale: f32,
    position: (f32, f32),
    motion: Option<(String, Instant)>,
}

impl VectorModel {
    fn new() -> Self {
        Self {
            size: vec2(140.0, 200.0),
            scale: 1.0,
            position: (0.0, 0.0),
            motion: None,
        }
    }

    pub fn current_motion(&self) -> Option<&str> {
        match &self.motion {
            Some((name, started)) if started.elapsed() < MOTION_DURATION => Some(name),
            _ => None,
        }
    }
}

impl ModelHandle for VectorModel {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn set_scale(&mut self, factor: f32) {
        self.scale = factor;
    }

    fn set_position(&mut self, x: f32, y: f32) {
        self.position = (x, y);
    }

    fn play_motion(&mut self, name: &str) {
        self.motion = Some((name.to_string(), Instant::now()));
    }

    fn is_motion_playing(&self) -> bool {
        self.current_motion().is_some()
    }

    fn hit_regions_at(&self, point: Vec2) -> Vec<String> {
        let local = point - vec2(self.position.0, self.position.1);
        let extent = self.size * self.scale;
        if local.x < 0.0 || local.y < 0.0 || local.x > extent.x || local.y > extent.y {
            return Vec::new();
        }
        if local.y < extent.y * HEAD_FRACTION {
            vec!["head".to_string()]
        } else {
            vec!["body".to_string()]
        }
    }
}
