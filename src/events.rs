use crate::engine::ModelHandle;

pub enum UserEvent {
    ModelReady(ModelResult),
}

pub struct LoadRequest {
    pub surface: String,
    pub model_index: usize,
    pub name: String,
    pub asset: String,
}

pub struct ModelResult {
    pub model_index: usize,
    pub name: String,
    pub handle: Option<Box<dyn ModelHandle>>,
}
