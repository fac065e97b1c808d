pub const APP_DISPLAY_NAME: &str = "Mascot Widget";
pub const SURFACE_ID: &str = "mascot-surface";
