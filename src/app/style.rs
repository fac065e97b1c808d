use eframe::egui::Color32;

pub const WIDGET_WIDTH: f32 = 140.0;
pub const WIDGET_HEIGHT: f32 = 200.0;
pub const WAKE_DIAMETER: f32 = 44.0;
pub const BUBBLE_WIDTH: f32 = 190.0;
pub const BUBBLE_PADDING: f32 = 10.0;
pub const MENU_BUTTON_SIZE: f32 = 24.0;
pub const MENU_GAP: f32 = 6.0;

#[derive(Clone, Copy)]
pub struct MascotTheme {
    pub bubble_bg: Color32,
    pub bubble_border: Color32,
    pub bubble_text: Color32,
    pub menu_bg: Color32,
    pub menu_hover: Color32,
    pub menu_text: Color32,
    pub wake_bg: Color32,
    pub wake_ring: Color32,
    pub outline: Color32,
    pub face: Color32,
    pub loading: Color32,
}

impl Default for MascotTheme {
    fn default() -> Self {
        Self {
            bubble_bg: Color32::from_rgba_premultiplied(252, 252, 255, 240),
            bubble_border: Color32::from_rgba_premultiplied(150, 160, 190, 110),
            bubble_text: Color32::from_rgb(40, 44, 58),
            menu_bg: Color32::from_rgba_premultiplied(28, 34, 48, 190),
            menu_hover: Color32::from_rgba_premultiplied(55, 70, 95, 220),
            menu_text: Color32::from_rgb(235, 240, 250),
            wake_bg: Color32::from_rgba_premultiplied(103, 58, 183, 230),
            wake_ring: Color32::from_rgba_premultiplied(240, 235, 255, 160),
            outline: Color32::from_rgba_premultiplied(30, 30, 40, 160),
            face: Color32::from_rgb(35, 32, 40),
            loading: Color32::from_rgba_premultiplied(120, 120, 130, 150),
        }
    }
}

const TINTS: [Color32; 6] = [
    Color32::from_rgb(244, 162, 189),
    Color32::from_rgb(144, 190, 235),
    Color32::from_rgb(250, 208, 137),
    Color32::from_rgb(162, 218, 166),
    Color32::from_rgb(200, 168, 232),
    Color32::from_rgb(240, 180, 150),
];

/// Stable per-model body tint so skin switches read visually.
pub fn model_tint(name: &str) -> Color32 {
    let mut hash = 0usize;
    for byte in name.bytes() {
        hash = hash.wrapping_mul(31).wrapping_add(byte as usize);
    }
    TINTS[hash % TINTS.len()]
}
