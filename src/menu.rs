use crate::config::ContentConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Home,
    SwitchSkin,
    Info,
    Night,
    FlipAlignment,
    ToggleTouchDrag,
    Close,
}

/// One menu entry: a glyph for the button, a hover preview, a click effect.
/// Declared once at startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct MenuCommand {
    pub action: MenuAction,
    pub glyph: &'static str,
    pub hover_message: String,
}

pub const DEFAULT_HOME_HOVER: &str = "Click here to go back home!";
pub const DEFAULT_SKIN_HOVER: &str = "Want to see my new outfit?";
pub const DEFAULT_INFO_HOVER: &str = "Curious about this project?";
pub const DEFAULT_NIGHT_HOVER: &str = "Click here at night to rest your eyes";
pub const DEFAULT_FLIP_HOVER: &str = "Click to switch sides~";
pub const DEFAULT_CLOSE_HOVER: &str = "QWQ see you next time~";

/// Build the fixed command table. Entries are gated at construction:
/// `skin` needs more than one model, `night` needs a host callback,
/// `touch` only exists on narrow viewports.
pub fn build_menu(
    content: &ContentConfig,
    model_count: usize,
    has_night_toggle: bool,
    narrow_viewport: bool,
) -> Vec<MenuCommand> {
    let mut commands = vec![MenuCommand {
        action: MenuAction::Home,
        glyph: "H",
        hover_message: content
            .home
            .clone()
            .unwrap_or_else(|| DEFAULT_HOME_HOVER.to_string()),
    }];

    if model_count > 1 {
        commands.push(MenuCommand {
            action: MenuAction::SwitchSkin,
            glyph: "S",
            hover_message: content
                .skin_hover
                .clone()
                .unwrap_or_else(|| DEFAULT_SKIN_HOVER.to_string()),
        });
    }

    commands.push(MenuCommand {
        action: MenuAction::Info,
        glyph: "i",
        hover_message: DEFAULT_INFO_HOVER.to_string(),
    });

    if has_night_toggle {
        commands.push(MenuCommand {
            action: MenuAction::Night,
            glyph: "N",
            hover_message: DEFAULT_NIGHT_HOVER.to_string(),
        });
    }

    commands.push(MenuCommand {
        action: MenuAction::FlipAlignment,
        glyph: "<>",
        hover_message: DEFAULT_FLIP_HOVER.to_string(),
    });

    if narrow_viewport {
        commands.push(MenuCommand {
            action: MenuAction::ToggleTouchDrag,
            glyph: "T",
            // The real hover text depends on the live toggle state; the
            // controller substitutes it on preview.
            hover_message: String::new(),
        });
    }

    commands.push(MenuCommand {
        action: MenuAction::Close,
        glyph: "X",
        hover_message: content
            .close
            .clone()
            .unwrap_or_else(|| DEFAULT_CLOSE_HOVER.to_string()),
    });

    commands
}
