use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Static,
    Fixed,
    Draggable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Right,
}

impl Alignment {
    pub fn flipped(self) -> Self {
        match self {
            Alignment::Left => Alignment::Right,
            Alignment::Right => Alignment::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Right => "right",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "left" => Some(Alignment::Left),
            "right" => Some(Alignment::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelEntry {
    pub name: String,
    pub asset: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TouchReaction {
    pub text: String,
    #[serde(default)]
    pub motion: Option<String>,
}

impl TouchReaction {
    pub fn text_only<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            motion: None,
        }
    }
}

/// Per-model script looked up by model name once per load-complete event.
/// Adding a model is a pure data change, never a new code branch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelCustomization {
    pub name: String,
    #[serde(default)]
    pub confirmation: Option<String>,
    #[serde(default)]
    pub interactions: Vec<TouchReaction>,
    #[serde(default)]
    pub on_load_motion: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ContentConfig {
    #[serde(default)]
    pub welcome: Vec<String>,
    #[serde(default)]
    pub touch: Vec<String>,
    #[serde(default)]
    pub skin_hover: Option<String>,
    #[serde(default)]
    pub skin_done: Option<String>,
    #[serde(default)]
    pub home: Option<String>,
    #[serde(default)]
    pub close: Option<String>,
    /// Referrer welcome template; `%t` is replaced with the referring host.
    #[serde(default)]
    pub referrer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WidgetConfig {
    #[serde(default = "default_mode")]
    pub mode: RunMode,
    #[serde(default = "default_models")]
    pub models: Vec<ModelEntry>,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default = "default_alignment")]
    pub default_alignment: Alignment,
    #[serde(default)]
    pub customizations: Vec<ModelCustomization>,
    #[serde(default = "default_home_url")]
    pub home_url: String,
    #[serde(default = "default_info_url")]
    pub info_url: String,
}

fn default_mode() -> RunMode {
    RunMode::Draggable
}

fn default_alignment() -> Alignment {
    Alignment::Right
}

fn default_home_url() -> String {
    "https://example.com/".to_string()
}

fn default_info_url() -> String {
    "https://example.com/about".to_string()
}

fn default_models() -> Vec<ModelEntry> {
    vec![
        ModelEntry {
            name: "momo".to_string(),
            asset: "models/momo/momo.model.json".to_string(),
        },
        ModelEntry {
            name: "kiki".to_string(),
            asset: "models/kiki/kiki.model.json".to_string(),
        },
        ModelEntry {
            name: "nana".to_string(),
            asset: "models/nana/nana.model.json".to_string(),
        },
    ]
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            models: default_models(),
            content: ContentConfig::default(),
            default_alignment: default_alignment(),
            customizations: vec![
                ModelCustomization {
                    name: "momo".to_string(),
                    confirmation: Some("Momo here! Thanks for picking me~".to_string()),
                    interactions: vec![
                        TouchReaction {
                            text: "Did something break?".to_string(),
                            motion: Some("bug".to_string()),
                        },
                        TouchReaction {
                            text: "Wink~".to_string(),
                            motion: Some("wink".to_string()),
                        },
                    ],
                    on_load_motion: Some("greet".to_string()),
                },
                ModelCustomization {
                    name: "kiki".to_string(),
                    confirmation: Some("Kiki reporting in! Where are we headed?".to_string()),
                    interactions: Vec::new(),
                    on_load_motion: None,
                },
            ],
            home_url: default_home_url(),
            info_url: default_info_url(),
        }
    }
}

impl WidgetConfig {
    pub fn config_dir() -> Option<std::path::PathBuf> {
        directories::ProjectDirs::from("com", "mascot_widget", "mascot_widget")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    pub fn load() -> Self {
        if let Some(config_dir) = Self::config_dir() {
            let config_path = config_dir.join("widget.json");
            if config_path.exists() {
                if let Ok(file) = std::fs::File::open(config_path) {
                    if let Ok(config) = serde_json::from_reader(file) {
                        return config;
                    } else {
                        warn!("Failed to parse widget config, using default");
                    }
                }
            }
        }
        Self::default()
    }

    pub fn customization_for(&self, model_name: &str) -> Option<&ModelCustomization> {
        self.customizations.iter().find(|c| c.name == model_name)
    }
}
