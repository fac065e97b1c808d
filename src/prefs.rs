use log::warn;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const KEY_VISIBLE: &str = "mascot";
pub const KEY_ALIGNMENT: &str = "mascot_alignment";
pub const KEY_MODEL: &str = "mascot_model";
pub const KEY_TOUCH_DRAG: &str = "mascot_touch_drag";

/// Raw string-keyed storage. The file backend mirrors the browser-style
/// key/value cache the widget preferences came from; the in-memory backend
/// keeps tests off the filesystem.
pub trait PrefBackend {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&mut self, key: &str, value: &str);
}

#[derive(Debug, Default)]
pub struct MemStore {
    entries: BTreeMap<String, String>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(pairs: &[(&str, &str)]) -> Self {
        let mut store = Self::new();
        for (key, value) in pairs {
            store.entries.insert((*key).to_string(), (*value).to_string());
        }
        store
    }
}

impl PrefBackend for MemStore {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    pub fn open(path: PathBuf) -> Self {
        let entries = match std::fs::File::open(&path) {
            Ok(file) => serde_json::from_reader(file).unwrap_or_else(|_| {
                warn!("Failed to parse preference file, starting clean");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self { path, entries }
    }

    pub fn open_default() -> Option<Self> {
        let dir = crate::config::WidgetConfig::config_dir()?;
        if std::fs::create_dir_all(&dir).is_err() {
            return None;
        }
        Some(Self::open(dir.join("prefs.json")))
    }

    fn persist(&self) {
        // Fire-and-forget: preference persistence is a convenience, not a
        // correctness requirement of the visible widget.
        match std::fs::File::create(&self.path) {
            Ok(file) => {
                if serde_json::to_writer_pretty(file, &self.entries).is_err() {
                    warn!("Failed to serialize preferences");
                }
            }
            Err(err) => warn!("Failed to write preference file: {err}"),
        }
    }
}

impl PrefBackend for FileStore {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist();
    }
}

pub struct PrefStore {
    backend: Box<dyn PrefBackend>,
}

impl PrefStore {
    pub fn new(backend: Box<dyn PrefBackend>) -> Self {
        Self { backend }
    }

    pub fn open_default() -> Self {
        match FileStore::open_default() {
            Some(store) => Self::new(Box::new(store)),
            None => {
                warn!("No config directory available, preferences will not persist");
                Self::new(Box::new(MemStore::new()))
            }
        }
    }

    /// Read-validate-repair. A missing or invalid value is replaced by
    /// `default` and the default is written back, so the invalid state does
    /// not recur on the next read.
    pub fn get(&mut self, key: &str, validator: impl Fn(&str) -> bool, default: &str) -> String {
        match self.backend.read(key) {
            Some(value) if validator(&value) => value,
            _ => {
                self.backend.write(key, default);
                default.to_string()
            }
        }
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.backend.write(key, value);
    }

    /// Unvalidated read, mainly for inspection; callers that need a usable
    /// value go through [`PrefStore::get`].
    pub fn raw(&self, key: &str) -> Option<String> {
        self.backend.read(key)
    }
}
