//! Layered settings loading.

mod settings;

pub use settings::{ENV_PREFIX, SETTINGS_FILE, Settings, SettingsError};
