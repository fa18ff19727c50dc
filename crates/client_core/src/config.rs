use std::{collections::HashMap, fs, path::Path};

use serde::Deserialize;

pub const DEFAULT_SIGN_UP_REDIRECT_URL: &str = "http://localhost:8080/signup/redirect";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
pub const SETTINGS_FILE: &str = "portal.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSettings {
    pub sign_up_redirect_url: String,
    pub api_base_url: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            sign_up_redirect_url: DEFAULT_SIGN_UP_REDIRECT_URL.into(),
            api_base_url: DEFAULT_API_BASE_URL.into(),
        }
    }
}

pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Layers `portal.toml` (if readable) and then environment overrides on top of
/// the defaults. Later sources win.
pub fn load_settings_from(file: &Path, env: impl Fn(&str) -> Option<String>) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(file) {
        match toml::from_str::<HashMap<String, String>>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("sign_up_redirect_url") {
                    settings.sign_up_redirect_url = v.clone();
                }
                if let Some(v) = file_cfg.get("api_base_url") {
                    settings.api_base_url = v.clone();
                }
            }
            Err(err) => {
                tracing::warn!(path = %file.display(), "ignoring unreadable settings file: {err}");
            }
        }
    }

    if let Some(v) = env("SIGN_UP_REDIRECT_URL") {
        settings.sign_up_redirect_url = v;
    }
    if let Some(v) = env("APP__SIGN_UP_REDIRECT_URL") {
        settings.sign_up_redirect_url = v;
    }

    if let Some(v) = env("API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    settings
}
