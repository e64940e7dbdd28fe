use std::{collections::HashMap, fs, path::Path};

pub const DEFAULT_CONFIG_PATH: &str = "orders_console.toml";
const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:80";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.into(),
            log_filter: "info".into(),
        }
    }
}

pub fn load_settings(path: &Path) -> Settings {
    let raw = fs::read_to_string(path).ok();
    settings_from_sources(raw.as_deref(), |key| std::env::var(key).ok())
}

/// Defaults, then the config file, then environment variables; later sources
/// win.
pub fn settings_from_sources(
    file_contents: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file_contents {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) {
            if let Some(v) = file_cfg.get("server_url") {
                settings.server_url = v.clone();
            }
            if let Some(v) = file_cfg.get("log_filter") {
                settings.log_filter = v.clone();
            }
        }
    }

    if let Some(v) = env("ORDERS_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = env("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = env("ORDERS_LOG") {
        settings.log_filter = v;
    }
    if let Some(v) = env("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    settings.server_url = normalize_server_url(&settings.server_url);
    if settings.log_filter.trim().is_empty() {
        settings.log_filter = Settings::default().log_filter;
    }
    settings
}

pub fn normalize_server_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Settings::default().server_url;
    }
    trimmed.to_string()
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
