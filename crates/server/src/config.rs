use std::{env, fs};

use serde::Deserialize;

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// Directory served at the HTTP root, relative to the working directory.
    pub public_dir: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: DEFAULT_PORT,
            public_dir: "public".into(),
        }
    }
}

impl Settings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Defaults, overlaid by an optional `relay.toml`, overlaid by environment
/// variables. `PORT` alone is enough to move the listener.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("relay.toml") {
        if let Ok(file_cfg) = toml::from_str::<Settings>(&raw) {
            settings = file_cfg;
        }
    }

    if let Ok(v) = env::var("HOST") {
        settings.host = v;
    }
    if let Ok(v) = env::var("PORT") {
        if let Ok(parsed) = v.parse::<u16>() {
            settings.port = parsed;
        }
    }
    if let Ok(v) = env::var("PUBLIC_DIR") {
        settings.public_dir = v;
    }

    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
