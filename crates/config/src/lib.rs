use serde::Deserialize;
use std::path::PathBuf;

pub mod session;

pub use session::{Gate, Role, Session, authorize};

/// All configuration for the evx client.
///
/// Precedence (lowest to highest): defaults → config file → env var → CLI arg.
/// CLI arg merging is done by the caller after `Config::load()`.
#[derive(Debug, Clone)]
pub struct Config {
    // Remote API
    pub api_url: String,
    pub timeout_secs: u64,

    // Logging
    pub log_level: String,
    pub utc: bool,
}

/// Config file layout (~/.evx/config.toml). All fields optional — they layer
/// on top of compiled-in defaults.
#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    api_url: Option<String>,
    timeout_secs: Option<u64>,
    log_level: Option<String>,
    utc: Option<bool>,
}

impl Config {
    /// Config directory: ~/.evx/
    pub fn dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".evx")
    }

    /// Config file path: ~/.evx/config.toml
    pub fn file_path() -> PathBuf {
        Self::dir().join("config.toml")
    }

    /// Load config: defaults → config file → env vars.
    /// CLI args should be merged by the caller afterward.
    pub fn load() -> Self {
        let mut config = Self::defaults();

        // Layer 2: config file
        if let Ok(contents) = std::fs::read_to_string(Self::file_path()) {
            if let Ok(file) = toml::from_str::<FileConfig>(&contents) {
                config.apply_file(file);
            }
        }

        // Layer 3: environment variables
        config.apply_env();

        config
    }

    // --- Private helpers ---

    fn defaults() -> Self {
        Self {
            api_url: "https://eventx-backend-sxv2.onrender.com".to_string(),
            timeout_secs: 10,
            log_level: "info".to_string(),
            utc: false,
        }
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(v) = file.api_url { self.api_url = v; }
        if let Some(v) = file.timeout_secs { self.timeout_secs = v; }
        if let Some(v) = file.log_level { self.log_level = v; }
        if let Some(v) = file.utc { self.utc = v; }
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("EVX_API_URL") { self.api_url = v; }
        if let Ok(v) = std::env::var("EVX_TIMEOUT_SECS") {
            if let Ok(secs) = v.parse() { self.timeout_secs = secs; }
        }
        if let Ok(v) = std::env::var("EVX_LOG_LEVEL") { self.log_level = v; }
        if let Ok(v) = std::env::var("EVX_UTC") {
            self.utc = v == "1" || v.eq_ignore_ascii_case("true");
        }
    }
}
