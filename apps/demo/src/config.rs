use std::{fs, time::Duration};

use nav_core::HandlerConfig;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log_filter: String,
    pub inter_message_delay_ms: u64,
    pub safety_restart_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_filter: "info".into(),
            inter_message_delay_ms: 0,
            safety_restart_ms: 3_000,
        }
    }
}

impl Settings {
    pub fn handler_config(&self) -> HandlerConfig {
        HandlerConfig {
            inter_message_delay: Duration::from_millis(self.inter_message_delay_ms),
            safety_restart_delay: Duration::from_millis(self.safety_restart_ms),
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("nav_demo.toml") {
        match toml::from_str::<Settings>(&raw) {
            Ok(file_settings) => settings = file_settings,
            Err(err) => eprintln!("ignoring malformed nav_demo.toml: {err}"),
        }
    }

    if let Ok(v) = std::env::var("NAV_DEMO__LOG_FILTER") {
        settings.log_filter = v;
    }
    if let Ok(v) = std::env::var("NAV_DEMO__INTER_MESSAGE_DELAY_MS") {
        if let Ok(parsed) = v.parse() {
            settings.inter_message_delay_ms = parsed;
        }
    }
    if let Ok(v) = std::env::var("NAV_DEMO__SAFETY_RESTART_MS") {
        if let Ok(parsed) = v.parse() {
            settings.safety_restart_ms = parsed;
        }
    }

    settings
}
