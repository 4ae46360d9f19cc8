use std::{collections::HashMap, fs, net::SocketAddr, time::Duration};

use anyhow::{bail, Context};
use intake_core::WebhookEndpoints;
use reference::gviz_csv_url;
use serde::Deserialize;
use url::Url;

pub const SETTINGS_FILE: &str = "server.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub server_bind: String,
    pub sheet_id: String,
    pub sheet_name: String,
    pub reference_csv_url: Option<String>,
    pub upload_webhook_url: String,
    pub append_webhook_url: String,
    pub http_timeout_seconds: Option<u64>,
    pub max_body_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8080".into(),
            sheet_id: String::new(),
            sheet_name: "Master".into(),
            reference_csv_url: None,
            upload_webhook_url: String::new(),
            append_webhook_url: String::new(),
            http_timeout_seconds: None,
            max_body_bytes: 64 * 1024 * 1024,
        }
    }
}

/// Settings after validation, ready for wiring.
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    pub bind_addr: SocketAddr,
    pub reference_url: Url,
    pub webhooks: WebhookEndpoints,
    pub http_timeout: Option<Duration>,
    pub max_body_bytes: usize,
}

pub fn load_settings() -> Settings {
    let file = fs::read_to_string(SETTINGS_FILE).ok();
    load_settings_from(file.as_deref(), |key| std::env::var(key).ok())
}

/// Defaults, then `server.toml`, then `INTAKE_*` and `APP__*` variables.
pub fn load_settings_from(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, toml::Value>>(raw) {
            for (key, value) in file_cfg {
                let value = match value {
                    toml::Value::String(text) => text,
                    other => other.to_string(),
                };
                settings.apply(&key, value);
            }
        }
    }

    for key in Settings::KEYS {
        let upper = key.to_ascii_uppercase();
        if let Some(v) = env(&format!("INTAKE_{upper}")) {
            settings.apply(key, v);
        }
        if let Some(v) = env(&format!("APP__{upper}")) {
            settings.apply(key, v);
        }
    }

    settings
}

impl Settings {
    const KEYS: [&'static str; 8] = [
        "bind_addr",
        "sheet_id",
        "sheet_name",
        "reference_csv_url",
        "upload_webhook_url",
        "append_webhook_url",
        "http_timeout_seconds",
        "max_body_bytes",
    ];

    fn apply(&mut self, key: &str, value: String) {
        match key {
            "bind_addr" => self.server_bind = value,
            "sheet_id" => self.sheet_id = value,
            "sheet_name" => self.sheet_name = value,
            "reference_csv_url" => self.reference_csv_url = Some(value),
            "upload_webhook_url" => self.upload_webhook_url = value,
            "append_webhook_url" => self.append_webhook_url = value,
            "http_timeout_seconds" => {
                if let Ok(parsed) = value.parse::<u64>() {
                    self.http_timeout_seconds = Some(parsed);
                }
            }
            "max_body_bytes" => {
                if let Ok(parsed) = value.parse::<usize>() {
                    self.max_body_bytes = parsed;
                }
            }
            _ => {}
        }
    }

    pub fn resolve(&self) -> anyhow::Result<ResolvedSettings> {
        let bind_addr: SocketAddr = self
            .server_bind
            .parse()
            .with_context(|| format!("invalid bind_addr '{}'", self.server_bind))?;

        let reference_url = match self.reference_csv_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => parse_url("reference_csv_url", url)?,
            _ => {
                if self.sheet_id.trim().is_empty() {
                    bail!("either sheet_id or reference_csv_url must be configured");
                }
                gviz_csv_url(self.sheet_id.trim(), self.sheet_name.trim())
                    .context("failed to build reference csv url from sheet_id")?
            }
        };

        let webhooks = WebhookEndpoints {
            upload_url: parse_url("upload_webhook_url", &self.upload_webhook_url)?,
            append_url: parse_url("append_webhook_url", &self.append_webhook_url)?,
        };

        Ok(ResolvedSettings {
            bind_addr,
            reference_url,
            webhooks,
            http_timeout: self.http_timeout_seconds.map(Duration::from_secs),
            max_body_bytes: self.max_body_bytes,
        })
    }
}

fn parse_url(key: &str, raw: &str) -> anyhow::Result<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        bail!("{key} is not configured");
    }
    let url = Url::parse(raw).with_context(|| format!("{key} is not a valid url: '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("{key} must use http or https: '{raw}'");
    }
    Ok(url)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
