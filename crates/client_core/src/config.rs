use std::{fs, io, path::Path, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use shared::protocol::{ResponseMode, WireFormat};
use url::Url;

pub const DEFAULT_COLLECTOR_URL: &str = "https://script.google.com/macros/s/AKfycbwZ170AYw7UjqPonKpPQiLMFppmi0Q1iUFdTktz_e6qivqHug1PC_cZ2ZZsUIhMpSFg/exec";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const SETTINGS_FILE: &str = "rsvp.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub endpoint: String,
    pub wire_format: WireFormat,
    pub response_mode: ResponseMode,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_COLLECTOR_URL.into(),
            wire_format: WireFormat::default(),
            response_mode: ResponseMode::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    pub fn endpoint_url(&self) -> Result<Url> {
        let url = Url::parse(self.endpoint.trim())
            .with_context(|| format!("invalid collector endpoint '{}'", self.endpoint))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => bail!("collector endpoint must be http or https, got '{other}'"),
        }
    }

    pub fn timeout(&self) -> Result<Duration> {
        if self.timeout_secs == 0 {
            bail!("submission timeout must be at least one second");
        }
        Ok(Duration::from_secs(self.timeout_secs))
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    endpoint: Option<String>,
    wire_format: Option<WireFormat>,
    response_mode: Option<ResponseMode>,
    timeout_secs: Option<u64>,
}

/// Defaults, then `rsvp.toml` in the working directory, then the process environment.
pub fn load_settings() -> Result<Settings> {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Settings> {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => {
            let file_cfg: FileSettings = toml::from_str(&raw)
                .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;
            if let Some(v) = file_cfg.endpoint {
                settings.endpoint = v;
            }
            if let Some(v) = file_cfg.wire_format {
                settings.wire_format = v;
            }
            if let Some(v) = file_cfg.response_mode {
                settings.response_mode = v;
            }
            if let Some(v) = file_cfg.timeout_secs {
                settings.timeout_secs = v;
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))
        }
    }

    if let Some(v) = lookup(&env, "RSVP_ENDPOINT", "APP__ENDPOINT") {
        settings.endpoint = v;
    }
    if let Some(v) = lookup(&env, "RSVP_WIRE_FORMAT", "APP__WIRE_FORMAT") {
        settings.wire_format = v.parse()?;
    }
    if let Some(v) = lookup(&env, "RSVP_RESPONSE_MODE", "APP__RESPONSE_MODE") {
        settings.response_mode = v.parse()?;
    }
    if let Some(v) = lookup(&env, "RSVP_TIMEOUT_SECS", "APP__TIMEOUT_SECS") {
        settings.timeout_secs = v
            .trim()
            .parse()
            .map_err(|e| anyhow!("invalid submission timeout '{v}': {e}"))?;
    }

    Ok(settings)
}

/// The `APP__` spelling wins when both are set.
fn lookup(env: &impl Fn(&str) -> Option<String>, key: &str, alias: &str) -> Option<String> {
    env(alias).or_else(|| env(key))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
