use std::{
    fs,
    path::Path,
    time::Duration,
};

use anyhow::{Context, Result};
use portal_api::{Operation, SimulatedLatency};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "portal.toml";
pub const DEFAULT_FAIL_MESSAGE: &str = "Simulated backend failure";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub list_latency_ms: u64,
    pub update_latency_ms: u64,
    pub submit_latency_ms: u64,
    pub report_latency_ms: u64,
    pub log_filter: String,
    pub fail_resource: Option<String>,
    pub fail_message: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        let latency = SimulatedLatency::default();
        Self {
            list_latency_ms: millis(latency.list),
            update_latency_ms: millis(latency.update),
            submit_latency_ms: millis(latency.submit),
            report_latency_ms: millis(latency.report),
            log_filter: "info".into(),
            fail_resource: None,
            fail_message: None,
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Settings {
    pub fn latency(&self) -> SimulatedLatency {
        SimulatedLatency {
            list: Duration::from_millis(self.list_latency_ms),
            update: Duration::from_millis(self.update_latency_ms),
            submit: Duration::from_millis(self.submit_latency_ms),
            report: Duration::from_millis(self.report_latency_ms),
        }
    }

    /// The operation the mock backend should fail, if one is configured.
    pub fn failure(&self) -> Result<Option<(Operation, String)>> {
        let Some(resource) = self.fail_resource.as_deref() else {
            return Ok(None);
        };
        let operation = resource
            .parse::<Operation>()
            .with_context(|| format!("invalid fail_resource '{resource}'"))?;
        let message = self
            .fail_message
            .clone()
            .unwrap_or_else(|| DEFAULT_FAIL_MESSAGE.to_string());
        Ok(Some((operation, message)))
    }
}

/// Defaults, then the config file, then environment overrides.
///
/// An explicit `path` must exist; without one `portal.toml` in the working
/// directory is read when present.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let mut settings = match path {
        Some(path) => read_file(path)?,
        None => {
            let fallback = Path::new(DEFAULT_CONFIG_FILE);
            if fallback.exists() {
                read_file(fallback)?
            } else {
                Settings::default()
            }
        }
    };

    apply_env(&mut settings, |name| std::env::var(name).ok())?;
    Ok(settings)
}

fn read_file(path: &Path) -> Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    parse_settings(&raw).with_context(|| format!("invalid config file '{}'", path.display()))
}

pub fn parse_settings(raw: &str) -> Result<Settings> {
    Ok(toml::from_str(raw)?)
}

/// Applies `PORTAL_*` then `APP__*` variables; the latter win.
pub fn apply_env<F>(settings: &mut Settings, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| {
        lookup(&format!("APP__{key}")).or_else(|| lookup(&format!("PORTAL_{key}")))
    };
    let number = |key: &str| -> Result<Option<u64>> {
        var(key)
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| format!("invalid value '{raw}' for {key}"))
            })
            .transpose()
    };

    if let Some(v) = number("LIST_LATENCY_MS")? {
        settings.list_latency_ms = v;
    }
    if let Some(v) = number("UPDATE_LATENCY_MS")? {
        settings.update_latency_ms = v;
    }
    if let Some(v) = number("SUBMIT_LATENCY_MS")? {
        settings.submit_latency_ms = v;
    }
    if let Some(v) = number("REPORT_LATENCY_MS")? {
        settings.report_latency_ms = v;
    }
    if let Some(v) = var("LOG_FILTER") {
        settings.log_filter = v;
    }
    if let Some(v) = var("FAIL_RESOURCE") {
        settings.fail_resource = Some(v);
    }
    if let Some(v) = var("FAIL_MESSAGE") {
        settings.fail_message = Some(v);
    }

    Ok(())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
