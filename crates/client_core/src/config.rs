use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::Context;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "interview.toml";
const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub exchange_endpoint: Url,
    pub report_endpoint: Url,
    pub pacing_delay_ms: u64,
    pub request_timeout_secs: u64,
}

impl ClientSettings {
    /// Both endpoints under one service root: `<base>/chat` and `<base>/report`.
    pub fn for_server(base: &str) -> anyhow::Result<Self> {
        let (exchange_endpoint, report_endpoint) = endpoints_for_server(base)?;
        Ok(Self {
            exchange_endpoint,
            report_endpoint,
            ..Self::default()
        })
    }

    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.pacing_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            exchange_endpoint: Url::parse("http://127.0.0.1:8000/chat")
                .expect("static exchange endpoint"),
            report_endpoint: Url::parse("http://127.0.0.1:8000/report")
                .expect("static report endpoint"),
            pacing_delay_ms: 800,
            request_timeout_secs: 30,
        }
    }
}

pub fn load_settings() -> anyhow::Result<ClientSettings> {
    load_settings_from(Path::new(DEFAULT_CONFIG_FILE))
}

pub fn load_settings_from(path: &Path) -> anyhow::Result<ClientSettings> {
    let raw = fs::read_to_string(path).ok();
    settings_from_sources(raw.as_deref(), |key| std::env::var(key).ok())
        .with_context(|| format!("failed to load client settings from '{}'", path.display()))
}

/// Layers defaults, the optional toml document, then environment values.
pub fn settings_from_sources(
    file_contents: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    let mut server_url = None;
    let mut exchange_endpoint = None;
    let mut report_endpoint = None;

    if let Some(raw) = file_contents {
        let file_cfg = toml::from_str::<HashMap<String, toml::Value>>(raw)
            .context("interview config is not valid toml")?;
        if let Some(v) = file_cfg.get("server_url").and_then(toml::Value::as_str) {
            server_url = Some(v.to_string());
        }
        if let Some(v) = file_cfg.get("exchange_endpoint").and_then(toml::Value::as_str) {
            exchange_endpoint = Some(v.to_string());
        }
        if let Some(v) = file_cfg.get("report_endpoint").and_then(toml::Value::as_str) {
            report_endpoint = Some(v.to_string());
        }
        if let Some(v) = file_cfg.get("pacing_delay_ms").and_then(toml::Value::as_integer) {
            if let Ok(v) = u64::try_from(v) {
                settings.pacing_delay_ms = v;
            }
        }
        if let Some(v) = file_cfg
            .get("request_timeout_secs")
            .and_then(toml::Value::as_integer)
        {
            if let Ok(v) = u64::try_from(v) {
                settings.request_timeout_secs = v;
            }
        }
    }

    if let Some(v) = env("INTERVIEW_SERVER_URL") {
        server_url = Some(v);
    }
    if let Some(v) = env("APP__EXCHANGE_ENDPOINT") {
        exchange_endpoint = Some(v);
    }
    if let Some(v) = env("APP__REPORT_ENDPOINT") {
        report_endpoint = Some(v);
    }
    if let Some(v) = env("APP__PACING_DELAY_MS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.pacing_delay_ms = parsed;
        }
    }
    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }

    if let Some(base) = server_url {
        let (exchange, report) = endpoints_for_server(&base)?;
        settings.exchange_endpoint = exchange;
        settings.report_endpoint = report;
    }
    if let Some(v) = exchange_endpoint {
        settings.exchange_endpoint = parse_endpoint(&v)?;
    }
    if let Some(v) = report_endpoint {
        settings.report_endpoint = parse_endpoint(&v)?;
    }

    Ok(settings)
}

fn endpoints_for_server(base: &str) -> anyhow::Result<(Url, Url)> {
    let base = base.trim();
    let base = if base.is_empty() {
        DEFAULT_SERVER_URL
    } else {
        base.trim_end_matches('/')
    };
    Ok((
        parse_endpoint(&format!("{base}/chat"))?,
        parse_endpoint(&format!("{base}/report"))?,
    ))
}

fn parse_endpoint(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("invalid endpoint url '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("endpoint url '{raw}' must use http or https");
    }
    Ok(url)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
