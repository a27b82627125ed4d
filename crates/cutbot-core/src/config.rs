use std::{env, fs, path::Path, time::Duration};

use tracing::warn;

use crate::{errors::Error, Result};

pub const DEFAULT_CUTTLY_API_URL: &str = "https://cutt.ly/api/api.php";
pub const DEFAULT_CUTTLY_STATS_BASE: &str = "https://cutt.ly";
pub const DEFAULT_QR_API_URL: &str = "https://api.qrserver.com/v1/create-qr-code/";
pub const DEFAULT_WEBHOOK_PORT: u16 = 10000;

/// How the bot receives updates from Telegram.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportMode {
    /// Long polling (local development).
    Polling,
    /// Push-style webhook listener bound to `0.0.0.0:<port>`.
    /// `external_url` is the public base URL; the bot token is appended as path.
    Webhook { port: u16, external_url: String },
}

/// Typed configuration for the link bot.
#[derive(Clone, Debug)]
pub struct Config {
    // Secrets
    pub telegram_bot_token: String,
    pub cuttly_api_key: String,

    // Upstream services
    pub cuttly_api_url: String,
    pub cuttly_stats_base: String,
    pub qr_api_url: String,
    pub shorten_timeout: Duration,

    // Behavior
    pub bulk_max_urls: usize,
    pub telegram_safe_limit: usize,

    // Transport
    pub transport: TransportMode,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        // Required env vars
        let telegram_bot_token = required("TELEGRAM_BOT_TOKEN")?;
        let cuttly_api_key = required("CUTTLY_API_KEY")?;

        let cuttly_api_url = env_str("CUTTLY_API_URL")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_CUTTLY_API_URL.to_string());
        let cuttly_stats_base = env_str("CUTTLY_STATS_BASE")
            .and_then(non_empty)
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_CUTTLY_STATS_BASE.to_string());
        let qr_api_url = env_str("QR_API_URL")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_QR_API_URL.to_string());
        let shorten_timeout = Duration::from_secs(env_u64("SHORTEN_TIMEOUT_SECS").unwrap_or(10));

        let bulk_max_urls = env_usize("BULK_MAX_URLS").unwrap_or(10).max(1);
        let telegram_safe_limit = env_usize("TELEGRAM_SAFE_LIMIT").unwrap_or(4000).max(200);

        let transport = transport_from_env();

        Ok(Self {
            telegram_bot_token,
            cuttly_api_key,
            cuttly_api_url,
            cuttly_stats_base,
            qr_api_url,
            shorten_timeout,
            bulk_max_urls,
            telegram_safe_limit,
            transport,
        })
    }
}

fn required(key: &str) -> Result<String> {
    env_str(key)
        .and_then(non_empty)
        .ok_or_else(|| Error::Config(format!("{key} environment variable is required")))
}

fn transport_from_env() -> TransportMode {
    // Render sets `RENDER` and `RENDER_EXTERNAL_URL` for web services.
    if env::var_os("RENDER").is_none() {
        return TransportMode::Polling;
    }

    let port = env_u16("PORT").unwrap_or(DEFAULT_WEBHOOK_PORT);
    match env_str("RENDER_EXTERNAL_URL").and_then(non_empty) {
        Some(url) => TransportMode::Webhook {
            port,
            external_url: url.trim_end_matches('/').to_string(),
        },
        None => {
            warn!("RENDER is set but RENDER_EXTERNAL_URL is missing; falling back to polling");
            TransportMode::Polling
        }
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_u16(key: &str) -> Option<u16> {
    env_str(key).and_then(|s| s.trim().parse::<u16>().ok())
}

fn env_usize(key: &str) -> Option<usize> {
    env_str(key).and_then(|s| s.trim().parse::<usize>().ok())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotenv_parsing_strips_quotes_and_comments() {
        let parsed = parse_dotenv(
            "# secrets\n\
             TELEGRAM_BOT_TOKEN=\"123:abc\"\n\
             export CUTTLY_API_KEY='k'\n\
             \n\
             BROKEN_LINE\n\
             =novalue\n\
             PORT = 8080\n",
        );

        assert_eq!(
            parsed,
            vec![
                ("TELEGRAM_BOT_TOKEN".to_string(), "123:abc".to_string()),
                ("CUTTLY_API_KEY".to_string(), "k".to_string()),
                ("PORT".to_string(), "8080".to_string()),
            ]
        );
    }

    #[test]
    fn blank_values_are_treated_as_missing() {
        assert_eq!(non_empty("   ".to_string()), None);
        assert_eq!(non_empty("x".to_string()), Some("x".to_string()));
    }
}
