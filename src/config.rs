use std::time::Duration;

use log::warn;

pub const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_MAX_WAIT_SECS: u64 = 900;
const DEFAULT_VALIDATION_POLL_ATTEMPTS: u32 = 40;
const DEFAULT_VALIDATION_POLL_INTERVAL_SECS: u64 = 10;
const DEFAULT_ISSUANCE_POLL_INTERVAL_SECS: u64 = 20;
const DEFAULT_CALLBACK_TIMEOUT_SECS: u64 = 30;

/// Process-level settings, read once at startup.
#[derive(Debug, Clone)]
pub struct RequestorConfig {
    /// Return right after the validation records are in place.
    pub skip_wait: bool,
    pub max_wait: Duration,
    pub default_region: String,
    pub validation_poll_attempts: u32,
    pub validation_poll_interval: Duration,
    pub issuance_poll_interval: Duration,
    pub callback_timeout: Duration,
}

impl Default for RequestorConfig {
    fn default() -> Self {
        Self {
            skip_wait: false,
            max_wait: Duration::from_secs(DEFAULT_MAX_WAIT_SECS),
            default_region: DEFAULT_REGION.to_string(),
            validation_poll_attempts: DEFAULT_VALIDATION_POLL_ATTEMPTS,
            validation_poll_interval: Duration::from_secs(DEFAULT_VALIDATION_POLL_INTERVAL_SECS),
            issuance_poll_interval: Duration::from_secs(DEFAULT_ISSUANCE_POLL_INTERVAL_SECS),
            callback_timeout: Duration::from_secs(DEFAULT_CALLBACK_TIMEOUT_SECS),
        }
    }
}

impl RequestorConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Invalid values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let skip_wait = lookup("SKIP_WAIT")
            .map(|raw| {
                let raw = raw.trim();
                raw == "1" || raw.eq_ignore_ascii_case("true")
            })
            .unwrap_or(defaults.skip_wait);
        let default_region = lookup("ACM_REGION")
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .unwrap_or(defaults.default_region);

        Self {
            skip_wait,
            max_wait: resolve_secs(&lookup, "MAX_WAIT_SECONDS", DEFAULT_MAX_WAIT_SECS),
            default_region,
            validation_poll_attempts: resolve_attempts(
                &lookup,
                "VALIDATION_POLL_ATTEMPTS",
                DEFAULT_VALIDATION_POLL_ATTEMPTS,
            ),
            validation_poll_interval: resolve_secs(
                &lookup,
                "VALIDATION_POLL_INTERVAL_SECONDS",
                DEFAULT_VALIDATION_POLL_INTERVAL_SECS,
            ),
            issuance_poll_interval: resolve_secs(
                &lookup,
                "ISSUANCE_POLL_INTERVAL_SECONDS",
                DEFAULT_ISSUANCE_POLL_INTERVAL_SECS,
            ),
            callback_timeout: resolve_secs(
                &lookup,
                "CALLBACK_TIMEOUT_SECONDS",
                DEFAULT_CALLBACK_TIMEOUT_SECS,
            ),
        }
    }
}

fn resolve_secs<F>(lookup: &F, key: &str, default: u64) -> Duration
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Duration::from_secs(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Duration::from_secs(secs),
        _ => {
            warn!("[config] invalid {key} value {raw:?}; using default {default}s");
            Duration::from_secs(default)
        }
    }
}

fn resolve_attempts<F>(lookup: &F, key: &str, default: u32) -> u32
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<u32>() {
        Ok(attempts) if attempts > 0 => attempts,
        _ => {
            warn!("[config] invalid {key} value {raw:?}; using default {default}");
            default
        }
    }
}

/// Details about the hosting invocation used to fill callback defaults.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    pub log_stream_name: String,
}

impl InvocationContext {
    pub fn new(log_stream_name: impl Into<String>) -> Self {
        Self {
            log_stream_name: log_stream_name.into(),
        }
    }

    pub fn from_env() -> Self {
        let name = std::env::var("AWS_LAMBDA_LOG_STREAM_NAME")
            .ok()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "unknown".to_string());
        Self::new(name)
    }
}
