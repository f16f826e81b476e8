//! Viewer configuration.
//!
//! Desktop builds read `MB_VIEWER_*` environment variables (optionally from a
//! `.env` file at the repo root). Browser builds derive the socket URL from the
//! page location and use the defaults for everything else.

use std::str::FromStr;

use crate::error::ConfigError;
use crate::infrastructure::websocket::shared::{
    BACKOFF_MULTIPLIER, INITIAL_RETRY_DELAY_MS, MAX_RETRY_ATTEMPTS, MAX_RETRY_DELAY_MS,
};

pub const ENV_WS_URL: &str = "MB_VIEWER_WS_URL";
pub const ENV_RECONNECT_BASE_MS: &str = "MB_VIEWER_RECONNECT_BASE_MS";
pub const ENV_RECONNECT_FACTOR: &str = "MB_VIEWER_RECONNECT_FACTOR";
pub const ENV_RECONNECT_MAX_ATTEMPTS: &str = "MB_VIEWER_RECONNECT_MAX_ATTEMPTS";
pub const ENV_RECONNECT_MAX_DELAY_MS: &str = "MB_VIEWER_RECONNECT_MAX_DELAY_MS";
pub const ENV_WIDTH: &str = "MB_VIEWER_WIDTH";
pub const ENV_HEIGHT: &str = "MB_VIEWER_HEIGHT";
pub const ENV_PIXEL_DENSITY: &str = "MB_VIEWER_PIXEL_DENSITY";

const DEFAULT_WS_URL: &str = "ws://localhost:3000/ws";

/// Side length of the simulated biome, used as the default headless surface size.
const DEFAULT_SURFACE_SIZE: f64 = 500.0;

/// Reconnection policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconnectConfig {
    /// Delay before the first reconnect attempt
    pub base_delay_ms: u64,
    /// Multiplier applied to the delay after each scheduled attempt
    pub growth_factor: f64,
    /// Attempts allowed before giving up
    pub max_attempts: u32,
    /// Upper bound for the delay
    pub max_delay_ms: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: INITIAL_RETRY_DELAY_MS,
            growth_factor: BACKOFF_MULTIPLIER,
            max_attempts: MAX_RETRY_ATTEMPTS,
            max_delay_ms: MAX_RETRY_DELAY_MS,
        }
    }
}

/// Full viewer configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub ws_url: String,
    pub reconnect: ReconnectConfig,
    /// Logical width of the headless surface
    pub width: f64,
    /// Logical height of the headless surface
    pub height: f64,
    /// Pixel density of the headless surface
    pub pixel_density: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            ws_url: DEFAULT_WS_URL.to_string(),
            reconnect: ReconnectConfig::default(),
            width: DEFAULT_SURFACE_SIZE,
            height: DEFAULT_SURFACE_SIZE,
            pixel_density: 1.0,
        }
    }
}

impl ViewerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let reconnect = ReconnectConfig {
            base_delay_ms: parse_or(&lookup, ENV_RECONNECT_BASE_MS, defaults.reconnect.base_delay_ms)?,
            growth_factor: parse_or(&lookup, ENV_RECONNECT_FACTOR, defaults.reconnect.growth_factor)?,
            max_attempts: parse_or(&lookup, ENV_RECONNECT_MAX_ATTEMPTS, defaults.reconnect.max_attempts)?,
            max_delay_ms: parse_or(&lookup, ENV_RECONNECT_MAX_DELAY_MS, defaults.reconnect.max_delay_ms)?,
        };
        if !(reconnect.growth_factor.is_finite() && reconnect.growth_factor >= 1.0) {
            return Err(ConfigError::Invalid {
                key: ENV_RECONNECT_FACTOR,
                value: reconnect.growth_factor.to_string(),
            });
        }

        let ws_url = match lookup(ENV_WS_URL) {
            Some(url) if !url.trim().is_empty() => validate_plain_ws_url(url.trim())?,
            _ => defaults.ws_url,
        };

        let width = parse_or(&lookup, ENV_WIDTH, defaults.width)?;
        let height = parse_or(&lookup, ENV_HEIGHT, defaults.height)?;
        let pixel_density = parse_or(&lookup, ENV_PIXEL_DENSITY, defaults.pixel_density)?;
        if !(pixel_density.is_finite() && pixel_density > 0.0) {
            return Err(ConfigError::Invalid {
                key: ENV_PIXEL_DENSITY,
                value: pixel_density.to_string(),
            });
        }

        Ok(Self {
            ws_url,
            reconnect,
            width,
            height,
            pixel_density,
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

/// Check that `raw` is a `ws://` or `wss://` URL.
pub fn validate_ws_url(raw: &str) -> Result<String, ConfigError> {
    let parsed = url::Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "ws" | "wss" => Ok(parsed.to_string()),
        other => Err(ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme `{other}`"),
        }),
    }
}

/// Check that `raw` is a `ws://` URL.
///
/// The desktop transport is built without TLS, so `wss://` would fail on
/// every attempt.
pub fn validate_plain_ws_url(raw: &str) -> Result<String, ConfigError> {
    let url = validate_ws_url(raw)?;
    if url.starts_with("wss:") {
        return Err(ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: "wss is not supported by the desktop transport (built without TLS)".to_string(),
        });
    }
    Ok(url)
}

/// Socket URL for a page served from `host` over `scheme`.
///
/// Secure pages get `wss`, everything else `ws`. `scheme` may carry the
/// trailing colon that `window.location.protocol` reports.
pub fn ws_url_for_page(scheme: &str, host: &str) -> String {
    let scheme = scheme.trim_end_matches(':');
    let ws_scheme = if scheme.eq_ignore_ascii_case("https") {
        "wss"
    } else {
        "ws"
    };
    format!("{ws_scheme}://{host}/ws")
}
