use crate::{
    error::{ImagenError, Result},
    logger::LogLevel,
};
use std::env;
use std::str::FromStr;

/// Endpoint used by the local profile: the development API on loopback.
pub const LOCAL_ENDPOINT: &str = "http://127.0.0.1:8000/api/generate/";

/// Seconds a user must wait after a successful generation on the hosted profile.
pub const HOSTED_COOLDOWN_SECS: u32 = 45;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Hosted,
    Local,
}

impl FromStr for Profile {
    type Err = ImagenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hosted" => Ok(Profile::Hosted),
            "local" => Ok(Profile::Local),
            other => Err(ImagenError::Config(format!(
                "unknown profile '{}', expected 'hosted' or 'local'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ApiConfig {
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl ApiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn local() -> Self {
        Self::new().with_endpoint(LOCAL_ENDPOINT)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Cooldown started after each successful response. Zero disables it.
    pub cooldown_secs: u32,
    /// Refuse a new submission while one is still in flight.
    pub reject_while_loading: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::hosted()
    }
}

impl ControllerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hosted() -> Self {
        ControllerConfig {
            cooldown_secs: HOSTED_COOLDOWN_SECS,
            reject_while_loading: true,
        }
    }

    pub fn local() -> Self {
        ControllerConfig {
            cooldown_secs: 0,
            reject_while_loading: true,
        }
    }

    pub fn with_cooldown(mut self, secs: u32) -> Self {
        self.cooldown_secs = secs;
        self
    }

    pub fn with_reject_while_loading(mut self, enabled: bool) -> Self {
        self.reject_while_loading = enabled;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub profile: Profile,
    pub api: ApiConfig,
    pub controller: ControllerConfig,
    pub log_level: LogLevel,
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::hosted()
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hosted() -> Self {
        Config {
            profile: Profile::Hosted,
            api: ApiConfig::new(),
            controller: ControllerConfig::hosted(),
            log_level: LogLevel::Warn,
            log_json: false,
        }
    }

    pub fn local() -> Self {
        Config {
            profile: Profile::Local,
            api: ApiConfig::local(),
            controller: ControllerConfig::local(),
            ..Self::hosted()
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from `IMAGEN_*` variables resolved through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let profile = match lookup("IMAGEN_PROFILE") {
            Some(value) => value.parse()?,
            None => Profile::Hosted,
        };

        let mut config = match profile {
            Profile::Hosted => Config::hosted(),
            Profile::Local => Config::local(),
        };

        if let Some(endpoint) = lookup("IMAGEN_API_URL").filter(|v| !v.trim().is_empty()) {
            config.api.endpoint = Some(endpoint.trim().to_string());
        }
        if let Some(value) = lookup("IMAGEN_TIMEOUT_SECS") {
            config.api.timeout_secs = Some(parse_number("IMAGEN_TIMEOUT_SECS", &value)?);
        }
        if let Some(value) = lookup("IMAGEN_COOLDOWN_SECS") {
            config.controller.cooldown_secs = parse_number("IMAGEN_COOLDOWN_SECS", &value)?;
        }
        if let Some(value) = lookup("IMAGEN_REJECT_WHILE_LOADING") {
            config.controller.reject_while_loading =
                parse_bool("IMAGEN_REJECT_WHILE_LOADING", &value)?;
        }
        if let Some(value) = lookup("IMAGEN_LOG_LEVEL") {
            config.log_level = value.parse()?;
        }
        if let Some(value) = lookup("IMAGEN_LOG_JSON") {
            config.log_json = parse_bool("IMAGEN_LOG_JSON", &value)?;
        }

        Ok(config)
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ImagenError::Config(format!("{} must be a number, got '{}'", key, value)))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ImagenError::Config(format!(
            "{} must be true or false, got '{}'",
            key, value
        ))),
    }
}
