use crate::api::retry::RetryPolicy;
use crate::error::AutologinError;
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BACKEND_UPDATE_URL: &str =
    "https://web-production-de0bc.up.railway.app/api/modules/auth/broker/token/update";
pub const DEFAULT_BACKEND_SOURCE_LABEL: &str = "automation";
pub const DEFAULT_KITE_LOGIN_URL: &str = "https://kite.trade/connect/login";
pub const DEFAULT_KITE_API_URL: &str = "https://api.kite.trade";
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

/// String-valued keys, read as-is so secrets like `007` keep their exact text.
const STRING_ENV_KEYS: &[(&str, &str)] = &[
    ("Z_API_KEY", "api_key"),
    ("Z_API_SECRET", "api_secret"),
    ("Z_TOTP_SECRET", "totp_secret"),
    ("Z_USER_ID", "user_id"),
    ("Z_PASSWORD", "password"),
    ("TOKEN_OUTPUT_PATH", "token_output_path"),
    ("BACKEND_UPDATE_URL", "backend_update_url"),
    ("BACKEND_SOURCE_LABEL", "backend_source_label"),
    ("LOGLEVEL", "loglevel"),
    ("WEBDRIVER_URL", "webdriver_url"),
    ("KITE_LOGIN_URL", "kite_login_url"),
    ("KITE_API_URL", "kite_api_url"),
    ("PROXY", "proxy"),
];

/// Numeric knobs, parsed by figment's env provider.
const NUMERIC_ENV_KEYS: &[&str] = &[
    "backend_max_retries",
    "backend_retry_delay_secs",
    "backend_timeout_secs",
    "login_timeout_secs",
];

/// Validated runtime configuration for one autologin run.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub api_secret: String,
    pub totp_secret: String,
    pub user_id: String,
    pub password: String,
    pub token_output_path: Option<PathBuf>,
    pub backend_update_url: Url,
    pub backend_source_label: String,
    pub backend_max_retries: usize,
    pub backend_retry_delay: Duration,
    pub backend_timeout: Duration,
    pub loglevel: String,
    pub webdriver_url: Url,
    pub login_timeout: Duration,
    pub kite_login_url: Url,
    pub kite_api_url: Url,
    pub proxy: Option<Url>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("totp_secret", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("password", &"<redacted>")
            .field("token_output_path", &self.token_output_path)
            .field("backend_update_url", &self.backend_update_url.as_str())
            .field("backend_source_label", &self.backend_source_label)
            .field("backend_max_retries", &self.backend_max_retries)
            .field("backend_retry_delay", &self.backend_retry_delay)
            .field("backend_timeout", &self.backend_timeout)
            .field("loglevel", &self.loglevel)
            .field("webdriver_url", &self.webdriver_url.as_str())
            .field("login_timeout", &self.login_timeout)
            .field("kite_login_url", &self.kite_login_url.as_str())
            .field("kite_api_url", &self.kite_api_url.as_str())
            .field("proxy", &self.proxy.as_ref().map(Url::as_str))
            .finish()
    }
}

/// Shape of the merged figment before trimming and validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawConfig {
    api_key: String,
    api_secret: String,
    totp_secret: String,
    user_id: String,
    password: String,
    #[serde(default)]
    token_output_path: Option<String>,
    backend_update_url: String,
    backend_source_label: String,
    backend_max_retries: usize,
    backend_retry_delay_secs: u64,
    backend_timeout_secs: u64,
    loglevel: String,
    webdriver_url: String,
    login_timeout_secs: u64,
    kite_login_url: String,
    kite_api_url: String,
    #[serde(default)]
    proxy: Option<String>,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            totp_secret: String::new(),
            user_id: String::new(),
            password: String::new(),
            token_output_path: None,
            backend_update_url: DEFAULT_BACKEND_UPDATE_URL.to_string(),
            backend_source_label: DEFAULT_BACKEND_SOURCE_LABEL.to_string(),
            backend_max_retries: 3,
            backend_retry_delay_secs: 5,
            backend_timeout_secs: 20,
            loglevel: "info".to_string(),
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            login_timeout_secs: 20,
            kite_login_url: DEFAULT_KITE_LOGIN_URL.to_string(),
            kite_api_url: DEFAULT_KITE_API_URL.to_string(),
            proxy: None,
        }
    }
}

impl Config {
    /// Load `.env` (if present) and the process environment.
    pub fn load() -> Result<Self, AutologinError> {
        dotenvy::dotenv().ok();
        Self::from_figment(Self::figment())
    }

    /// Defaults merged with the `Z_*` broker credentials and the plain env keys.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(RawConfig::default()))
            .merge(Env::raw().only(NUMERIC_ENV_KEYS))
            .merge(Serialized::defaults(string_env()))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, AutologinError> {
        let raw: RawConfig = figment.extract()?;
        raw.try_into()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.backend_max_retries, self.backend_retry_delay)
    }
}

impl TryFrom<RawConfig> for Config {
    type Error = AutologinError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let required = [
            ("api_key", raw.api_key.trim()),
            ("api_secret", raw.api_secret.trim()),
            ("totp_secret", raw.totp_secret.trim()),
            ("user_id", raw.user_id.trim()),
            ("password", raw.password.trim()),
        ];
        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(AutologinError::MissingConfig(missing));
        }

        Ok(Self {
            api_key: raw.api_key.trim().to_string(),
            api_secret: raw.api_secret.trim().to_string(),
            totp_secret: raw.totp_secret.trim().to_string(),
            user_id: raw.user_id.trim().to_string(),
            password: raw.password.trim().to_string(),
            token_output_path: non_empty(raw.token_output_path).map(PathBuf::from),
            backend_update_url: Url::parse(&or_default(
                raw.backend_update_url,
                DEFAULT_BACKEND_UPDATE_URL,
            ))?,
            backend_source_label: or_default(
                raw.backend_source_label,
                DEFAULT_BACKEND_SOURCE_LABEL,
            ),
            backend_max_retries: raw.backend_max_retries.max(1),
            backend_retry_delay: Duration::from_secs(raw.backend_retry_delay_secs),
            backend_timeout: Duration::from_secs(raw.backend_timeout_secs),
            loglevel: or_default(raw.loglevel, "info"),
            webdriver_url: Url::parse(&or_default(raw.webdriver_url, DEFAULT_WEBDRIVER_URL))?,
            login_timeout: Duration::from_secs(raw.login_timeout_secs),
            kite_login_url: Url::parse(&or_default(raw.kite_login_url, DEFAULT_KITE_LOGIN_URL))?,
            kite_api_url: Url::parse(&or_default(raw.kite_api_url, DEFAULT_KITE_API_URL))?,
            proxy: non_empty(raw.proxy).map(|p| Url::parse(&p)).transpose()?,
        })
    }
}

fn string_env() -> BTreeMap<&'static str, String> {
    STRING_ENV_KEYS
        .iter()
        .filter_map(|(var, key)| std::env::var(var).ok().map(|value| (*key, value)))
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn or_default(value: String, default: &str) -> String {
    non_empty(Some(value)).unwrap_or_else(|| default.to_string())
}
