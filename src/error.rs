use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum AutologinError {
    #[error("Missing required config values: {0:?}")]
    MissingConfig(Vec<&'static str>),

    #[error("Config error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOTP secret: {0}")]
    TotpSecret(String),

    #[error("WebDriver session error: {0}")]
    WebDriverSession(#[from] fantoccini::error::NewSessionError),

    #[error("WebDriver command error: {0}")]
    WebDriver(#[from] fantoccini::error::CmdError),

    #[error("Timed out after {0:?} waiting for login redirect")]
    LoginTimeout(Duration),

    #[error("Unable to locate request_token in redirect URL: {0}")]
    MissingRequestToken(String),

    #[error("Session data missing access_token")]
    MissingAccessToken,

    #[error("Kite API error ({error_type}): {message}")]
    KiteApi { error_type: String, message: String },

    #[error("Kite API responded with status {status}: {body}")]
    KiteStatus { status: StatusCode, body: String },

    #[error("Backend responded with status {status}: {body}")]
    BackendStatus { status: StatusCode, body: String },

    #[error("Unable to update backend with new access token after {attempts} attempts: {last_error}")]
    BackendUnavailable { attempts: usize, last_error: String },
}

impl From<figment::Error> for AutologinError {
    fn from(e: figment::Error) -> Self {
        AutologinError::Config(Box::new(e))
    }
}

/// Errors that a retry loop may safely attempt again.
pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for AutologinError {
    fn is_retryable(&self) -> bool {
        match self {
            AutologinError::Reqwest(e) => !e.is_builder(),
            AutologinError::BackendStatus { .. } => true,
            _ => false,
        }
    }
}
