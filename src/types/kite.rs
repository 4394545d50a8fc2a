use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Kite Connect v3 response envelope: `{"status": "success", "data": {...}}`
/// or `{"status": "error", "message": "...", "error_type": "..."}`.
#[derive(Debug, Deserialize)]
pub struct KiteEnvelope<T> {
    pub status: String,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error_type: Option<String>,
}

impl<T> KiteEnvelope<T> {
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("success")
    }
}

/// Session data returned by `POST /session/token`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KiteSession {
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub access_token: Option<String>,
    pub public_token: Option<String>,
    pub refresh_token: Option<String>,
    pub login_time: Option<String>,
    pub expires_in: Option<Value>,
    pub expires_at: Option<Value>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl KiteSession {
    /// The access token, treating an empty string as absent.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }

    /// Short, log-safe rendering of the access token.
    pub fn masked_access_token(&self) -> String {
        match self.access_token() {
            Some(token) if token.len() > 6 => {
                format!("{}***", token.chars().take(4).collect::<String>())
            }
            Some(_) => "***".to_string(),
            None => "<none>".to_string(),
        }
    }
}
