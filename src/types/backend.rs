use crate::error::AutologinError;
use crate::types::kite::KiteSession;
use serde::Serialize;
use serde_json::Value;

/// JSON body for the backend token update endpoint.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TokenUpdatePayload {
    pub user_id: String,
    pub access_token: String,
    pub expires_in: Option<Value>,
    pub expires_at: Option<Value>,
    pub source: String,
}

impl TokenUpdatePayload {
    pub fn from_session(
        user_id: impl Into<String>,
        session: &KiteSession,
        source: impl Into<String>,
    ) -> Result<Self, AutologinError> {
        let access_token = session
            .access_token()
            .ok_or(AutologinError::MissingAccessToken)?;
        Ok(Self {
            user_id: user_id.into(),
            access_token: access_token.to_string(),
            expires_in: session.expires_in.clone(),
            expires_at: session.expires_at.clone(),
            source: source.into(),
        })
    }
}
