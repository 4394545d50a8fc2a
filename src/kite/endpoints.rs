use crate::error::AutologinError;
use crate::types::kite::{KiteEnvelope, KiteSession};

use sha2::{Digest, Sha256};
use tracing::info;
use url::Url;

const KITE_VERSION: &str = "3";

/// Stateless Kite Connect endpoints.
pub struct KiteEndpoints;

impl KiteEndpoints {
    /// Exchange a one-time request token for session data (`POST /session/token`).
    pub async fn generate_session(
        http_client: &reqwest::Client,
        api_url: &Url,
        api_key: &str,
        api_secret: &str,
        request_token: &str,
    ) -> Result<KiteSession, AutologinError> {
        let url = endpoint(api_url, "session/token")?;
        let checksum = checksum(api_key, request_token, api_secret);

        let resp = http_client
            .post(url)
            .header("X-Kite-Version", KITE_VERSION)
            .form(&[
                ("api_key", api_key),
                ("request_token", request_token),
                ("checksum", checksum.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.bytes().await?;
        let session = match serde_json::from_slice::<KiteEnvelope<KiteSession>>(&body) {
            Ok(envelope) => into_session(envelope)?,
            Err(e) if status.is_success() => return Err(e.into()),
            Err(_) => {
                return Err(AutologinError::KiteStatus {
                    status,
                    body: String::from_utf8_lossy(&body).into_owned(),
                });
            }
        };

        if session.access_token().is_none() {
            return Err(AutologinError::MissingAccessToken);
        }
        info!(
            user_id = session.user_id.as_deref().unwrap_or("<unknown>"),
            access_token = %session.masked_access_token(),
            "Kite session generated"
        );
        Ok(session)
    }
}

fn into_session(envelope: KiteEnvelope<KiteSession>) -> Result<KiteSession, AutologinError> {
    if !envelope.is_success() {
        return Err(AutologinError::KiteApi {
            error_type: envelope
                .error_type
                .unwrap_or_else(|| "UnknownException".to_string()),
            message: envelope.message.unwrap_or_default(),
        });
    }
    envelope.data.ok_or(AutologinError::MissingAccessToken)
}

/// Join `path` under `base`, keeping any path prefix `base` carries.
fn endpoint(base: &Url, path: &str) -> Result<Url, AutologinError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let prefixed = format!("{}/", base.path());
        base.set_path(&prefixed);
    }
    Ok(base.join(path)?)
}

/// Hex SHA-256 of `api_key + request_token + api_secret`.
pub fn checksum(api_key: &str, request_token: &str, api_secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(api_key.as_bytes());
    hasher.update(request_token.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}
