use crate::api::retry::RetryPolicy;
use crate::error::{AutologinError, IsRetryable};
use crate::types::backend::TokenUpdatePayload;

use backon::Retryable;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{error, info, warn};
use url::Url;

pub struct BackendApi;

impl BackendApi {
    /// POST the token update, retrying with linear backoff on transport
    /// errors and non-2xx responses. Returns the backend's response body.
    pub async fn post_token_update(
        client: &reqwest::Client,
        url: &Url,
        payload: &TokenUpdatePayload,
        policy: RetryPolicy,
    ) -> Result<Value, AutologinError> {
        let attempts = AtomicUsize::new(0);

        let result = (|| async {
            let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
            Self::try_post(client, url, payload)
                .await
                .inspect_err(|e| {
                    warn!(attempt, error = %e, "Backend token update failed");
                })
        })
        .retry(policy.backoff())
        .when(|e: &AutologinError| e.is_retryable())
        .notify(|_err, dur: Duration| {
            info!("Retrying backend token update in {:?}", dur);
        })
        .await;

        result.map_err(|e| {
            let attempts = attempts.load(Ordering::Relaxed);
            error!(attempts, error = %e, "Giving up on backend token update");
            if e.is_retryable() {
                AutologinError::BackendUnavailable {
                    attempts,
                    last_error: e.to_string(),
                }
            } else {
                e
            }
        })
    }

    async fn try_post(
        client: &reqwest::Client,
        url: &Url,
        payload: &TokenUpdatePayload,
    ) -> Result<Value, AutologinError> {
        let resp = client.post(url.clone()).json(payload).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(AutologinError::BackendStatus { status, body: text });
        }

        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        info!(%status, response = %body, "Backend token update succeeded");
        Ok(body)
    }
}
