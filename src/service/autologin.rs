use crate::api::backend_api::BackendApi;
use crate::config::Config;
use crate::error::AutologinError;
use crate::kite::endpoints::KiteEndpoints;
use crate::kite::login::{BrowserLogin, RequestTokenSource};
use crate::service::token_store;
use crate::types::backend::TokenUpdatePayload;
use crate::types::kite::KiteSession;

use serde_json::Value;
use std::time::Duration;
use tracing::info;

/// Shared HTTP client for the Kite API and the backend.
pub fn build_http_client(cfg: &Config) -> Result<reqwest::Client, AutologinError> {
    let mut builder = reqwest::Client::builder()
        .user_agent(concat!("kite-autologin/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(5))
        .timeout(cfg.backend_timeout);
    if let Some(proxy_url) = cfg.proxy.as_ref() {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
    }
    Ok(builder.build()?)
}

/// Exchange the request token and persist the access token if configured.
pub async fn generate_access_token(
    cfg: &Config,
    client: &reqwest::Client,
    request_token: &str,
) -> Result<KiteSession, AutologinError> {
    let session = KiteEndpoints::generate_session(
        client,
        &cfg.kite_api_url,
        &cfg.api_key,
        &cfg.api_secret,
        request_token,
    )
    .await?;

    if let Some(path) = cfg.token_output_path.as_deref() {
        let token = session
            .access_token()
            .ok_or(AutologinError::MissingAccessToken)?;
        token_store::write_token(path, token)?;
    }
    Ok(session)
}

/// Send the fresh token to the backend. Fails before any request when the
/// session has no access token.
pub async fn notify_backend(
    cfg: &Config,
    client: &reqwest::Client,
    session: &KiteSession,
) -> Result<Value, AutologinError> {
    let payload =
        TokenUpdatePayload::from_session(&cfg.user_id, session, &cfg.backend_source_label)?;
    BackendApi::post_token_update(
        client,
        &cfg.backend_update_url,
        &payload,
        cfg.retry_policy(),
    )
    .await
}

/// Full run with the headless browser login.
pub async fn run(cfg: &Config) -> Result<KiteSession, AutologinError> {
    run_with(cfg, &BrowserLogin).await
}

pub async fn run_with<S: RequestTokenSource>(
    cfg: &Config,
    login: &S,
) -> Result<KiteSession, AutologinError> {
    let client = build_http_client(cfg)?;

    info!(user_id = %cfg.user_id, "Starting automated Zerodha login");
    let request_token = login.request_token(cfg).await?;
    info!(%request_token, "Request token received");

    let session = generate_access_token(cfg, &client, &request_token).await?;
    info!(access_token = %session.masked_access_token(), "Access token generated");

    notify_backend(cfg, &client, &session).await?;
    info!(backend = %cfg.backend_update_url, "All done");
    Ok(session)
}
