use crate::config::Config;
use crate::error::AutologinError;
use crate::kite::totp;

use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Map, Value, json};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

const CHROME_ARGS: [&str; 3] = ["--headless=new", "--no-sandbox", "--disable-dev-shm-usage"];
const SUBMIT_BUTTON: &str = "//button[@type='submit']";
const REDIRECT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Something that can complete the Kite login and hand back a request token.
pub trait RequestTokenSource {
    fn request_token(&self, cfg: &Config) -> impl Future<Output = Result<String, AutologinError>>;
}

/// Headless Chrome login driven over WebDriver.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserLogin;

impl RequestTokenSource for BrowserLogin {
    async fn request_token(&self, cfg: &Config) -> Result<String, AutologinError> {
        login_and_get_request_token(cfg).await
    }
}

/// `{base}?api_key=...&v=3`
pub fn login_url(base: &Url, api_key: &str) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair("api_key", api_key)
        .append_pair("v", "3");
    url
}

/// Run the user id / password / TOTP flow and return the redirect's request token.
pub async fn login_and_get_request_token(cfg: &Config) -> Result<String, AutologinError> {
    let client = connect(&cfg.webdriver_url).await?;
    let result = drive_login(&client, cfg).await;
    if let Err(e) = client.close().await {
        warn!(error = %e, "failed to close WebDriver session");
    }
    result
}

async fn connect(webdriver_url: &Url) -> Result<Client, AutologinError> {
    let mut caps = Map::new();
    caps.insert(
        "goog:chromeOptions".to_string(),
        json!({ "args": CHROME_ARGS }),
    );
    let client = ClientBuilder::native()
        .capabilities(caps)
        .connect(webdriver_url.as_str())
        .await?;
    debug!(webdriver = %webdriver_url, "WebDriver session opened");
    Ok(client)
}

async fn drive_login(client: &Client, cfg: &Config) -> Result<String, AutologinError> {
    let url = login_url(&cfg.kite_login_url, &cfg.api_key);
    client.goto(url.as_str()).await?;

    // Step 1: user id + password
    let user_field = client
        .wait()
        .at_most(cfg.login_timeout)
        .for_element(Locator::Id("userid"))
        .await?;
    let password_field = client.find(Locator::Id("password")).await?;
    user_field.clear().await?;
    user_field.send_keys(&cfg.user_id).await?;
    password_field.clear().await?;
    password_field.send_keys(&cfg.password).await?;
    client.find(Locator::XPath(SUBMIT_BUTTON)).await?.click().await?;
    info!(user_id = %cfg.user_id, "credentials submitted");

    // Step 2: TOTP, generated only once the field is about to be filled
    let totp_field = client
        .wait()
        .at_most(cfg.login_timeout)
        .for_element(Locator::Id("totp"))
        .await?;
    let code = totp::generate(&cfg.totp_secret)?;
    totp_field.clear().await?;
    totp_field.send_keys(&code).await?;
    client.find(Locator::XPath(SUBMIT_BUTTON)).await?.click().await?;
    info!("TOTP submitted");

    let redirected = wait_for_redirect(client, cfg.login_timeout).await?;
    extract_request_token(&redirected)
}

async fn wait_for_redirect(client: &Client, timeout: Duration) -> Result<Url, AutologinError> {
    let deadline = Instant::now() + timeout;
    loop {
        let current = client.current_url().await?;
        if has_request_token(&current) {
            return Ok(current);
        }
        if Instant::now() >= deadline {
            return Err(AutologinError::LoginTimeout(timeout));
        }
        tokio::time::sleep(REDIRECT_POLL_INTERVAL).await;
    }
}

fn has_request_token(url: &Url) -> bool {
    url.as_str().to_ascii_lowercase().contains("request_token=")
}

/// Pull `request_token` out of the post-login redirect URL.
pub fn extract_request_token(url: &Url) -> Result<String, AutologinError> {
    url.query_pairs()
        .find(|(key, _)| key.eq_ignore_ascii_case("request_token"))
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AutologinError::MissingRequestToken(url.to_string()))
}
