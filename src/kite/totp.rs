use crate::error::AutologinError;
use chrono::Utc;
use totp_rs::{Algorithm, Secret, TOTP};

const DIGITS: usize = 6;
const STEP_SECS: u64 = 30;

/// Current 6-digit TOTP code for a base32 secret.
pub fn generate(secret: &str) -> Result<String, AutologinError> {
    let now = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
    generate_at(secret, now)
}

/// TOTP code for `secret` at the given unix time.
pub fn generate_at(secret: &str, unix_secs: u64) -> Result<String, AutologinError> {
    Ok(build(secret)?.generate(unix_secs))
}

fn build(secret: &str) -> Result<TOTP, AutologinError> {
    let normalized: String = secret
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '=')
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if normalized.is_empty() {
        return Err(AutologinError::TotpSecret("secret is empty".to_string()));
    }
    let bytes = Secret::Encoded(normalized)
        .to_bytes()
        .map_err(|e| AutologinError::TotpSecret(format!("{e:?}")))?;
    Ok(TOTP::new_unchecked(Algorithm::SHA1, DIGITS, 1, STEP_SECS, bytes))
}
