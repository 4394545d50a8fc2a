use crate::error::AutologinError;
use std::{fs, path::Path};
use tracing::info;

/// Write the raw access token to `path`, replacing any previous contents.
pub fn write_token(path: &Path, access_token: &str) -> Result<(), AutologinError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, access_token)?;
    info!(path = %path.display(), "access token written to file");
    Ok(())
}
