//! Secure storage of the cloud API credential.
//!
//! The synthesis and translation endpoints authenticate with an API key.
//! It is kept out of the main config file, in the user's local data
//! directory with owner-only permissions.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Credentials {
    /// API key for the cloud speech services
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
}

/// Saves the cloud API key, replacing any existing one.
///
/// # Errors
/// - If the data directory cannot be determined or created
/// - If the credentials file cannot be written
pub fn save_api_key(key: &str) -> Result<()> {
    let path = credentials_path()?;
    let credentials = Credentials {
        api_key: Some(key.to_string()),
    };
    let content = toml::to_string_pretty(&credentials)?;
    fs::write(&path, content)?;
    restrict_permissions(&path)?;
    tracing::info!("API key saved");
    Ok(())
}

/// Reads the stored cloud API key, if any.
///
/// # Errors
/// - If the data directory cannot be determined
/// - If the credentials file exists but cannot be parsed
pub fn get_api_key() -> Result<Option<String>> {
    let path = credentials_path()?;
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)?;
    let credentials: Credentials = toml::from_str(&content)
        .map_err(|e| anyhow!("Malformed credentials file {}: {e}", path.display()))?;
    Ok(credentials.api_key)
}

/// Removes the stored credential.
pub fn clear_api_key() -> Result<()> {
    let path = credentials_path()?;
    if path.exists() {
        fs::remove_file(&path)?;
        tracing::info!("API key cleared");
    }
    Ok(())
}

/// Requires a stored API key, with a hint on how to set one.
pub fn require_api_key() -> Result<String> {
    get_api_key()?.ok_or_else(|| {
        anyhow!("No API key configured. Run 'voxlink auth' to store your cloud API key.")
    })
}

fn credentials_path() -> Result<PathBuf> {
    let data_dir = dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not determine home directory"))?
        .join(".local")
        .join("share")
        .join("voxlink");
    fs::create_dir_all(&data_dir)?;
    Ok(data_dir.join("credentials.toml"))
}

#[cfg(unix)]
fn restrict_permissions(path: &PathBuf) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o600);
    fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &PathBuf) -> Result<()> {
    Ok(())
}
