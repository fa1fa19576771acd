//! Local credential persistence.
//!
//! One JSON file per user, readable only by its owner. Writes go through a
//! temp file in the same directory and an atomic rename, so a crash never
//! leaves a half-written file behind.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

/// Overrides the directory holding the credentials file.
pub const CONFIG_DIR_ENV: &str = "CATALOG_CONFIG_DIR";

/// File name inside the configuration directory.
pub const CREDENTIALS_FILE: &str = "credentials.json";

/// What a logged-in CLI remembers between invocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub server_url: String,
    pub refresh_token: String,
    pub access_token: String,
    /// Cached `exp` of the access token; unknown when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token_expiry: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$CATALOG_CONFIG_DIR/credentials.json`, else
    /// `<user config dir>/catalog/credentials.json`.
    pub fn from_default_location() -> Result<Self> {
        Self::resolve(std::env::var_os(CONFIG_DIR_ENV).map(PathBuf::from))
    }

    fn resolve(override_dir: Option<PathBuf>) -> Result<Self> {
        if let Some(dir) = override_dir.filter(|d| !d.as_os_str().is_empty()) {
            return Ok(Self::new(dir.join(CREDENTIALS_FILE)));
        }
        let base = dirs::config_dir().ok_or(ClientError::NoConfigDir)?;
        Ok(Self::new(base.join("catalog").join(CREDENTIALS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, credentials: &Credentials) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        create_private_dir(dir)?;

        let mut json = serde_json::to_vec_pretty(credentials).map_err(io::Error::other)?;
        json.push(b'\n');

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(fs::Permissions::from_mode(0o600))?;
        }
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        debug!("saved credentials to {}", self.path.display());
        Ok(())
    }

    pub fn load(&self) -> Result<Credentials> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(ClientError::NotLoggedIn),
            Err(e) => return Err(e.into()),
        };

        let credentials: Credentials =
            serde_json::from_str(&raw).map_err(|e| ClientError::CorruptCredentials {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        if credentials.server_url.is_empty() || credentials.refresh_token.is_empty() {
            return Err(ClientError::NotLoggedIn);
        }
        Ok(credentials)
    }

    /// Remove the file. Succeeds when there is nothing to remove.
    pub fn delete(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("removed credentials at {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)
}
