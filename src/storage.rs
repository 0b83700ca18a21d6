use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{Error, Result};

const TOKEN_FILE_NAME: &str = "access_token";

/// Returns the application data directory, creating it if needed.
///
/// 1. `~/.local/share/taskflow` (on Linux).
/// 2. `./` (fallback when no data directory is known).
pub fn data_dir() -> PathBuf {
    let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    p.push("taskflow");
    if !p.exists() {
        let _ = fs::create_dir_all(&p);
    }
    p
}

/// File-backed home of the bearer token.
///
/// The auth service is its only writer.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Uses `token_path` from the config, or `access_token` in [`data_dir`].
    pub fn from_config(config: &Config) -> Self {
        match &config.token_path {
            Some(path) => Self::new(path),
            None => Self::new(data_dir().join(TOKEN_FILE_NAME)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored token.
    ///
    /// Returns `None` if the file does not exist, cannot be read, or is blank.
    pub fn load(&self) -> Option<String> {
        fs::read_to_string(&self.path)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Writes the token, replacing any previous one. Owner-only on Unix.
    pub fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    Error::Storage(format!("mkdir {}: {}", parent.display(), e))
                })?;
            }
        }
        fs::write(&self.path, token)
            .map_err(|e| Error::Storage(format!("write {}: {}", self.path.display(), e)))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600)) {
                tracing::warn!("failed to chmod 0600 {}: {}", self.path.display(), e);
            }
        }
        Ok(())
    }

    /// Deletes the token file. A missing file is not an error.
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .map_err(|e| Error::Storage(format!("delete {}: {}", self.path.display(), e)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_load_clear_cycle() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = TokenStore::new(tmp.path().join("nested").join("access_token"));

        assert_eq!(store.load(), None);
        store.save("abc.def.ghi").unwrap();
        assert_eq!(store.load().as_deref(), Some("abc.def.ghi"));

        store.clear().unwrap();
        assert_eq!(store.load(), None);
        // Clearing twice is fine.
        store.clear().unwrap();
    }

    #[test]
    fn whitespace_only_file_reads_as_absent() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("access_token");
        fs::write(&path, "  \n").unwrap();
        assert_eq!(TokenStore::new(path).load(), None);
    }

    #[cfg(unix)]
    #[test]
    fn token_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().unwrap();
        let store = TokenStore::new(tmp.path().join("access_token"));
        store.save("t").unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn config_path_wins_over_data_dir() {
        let config = Config {
            token_path: Some(PathBuf::from("/tmp/custom_token")),
            ..Config::default()
        };
        assert_eq!(TokenStore::from_config(&config).path(), Path::new("/tmp/custom_token"));
    }
}
