//! Data directory and database path resolution.

use std::path::PathBuf;

use thiserror::Error;

/// Environment variable overriding the data root.
pub const DATA_DIR_ENV: &str = "MCPLANE_DATA_DIR";

/// Errors resolving application paths.
#[derive(Debug, Error)]
pub enum PathError {
    /// No platform data directory could be determined.
    #[error("Could not determine a data directory; set {DATA_DIR_ENV}")]
    NoDataDir,

    /// The data directory could not be created.
    #[error("Failed to create data directory {path}: {source}")]
    CreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Resolve the application data root.
///
/// `MCPLANE_DATA_DIR` wins when set; otherwise the platform data dir
/// (e.g., `~/.local/share/mcplane` on Linux).
pub fn data_root() -> Result<PathBuf, PathError> {
    data_root_from(std::env::var(DATA_DIR_ENV).ok().as_deref())
}

/// Resolve the data root from an explicit override, falling back to the
/// platform data directory.
pub fn data_root_from(override_dir: Option<&str>) -> Result<PathBuf, PathError> {
    if let Some(dir) = override_dir {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    dirs::data_dir()
        .map(|d| d.join("mcplane"))
        .ok_or(PathError::NoDataDir)
}

/// Resolve the database path, creating the data root if needed.
pub fn database_path() -> Result<PathBuf, PathError> {
    let root = data_root()?;
    std::fs::create_dir_all(&root).map_err(|source| PathError::CreateFailed {
        path: root.clone(),
        source,
    })?;
    Ok(root.join("mcplane.db"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        let root = data_root_from(Some("/tmp/mcplane-test")).unwrap();
        assert_eq!(root, PathBuf::from("/tmp/mcplane-test"));
    }

    #[test]
    fn test_empty_override_falls_through() {
        // An empty override behaves as unset.
        let root = data_root_from(Some(""));
        if let Ok(path) = root {
            assert!(path.ends_with("mcplane"));
        }
    }
}
