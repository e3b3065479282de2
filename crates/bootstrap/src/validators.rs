//! Validators for flag-supplied input paths.
//!
//! They only check that a path names a readable, non-empty regular file;
//! content is checked by the parsers in [`crate::network`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while validating an input path.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("--{flag}: file not found: {}", path.display())]
    NotFound { flag: &'static str, path: PathBuf },

    #[error("--{flag}: not a regular file: {}", path.display())]
    NotAFile { flag: &'static str, path: PathBuf },

    #[error("--{flag}: file is empty: {}", path.display())]
    Empty { flag: &'static str, path: PathBuf },

    #[error("--{flag}: cannot read {}: {source}", path.display())]
    Unreadable {
        flag: &'static str,
        path: PathBuf,
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ValidationError>;

/// Validate the trusted-peer definitions path given by `--config`.
pub fn validate_config(path: &Path) -> Result<()> {
    validate_input_file("config", path)
}

/// Validate the genesis block path given by `--genesis_block`.
pub fn validate_genesis_block(path: &Path) -> Result<()> {
    validate_input_file("genesis_block", path)
}

fn validate_input_file(flag: &'static str, path: &Path) -> Result<()> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ValidationError::NotFound {
                flag,
                path: path.to_path_buf(),
            })
        }
        Err(source) => {
            return Err(ValidationError::Unreadable {
                flag,
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if !metadata.is_file() {
        return Err(ValidationError::NotAFile {
            flag,
            path: path.to_path_buf(),
        });
    }
    if metadata.len() == 0 {
        return Err(ValidationError::Empty {
            flag,
            path: path.to_path_buf(),
        });
    }

    fs::File::open(path).map_err(|source| ValidationError::Unreadable {
        flag,
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_existing_file_accepted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("peers.json");
        fs::write(&path, "{}").unwrap();

        assert!(validate_config(&path).is_ok());
        assert!(validate_genesis_block(&path).is_ok());
    }

    #[test]
    fn test_missing_file_rejected() {
        let dir = TempDir::new().unwrap();
        let err = validate_config(&dir.path().join("missing.json")).unwrap_err();

        assert!(matches!(err, ValidationError::NotFound { flag: "config", .. }));
        assert!(err.to_string().starts_with("--config: file not found"));
    }

    #[test]
    fn test_directory_rejected() {
        let dir = TempDir::new().unwrap();
        let err = validate_genesis_block(dir.path()).unwrap_err();

        assert!(matches!(
            err,
            ValidationError::NotAFile {
                flag: "genesis_block",
                ..
            }
        ));
    }

    #[test]
    fn test_empty_file_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("genesis.json");
        fs::write(&path, "").unwrap();

        assert!(matches!(
            validate_genesis_block(&path),
            Err(ValidationError::Empty { .. })
        ));
    }
}
