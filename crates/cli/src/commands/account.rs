//! Account key provisioning.

use crate::error::{CliError, Result};
use colored::Colorize;
use ledgerboot_core::KeyPair;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Paths of a provisioned key pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFiles {
    pub public: PathBuf,
    pub private: PathBuf,
}

impl KeyFiles {
    pub fn new(dir: &Path, name: &str) -> Self {
        Self {
            public: dir.join(format!("{}.pub", name)),
            private: dir.join(format!("{}.priv", name)),
        }
    }
}

/// Provision a new account in the current directory and report it.
pub fn run(name: &str) -> Result<()> {
    let files = create_account(Path::new("."), name, &mut OsRng)?;

    println!(
        "{}",
        "Public and private key has been generated in current directory".green()
    );
    println!("  Public key:  {}", files.public.display().to_string().bright_black());
    println!("  Private key: {}", files.private.display().to_string().bright_black());

    Ok(())
}

/// Generate a key pair and write `<name>.pub` and `<name>.priv` under `dir`.
///
/// Fails without touching the filesystem if `<name>.pub` already exists.
/// Both files are staged and synced first, then renamed into place, public
/// key first. A `.pub` is never overwritten, and a `.pub` whose `.priv`
/// could not be placed is removed again.
pub fn create_account<R: RngCore + CryptoRng>(
    dir: &Path,
    name: &str,
    rng: &mut R,
) -> Result<KeyFiles> {
    let files = KeyFiles::new(dir, name);
    if files.public.exists() {
        return Err(CliError::FileExists(files.public));
    }

    let keypair = KeyPair::generate_with(rng);
    debug!(public_key = %keypair.public_key(), "generated key pair");

    let public = stage(&files.public, &keypair.public_key_hex())?;
    let private = stage(&files.private, &keypair.private_key_hex())?;

    place(public, private, &files)?;

    info!(
        public = %files.public.display(),
        private = %files.private.display(),
        "saved account key pair"
    );
    Ok(files)
}

/// Rename staged key files into place, public key first.
///
/// The `.pub` rename fails rather than replace a file that appeared after
/// the existence check.
fn place(public: NamedTempFile, private: NamedTempFile, files: &KeyFiles) -> Result<()> {
    public.persist_noclobber(&files.public).map_err(|e| {
        if e.error.kind() == std::io::ErrorKind::AlreadyExists {
            CliError::FileExists(files.public.clone())
        } else {
            CliError::io(format!("failed to write {}", files.public.display()), e.error)
        }
    })?;

    if let Err(e) = private.persist(&files.private) {
        if let Err(cleanup) = fs::remove_file(&files.public) {
            warn!(
                path = %files.public.display(),
                error = %cleanup,
                "failed to remove public key after private key write failed"
            );
        }
        return Err(CliError::io(
            format!("failed to write {}", files.private.display()),
            e.error,
        ));
    }

    Ok(())
}

/// Write `contents` to a synced temporary file next to `target`.
fn stage(target: &Path, contents: &str) -> Result<NamedTempFile> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let context = || format!("failed to stage {}", target.display());

    let mut file = NamedTempFile::new_in(dir).map_err(|e| CliError::io(context(), e))?;
    file.write_all(contents.as_bytes())
        .and_then(|()| file.as_file().sync_all())
        .map_err(|e| CliError::io(context(), e))?;

    Ok(file)
}
