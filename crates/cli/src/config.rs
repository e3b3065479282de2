//! Command-line flags and the immutable configuration built from them.

use crate::error::{CliError, Result};
use clap::{ArgAction, Parser};
use ledgerboot_bootstrap::{validate_config, validate_genesis_block, BootstrapOptions};
use std::path::PathBuf;
use std::time::Duration;

/// Raw command-line flags.
#[derive(Parser, Debug)]
#[command(name = "ledgerboot")]
#[command(about = "Provision account keys or bootstrap a ledger network", long_about = None)]
pub struct Flags {
    /// Trusted peers' addresses and public keys
    #[arg(long, value_name = "PATH", default_value = "")]
    pub config: String,

    /// Genesis block for sending to the network
    #[arg(long = "genesis_block", value_name = "PATH", default_value = "")]
    pub genesis_block: String,

    /// Choose if the account does not exist yet
    #[arg(
        long = "new_account",
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    pub new_account: bool,

    /// Name of the account
    #[arg(long, default_value = "")]
    pub name: String,

    /// Per-peer connect and write timeout, in milliseconds
    #[arg(long = "peer_timeout_ms", default_value_t = 5000)]
    pub peer_timeout_ms: u64,
}

/// The operating mode selected by the flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Generate `<name>.pub` and `<name>.priv`.
    NewAccount { name: String },
    /// Load peers and genesis block, then run the bootstrap collaborator.
    Bootstrap {
        config: PathBuf,
        genesis_block: PathBuf,
    },
}

/// Configuration for one invocation, built once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub bootstrap: BootstrapOptions,
}

/// An empty flag value means the flag was not given.
fn non_empty(value: String) -> Option<PathBuf> {
    (!value.is_empty()).then(|| PathBuf::from(value))
}

impl Config {
    /// Validate the flags and select the mode.
    ///
    /// Supplied input paths are validated before the mode is chosen, so a bad
    /// `--config` aborts even when `--new_account` is set. `--new_account`
    /// wins over the bootstrap flags.
    pub fn from_flags(flags: Flags) -> Result<Self> {
        let config = non_empty(flags.config);
        let genesis_block = non_empty(flags.genesis_block);

        if let Some(path) = &config {
            validate_config(path)?;
        }
        if let Some(path) = &genesis_block {
            validate_genesis_block(path)?;
        }
        if flags.peer_timeout_ms == 0 {
            return Err(CliError::InvalidFlags(
                "--peer_timeout_ms must be positive".into(),
            ));
        }

        let mode = if flags.new_account {
            if flags.name.is_empty() {
                return Err(CliError::InvalidFlags(
                    "--new_account requires a non-empty --name".into(),
                ));
            }
            Mode::NewAccount { name: flags.name }
        } else if let (Some(config), Some(genesis_block)) = (config, genesis_block) {
            Mode::Bootstrap {
                config,
                genesis_block,
            }
        } else {
            return Err(CliError::InvalidFlags(
                "expected --new_account --name=<name>, or both --config and --genesis_block"
                    .into(),
            ));
        };

        Ok(Self {
            mode,
            bootstrap: BootstrapOptions {
                connect_timeout: Duration::from_millis(flags.peer_timeout_ms),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::fs;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Result<Config> {
        let argv = std::iter::once("ledgerboot").chain(args.iter().copied());
        Config::from_flags(Flags::try_parse_from(argv).unwrap())
    }

    /// A scratch directory holding non-empty `peers.json` and `genesis.json`.
    fn inputs() -> (TempDir, String, String) {
        let dir = TempDir::new().unwrap();
        let peers = dir.path().join("peers.json");
        let genesis = dir.path().join("genesis.json");
        fs::write(&peers, "{}").unwrap();
        fs::write(&genesis, "{}").unwrap();
        (
            dir,
            format!("--config={}", peers.display()),
            format!("--genesis_block={}", genesis.display()),
        )
    }

    #[test]
    fn test_new_account_mode() {
        let config = parse(&["--new_account", "--name=alice"]).unwrap();
        assert_eq!(
            config.mode,
            Mode::NewAccount {
                name: "alice".into()
            }
        );
    }

    #[test]
    fn test_bootstrap_mode() {
        let (_dir, config_flag, genesis_flag) = inputs();
        let config = parse(&[&config_flag, &genesis_flag]).unwrap();
        assert!(matches!(config.mode, Mode::Bootstrap { .. }));
        assert_eq!(config.bootstrap.connect_timeout, Duration::from_millis(5000));
    }

    #[test]
    fn test_new_account_takes_priority() {
        let (_dir, config_flag, genesis_flag) = inputs();
        let config = parse(&["--new_account", "--name=bob", &config_flag, &genesis_flag]).unwrap();
        assert_eq!(config.mode, Mode::NewAccount { name: "bob".into() });
    }

    #[test]
    fn test_new_account_requires_name() {
        let err = parse(&["--new_account"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().starts_with("Invalid flags"));
    }

    #[test]
    fn test_partial_bootstrap_flags_rejected() {
        let (_dir, config_flag, genesis_flag) = inputs();
        for args in [
            vec![config_flag.as_str()],
            vec![genesis_flag.as_str()],
            vec![genesis_flag.as_str(), "--config="],
            vec![],
        ] {
            let err = parse(&args).unwrap_err();
            assert!(matches!(err, CliError::InvalidFlags(_)), "{args:?}");
        }
    }

    #[test]
    fn test_missing_input_file_rejected_before_mode() {
        let err = parse(&["--new_account", "--name=carol", "--config=/nonexistent/peers.json"])
            .unwrap_err();
        assert!(matches!(err, CliError::InvalidInput(_)));
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let (_dir, config_flag, genesis_flag) = inputs();
        let err = parse(&[&config_flag, &genesis_flag, "--peer_timeout_ms=0"]).unwrap_err();
        assert!(matches!(err, CliError::InvalidFlags(_)));
    }

    #[test]
    fn test_empty_config_with_genesis_is_invalid_flags() {
        let (_dir, _config_flag, genesis_flag) = inputs();
        let err = parse(&[&genesis_flag, "--config="]).unwrap_err();
        assert!(matches!(err, CliError::InvalidFlags(_)));
        assert!(err.to_string().starts_with("Invalid flags"));
    }

    #[test]
    fn test_new_account_ignores_empty_bootstrap_flags() {
        let config = parse(&["--new_account", "--name=bob", "--config=", "--genesis_block="]).unwrap();
        assert_eq!(config.mode, Mode::NewAccount { name: "bob".into() });
    }

    #[test]
    fn test_new_account_explicit_values() {
        let config = parse(&["--new_account=true", "--name=dan"]).unwrap();
        assert_eq!(config.mode, Mode::NewAccount { name: "dan".into() });

        let (_dir, config_flag, genesis_flag) = inputs();
        let config = parse(&["--new_account=false", "--name=dan", &config_flag, &genesis_flag])
            .unwrap();
        assert!(matches!(config.mode, Mode::Bootstrap { .. }));

        let err = parse(&["--new_account=false", "--name=dan"]).unwrap_err();
        assert!(matches!(err, CliError::InvalidFlags(_)));
    }

    #[test]
    fn test_unknown_flag_fails_parsing() {
        assert!(Flags::try_parse_from(["ledgerboot", "--bogus"]).is_err());
    }
}
