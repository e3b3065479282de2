//! Network bootstrap for ledgerboot.
//!
//! This crate is the collaborator behind the CLI's bootstrap mode:
//! - Validators for the `--config` and `--genesis_block` input files
//! - Parsing and checking of trusted peer lists and genesis blocks
//! - Delivery of the genesis block to every trusted peer
//!
//! # Example
//!
//! ```rust,no_run
//! use ledgerboot_bootstrap::{BootstrapNetwork, BootstrapNetworkImpl, BootstrapOptions};
//! use std::path::Path;
//!
//! let network = BootstrapNetworkImpl::new(BootstrapOptions::default());
//! let peers = network.parse_trusted_peers(Path::new("peers.json")).unwrap();
//! let block = network.parse_genesis_block(Path::new("genesis.json")).unwrap();
//! network.run_network(peers, block).unwrap();
//! ```

pub mod network;
pub mod validators;

// Re-export commonly used types
pub use network::{BootstrapError, BootstrapNetwork, BootstrapNetworkImpl, BootstrapOptions};
pub use validators::{validate_config, validate_genesis_block, ValidationError};
