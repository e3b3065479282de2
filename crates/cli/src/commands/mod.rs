//! CLI operating modes.

use crate::config::{Config, Mode};
use crate::error::Result;
use ledgerboot_bootstrap::BootstrapNetworkImpl;

pub mod account;
pub mod bootstrap;

/// Run the mode selected by `config`.
pub fn run(config: Config) -> Result<()> {
    match config.mode {
        Mode::NewAccount { name } => account::run(&name),
        Mode::Bootstrap {
            config: peers,
            genesis_block,
        } => {
            let network = BootstrapNetworkImpl::new(config.bootstrap);
            bootstrap::dispatch(&network, &peers, &genesis_block)
        }
    }
}
