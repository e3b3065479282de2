//! Network bootstrap dispatch.

use crate::error::{CliError, Result};
use anyhow::Context;
use ledgerboot_bootstrap::BootstrapNetwork;
use std::path::Path;
use tracing::info;

/// Load the trusted peers and the genesis block, then run the network.
///
/// Each collaborator call happens exactly once, in order, and the first
/// failure stops the sequence.
pub fn dispatch<N: BootstrapNetwork>(network: &N, config: &Path, genesis_block: &Path) -> Result<()> {
    let peers = network
        .parse_trusted_peers(config)
        .with_context(|| format!("failed to load trusted peers from {}", config.display()))
        .map_err(CliError::Collaborator)?;

    let block = network
        .parse_genesis_block(genesis_block)
        .with_context(|| {
            format!(
                "failed to load genesis block from {}",
                genesis_block.display()
            )
        })
        .map_err(CliError::Collaborator)?;

    info!(peers = peers.len(), genesis = %block.hash(), "starting network bootstrap");

    network
        .run_network(peers, block)
        .context("network bootstrap failed")
        .map_err(CliError::Collaborator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use ledgerboot_bootstrap::network::Result as BootstrapResult;
    use ledgerboot_bootstrap::BootstrapError;
    use ledgerboot_core::{
        Command, GenesisBlock, GenesisTransaction, KeyPair, Peer, PeerError, PeerList,
    };
    use std::cell::RefCell;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        ParsePeers(String),
        ParseGenesis(String),
        Run { peers: usize },
    }

    /// Records every call; optionally fails peer parsing.
    #[derive(Default)]
    struct RecordingNetwork {
        calls: RefCell<Vec<Call>>,
        fail_peers: bool,
    }

    impl BootstrapNetwork for RecordingNetwork {
        fn parse_trusted_peers(&self, path: &Path) -> BootstrapResult<PeerList> {
            self.calls
                .borrow_mut()
                .push(Call::ParsePeers(path.display().to_string()));
            if self.fail_peers {
                return Err(BootstrapError::InvalidPeers(PeerError::Empty));
            }
            Ok(PeerList::new(vec![Peer::new(
                "127.0.0.1:50541",
                KeyPair::generate().public_key(),
            )]))
        }

        fn parse_genesis_block(&self, path: &Path) -> BootstrapResult<GenesisBlock> {
            self.calls
                .borrow_mut()
                .push(Call::ParseGenesis(path.display().to_string()));
            Ok(GenesisBlock::new(vec![GenesisTransaction::new(
                "admin@test",
                vec![Command::CreateDomain {
                    domain_id: "test".into(),
                }],
            )]))
        }

        fn run_network(&self, peers: PeerList, _block: GenesisBlock) -> BootstrapResult<()> {
            self.calls.borrow_mut().push(Call::Run { peers: peers.len() });
            Ok(())
        }
    }

    #[test]
    fn test_calls_collaborator_once_in_order() {
        let network = RecordingNetwork::default();
        dispatch(&network, Path::new("peers.json"), Path::new("genesis.json")).unwrap();

        assert_eq!(
            network.calls.into_inner(),
            vec![
                Call::ParsePeers("peers.json".into()),
                Call::ParseGenesis("genesis.json".into()),
                Call::Run { peers: 1 },
            ]
        );
    }

    #[test]
    fn test_parse_failure_stops_dispatch() {
        let network = RecordingNetwork {
            fail_peers: true,
            ..Default::default()
        };
        let err = dispatch(&network, Path::new("peers.json"), Path::new("genesis.json"))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Collaborator);
        assert!(err
            .to_string()
            .contains("failed to load trusted peers from peers.json"));
        assert_eq!(
            network.calls.into_inner(),
            vec![Call::ParsePeers("peers.json".into())]
        );
    }
}
