//! The bootstrap collaborator: load trusted peers and the genesis block,
//! then hand the block to every trusted peer.
//!
//! Delivery is one blocking TCP connection per peer carrying the genesis
//! block as a single newline-terminated JSON document.

use ledgerboot_core::{BlockError, GenesisBlock, Peer, PeerError, PeerList};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur while bootstrapping the network.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to read {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("malformed JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid trusted peers: {0}")]
    InvalidPeers(#[from] PeerError),

    #[error("invalid genesis block: {0}")]
    InvalidGenesis(#[from] BlockError),

    #[error("failed to encode genesis block: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("genesis block delivery failed for {failed} of {total} peers")]
    Delivery { failed: usize, total: usize },
}

pub type Result<T> = std::result::Result<T, BootstrapError>;

/// The narrow interface the CLI drives in bootstrap mode.
pub trait BootstrapNetwork {
    /// Load and check the trusted peer list.
    fn parse_trusted_peers(&self, path: &Path) -> Result<PeerList>;

    /// Load and check the genesis block.
    fn parse_genesis_block(&self, path: &Path) -> Result<GenesisBlock>;

    /// Start network participation from the given peers and genesis block.
    ///
    /// Returns once the bootstrap round has finished.
    fn run_network(&self, peers: PeerList, block: GenesisBlock) -> Result<()>;
}

/// Bootstrap tuning knobs.
#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    /// Timeout for connecting to, and writing to, a single peer.
    pub connect_timeout: Duration,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_millis(5000),
        }
    }
}

/// File-backed, TCP-delivering [`BootstrapNetwork`].
#[derive(Debug, Clone, Default)]
pub struct BootstrapNetworkImpl {
    options: BootstrapOptions,
}

impl BootstrapNetworkImpl {
    pub fn new(options: BootstrapOptions) -> Self {
        Self { options }
    }

    fn deliver(&self, peer: &Peer, payload: &[u8]) -> io::Result<()> {
        let addrs: Vec<SocketAddr> = peer.address.to_socket_addrs()?.collect();
        let mut last_err =
            io::Error::new(io::ErrorKind::NotFound, "address resolved to nothing");

        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.options.connect_timeout) {
                Ok(mut stream) => {
                    stream.set_write_timeout(Some(self.options.connect_timeout))?;
                    stream.write_all(payload)?;
                    stream.flush()?;
                    stream.shutdown(Shutdown::Write)?;
                    debug!(peer = %peer.address, %addr, "delivered genesis block");
                    return Ok(());
                }
                Err(e) => last_err = e,
            }
        }

        Err(last_err)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path).map_err(|source| BootstrapError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| BootstrapError::Json {
        path: path.to_path_buf(),
        source,
    })
}

impl BootstrapNetwork for BootstrapNetworkImpl {
    fn parse_trusted_peers(&self, path: &Path) -> Result<PeerList> {
        let peers: PeerList = read_json(path)?;
        peers.validate()?;
        info!(count = peers.len(), path = %path.display(), "loaded trusted peers");
        Ok(peers)
    }

    fn parse_genesis_block(&self, path: &Path) -> Result<GenesisBlock> {
        let block: GenesisBlock = read_json(path)?;
        block.validate()?;
        info!(
            hash = %block.hash(),
            transactions = block.transactions.len(),
            "loaded genesis block"
        );
        Ok(block)
    }

    fn run_network(&self, peers: PeerList, block: GenesisBlock) -> Result<()> {
        let genesis_peers: HashSet<&str> = block.peer_commands().map(|(addr, _)| addr).collect();
        for peer in peers.iter() {
            if !genesis_peers.contains(peer.address.as_str()) {
                warn!(peer = %peer.address, "trusted peer is not registered by the genesis block");
            }
        }

        let mut payload = serde_json::to_vec(&block).map_err(BootstrapError::Encode)?;
        payload.push(b'\n');

        let total = peers.len();
        let mut failed = 0;
        for peer in peers.iter() {
            if let Err(e) = self.deliver(peer, &payload) {
                warn!(peer = %peer.address, error = %e, "genesis block delivery failed");
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(BootstrapError::Delivery { failed, total });
        }

        info!(peers = total, hash = %block.hash(), "genesis block delivered to all trusted peers");
        Ok(())
    }
}
