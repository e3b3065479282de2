//! Trusted peer definitions.

use crate::crypto::PublicKey;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Errors found while checking a trusted-peer list.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeerError {
    #[error("trusted peer list is empty")]
    Empty,

    #[error("invalid peer address {0:?} (expected host:port)")]
    InvalidAddress(String),

    #[error("duplicate peer address {0}")]
    DuplicateAddress(String),

    #[error("duplicate peer public key {0}")]
    DuplicatePublicKey(String),
}

/// A peer the node trusts at bootstrap time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    /// Network address in `host:port` form.
    pub address: String,
    pub public_key: PublicKey,
}

impl Peer {
    pub fn new(address: impl Into<String>, public_key: PublicKey) -> Self {
        Self {
            address: address.into(),
            public_key,
        }
    }

    fn check_address(&self) -> Result<(), PeerError> {
        let invalid = || PeerError::InvalidAddress(self.address.clone());
        let (host, port) = self.address.rsplit_once(':').ok_or_else(invalid)?;
        if host.is_empty() || port.parse::<u16>().is_err() {
            return Err(invalid());
        }
        Ok(())
    }
}

/// The ordered set of trusted peers read from `--config`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerList {
    pub peers: Vec<Peer>,
}

impl PeerList {
    pub fn new(peers: Vec<Peer>) -> Self {
        Self { peers }
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Peer> {
        self.peers.iter()
    }

    /// Check the list is usable for bootstrapping.
    ///
    /// Order is preserved and significant: peers are contacted in list order.
    pub fn validate(&self) -> Result<(), PeerError> {
        if self.peers.is_empty() {
            return Err(PeerError::Empty);
        }

        let mut addresses = HashSet::new();
        let mut keys = HashSet::new();
        for peer in &self.peers {
            peer.check_address()?;
            if !addresses.insert(peer.address.as_str()) {
                return Err(PeerError::DuplicateAddress(peer.address.clone()));
            }
            if !keys.insert(peer.public_key.to_bytes()) {
                return Err(PeerError::DuplicatePublicKey(peer.public_key.to_hex()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;

    fn peer(address: &str) -> Peer {
        Peer::new(address, KeyPair::generate().public_key())
    }

    #[test]
    fn test_valid_list() {
        let list = PeerList::new(vec![peer("10.0.0.1:50541"), peer("node-b.local:50541")]);
        assert_eq!(list.validate(), Ok(()));
    }

    #[test]
    fn test_empty_list_rejected() {
        assert_eq!(PeerList::default().validate(), Err(PeerError::Empty));
    }

    #[test]
    fn test_bad_addresses_rejected() {
        for bad in ["10.0.0.1", ":50541", "10.0.0.1:port", "10.0.0.1:70000"] {
            let list = PeerList::new(vec![peer(bad)]);
            assert_eq!(
                list.validate(),
                Err(PeerError::InvalidAddress(bad.to_string())),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_duplicate_address_rejected() {
        let list = PeerList::new(vec![peer("10.0.0.1:1"), peer("10.0.0.1:1")]);
        assert!(matches!(list.validate(), Err(PeerError::DuplicateAddress(_))));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let key = KeyPair::generate().public_key();
        let list = PeerList::new(vec![
            Peer::new("10.0.0.1:1", key),
            Peer::new("10.0.0.2:1", key),
        ]);
        assert!(matches!(list.validate(), Err(PeerError::DuplicatePublicKey(_))));
    }

    #[test]
    fn test_json_format() {
        let key = KeyPair::generate().public_key();
        let json = format!(
            r#"{{"peers":[{{"address":"127.0.0.1:50541","public_key":"{}"}}]}}"#,
            key.to_hex()
        );
        let list: PeerList = serde_json::from_str(&json).unwrap();
        assert_eq!(list.peers, vec![Peer::new("127.0.0.1:50541", key)]);
    }
}
