//! Genesis block structures.

use crate::crypto::{KeyPair, PublicKey, Signature};
use crate::hash::{hash, merkle_root, Hash};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Errors found while checking a genesis block.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BlockError {
    #[error("genesis block height must be 0 (got {0})")]
    InvalidHeight(u64),

    #[error("genesis block prev_hash must be zero")]
    InvalidPrevHash,

    #[error("genesis block contains no transactions")]
    NoTransactions,

    #[error("genesis transaction {0} contains no commands")]
    EmptyTransaction(usize),

    #[error("genesis block merkle root mismatch (expected {expected}, got {got})")]
    InvalidMerkleRoot { expected: Hash, got: Hash },

    #[error("genesis block signature verification failed")]
    InvalidSignature,
}

/// A ledger command carried by a genesis transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Register a peer in the initial peer set.
    AddPeer {
        address: String,
        public_key: PublicKey,
    },
    CreateDomain {
        domain_id: String,
    },
    CreateAccount {
        account_name: String,
        domain_id: String,
        public_key: PublicKey,
    },
}

/// A transaction applied while the ledger is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisTransaction {
    /// Account id of the creator, e.g. `admin@test`.
    pub creator: String,
    pub commands: Vec<Command>,
}

impl GenesisTransaction {
    pub fn new(creator: impl Into<String>, commands: Vec<Command>) -> Self {
        Self {
            creator: creator.into(),
            commands,
        }
    }

    pub fn hash(&self) -> Hash {
        let encoded = serde_json::to_vec(self).expect("serialization should not fail");
        hash(&encoded)
    }
}

/// The header of a genesis block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Block height, always 0 for genesis.
    pub height: u64,
    /// Unix timestamp in milliseconds.
    pub created_at: u64,
    pub prev_hash: Hash,
    /// Merkle root of transaction hashes.
    pub merkle_root: Hash,
}

impl BlockHeader {
    pub fn hash(&self) -> Hash {
        let encoded = serde_json::to_vec(self).expect("serialization should not fail");
        hash(&encoded)
    }

    /// Get the current Unix timestamp in milliseconds.
    pub fn current_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    }
}

/// The first block of a ledger, handed to the trusted peers at bootstrap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisBlock {
    pub header: BlockHeader,
    pub transactions: Vec<GenesisTransaction>,
    /// Key that signed the header, if the block is signed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer: Option<PublicKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<Signature>,
}

impl GenesisBlock {
    /// Create an unsigned genesis block over the given transactions.
    pub fn new(transactions: Vec<GenesisTransaction>) -> Self {
        let merkle_root = Self::compute_merkle_root(&transactions);
        Self {
            header: BlockHeader {
                height: 0,
                created_at: BlockHeader::current_timestamp(),
                prev_hash: Hash::ZERO,
                merkle_root,
            },
            transactions,
            signer: None,
            signature: None,
        }
    }

    fn compute_merkle_root(transactions: &[GenesisTransaction]) -> Hash {
        let hashes: Vec<Hash> = transactions.iter().map(GenesisTransaction::hash).collect();
        merkle_root(&hashes)
    }

    /// Get the block hash (hash of the header).
    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    /// Sign the header with the given key pair.
    pub fn signed(mut self, keypair: &KeyPair) -> Self {
        self.signature = Some(keypair.sign(self.hash().as_bytes()));
        self.signer = Some(keypair.public_key());
        self
    }

    /// Check the structural rules a genesis block must satisfy.
    ///
    /// A signature is optional, but when present it must verify against
    /// the embedded signer key.
    pub fn validate(&self) -> Result<(), BlockError> {
        if self.header.height != 0 {
            return Err(BlockError::InvalidHeight(self.header.height));
        }
        if self.header.prev_hash != Hash::ZERO {
            return Err(BlockError::InvalidPrevHash);
        }
        if self.transactions.is_empty() {
            return Err(BlockError::NoTransactions);
        }
        if let Some(index) = self.transactions.iter().position(|tx| tx.commands.is_empty()) {
            return Err(BlockError::EmptyTransaction(index));
        }

        let expected = Self::compute_merkle_root(&self.transactions);
        if expected != self.header.merkle_root {
            return Err(BlockError::InvalidMerkleRoot {
                expected,
                got: self.header.merkle_root,
            });
        }

        match (&self.signer, &self.signature) {
            (None, None) => Ok(()),
            (Some(signer), Some(signature)) => signer
                .verify(self.hash().as_bytes(), signature)
                .map_err(|_| BlockError::InvalidSignature),
            _ => Err(BlockError::InvalidSignature),
        }
    }

    /// Peers registered by `AddPeer` commands, in block order.
    pub fn peer_commands(&self) -> impl Iterator<Item = (&str, &PublicKey)> {
        self.transactions
            .iter()
            .flat_map(|tx| tx.commands.iter())
            .filter_map(|cmd| match cmd {
                Command::AddPeer {
                    address,
                    public_key,
                } => Some((address.as_str(), public_key)),
                _ => None,
            })
    }
}
