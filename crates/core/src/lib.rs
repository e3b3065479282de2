//! Core primitives for ledgerboot.
//!
//! This crate provides the types shared by the bootstrap utility:
//! - Ed25519 key pairs and their hex encoding
//! - Blake3 hashing and merkle roots
//! - Trusted peer lists
//! - Genesis blocks

pub mod block;
pub mod crypto;
pub mod hash;
pub mod peer;

// Re-export commonly used types at the crate root
pub use block::{BlockError, BlockHeader, Command, GenesisBlock, GenesisTransaction};
pub use crypto::{CryptoError, KeyPair, PublicKey, Signature};
pub use hash::{hash, hash_concat, merkle_root, Hash};
pub use peer::{Peer, PeerError, PeerList};
