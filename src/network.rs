//! Network selection: RPC endpoint plus the passphrase that binds every
//! transaction hash and Soroban auth preimage to one chain.
//!
//! The upstream CLI threads network passphrase and RPC URL through a
//! `clap::Args` struct (`config/network.rs`) with env-var fallbacks; a
//! library has no CLI surface, so this is the plain value-type equivalent,
//! with the passphrase literals centralized here instead of repeated at
//! each CLI call site (`deploy.rs`, `commands/contract/upload.rs`).

use crate::crypto::sha256;

pub const PUBLIC_NETWORK_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";
pub const TESTNET_NETWORK_PASSPHRASE: &str = "Test SDF Network ; September 2015";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    pub rpc_url: String,
    pub network_passphrase: String,
}

impl Network {
    pub fn new(rpc_url: impl Into<String>, network_passphrase: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            network_passphrase: network_passphrase.into(),
        }
    }

    pub fn public(rpc_url: impl Into<String>) -> Self {
        Self::new(rpc_url, PUBLIC_NETWORK_PASSPHRASE)
    }

    pub fn testnet(rpc_url: impl Into<String>) -> Self {
        Self::new(rpc_url, TESTNET_NETWORK_PASSPHRASE)
    }

    /// `network_id = SHA-256(network_passphrase)`, the 32-byte prefix bound
    /// into every transaction hash and Soroban authorization preimage.
    pub fn id(&self) -> [u8; 32] {
        sha256(self.network_passphrase.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn testnet_id_is_stable() {
        let n = Network::testnet("https://soroban-testnet.stellar.org");
        let expected = sha256(TESTNET_NETWORK_PASSPHRASE.as_bytes());
        assert_eq!(n.id(), expected);
    }

    #[test]
    fn different_passphrases_give_different_ids() {
        let a = Network::public("https://horizon.stellar.org");
        let b = Network::testnet("https://soroban-testnet.stellar.org");
        assert_ne!(a.id(), b.id());
    }
}
