//! Client-side core of the Stellar protocol: XDR-backed transaction
//! construction, Ed25519 signing, Soroban authorization and RPC
//! orchestration, and a resilient Horizon SSE stream reader.
//!
//! This crate builds and signs transactions and talks to Soroban RPC /
//! Horizon; it does not run a node, validate consensus, or persist any
//! state beyond what a caller explicitly hands it back in (e.g. an SSE
//! cursor).

pub mod xdr;

pub mod address;
pub mod amount;
pub mod asset;
pub mod crypto;
pub mod horizon;
pub mod network;
pub mod operation;
pub mod sse;
pub mod strkey;
pub mod tx;

pub mod soroban;

pub use address::Address;
pub use asset::Asset;
pub use crypto::KeyPair;
pub use network::Network;
pub use tx::{Transaction, TransactionBuilder};
