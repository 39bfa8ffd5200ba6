//! The Soroban smart-contract layer: authorization entry signing,
//! ContractSpec-driven argument marshalling, and the RPC simulate/prepare/
//! submit/poll pipeline.

pub mod auth;
pub mod client;
pub mod contractspec;
