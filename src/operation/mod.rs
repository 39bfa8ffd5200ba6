//! Operation variants, each a small builder that knows how to produce its
//! `xdr::OperationBody`.
//!
//! Grounded in `tx/builder/operations.rs` + `operations/*.rs`: every
//! variant is a newtype wrapping the XDR op struct, with a `::new(...)`
//! constructor and `#[must_use]` chainable setters for optional fields, and
//! a shared `Operation` trait with a single `build_body` method.

mod account_merge;
mod allow_trust;
mod bump_sequence;
mod change_trust;
mod claimable_balance;
mod create_account;
mod footprint;
mod invoke_host_function;
mod liquidity_pool;
mod manage_data;
mod manage_offer;
mod path_payment;
mod payment;
mod set_options;
mod set_trustline_flags;
mod sponsorship;

pub use account_merge::AccountMerge;
pub use allow_trust::AllowTrust;
pub use bump_sequence::BumpSequence;
pub use change_trust::ChangeTrust;
pub use claimable_balance::{ClaimClaimableBalance, ClawbackClaimableBalance, CreateClaimableBalance};
pub use create_account::CreateAccount;
pub use footprint::{ExtendFootprintTtl, RestoreFootprint};
pub use invoke_host_function::InvokeHostFunction;
pub use liquidity_pool::{LiquidityPoolDeposit, LiquidityPoolWithdraw};
pub use manage_data::ManageData;
pub use manage_offer::{CreatePassiveSellOffer, ManageBuyOffer, ManageSellOffer};
pub use path_payment::{PathPaymentStrictReceive, PathPaymentStrictSend};
pub use payment::{Clawback, Payment};
pub use set_options::SetOptions;
pub use set_trustline_flags::SetTrustLineFlags;
pub use sponsorship::{BeginSponsoringFutureReserves, EndSponsoringFutureReserves, RevokeSponsorship};

use crate::xdr;

/// Implemented by every operation builder: produces the XDR `OperationBody`
/// discriminant and payload for this variant.
pub trait Operation {
    fn build_body(self) -> xdr::OperationBody;
}

/// Wraps any `Operation` builder with an optional source account distinct
/// from the transaction's own source, and produces the final `xdr::Operation`.
pub fn build(op: impl Operation, source_account: Option<crate::address::Address>) -> xdr::Operation {
    xdr::Operation {
        source_account: source_account.and_then(|a| a.to_muxed_account()),
        body: op.build_body(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_without_source_account_leaves_it_none() {
        let op = build(create_account::CreateAccount::new("GCEZWKCA5VLDNRLN3RPRJMRZOX3Z6G5CHCGSNFHEYVXM3XOJMDS674JZ", None).unwrap(), None);
        assert!(op.source_account.is_none());
    }
}
