//! Polymorphic Stellar address: account, muxed account, contract, liquidity
//! pool, or claimable balance, each with a canonical strkey string form.
//!
//! Grounded in `tx/builder/muxed_account.rs` and `tx/builder/account_id.rs`,
//! which convert between `stellar_strkey` types and `xdr::MuxedAccount` /
//! `xdr::AccountId`.

use thiserror::Error;

use crate::strkey::{self, ClaimableBalanceId, LiquidityPoolId};
use crate::xdr;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid address string: {0}")]
    InvalidAddress(String),
    #[error("strkey error: {0}")]
    StrKey(#[from] strkey::Error),
    #[error("xdr error: {0}")]
    Xdr(#[from] xdr::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    Account([u8; 32]),
    Muxed { ed25519: [u8; 32], id: u64 },
    Contract([u8; 32]),
    LiquidityPool([u8; 32]),
    ClaimableBalance([u8; 33]),
}

impl Address {
    /// Parses any recognized strkey prefix (`G`, `M`, `C`, `L`, `B`).
    pub fn from_string(s: &str) -> Result<Self, Error> {
        match s.chars().next() {
            Some('G') => {
                let pk = stellar_strkey::ed25519::PublicKey::from_string(s)?;
                Ok(Address::Account(pk.0))
            }
            Some('M') => {
                let m = stellar_strkey::Strkey::from_string(s)
                    .map_err(|_| Error::InvalidAddress(s.to_string()))?;
                match m {
                    stellar_strkey::Strkey::MuxedAccount(
                        stellar_strkey::MuxedAccount::MuxedEd25519(muxed),
                    ) => Ok(Address::Muxed {
                        ed25519: muxed.ed25519,
                        id: muxed.id,
                    }),
                    _ => Err(Error::InvalidAddress(s.to_string())),
                }
            }
            Some('C') => {
                let c = stellar_strkey::Contract::from_string(s)
                    .map_err(|_| Error::InvalidAddress(s.to_string()))?;
                Ok(Address::Contract(c.0))
            }
            Some('L') => Ok(Address::LiquidityPool(LiquidityPoolId::from_string(s)?.0)),
            Some('B') => Ok(Address::ClaimableBalance(
                ClaimableBalanceId::from_string(s)?.0,
            )),
            _ => Err(Error::InvalidAddress(s.to_string())),
        }
    }

    pub fn to_string(&self) -> String {
        match self {
            Address::Account(raw) => stellar_strkey::ed25519::PublicKey(*raw).to_string(),
            Address::Muxed { ed25519, id } => {
                stellar_strkey::Strkey::MuxedAccount(stellar_strkey::MuxedAccount::MuxedEd25519(
                    stellar_strkey::MuxedEd25519PublicKey {
                        ed25519: *ed25519,
                        id: *id,
                    },
                ))
                .to_string()
            }
            Address::Contract(raw) => stellar_strkey::Contract(*raw).to_string(),
            Address::LiquidityPool(raw) => LiquidityPoolId(*raw).to_string(),
            Address::ClaimableBalance(raw) => ClaimableBalanceId(*raw).to_string(),
        }
    }

    /// Converts to the Soroban `ScAddress` form, where applicable. Muxed,
    /// liquidity-pool and claimable-balance addresses have no `ScAddress`
    /// representation and return `None`.
    pub fn to_sc_address(&self) -> Option<xdr::ScAddress> {
        match self {
            Address::Account(raw) => Some(xdr::ScAddress::Account(xdr::AccountId(
                xdr::PublicKey::PublicKeyTypeEd25519(xdr::Uint256(*raw)),
            ))),
            Address::Contract(raw) => Some(xdr::ScAddress::Contract(xdr::Hash(*raw))),
            _ => None,
        }
    }

    pub fn to_sc_val(&self) -> Option<xdr::ScVal> {
        self.to_sc_address().map(xdr::ScVal::Address)
    }

    pub fn to_muxed_account(&self) -> Option<xdr::MuxedAccount> {
        match self {
            Address::Account(raw) => {
                Some(xdr::MuxedAccount::Ed25519(xdr::Uint256(*raw)))
            }
            Address::Muxed { ed25519, id } => {
                Some(xdr::MuxedAccount::MuxedEd25519(xdr::MuxedAccountMed25519 {
                    id: *id,
                    ed25519: xdr::Uint256(*ed25519),
                }))
            }
            _ => None,
        }
    }

    pub fn to_account_id(&self) -> Option<xdr::AccountId> {
        match self {
            Address::Account(raw) => Some(xdr::AccountId(xdr::PublicKey::PublicKeyTypeEd25519(
                xdr::Uint256(*raw),
            ))),
            _ => None,
        }
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_string())
    }
}

impl From<xdr::AccountId> for Address {
    fn from(id: xdr::AccountId) -> Self {
        let xdr::PublicKey::PublicKeyTypeEd25519(xdr::Uint256(raw)) = id.0;
        Address::Account(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_address_round_trips() {
        let addr = Address::Account([5u8; 32]);
        let s = addr.to_string();
        assert!(s.starts_with('G'));
        assert_eq!(Address::from_string(&s).unwrap(), addr);
    }

    #[test]
    fn contract_address_round_trips() {
        let addr = Address::Contract([6u8; 32]);
        let s = addr.to_string();
        assert!(s.starts_with('C'));
        assert_eq!(Address::from_string(&s).unwrap(), addr);
    }

    #[test]
    fn account_address_has_sc_val() {
        let addr = Address::Account([1u8; 32]);
        assert!(matches!(addr.to_sc_val(), Some(xdr::ScVal::Address(_))));
    }

    #[test]
    fn muxed_address_has_no_sc_val() {
        let addr = Address::Muxed {
            ed25519: [1u8; 32],
            id: 42,
        };
        assert!(addr.to_sc_val().is_none());
    }

    #[test]
    fn invalid_prefix_is_rejected() {
        assert!(Address::from_string("Zabc").is_err());
    }
}
