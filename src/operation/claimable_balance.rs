use crate::address::{self, Address};
use crate::amount;
use crate::asset::{self, Asset};
use crate::strkey;
use crate::xdr;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Address(#[from] address::Error),
    #[error(transparent)]
    Asset(#[from] asset::Error),
    #[error(transparent)]
    Amount(#[from] amount::Error),
    #[error(transparent)]
    StrKey(#[from] strkey::Error),
    #[error("too many claimants (max 10)")]
    TooManyClaimants,
}

pub struct CreateClaimableBalance(xdr::CreateClaimableBalanceOp);

impl CreateClaimableBalance {
    pub fn new(
        asset: &Asset,
        amount_decimal: &str,
        claimants: Vec<(String, xdr::ClaimPredicate)>,
    ) -> Result<Self, Error> {
        let claimants = claimants
            .into_iter()
            .map(|(dest, predicate)| {
                let destination = Address::from_string(&dest)?
                    .to_account_id()
                    .ok_or_else(|| address::Error::InvalidAddress(dest.clone()))?;
                Ok(xdr::Claimant::ClaimantTypeV0(xdr::ClaimantV0 {
                    destination,
                    predicate,
                }))
            })
            .collect::<Result<Vec<_>, address::Error>>()?;
        Ok(Self(xdr::CreateClaimableBalanceOp {
            asset: asset.to_xdr()?,
            amount: amount::parse_stroops(amount_decimal)?,
            claimants: claimants.try_into().map_err(|_| Error::TooManyClaimants)?,
        }))
    }
}

impl super::Operation for CreateClaimableBalance {
    fn build_body(self) -> xdr::OperationBody {
        xdr::OperationBody::CreateClaimableBalance(self.0)
    }
}

fn parse_balance_id(id: &str) -> Result<xdr::ClaimableBalanceId, Error> {
    let raw = strkey::normalize_claimable_balance_id(id)?;
    Ok(xdr::ClaimableBalanceId::ClaimableBalanceIdTypeV0(xdr::Hash(
        raw,
    )))
}

pub struct ClaimClaimableBalance(xdr::ClaimClaimableBalanceOp);

impl ClaimClaimableBalance {
    pub fn new(balance_id: &str) -> Result<Self, Error> {
        Ok(Self(xdr::ClaimClaimableBalanceOp {
            balance_id: parse_balance_id(balance_id)?,
        }))
    }
}

impl super::Operation for ClaimClaimableBalance {
    fn build_body(self) -> xdr::OperationBody {
        xdr::OperationBody::ClaimClaimableBalance(self.0)
    }
}

pub struct ClawbackClaimableBalance(xdr::ClawbackClaimableBalanceOp);

impl ClawbackClaimableBalance {
    pub fn new(balance_id: &str) -> Result<Self, Error> {
        Ok(Self(xdr::ClawbackClaimableBalanceOp {
            balance_id: parse_balance_id(balance_id)?,
        }))
    }
}

impl super::Operation for ClawbackClaimableBalance {
    fn build_body(self) -> xdr::OperationBody {
        xdr::OperationBody::ClawbackClaimableBalance(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_with_unconditional_claimant() {
        let op = CreateClaimableBalance::new(
            &Asset::Native,
            "10",
            vec![(
                "GCEZWKCA5VLDNRLN3RPRJMRZOX3Z6G5CHCGSNFHEYVXM3XOJMDS674JZ".to_string(),
                xdr::ClaimPredicate::Unconditional,
            )],
        )
        .unwrap();
        assert_eq!(op.0.amount, 100_000_000);
    }
}
