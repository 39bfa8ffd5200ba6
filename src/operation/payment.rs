use crate::address::{self, Address};
use crate::amount;
use crate::asset::{self, Asset};
use crate::xdr;

pub struct Payment(xdr::PaymentOp);

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Address(#[from] address::Error),
    #[error(transparent)]
    Asset(#[from] asset::Error),
    #[error(transparent)]
    Amount(#[from] amount::Error),
}

impl Payment {
    pub fn new(destination: &str, asset: &Asset, amount_decimal: &str) -> Result<Self, Error> {
        let destination = Address::from_string(destination)?
            .to_muxed_account()
            .ok_or_else(|| address::Error::InvalidAddress(destination.to_string()))?;
        Ok(Self(xdr::PaymentOp {
            destination,
            asset: asset.to_xdr()?,
            amount: amount::parse_stroops(amount_decimal)?,
        }))
    }
}

impl super::Operation for Payment {
    fn build_body(self) -> xdr::OperationBody {
        xdr::OperationBody::Payment(self.0)
    }
}

pub struct Clawback(xdr::ClawbackOp);

impl Clawback {
    pub fn new(asset: &Asset, from: &str, amount_decimal: &str) -> Result<Self, Error> {
        let from = Address::from_string(from)?
            .to_muxed_account()
            .ok_or_else(|| address::Error::InvalidAddress(from.to_string()))?;
        Ok(Self(xdr::ClawbackOp {
            asset: asset.to_xdr()?,
            from,
            amount: amount::parse_stroops(amount_decimal)?,
        }))
    }
}

impl super::Operation for Clawback {
    fn build_body(self) -> xdr::OperationBody {
        xdr::OperationBody::Clawback(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEST: &str = "GCEZWKCA5VLDNRLN3RPRJMRZOX3Z6G5CHCGSNFHEYVXM3XOJMDS674JZ";

    #[test]
    fn payment_parses_amount_to_stroops() {
        let op = Payment::new(DEST, &Asset::Native, "10.5").unwrap();
        assert_eq!(op.0.amount, 105_000_000);
    }

    #[test]
    fn payment_rejects_negative_amount() {
        assert!(Payment::new(DEST, &Asset::Native, "-1").is_err());
    }
}
