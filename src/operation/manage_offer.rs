use crate::asset::{self, Asset};
use crate::xdr;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Asset(#[from] asset::Error),
    #[error("price numerator and denominator must both be positive")]
    InvalidPrice,
}

fn price(n: i32, d: i32) -> Result<xdr::Price, Error> {
    if n <= 0 || d <= 0 {
        return Err(Error::InvalidPrice);
    }
    Ok(xdr::Price { n, d })
}

pub struct ManageSellOffer(xdr::ManageSellOfferOp);

impl ManageSellOffer {
    /// `amount = 0` cancels the offer; `offer_id = 0` creates a new one.
    pub fn new(
        selling: &Asset,
        buying: &Asset,
        amount: i64,
        price_n: i32,
        price_d: i32,
        offer_id: i64,
    ) -> Result<Self, Error> {
        Ok(Self(xdr::ManageSellOfferOp {
            selling: selling.to_xdr()?,
            buying: buying.to_xdr()?,
            amount,
            price: price(price_n, price_d)?,
            offer_id,
        }))
    }
}

impl super::Operation for ManageSellOffer {
    fn build_body(self) -> xdr::OperationBody {
        xdr::OperationBody::ManageSellOffer(self.0)
    }
}

pub struct ManageBuyOffer(xdr::ManageBuyOfferOp);

impl ManageBuyOffer {
    pub fn new(
        selling: &Asset,
        buying: &Asset,
        buy_amount: i64,
        price_n: i32,
        price_d: i32,
        offer_id: i64,
    ) -> Result<Self, Error> {
        Ok(Self(xdr::ManageBuyOfferOp {
            selling: selling.to_xdr()?,
            buying: buying.to_xdr()?,
            buy_amount,
            price: price(price_n, price_d)?,
            offer_id,
        }))
    }
}

impl super::Operation for ManageBuyOffer {
    fn build_body(self) -> xdr::OperationBody {
        xdr::OperationBody::ManageBuyOffer(self.0)
    }
}

pub struct CreatePassiveSellOffer(xdr::CreatePassiveSellOfferOp);

impl CreatePassiveSellOffer {
    pub fn new(
        selling: &Asset,
        buying: &Asset,
        amount: i64,
        price_n: i32,
        price_d: i32,
    ) -> Result<Self, Error> {
        Ok(Self(xdr::CreatePassiveSellOfferOp {
            selling: selling.to_xdr()?,
            buying: buying.to_xdr()?,
            amount,
            price: price(price_n, price_d)?,
        }))
    }
}

impl super::Operation for CreatePassiveSellOffer {
    fn build_body(self) -> xdr::OperationBody {
        xdr::OperationBody::CreatePassiveSellOffer(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_amount_cancels_offer() {
        let op = ManageSellOffer::new(&Asset::Native, &Asset::Native, 0, 1, 1, 5).unwrap();
        assert_eq!(op.0.amount, 0);
    }

    #[test]
    fn rejects_non_positive_price() {
        assert!(matches!(
            ManageSellOffer::new(&Asset::Native, &Asset::Native, 100, 0, 1, 0),
            Err(Error::InvalidPrice)
        ));
    }
}
