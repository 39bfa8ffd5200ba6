use crate::address::{self, Address};
use crate::amount;
use crate::asset::{self, Asset};
use crate::xdr;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Address(#[from] address::Error),
    #[error(transparent)]
    Asset(#[from] asset::Error),
    #[error(transparent)]
    Amount(#[from] amount::Error),
    #[error("path may contain at most 5 assets")]
    PathTooLong,
}

fn build_path(path: &[Asset]) -> Result<xdr::VecM<xdr::Asset, 5>, Error> {
    let xdr_assets = path
        .iter()
        .map(Asset::to_xdr)
        .collect::<Result<Vec<_>, _>>()?;
    xdr_assets.try_into().map_err(|_| Error::PathTooLong)
}

pub struct PathPaymentStrictSend(xdr::PathPaymentStrictSendOp);

impl PathPaymentStrictSend {
    pub fn new(
        send_asset: &Asset,
        send_amount: &str,
        destination: &str,
        dest_asset: &Asset,
        dest_min: &str,
        path: &[Asset],
    ) -> Result<Self, Error> {
        let destination = Address::from_string(destination)?
            .to_muxed_account()
            .ok_or_else(|| address::Error::InvalidAddress(destination.to_string()))?;
        Ok(Self(xdr::PathPaymentStrictSendOp {
            send_asset: send_asset.to_xdr()?,
            send_amount: amount::parse_stroops(send_amount)?,
            destination,
            dest_asset: dest_asset.to_xdr()?,
            dest_min: amount::parse_stroops(dest_min)?,
            path: build_path(path)?,
        }))
    }
}

impl super::Operation for PathPaymentStrictSend {
    fn build_body(self) -> xdr::OperationBody {
        xdr::OperationBody::PathPaymentStrictSend(self.0)
    }
}

pub struct PathPaymentStrictReceive(xdr::PathPaymentStrictReceiveOp);

impl PathPaymentStrictReceive {
    pub fn new(
        send_asset: &Asset,
        send_max: &str,
        destination: &str,
        dest_asset: &Asset,
        dest_amount: &str,
        path: &[Asset],
    ) -> Result<Self, Error> {
        let destination = Address::from_string(destination)?
            .to_muxed_account()
            .ok_or_else(|| address::Error::InvalidAddress(destination.to_string()))?;
        Ok(Self(xdr::PathPaymentStrictReceiveOp {
            send_asset: send_asset.to_xdr()?,
            send_max: amount::parse_stroops(send_max)?,
            destination,
            dest_asset: dest_asset.to_xdr()?,
            dest_amount: amount::parse_stroops(dest_amount)?,
            path: build_path(path)?,
        }))
    }
}

impl super::Operation for PathPaymentStrictReceive {
    fn build_body(self) -> xdr::OperationBody {
        xdr::OperationBody::PathPaymentStrictReceive(self.0)
    }
}
