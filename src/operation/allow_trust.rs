use crate::address::{self, Address};
use crate::xdr;

/// Historical, deprecated operation kept only to decode envelopes already
/// on the wire. New code should build `SetTrustLineFlags` instead (spec §9);
/// this builder exists so old envelopes round-trip, not for new
/// transactions.
pub struct AllowTrust(xdr::AllowTrustOp);

impl AllowTrust {
    fn trustor_account_id(trustor: &str) -> Result<xdr::AccountId, address::Error> {
        Address::from_string(trustor)?
            .to_account_id()
            .ok_or_else(|| address::Error::InvalidAddress(trustor.to_string()))
    }
}

impl TryFrom<xdr::OperationBody> for AllowTrust {
    type Error = &'static str;

    fn try_from(body: xdr::OperationBody) -> Result<Self, Self::Error> {
        match body {
            xdr::OperationBody::AllowTrust(op) => Ok(Self(op)),
            _ => Err("operation body is not AllowTrust"),
        }
    }
}

impl AllowTrust {
    pub fn new(trustor: &str, asset_code: xdr::AssetCode, authorize: u32) -> Result<Self, address::Error> {
        Ok(Self(xdr::AllowTrustOp {
            trustor: Self::trustor_account_id(trustor)?,
            asset: asset_code,
            authorize,
        }))
    }
}

impl super::Operation for AllowTrust {
    fn build_body(self) -> xdr::OperationBody {
        xdr::OperationBody::AllowTrust(self.0)
    }
}
