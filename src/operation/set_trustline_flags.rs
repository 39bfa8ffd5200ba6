use crate::address::{self, Address};
use crate::asset::{self, Asset};
use crate::xdr;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Address(#[from] address::Error),
    #[error(transparent)]
    Asset(#[from] asset::Error),
}

pub struct SetTrustLineFlags(xdr::SetTrustLineFlagsOp);

impl SetTrustLineFlags {
    pub fn new(trustor: &str, asset: &Asset) -> Result<Self, Error> {
        let trustor = Address::from_string(trustor)?
            .to_account_id()
            .ok_or_else(|| address::Error::InvalidAddress(trustor.to_string()))?;
        Ok(Self(xdr::SetTrustLineFlagsOp {
            trustor,
            asset: asset.to_xdr()?,
            clear_flags: 0,
            set_flags: 0,
        }))
    }

    fn set_set_flags(mut self, flag: xdr::TrustLineFlags) -> Self {
        self.0.set_flags |= flag as u32;
        self
    }

    fn set_clear_flags(mut self, flag: xdr::TrustLineFlags) -> Self {
        self.0.clear_flags |= flag as u32;
        self
    }

    #[must_use]
    pub fn set_authorized(self) -> Self {
        self.set_set_flags(xdr::TrustLineFlags::AuthorizedFlag)
    }

    #[must_use]
    pub fn set_authorized_to_maintain_liabilities(self) -> Self {
        self.set_set_flags(xdr::TrustLineFlags::AuthorizedToMaintainLiabilitiesFlag)
    }

    #[must_use]
    pub fn set_trustline_clawback_enabled(self) -> Self {
        self.set_set_flags(xdr::TrustLineFlags::TrustlineClawbackEnabledFlag)
    }

    #[must_use]
    pub fn clear_authorized(self) -> Self {
        self.set_clear_flags(xdr::TrustLineFlags::AuthorizedFlag)
    }

    #[must_use]
    pub fn clear_authorized_to_maintain_liabilities(self) -> Self {
        self.set_clear_flags(xdr::TrustLineFlags::AuthorizedToMaintainLiabilitiesFlag)
    }

    #[must_use]
    pub fn clear_trustline_clawback_enabled(self) -> Self {
        self.set_clear_flags(xdr::TrustLineFlags::TrustlineClawbackEnabledFlag)
    }
}

impl super::Operation for SetTrustLineFlags {
    fn build_body(self) -> xdr::OperationBody {
        xdr::OperationBody::SetTrustLineFlags(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRUSTOR: &str = "GCEZWKCA5VLDNRLN3RPRJMRZOX3Z6G5CHCGSNFHEYVXM3XOJMDS674JZ";
    const ISSUER: &str = "GBRPYHIL2CI3FNQ4BXLFMNDLFJUNPU2HY3ZMFSHONUCEOASW7QC7OX2H";

    #[test]
    fn set_and_clear_flags_combine() {
        let asset = Asset::credit("USD", ISSUER).unwrap();
        let op = SetTrustLineFlags::new(TRUSTOR, &asset)
            .unwrap()
            .set_authorized()
            .set_trustline_clawback_enabled();
        assert_eq!(
            op.0.set_flags,
            xdr::TrustLineFlags::AuthorizedFlag as u32
                | xdr::TrustLineFlags::TrustlineClawbackEnabledFlag as u32
        );
    }
}
