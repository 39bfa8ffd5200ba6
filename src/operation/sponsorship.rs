use crate::address::{self, Address};
use crate::xdr;

pub struct BeginSponsoringFutureReserves(xdr::BeginSponsoringFutureReservesOp);

impl BeginSponsoringFutureReserves {
    pub fn new(sponsored_id: &str) -> Result<Self, address::Error> {
        let sponsored_id = Address::from_string(sponsored_id)?
            .to_account_id()
            .ok_or_else(|| address::Error::InvalidAddress(sponsored_id.to_string()))?;
        Ok(Self(xdr::BeginSponsoringFutureReservesOp { sponsored_id }))
    }
}

impl super::Operation for BeginSponsoringFutureReserves {
    fn build_body(self) -> xdr::OperationBody {
        xdr::OperationBody::BeginSponsoringFutureReserves(self.0)
    }
}

/// Carries no payload in the XDR schema: `OperationBody::EndSponsoringFutureReserves`.
pub struct EndSponsoringFutureReserves;

impl EndSponsoringFutureReserves {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EndSponsoringFutureReserves {
    fn default() -> Self {
        Self::new()
    }
}

impl super::Operation for EndSponsoringFutureReserves {
    fn build_body(self) -> xdr::OperationBody {
        xdr::OperationBody::EndSponsoringFutureReserves
    }
}

pub struct RevokeSponsorship(xdr::OperationBody);

impl RevokeSponsorship {
    pub fn ledger_entry(key: xdr::LedgerKey) -> Self {
        Self(xdr::OperationBody::RevokeSponsorship(
            xdr::RevokeSponsorshipOp::LedgerEntry(key),
        ))
    }

    pub fn signer(account_id: &str, signer_key: xdr::SignerKey) -> Result<Self, address::Error> {
        let account_id = Address::from_string(account_id)?
            .to_account_id()
            .ok_or_else(|| address::Error::InvalidAddress(account_id.to_string()))?;
        Ok(Self(xdr::OperationBody::RevokeSponsorship(
            xdr::RevokeSponsorshipOp::Signer(xdr::RevokeSponsorshipOpSigner {
                account_id,
                signer_key,
            }),
        )))
    }
}

impl super::Operation for RevokeSponsorship {
    fn build_body(self) -> xdr::OperationBody {
        self.0
    }
}
