use crate::address::{self, Address};
use crate::xdr;

/// `AccountMerge`'s body is the destination `MuxedAccount` directly — no
/// wrapping struct in the XDR schema.
pub struct AccountMerge(xdr::MuxedAccount);

impl AccountMerge {
    pub fn new(destination: &str) -> Result<Self, address::Error> {
        let destination = Address::from_string(destination)?
            .to_muxed_account()
            .ok_or_else(|| address::Error::InvalidAddress(destination.to_string()))?;
        Ok(Self(destination))
    }
}

impl super::Operation for AccountMerge {
    fn build_body(self) -> xdr::OperationBody {
        xdr::OperationBody::AccountMerge(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_account_address() {
        let op =
            AccountMerge::new("GCEZWKCA5VLDNRLN3RPRJMRZOX3Z6G5CHCGSNFHEYVXM3XOJMDS674JZ").unwrap();
        assert!(matches!(op.0, xdr::MuxedAccount::Ed25519(_)));
    }
}
