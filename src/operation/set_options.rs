use std::str::FromStr;

use crate::address::{self, Address};
use crate::xdr;

pub struct SetOptions(xdr::SetOptionsOp);

impl Default for SetOptions {
    fn default() -> Self {
        Self(xdr::SetOptionsOp {
            inflation_dest: None,
            clear_flags: None,
            set_flags: None,
            master_weight: None,
            low_threshold: None,
            med_threshold: None,
            high_threshold: None,
            home_domain: None,
            signer: None,
        })
    }
}

impl SetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_inflation_dest(mut self, dest: &str) -> Result<Self, address::Error> {
        let account_id = Address::from_string(dest)?
            .to_account_id()
            .ok_or_else(|| address::Error::InvalidAddress(dest.to_string()))?;
        self.0.inflation_dest = Some(account_id);
        Ok(self)
    }

    fn set_flag(mut self, flag: xdr::AccountFlags) -> Self {
        let flags = self.0.set_flags.unwrap_or(0);
        self.0.set_flags = Some(flags | flag as u32);
        self
    }

    fn clear_flag(mut self, flag: xdr::AccountFlags) -> Self {
        let flags = self.0.clear_flags.unwrap_or(0);
        self.0.clear_flags = Some(flags | flag as u32);
        self
    }

    #[must_use]
    pub fn set_required_flag(self) -> Self {
        self.set_flag(xdr::AccountFlags::RequiredFlag)
    }

    #[must_use]
    pub fn set_revocable_flag(self) -> Self {
        self.set_flag(xdr::AccountFlags::RevocableFlag)
    }

    #[must_use]
    pub fn set_immutable_flag(self) -> Self {
        self.set_flag(xdr::AccountFlags::ImmutableFlag)
    }

    #[must_use]
    pub fn set_clawback_enabled_flag(self) -> Self {
        self.set_flag(xdr::AccountFlags::ClawbackEnabledFlag)
    }

    #[must_use]
    pub fn clear_required_flag(self) -> Self {
        self.clear_flag(xdr::AccountFlags::RequiredFlag)
    }

    #[must_use]
    pub fn clear_revocable_flag(self) -> Self {
        self.clear_flag(xdr::AccountFlags::RevocableFlag)
    }

    #[must_use]
    pub fn set_master_weight(mut self, weight: u32) -> Self {
        self.0.master_weight = Some(weight);
        self
    }

    #[must_use]
    pub fn set_thresholds(mut self, low: u32, medium: u32, high: u32) -> Self {
        self.0.low_threshold = Some(low);
        self.0.med_threshold = Some(medium);
        self.0.high_threshold = Some(high);
        self
    }

    pub fn set_home_domain(mut self, domain: &str) -> Result<Self, xdr::Error> {
        self.0.home_domain = Some(xdr::String32(xdr::StringM::from_str(domain)?));
        Ok(self)
    }

    #[must_use]
    pub fn set_signer(mut self, key: xdr::SignerKey, weight: u32) -> Self {
        self.0.signer = Some(xdr::Signer {
            key,
            weight,
        });
        self
    }
}

impl super::Operation for SetOptions {
    fn build_body(self) -> xdr::OperationBody {
        xdr::OperationBody::SetOptions(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_fields_set() {
        let op = SetOptions::new();
        assert!(op.0.master_weight.is_none());
        assert!(op.0.home_domain.is_none());
    }

    #[test]
    fn flags_combine_across_calls() {
        let op = SetOptions::new()
            .set_required_flag()
            .set_revocable_flag();
        assert_eq!(
            op.0.set_flags.unwrap(),
            xdr::AccountFlags::RequiredFlag as u32 | xdr::AccountFlags::RevocableFlag as u32
        );
    }
}
