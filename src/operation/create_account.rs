use crate::address::{self, Address};
use crate::xdr;

/// Stroop value of one lumen, used as the default starting balance.
pub const ONE_XLM: i64 = 10_000_000;

pub struct CreateAccount(xdr::CreateAccountOp);

impl CreateAccount {
    /// `starting_balance` defaults to 1 XLM when `None`.
    pub fn new(destination: &str, starting_balance: Option<i64>) -> Result<Self, address::Error> {
        let destination = Address::from_string(destination)?
            .to_account_id()
            .ok_or_else(|| address::Error::InvalidAddress(destination.to_string()))?;
        Ok(Self(xdr::CreateAccountOp {
            destination,
            starting_balance: starting_balance.unwrap_or(ONE_XLM),
        }))
    }
}

impl super::Operation for CreateAccount {
    fn build_body(self) -> xdr::OperationBody {
        xdr::OperationBody::CreateAccount(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_one_xlm() {
        let op = CreateAccount::new(
            "GCEZWKCA5VLDNRLN3RPRJMRZOX3Z6G5CHCGSNFHEYVXM3XOJMDS674JZ",
            None,
        )
        .unwrap();
        assert_eq!(op.0.starting_balance, ONE_XLM);
    }
}
