use crate::strkey;
use crate::xdr;

pub struct LiquidityPoolDeposit(xdr::LiquidityPoolDepositOp);

impl LiquidityPoolDeposit {
    /// `liquidity_pool_id` accepts hex or `L…` strkey and is normalized to
    /// the canonical 32-byte form (spec §4.5).
    pub fn new(
        liquidity_pool_id: &str,
        max_amount_a: i64,
        max_amount_b: i64,
        min_price_n: i32,
        min_price_d: i32,
        max_price_n: i32,
        max_price_d: i32,
    ) -> Result<Self, strkey::Error> {
        let id = strkey::normalize_liquidity_pool_id(liquidity_pool_id)?;
        Ok(Self(xdr::LiquidityPoolDepositOp {
            liquidity_pool_id: xdr::PoolId(xdr::Hash(id)),
            max_amount_a,
            max_amount_b,
            min_price: xdr::Price {
                n: min_price_n,
                d: min_price_d,
            },
            max_price: xdr::Price {
                n: max_price_n,
                d: max_price_d,
            },
        }))
    }
}

impl super::Operation for LiquidityPoolDeposit {
    fn build_body(self) -> xdr::OperationBody {
        xdr::OperationBody::LiquidityPoolDeposit(self.0)
    }
}

pub struct LiquidityPoolWithdraw(xdr::LiquidityPoolWithdrawOp);

impl LiquidityPoolWithdraw {
    pub fn new(
        liquidity_pool_id: &str,
        amount: i64,
        min_amount_a: i64,
        min_amount_b: i64,
    ) -> Result<Self, strkey::Error> {
        let id = strkey::normalize_liquidity_pool_id(liquidity_pool_id)?;
        Ok(Self(xdr::LiquidityPoolWithdrawOp {
            liquidity_pool_id: xdr::PoolId(xdr::Hash(id)),
            amount,
            min_amount_a,
            min_amount_b,
        }))
    }
}

impl super::Operation for LiquidityPoolWithdraw {
    fn build_body(self) -> xdr::OperationBody {
        xdr::OperationBody::LiquidityPoolWithdraw(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_hex_pool_id() {
        let hex_id = hex::encode([4u8; 32]);
        let op = LiquidityPoolDeposit::new(&hex_id, 1, 1, 1, 1, 1, 1).unwrap();
        assert_eq!(op.0.liquidity_pool_id.0 .0, [4u8; 32]);
    }
}
