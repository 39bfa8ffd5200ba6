use crate::asset::{self, Asset};
use crate::xdr;

/// `i64::MAX`; the maximum trust limit.
pub const MAX_LIMIT: i64 = i64::MAX;

pub struct ChangeTrust(xdr::ChangeTrustOp);

impl ChangeTrust {
    /// `limit = 0` removes the trustline (the network additionally requires
    /// a zero balance for that to succeed). Defaults to `MAX_LIMIT`.
    pub fn new(line: &Asset, limit: Option<i64>) -> Result<Self, asset::Error> {
        Ok(Self(xdr::ChangeTrustOp {
            line: to_change_trust_asset(line)?,
            limit: limit.unwrap_or(MAX_LIMIT),
        }))
    }

    pub fn pool_share(
        asset_a: &Asset,
        asset_b: &Asset,
        fee: i32,
        limit: Option<i64>,
    ) -> Result<Self, asset::Error> {
        Ok(Self(xdr::ChangeTrustOp {
            line: xdr::ChangeTrustAsset::PoolShare(xdr::LiquidityPoolParameters::LiquidityPoolConstantProduct(
                xdr::LiquidityPoolConstantProductParameters {
                    asset_a: asset_a.to_xdr()?,
                    asset_b: asset_b.to_xdr()?,
                    fee,
                },
            )),
            limit: limit.unwrap_or(MAX_LIMIT),
        }))
    }
}

fn to_change_trust_asset(asset: &Asset) -> Result<xdr::ChangeTrustAsset, asset::Error> {
    Ok(match asset.to_xdr()? {
        xdr::Asset::Native => xdr::ChangeTrustAsset::Native,
        xdr::Asset::CreditAlphanum4(a) => xdr::ChangeTrustAsset::CreditAlphanum4(a),
        xdr::Asset::CreditAlphanum12(a) => xdr::ChangeTrustAsset::CreditAlphanum12(a),
    })
}

impl super::Operation for ChangeTrust {
    fn build_body(self) -> xdr::OperationBody {
        xdr::OperationBody::ChangeTrust(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISSUER: &str = "GCEZWKCA5VLDNRLN3RPRJMRZOX3Z6G5CHCGSNFHEYVXM3XOJMDS674JZ";

    #[test]
    fn zero_limit_removes_trustline() {
        let asset = Asset::credit("USD", ISSUER).unwrap();
        let op = ChangeTrust::new(&asset, Some(0)).unwrap();
        assert_eq!(op.0.limit, 0);
    }

    #[test]
    fn default_limit_is_max() {
        let asset = Asset::credit("USD", ISSUER).unwrap();
        let op = ChangeTrust::new(&asset, None).unwrap();
        assert_eq!(op.0.limit, MAX_LIMIT);
    }
}
