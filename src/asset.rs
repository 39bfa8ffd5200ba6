//! Asset sum type: native lumens, 4- or 12-character credit assets, or a
//! liquidity-pool share, with the `"native"` / `"CODE:ISSUER"` canonical
//! string form.
//!
//! Grounded in `tx/builder/asset.rs` and `tx/builder/asset_code.rs`.

use thiserror::Error;

use crate::xdr;

#[derive(Debug, Error)]
pub enum Error {
    #[error("asset code must be 1-12 ASCII characters, got {0:?}")]
    InvalidCode(String),
    #[error("invalid issuer address: {0}")]
    InvalidIssuer(String),
    #[error("canonical asset string must be \"native\" or \"CODE:ISSUER\": {0:?}")]
    InvalidCanonicalForm(String),
    #[error("strkey error: {0}")]
    StrKey(#[from] crate::strkey::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asset {
    Native,
    CreditAlphaNum4 { code: String, issuer: [u8; 32] },
    CreditAlphaNum12 { code: String, issuer: [u8; 32] },
    PoolShare { pool_id: [u8; 32] },
}

impl Asset {
    pub fn credit(code: &str, issuer: &str) -> Result<Self, Error> {
        if code.is_empty() || code.len() > 12 || !code.is_ascii() {
            return Err(Error::InvalidCode(code.to_string()));
        }
        let pk = stellar_strkey::ed25519::PublicKey::from_string(issuer)
            .map_err(|_| Error::InvalidIssuer(issuer.to_string()))?;
        Ok(if code.len() <= 4 {
            Asset::CreditAlphaNum4 {
                code: code.to_string(),
                issuer: pk.0,
            }
        } else {
            Asset::CreditAlphaNum12 {
                code: code.to_string(),
                issuer: pk.0,
            }
        })
    }

    /// Parses `"native"` or `"CODE:ISSUER"`.
    pub fn from_canonical(s: &str) -> Result<Self, Error> {
        if s == "native" {
            return Ok(Asset::Native);
        }
        let (code, issuer) = s
            .split_once(':')
            .ok_or_else(|| Error::InvalidCanonicalForm(s.to_string()))?;
        Self::credit(code, issuer)
    }

    pub fn canonical(&self) -> String {
        match self {
            Asset::Native => "native".to_string(),
            Asset::CreditAlphaNum4 { code, issuer } | Asset::CreditAlphaNum12 { code, issuer } => {
                format!(
                    "{code}:{}",
                    stellar_strkey::ed25519::PublicKey(*issuer)
                )
            }
            Asset::PoolShare { pool_id } => {
                crate::strkey::LiquidityPoolId(*pool_id).to_string()
            }
        }
    }

    pub fn to_xdr(&self) -> Result<xdr::Asset, Error> {
        Ok(match self {
            Asset::Native => xdr::Asset::Native,
            Asset::CreditAlphaNum4 { code, issuer } => {
                let mut code4 = [0u8; 4];
                code4[..code.len()].copy_from_slice(code.as_bytes());
                xdr::Asset::CreditAlphanum4(xdr::AlphaNum4 {
                    asset_code: xdr::AssetCode4(code4),
                    issuer: issuer_account_id(issuer),
                })
            }
            Asset::CreditAlphaNum12 { code, issuer } => {
                let mut code12 = [0u8; 12];
                code12[..code.len()].copy_from_slice(code.as_bytes());
                xdr::Asset::CreditAlphanum12(xdr::AlphaNum12 {
                    asset_code: xdr::AssetCode12(code12),
                    issuer: issuer_account_id(issuer),
                })
            }
            Asset::PoolShare { .. } => {
                return Err(Error::InvalidCanonicalForm(
                    "pool share has no direct Asset XDR form; use ChangeTrustAsset".into(),
                ))
            }
        })
    }
}

fn issuer_account_id(raw: &[u8; 32]) -> xdr::AccountId {
    xdr::AccountId(xdr::PublicKey::PublicKeyTypeEd25519(xdr::Uint256(*raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISSUER: &str = "GCEZWKCA5VLDNRLN3RPRJMRZOX3Z6G5CHCGSNFHEYVXM3XOJMDS674JZ";

    #[test]
    fn native_round_trips() {
        assert_eq!(Asset::from_canonical("native").unwrap(), Asset::Native);
        assert_eq!(Asset::Native.canonical(), "native");
    }

    #[test]
    fn short_code_is_alphanum4() {
        let asset = Asset::from_canonical(&format!("USD:{ISSUER}")).unwrap();
        assert!(matches!(asset, Asset::CreditAlphaNum4 { .. }));
    }

    #[test]
    fn five_char_code_is_alphanum12() {
        let asset = Asset::from_canonical(&format!("ASTRO:{ISSUER}")).unwrap();
        assert!(matches!(asset, Asset::CreditAlphaNum12 { .. }));
        assert_eq!(asset.canonical(), format!("ASTRO:{ISSUER}"));
    }

    #[test]
    fn rejects_code_too_long() {
        assert!(Asset::credit("TOOLONGASSETCODE", ISSUER).is_err());
    }

    #[test]
    fn rejects_malformed_canonical_form() {
        assert!(Asset::from_canonical("not-an-asset").is_err());
    }
}
