//! Soroban authorization entry signing.
//!
//! Grounded verbatim in `signer/auth.rs`: builds the
//! `HashIdPreimage::SorobanAuthorization` preimage, hashes it, signs with
//! the caller's key, and writes the signature back as the protocol's
//! canonical `{"public_key": bytes, "signature": bytes}` map (sorted by
//! symbol key).

use thiserror::Error;

use crate::crypto::{self, KeyPair};
use crate::network::Network;
use crate::xdr;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Xdr(#[from] xdr::Error),
    #[error(transparent)]
    Crypto(#[from] crypto::Error),
}

/// If `entry`'s credentials are not `Address`, or the credential address
/// does not match `signer`, the entry is returned unchanged (spec §4.6):
/// source-implicit entries need no signing, and mismatched addresses are
/// the caller's responsibility to route to the correct signer.
pub fn maybe_sign_soroban_authorization_entry(
    entry: &xdr::SorobanAuthorizationEntry,
    signer: &KeyPair,
    signature_expiration_ledger: u32,
    network: &Network,
) -> Result<xdr::SorobanAuthorizationEntry, Error> {
    let xdr::SorobanCredentials::Address(credentials) = &entry.credentials else {
        return Ok(entry.clone());
    };
    let xdr::ScAddress::Account(xdr::AccountId(xdr::PublicKey::PublicKeyTypeEd25519(
        xdr::Uint256(address_bytes),
    ))) = &credentials.address
    else {
        return Ok(entry.clone());
    };
    if *address_bytes != signer.public_key_bytes() {
        return Ok(entry.clone());
    }
    sign_soroban_authorization_entry(entry, signer, signature_expiration_ledger, network)
}

/// Signs `entry` unconditionally, assuming its credentials are already
/// confirmed to belong to `signer`.
pub fn sign_soroban_authorization_entry(
    entry: &xdr::SorobanAuthorizationEntry,
    signer: &KeyPair,
    signature_expiration_ledger: u32,
    network: &Network,
) -> Result<xdr::SorobanAuthorizationEntry, Error> {
    let xdr::SorobanCredentials::Address(credentials) = &entry.credentials else {
        return Ok(entry.clone());
    };

    let preimage = xdr::HashIdPreimage::SorobanAuthorization(xdr::HashIdPreimageSorobanAuthorization {
        network_id: xdr::Hash(network.id()),
        nonce: credentials.nonce,
        signature_expiration_ledger,
        invocation: entry.root_invocation.clone(),
    });
    let payload = preimage.to_xdr(xdr::Limits::none())?;
    let hash = crypto::sha256(&payload);
    let signature = signer.sign(&hash)?;

    let signature_map = xdr::ScMap::sorted_from(vec![
        (
            xdr::ScVal::Symbol(xdr::ScSymbol("public_key".try_into()?)),
            xdr::ScVal::Bytes(xdr::ScBytes(signer.public_key_bytes().to_vec().try_into()?)),
        ),
        (
            xdr::ScVal::Symbol(xdr::ScSymbol("signature".try_into()?)),
            xdr::ScVal::Bytes(xdr::ScBytes(signature.to_vec().try_into()?)),
        ),
    ])?;

    let mut signed = entry.clone();
    if let xdr::SorobanCredentials::Address(c) = &mut signed.credentials {
        c.signature_expiration_ledger = signature_expiration_ledger;
        c.signature = xdr::ScVal::Vec(Some(xdr::ScVec(
            vec![xdr::ScVal::Map(Some(signature_map))].try_into()?,
        )));
    }
    Ok(signed)
}

/// Iterates every auth entry on an `InvokeHostFunctionOp`, signing each
/// whose credential address matches `signer` and leaving the rest
/// unchanged. Grounded in `signer/auth.rs::sign_soroban_authorizations`.
pub fn sign_soroban_authorizations(
    op: &xdr::InvokeHostFunctionOp,
    signer: &KeyPair,
    signature_expiration_ledger: u32,
    network: &Network,
) -> Result<Vec<xdr::SorobanAuthorizationEntry>, Error> {
    op.auth
        .iter()
        .map(|entry| {
            maybe_sign_soroban_authorization_entry(
                entry,
                signer,
                signature_expiration_ledger,
                network,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unsigned_entry(address_bytes: [u8; 32]) -> xdr::SorobanAuthorizationEntry {
        xdr::SorobanAuthorizationEntry {
            credentials: xdr::SorobanCredentials::Address(xdr::SorobanAddressCredentials {
                address: xdr::ScAddress::Account(xdr::AccountId(
                    xdr::PublicKey::PublicKeyTypeEd25519(xdr::Uint256(address_bytes)),
                )),
                nonce: 7,
                signature_expiration_ledger: 0,
                signature: xdr::ScVal::Void,
            }),
            root_invocation: xdr::SorobanAuthorizedInvocation {
                function: xdr::SorobanAuthorizedFunction::ContractFn(xdr::InvokeContractArgs {
                    contract_address: xdr::ScAddress::Contract(xdr::Hash([0u8; 32])),
                    function_name: xdr::ScSymbol("f".try_into().unwrap()),
                    args: vec![].try_into().unwrap(),
                }),
                sub_invocations: vec![].try_into().unwrap(),
            },
        }
    }

    fn network() -> Network {
        Network::testnet("https://soroban-testnet.stellar.org")
    }

    #[test]
    fn signs_entry_matching_signer() {
        let kp = KeyPair::random();
        let entry = unsigned_entry(kp.public_key_bytes());
        let signed =
            maybe_sign_soroban_authorization_entry(&entry, &kp, 1000, &network()).unwrap();
        if let xdr::SorobanCredentials::Address(c) = signed.credentials {
            assert_eq!(c.signature_expiration_ledger, 1000);
            assert!(matches!(c.signature, xdr::ScVal::Vec(Some(_))));
        } else {
            panic!("expected address credentials");
        }
    }

    #[test]
    fn leaves_entry_unchanged_for_different_signer() {
        let kp = KeyPair::random();
        let other = KeyPair::random();
        let entry = unsigned_entry(other.public_key_bytes());
        let result =
            maybe_sign_soroban_authorization_entry(&entry, &kp, 1000, &network()).unwrap();
        if let xdr::SorobanCredentials::Address(c) = result.credentials {
            assert_eq!(c.signature_expiration_ledger, 0);
            assert_eq!(c.signature, xdr::ScVal::Void);
        } else {
            panic!("expected address credentials");
        }
    }

    #[test]
    fn leaves_source_account_credentials_unchanged() {
        let kp = KeyPair::random();
        let entry = xdr::SorobanAuthorizationEntry {
            credentials: xdr::SorobanCredentials::SourceAccount,
            root_invocation: unsigned_entry(kp.public_key_bytes()).root_invocation,
        };
        let result =
            maybe_sign_soroban_authorization_entry(&entry, &kp, 1000, &network()).unwrap();
        assert!(matches!(
            result.credentials,
            xdr::SorobanCredentials::SourceAccount
        ));
    }
}
