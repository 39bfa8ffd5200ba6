//! Ed25519 key material, signing, and SEP-0005 mnemonic derivation.
//!
//! Grounded in `signer.rs`'s `Stellar` trait (`sign_blob`, `sign_txn_hash`,
//! the `DecoratedSignature` hint derivation) and the teacher's
//! `ed25519-dalek` + `sep5` dependency pair.

use std::str::FromStr;

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use thiserror::Error;
use zeroize::Zeroize;

use crate::xdr;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid seed length, expected 32 bytes")]
    BadSeedLength,
    #[error("invalid public key length, expected 32 bytes")]
    BadPublicKeyLength,
    #[error("signature verification failed")]
    SignatureInvalid,
    #[error("key pair has no secret key; cannot sign")]
    NoSecretKey,
    #[error("strkey error: {0}")]
    StrKey(#[from] crate::strkey::Error),
    #[error("sep5 error: {0}")]
    Sep5(#[from] sep5::Error),
}

/// An Ed25519 key pair, either public-only (verification only) or full
/// (able to sign and derive its own seed strkey).
#[derive(Clone)]
pub enum KeyPair {
    Public(VerifyingKey),
    Full(SigningKey),
}

impl KeyPair {
    pub fn random() -> Self {
        let mut csprng = rand::rngs::OsRng;
        KeyPair::Full(SigningKey::generate(&mut csprng))
    }

    pub fn from_raw_seed(seed: &[u8; 32]) -> Self {
        KeyPair::Full(SigningKey::from_bytes(seed))
    }

    pub fn from_raw_public_key(bytes: &[u8]) -> Result<Self, Error> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| Error::BadPublicKeyLength)?;
        let vk = VerifyingKey::from_bytes(&arr).map_err(|_| Error::BadPublicKeyLength)?;
        Ok(KeyPair::Public(vk))
    }

    pub fn from_public_strkey(address: &str) -> Result<Self, Error> {
        let pk = stellar_strkey::ed25519::PublicKey::from_string(address)?;
        Self::from_raw_public_key(&pk.0)
    }

    pub fn from_secret_strkey(seed: &str) -> Result<Self, Error> {
        let mut sk = stellar_strkey::ed25519::PrivateKey::from_string(seed)?;
        let kp = Self::from_raw_seed(&sk.0);
        sk.0.zeroize();
        Ok(kp)
    }

    /// SEP-0005: BIP-32-for-Ed25519 derivation at `m/44'/148'/index'`.
    pub fn from_mnemonic(
        mnemonic: &str,
        passphrase: Option<&str>,
        index: usize,
    ) -> Result<Self, Error> {
        let derived = sep5::SeedPhrase::from_str(mnemonic)?.from_path_index(index, passphrase)?;
        let mut seed = derived.private().0;
        let kp = Self::from_raw_seed(&seed);
        seed.zeroize();
        Ok(kp)
    }

    pub fn public_key(&self) -> VerifyingKey {
        match self {
            KeyPair::Public(vk) => *vk,
            KeyPair::Full(sk) => sk.verifying_key(),
        }
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.public_key().to_bytes()
    }

    pub fn address(&self) -> String {
        stellar_strkey::ed25519::PublicKey(self.public_key_bytes()).to_string()
    }

    pub fn can_sign(&self) -> bool {
        matches!(self, KeyPair::Full(_))
    }

    pub fn sign(&self, data: &[u8]) -> Result<[u8; 64], Error> {
        match self {
            KeyPair::Full(sk) => Ok(sk.sign(data).to_bytes()),
            KeyPair::Public(_) => Err(Error::NoSecretKey),
        }
    }

    pub fn verify(&self, data: &[u8], sig: &[u8; 64]) -> Result<(), Error> {
        let sig = ed25519_dalek::Signature::from_bytes(sig);
        self.public_key()
            .verify(data, &sig)
            .map_err(|_| Error::SignatureInvalid)
    }

    /// The last 4 bytes of the raw Ed25519 public key, used as a
    /// `DecoratedSignature.hint`. For muxed accounts the hint derives from
    /// the underlying Ed25519 key, never the muxed wrapper (spec §9).
    pub fn signature_hint(&self) -> xdr::SignatureHint {
        let bytes = self.public_key_bytes();
        let mut hint = [0u8; 4];
        hint.copy_from_slice(&bytes[28..32]);
        xdr::SignatureHint(hint)
    }

    /// Signs `payload` and wraps the result as a `DecoratedSignature`.
    pub fn sign_decorated(&self, payload: &[u8]) -> Result<xdr::DecoratedSignature, Error> {
        let sig = self.sign(payload)?;
        Ok(xdr::DecoratedSignature {
            hint: self.signature_hint(),
            signature: xdr::Signature(sig.try_into().expect("64 bytes")),
        })
    }
}

pub fn sha256(data: &[u8]) -> [u8; 32] {
    use sha2::Digest;
    sha2::Sha256::digest(data).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify_round_trips() {
        let kp = KeyPair::random();
        let msg = b"hello stellar";
        let sig = kp.sign(msg).unwrap();
        assert!(kp.verify(msg, &sig).is_ok());
    }

    #[test]
    fn verify_rejects_tampered_message() {
        let kp = KeyPair::random();
        let sig = kp.sign(b"hello").unwrap();
        assert!(kp.verify(b"goodbye", &sig).is_err());
    }

    #[test]
    fn public_only_cannot_sign() {
        let kp = KeyPair::random();
        let public_only = KeyPair::from_raw_public_key(&kp.public_key_bytes()).unwrap();
        assert!(!public_only.can_sign());
        assert!(public_only.sign(b"x").is_err());
    }

    #[test]
    fn address_round_trips_through_strkey() {
        let kp = KeyPair::random();
        let addr = kp.address();
        assert!(addr.starts_with('G'));
        let from_addr = KeyPair::from_public_strkey(&addr).unwrap();
        assert_eq!(from_addr.public_key_bytes(), kp.public_key_bytes());
    }

    #[test]
    fn signature_hint_is_last_four_bytes_of_public_key() {
        let kp = KeyPair::random();
        let bytes = kp.public_key_bytes();
        assert_eq!(kp.signature_hint().0, bytes[28..32]);
    }
}
