//! Transaction assembly, canonical hashing, and signing.
//!
//! Grounded in `tx/builder/transaction.rs`'s `TxExt` trait (`new_tx`,
//! `add_operation`, `add_memo`, `add_cond`, implemented directly on
//! `xdr::Transaction`) and `signer.rs`'s `transaction_hash` /
//! `Stellar::sign_txn_hash`. The fee-bump wrapping is grounded in
//! `tx.rs::sim_sign_and_send_tx`.

use thiserror::Error;

use crate::address::{self, Address};
use crate::crypto::KeyPair;
use crate::network::Network;
use crate::operation::{self, Operation};
use crate::xdr;

pub const MIN_BASE_FEE: u32 = 100;
pub const MAX_OPS_PER_TX: usize = 100;
/// Sentinel passed to `set_timeout` meaning "no time bound".
pub const TIMEOUT_INFINITE: u64 = 0;

#[derive(Debug, Error)]
pub enum Error {
    #[error("a transaction may contain at most {MAX_OPS_PER_TX} operations")]
    TooManyOperations,
    #[error("a transaction must contain at least one operation")]
    NoOperations,
    #[error("call set_timeout (or TIMEOUT_INFINITE) before build()")]
    MissingTimeout,
    #[error(transparent)]
    Address(#[from] address::Error),
    #[error(transparent)]
    Xdr(#[from] xdr::Error),
    #[error(transparent)]
    Crypto(#[from] crate::crypto::Error),
}

/// Accumulates operations, preconditions, memo, fee, and sequence before
/// producing an immutable `Transaction`.
pub struct TransactionBuilder {
    source_account: xdr::MuxedAccount,
    sequence: i64,
    base_fee: u32,
    operations: Vec<xdr::Operation>,
    memo: xdr::Memo,
    preconditions: xdr::Preconditions,
    soroban_data: Option<xdr::SorobanTransactionData>,
    timeout_set: bool,
}

impl TransactionBuilder {
    /// `sequence` is the value the built transaction will use; callers
    /// typically pass `account.sequence_number + 1`.
    pub fn new(source: &str, sequence: i64) -> Result<Self, Error> {
        let source_account = Address::from_string(source)?
            .to_muxed_account()
            .ok_or_else(|| address::Error::InvalidAddress(source.to_string()))?;
        Ok(Self {
            source_account,
            sequence,
            base_fee: MIN_BASE_FEE,
            operations: Vec::new(),
            memo: xdr::Memo::None,
            preconditions: xdr::Preconditions::None,
            soroban_data: None,
            timeout_set: false,
        })
    }

    pub fn add_operation(mut self, op: impl Operation, source: Option<Address>) -> Result<Self, Error> {
        if self.operations.len() >= MAX_OPS_PER_TX {
            return Err(Error::TooManyOperations);
        }
        self.operations.push(operation::build(op, source));
        Ok(self)
    }

    pub fn add_raw_operation(mut self, op: xdr::Operation) -> Result<Self, Error> {
        if self.operations.len() >= MAX_OPS_PER_TX {
            return Err(Error::TooManyOperations);
        }
        self.operations.push(op);
        Ok(self)
    }

    /// `seconds = 0` (`TIMEOUT_INFINITE`) sets `timeBounds.max_time = 0`
    /// meaning no upper bound. Replaces any previously set time-bound
    /// precondition.
    #[must_use]
    pub fn set_timeout(mut self, seconds: u64) -> Self {
        let max_time = if seconds == TIMEOUT_INFINITE {
            0
        } else {
            now_unix() + seconds
        };
        self.preconditions = xdr::Preconditions::Time(xdr::TimeBounds {
            min_time: xdr::TimePoint(0),
            max_time: xdr::TimePoint(max_time),
        });
        self.timeout_set = true;
        self
    }

    #[must_use]
    pub fn set_base_fee(mut self, base_fee: u32) -> Self {
        self.base_fee = base_fee;
        self
    }

    #[must_use]
    pub fn set_memo(mut self, memo: xdr::Memo) -> Self {
        self.memo = memo;
        self
    }

    #[must_use]
    pub fn set_preconditions(mut self, preconditions: xdr::Preconditions) -> Self {
        self.preconditions = preconditions;
        self
    }

    #[must_use]
    pub fn set_soroban_data(mut self, data: xdr::SorobanTransactionData) -> Self {
        self.soroban_data = Some(data);
        self
    }

    pub fn build(self) -> Result<Transaction, Error> {
        if !self.timeout_set {
            return Err(Error::MissingTimeout);
        }
        if self.operations.is_empty() {
            return Err(Error::NoOperations);
        }
        let op_count = self.operations.len() as u32;
        let fee = self.base_fee.saturating_mul(op_count);
        let ext = match self.soroban_data {
            Some(data) => xdr::TransactionExt::V1(data),
            None => xdr::TransactionExt::V0,
        };
        let tx = xdr::Transaction {
            source_account: self.source_account,
            fee,
            seq_num: xdr::SequenceNumber(self.sequence),
            cond: self.preconditions,
            memo: self.memo,
            operations: self
                .operations
                .try_into()
                .map_err(|_| Error::TooManyOperations)?,
            ext,
        };
        Ok(Transaction {
            tx,
            signatures: Vec::new(),
        })
    }
}

fn now_unix() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system clock before epoch")
        .as_secs()
}

/// An assembled transaction with zero or more detached signatures.
#[derive(Clone)]
pub struct Transaction {
    pub tx: xdr::Transaction,
    pub signatures: Vec<xdr::DecoratedSignature>,
}

impl Transaction {
    /// Wraps an already-built `xdr::Transaction` with no signatures, e.g.
    /// one assembled from a simulation response.
    pub fn from_xdr(tx: xdr::Transaction) -> Self {
        Self {
            tx,
            signatures: Vec::new(),
        }
    }

    pub fn as_xdr(&self) -> &xdr::Transaction {
        &self.tx
    }

    pub fn operation_count(&self) -> usize {
        self.tx.operations.len()
    }

    pub fn fee(&self) -> u32 {
        self.tx.fee
    }

    /// Bumps the sequence number by one, e.g. after submitting a separate
    /// restore transaction ahead of this one.
    #[must_use]
    pub fn bump_seq_num(mut self) -> Self {
        self.tx.seq_num.0 += 1;
        self
    }

    /// `SHA-256(network_id || ENVELOPE_TYPE_TX || tx_xdr)`.
    pub fn hash(&self, network: &Network) -> Result<[u8; 32], Error> {
        let payload = xdr::TransactionSignaturePayload {
            network_id: xdr::Hash(network.id()),
            tagged_transaction: xdr::TransactionSignaturePayloadTaggedTransaction::Tx(
                self.tx.clone(),
            ),
        };
        let bytes = payload.to_xdr(xdr::Limits::none())?;
        Ok(crate::crypto::sha256(&bytes))
    }

    /// Appends a detached Ed25519 signature over this transaction's hash.
    /// Multiple keys may sign; signatures are appended in call order.
    pub fn sign(&mut self, keypair: &KeyPair, network: &Network) -> Result<(), Error> {
        let hash = self.hash(network)?;
        self.signatures.push(keypair.sign_decorated(&hash)?);
        Ok(())
    }

    /// Appends a pre-computed signature, e.g. returned by an external
    /// signer or hardware wallet.
    pub fn add_signature(&mut self, hint: [u8; 4], signature: [u8; 64]) -> Result<(), xdr::Error> {
        self.signatures.push(xdr::DecoratedSignature {
            hint: xdr::SignatureHint(hint),
            signature: xdr::Signature(signature.try_into()?),
        });
        Ok(())
    }

    pub fn to_envelope(&self) -> Result<xdr::TransactionEnvelope, Error> {
        Ok(xdr::TransactionEnvelope::Tx(xdr::TransactionV1Envelope {
            tx: self.tx.clone(),
            signatures: self.signatures.clone().try_into()?,
        }))
    }

    pub fn to_envelope_xdr_base64(&self) -> Result<String, Error> {
        Ok(self.to_envelope()?.to_xdr_base64(xdr::Limits::none())?)
    }

    pub fn from_envelope_xdr(s: &str) -> Result<Self, Error> {
        let envelope = xdr::TransactionEnvelope::from_xdr_base64(s, xdr::Limits::none())?;
        match envelope {
            xdr::TransactionEnvelope::Tx(v1) => Ok(Transaction {
                tx: v1.tx,
                signatures: v1.signatures.into(),
            }),
            _ => Err(Error::Xdr(xdr::Error::Invalid)),
        }
    }

    /// Wraps this already-signed transaction in a `FeeBumpTransaction` paid
    /// for by `fee_source`, per the teacher's `tx.rs::sim_sign_and_send_tx`
    /// fee-bump path (SPEC_FULL §11).
    pub fn into_fee_bump(self, fee_source: &str, fee: i64) -> Result<FeeBumpTransaction, Error> {
        let fee_source = Address::from_string(fee_source)?
            .to_muxed_account()
            .ok_or_else(|| address::Error::InvalidAddress(fee_source.to_string()))?;
        let inner = xdr::FeeBumpTransactionInnerTx::Tx(xdr::TransactionV1Envelope {
            tx: self.tx,
            signatures: self.signatures.try_into()?,
        });
        Ok(FeeBumpTransaction {
            tx: xdr::FeeBumpTransaction {
                fee_source,
                fee,
                inner_tx: inner,
                ext: xdr::FeeBumpTransactionExt::V0,
            },
            signatures: Vec::new(),
        })
    }
}

#[derive(Clone)]
pub struct FeeBumpTransaction {
    pub tx: xdr::FeeBumpTransaction,
    pub signatures: Vec<xdr::DecoratedSignature>,
}

impl FeeBumpTransaction {
    pub fn hash(&self, network: &Network) -> Result<[u8; 32], Error> {
        let payload = xdr::TransactionSignaturePayload {
            network_id: xdr::Hash(network.id()),
            tagged_transaction: xdr::TransactionSignaturePayloadTaggedTransaction::TxFeeBump(
                self.tx.clone(),
            ),
        };
        let bytes = payload.to_xdr(xdr::Limits::none())?;
        Ok(crate::crypto::sha256(&bytes))
    }

    pub fn sign(&mut self, keypair: &KeyPair, network: &Network) -> Result<(), Error> {
        let hash = self.hash(network)?;
        self.signatures.push(keypair.sign_decorated(&hash)?);
        Ok(())
    }

    pub fn to_envelope(&self) -> Result<xdr::TransactionEnvelope, Error> {
        Ok(xdr::TransactionEnvelope::TxFeeBump(
            xdr::FeeBumpTransactionEnvelope {
                tx: self.tx.clone(),
                signatures: self.signatures.clone().try_into()?,
            },
        ))
    }

    pub fn to_envelope_xdr_base64(&self) -> Result<String, Error> {
        Ok(self.to_envelope()?.to_xdr_base64(xdr::Limits::none())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Asset;
    use crate::operation::Payment;

    const SOURCE: &str = "GCEZWKCA5VLDNRLN3RPRJMRZOX3Z6G5CHCGSNFHEYVXM3XOJMDS674JZ";
    const DEST: &str = "GBRPYHIL2CI3FNQ4BXLFMNDLFJUNPU2HY3ZMFSHONUCEOASW7QC7OX2H";

    fn testnet() -> Network {
        Network::testnet("https://soroban-testnet.stellar.org")
    }

    #[test]
    fn build_requires_timeout() {
        let builder = TransactionBuilder::new(SOURCE, 1)
            .unwrap()
            .add_operation(Payment::new(DEST, &Asset::Native, "1").unwrap(), None)
            .unwrap();
        assert!(matches!(builder.build(), Err(Error::MissingTimeout)));
    }

    #[test]
    fn build_requires_at_least_one_operation() {
        let builder = TransactionBuilder::new(SOURCE, 1).unwrap().set_timeout(30);
        assert!(matches!(builder.build(), Err(Error::NoOperations)));
    }

    #[test]
    fn fee_floor_is_min_base_fee_times_op_count() {
        let tx = TransactionBuilder::new(SOURCE, 1)
            .unwrap()
            .add_operation(Payment::new(DEST, &Asset::Native, "1").unwrap(), None)
            .unwrap()
            .add_operation(Payment::new(DEST, &Asset::Native, "1").unwrap(), None)
            .unwrap()
            .set_timeout(30)
            .build()
            .unwrap();
        assert_eq!(tx.fee(), MIN_BASE_FEE * 2);
    }

    #[test]
    fn timeout_infinite_sets_max_time_zero() {
        let tx = TransactionBuilder::new(SOURCE, 1)
            .unwrap()
            .add_operation(Payment::new(DEST, &Asset::Native, "1").unwrap(), None)
            .unwrap()
            .set_timeout(TIMEOUT_INFINITE)
            .build()
            .unwrap();
        match tx.tx.cond {
            xdr::Preconditions::Time(tb) => assert_eq!(tb.max_time.0, 0),
            _ => panic!("expected time precondition"),
        }
    }

    #[test]
    fn sign_verifies_against_hash() {
        let kp = KeyPair::random();
        let mut tx = TransactionBuilder::new(&kp.address(), 1)
            .unwrap()
            .add_operation(Payment::new(DEST, &Asset::Native, "1").unwrap(), None)
            .unwrap()
            .set_timeout(30)
            .build()
            .unwrap();
        let network = testnet();
        tx.sign(&kp, &network).unwrap();
        let hash = tx.hash(&network).unwrap();
        let sig = &tx.signatures[0];
        kp.verify(&hash, &sig.signature.0.clone().try_into().unwrap())
            .unwrap();
    }

    #[test]
    fn envelope_round_trips() {
        let kp = KeyPair::random();
        let mut tx = TransactionBuilder::new(&kp.address(), 1)
            .unwrap()
            .add_operation(Payment::new(DEST, &Asset::Native, "1").unwrap(), None)
            .unwrap()
            .set_timeout(30)
            .build()
            .unwrap();
        tx.sign(&kp, &testnet()).unwrap();
        let encoded = tx.to_envelope_xdr_base64().unwrap();
        let decoded = Transaction::from_envelope_xdr(&encoded).unwrap();
        assert_eq!(decoded.to_envelope_xdr_base64().unwrap(), encoded);
    }

    #[test]
    fn too_many_operations_is_rejected() {
        let mut builder = TransactionBuilder::new(SOURCE, 1).unwrap();
        for _ in 0..MAX_OPS_PER_TX {
            builder = builder
                .add_operation(Payment::new(DEST, &Asset::Native, "1").unwrap(), None)
                .unwrap();
        }
        let result = builder.add_operation(Payment::new(DEST, &Asset::Native, "1").unwrap(), None);
        assert!(matches!(result, Err(Error::TooManyOperations)));
    }
}
