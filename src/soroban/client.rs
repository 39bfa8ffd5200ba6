//! The Soroban RPC client: `simulateTransaction` / `sendTransaction` /
//! `getTransaction` / `getLedgerEntries` / `getEvents`, and the
//! simulate-assemble-sign-submit pipeline that turns an unsigned
//! `InvokeHostFunction` transaction into a confirmed result (spec §4.9).
//!
//! Grounded in `cmd/soroban-cli/src/rpc/mod.rs` (the `Client` and its
//! request/response types) and `cmd/soroban-cli/src/assembled.rs` (the
//! `Assembled` simulate/restore/authorize/sign pipeline).

use std::time::Duration;

use itertools::Itertools;
use jsonrpsee_core::params::ObjectParams;
use jsonrpsee_core::{client::ClientT, rpc_params};
use jsonrpsee_http_client::{HeaderMap, HttpClient, HttpClientBuilder};
use serde_aux::prelude::{
    deserialize_default_from_null, deserialize_number_from_string,
    deserialize_option_number_from_string,
};
use thiserror::Error;

use crate::crypto::KeyPair;
use crate::network::Network;
use crate::soroban::auth;
use crate::xdr::{self, Limits, ReadXdr, WriteXdr};

const DEFAULT_TRANSACTION_FEES: u32 = 100;
const SEND_TRANSACTION_POLL_INTERVAL: Duration = Duration::from_secs(1);
const SEND_TRANSACTION_POLL_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    StrKey(#[from] crate::strkey::Error),
    #[error("invalid response from server")]
    InvalidResponse,
    #[error("provided network passphrase {expected:?} does not match the server: {server:?}")]
    InvalidNetworkPassphrase { expected: String, server: String },
    #[error(transparent)]
    Xdr(#[from] xdr::Error),
    #[error(transparent)]
    Tx(#[from] crate::tx::Error),
    #[error(transparent)]
    Auth(#[from] auth::Error),
    #[error("invalid rpc url: {0}")]
    InvalidRpcUrl(#[from] url::ParseError),
    #[error("jsonrpc error: {0}")]
    JsonRpc(#[from] jsonrpsee_core::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error("transaction submission failed: {0}")]
    TransactionSubmissionFailed(String),
    #[error("expected transaction status: {0}")]
    UnexpectedTransactionStatus(String),
    #[error("transaction submission timeout")]
    TransactionSubmissionTimeout,
    #[error("transaction simulation failed: {0}")]
    TransactionSimulationFailed(String),
    #[error("{0} not found: {1}")]
    NotFound(String, String),
    #[error("missing result in successful response")]
    MissingResult,
    #[error("missing error result from server")]
    MissingError,
    #[error("cursor is not valid")]
    InvalidCursor,
    #[error("unexpected ({length}) simulateTransaction result count")]
    UnexpectedSimulateTransactionResultSize { length: usize },
    #[error("unexpected ({count}) number of operations, expected exactly one")]
    UnexpectedOperationCount { count: usize },
    #[error("fee {0} too large to fit in a u32")]
    LargeFee(u64),
}

#[derive(serde::Deserialize, serde::Serialize, Debug)]
pub struct SendTransactionResponse {
    pub hash: String,
    pub status: String,
    #[serde(rename = "errorResultXdr", skip_serializing_if = "Option::is_none", default)]
    pub error_result_xdr: Option<String>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: u32,
}

#[derive(serde::Deserialize, serde::Serialize, Debug)]
pub struct GetTransactionResponseRaw {
    pub status: String,
    #[serde(rename = "envelopeXdr", skip_serializing_if = "Option::is_none", default)]
    pub envelope_xdr: Option<String>,
    #[serde(rename = "resultXdr", skip_serializing_if = "Option::is_none", default)]
    pub result_xdr: Option<String>,
    #[serde(rename = "resultMetaXdr", skip_serializing_if = "Option::is_none", default)]
    pub result_meta_xdr: Option<String>,
}

pub struct GetTransactionResponse {
    pub status: String,
    pub envelope: Option<xdr::TransactionEnvelope>,
    pub result: Option<xdr::TransactionResult>,
    pub result_meta: Option<xdr::TransactionMeta>,
}

impl TryFrom<GetTransactionResponseRaw> for GetTransactionResponse {
    type Error = xdr::Error;

    fn try_from(raw: GetTransactionResponseRaw) -> Result<Self, xdr::Error> {
        Ok(Self {
            status: raw.status,
            envelope: raw
                .envelope_xdr
                .map(|v| xdr::TransactionEnvelope::from_xdr_base64(v, Limits::none()))
                .transpose()?,
            result: raw
                .result_xdr
                .map(|v| xdr::TransactionResult::from_xdr_base64(v, Limits::none()))
                .transpose()?,
            result_meta: raw
                .result_meta_xdr
                .map(|v| xdr::TransactionMeta::from_xdr_base64(v, Limits::none()))
                .transpose()?,
        })
    }
}

#[derive(serde::Deserialize, serde::Serialize, Debug)]
pub struct LedgerEntryResult {
    pub key: String,
    pub xdr: String,
    #[serde(rename = "lastModifiedLedgerSeq")]
    pub last_modified_ledger: u32,
    #[serde(
        rename = "liveUntilLedgerSeq",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_option_number_from_string",
        default
    )]
    pub live_until_ledger_seq: Option<u32>,
}

#[derive(serde::Deserialize, serde::Serialize, Debug)]
pub struct GetLedgerEntriesResponse {
    pub entries: Option<Vec<LedgerEntryResult>>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: i64,
}

#[derive(serde::Deserialize, serde::Serialize, Debug)]
pub struct GetNetworkResponse {
    #[serde(rename = "friendbotUrl", skip_serializing_if = "Option::is_none", default)]
    pub friendbot_url: Option<String>,
    pub passphrase: String,
    #[serde(rename = "protocolVersion")]
    pub protocol_version: u32,
}

#[derive(serde::Deserialize, serde::Serialize, Debug)]
pub struct GetLatestLedgerResponse {
    pub id: String,
    #[serde(rename = "protocolVersion")]
    pub protocol_version: u32,
    pub sequence: u32,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Default)]
pub struct Cost {
    #[serde(rename = "cpuInsns", deserialize_with = "deserialize_number_from_string")]
    pub cpu_insns: u64,
    #[serde(rename = "memBytes", deserialize_with = "deserialize_number_from_string")]
    pub mem_bytes: u64,
}

#[derive(serde::Deserialize, serde::Serialize, Debug)]
pub struct SimulateHostFunctionResultRaw {
    #[serde(deserialize_with = "deserialize_default_from_null")]
    pub auth: Vec<String>,
    pub xdr: String,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Default)]
pub struct RestorePreamble {
    #[serde(rename = "transactionData")]
    pub transaction_data: String,
    #[serde(rename = "minResourceFee", deserialize_with = "deserialize_number_from_string")]
    pub min_resource_fee: u64,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Default)]
pub struct SimulateTransactionResponse {
    #[serde(rename = "minResourceFee", deserialize_with = "deserialize_number_from_string", default)]
    pub min_resource_fee: u64,
    #[serde(default)]
    pub cost: Cost,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub results: Vec<SimulateHostFunctionResultRaw>,
    #[serde(rename = "transactionData", default)]
    pub transaction_data: String,
    #[serde(deserialize_with = "deserialize_default_from_null", skip_serializing_if = "Vec::is_empty", default)]
    pub events: Vec<String>,
    #[serde(rename = "restorePreamble", skip_serializing_if = "Option::is_none", default)]
    pub restore_preamble: Option<RestorePreamble>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: u32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl SimulateTransactionResponse {
    pub fn transaction_data(&self) -> Result<xdr::SorobanTransactionData, Error> {
        Ok(xdr::SorobanTransactionData::from_xdr_base64(
            &self.transaction_data,
            Limits::none(),
        )?)
    }

    pub fn events(&self) -> Result<Vec<xdr::DiagnosticEvent>, Error> {
        self.events
            .iter()
            .map(|e| Ok(xdr::DiagnosticEvent::from_xdr_base64(e, Limits::none())?))
            .collect()
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EventType {
    All,
    Contract,
    System,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum EventStart {
    Ledger(u32),
    Cursor(String),
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone)]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: String,
    pub ledger: u32,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: String,
    pub id: String,
    #[serde(rename = "pagingToken")]
    pub paging_token: String,
    #[serde(rename = "contractId")]
    pub contract_id: String,
    pub topic: Vec<String>,
    pub value: String,
}

impl Event {
    pub fn parse_cursor(&self) -> Result<(u64, i32), Error> {
        parse_cursor(&self.id)
    }
}

/// Parses a `getEvents` paging token of the form `<toid>-<index>` into its
/// ledger-order component and in-ledger event index.
pub fn parse_cursor(c: &str) -> Result<(u64, i32), Error> {
    let (toid_part, event_index) = c.split('-').collect_tuple().ok_or(Error::InvalidCursor)?;
    let toid_part: u64 = toid_part.parse().map_err(|_| Error::InvalidCursor)?;
    let start_index: i32 = event_index.parse().map_err(|_| Error::InvalidCursor)?;
    Ok((toid_part, start_index))
}

#[derive(serde::Deserialize, serde::Serialize, Debug)]
pub struct GetEventsResponse {
    #[serde(deserialize_with = "deserialize_default_from_null")]
    pub events: Vec<Event>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: u32,
}

pub struct Client {
    base_url: String,
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let url = url::Url::parse(base_url)?;
        Ok(Self {
            base_url: url.to_string(),
        })
    }

    fn client(&self) -> Result<HttpClient, Error> {
        let mut headers = HeaderMap::new();
        headers.insert("X-Client-Name", "stellar-core-client".parse().unwrap());
        Ok(HttpClientBuilder::default()
            .set_headers(headers)
            .build(&self.base_url)?)
    }

    pub async fn get_network(&self) -> Result<GetNetworkResponse, Error> {
        tracing::trace!("getting network");
        Ok(self.client()?.request("getNetwork", rpc_params![]).await?)
    }

    pub async fn verify_network_passphrase(&self, expected: Option<&str>) -> Result<String, Error> {
        let server = self.get_network().await?.passphrase;
        if let Some(expected) = expected {
            if expected != server {
                return Err(Error::InvalidNetworkPassphrase {
                    expected: expected.to_string(),
                    server,
                });
            }
        }
        Ok(server)
    }

    pub async fn get_latest_ledger(&self) -> Result<GetLatestLedgerResponse, Error> {
        tracing::trace!("getting latest ledger");
        Ok(self
            .client()?
            .request("getLatestLedger", rpc_params![])
            .await?)
    }

    pub async fn get_transaction(&self, tx_id: &str) -> Result<GetTransactionResponseRaw, Error> {
        Ok(self
            .client()?
            .request("getTransaction", rpc_params![tx_id])
            .await?)
    }

    pub async fn get_ledger_entries(
        &self,
        keys: &[xdr::LedgerKey],
    ) -> Result<GetLedgerEntriesResponse, Error> {
        let base64_keys = keys
            .iter()
            .map(|k| Ok(k.to_xdr_base64(Limits::none())?))
            .collect::<Result<Vec<String>, Error>>()?;
        Ok(self
            .client()?
            .request("getLedgerEntries", rpc_params![base64_keys])
            .await?)
    }

    pub async fn simulate_transaction_envelope(
        &self,
        tx: &xdr::TransactionEnvelope,
    ) -> Result<SimulateTransactionResponse, Error> {
        let base64_tx = tx.to_xdr_base64(Limits::none())?;
        tracing::trace!("simulating:\n{tx:#?}");
        let mut params = ObjectParams::new();
        params.insert("transaction", base64_tx)?;
        let response: SimulateTransactionResponse =
            self.client()?.request("simulateTransaction", params).await?;
        tracing::trace!("simulation response:\n{response:#?}");
        match &response.error {
            None => Ok(response),
            Some(e) => {
                tracing::error!("simulation failed: {e}");
                Err(Error::TransactionSimulationFailed(e.clone()))
            }
        }
    }

    pub async fn send_transaction_envelope(
        &self,
        tx: &xdr::TransactionEnvelope,
    ) -> Result<(xdr::TransactionResult, xdr::TransactionMeta, Vec<xdr::DiagnosticEvent>), Error> {
        let client = self.client()?;
        let SendTransactionResponse {
            hash,
            error_result_xdr,
            status,
            ..
        } = client
            .request("sendTransaction", rpc_params![tx.to_xdr_base64(Limits::none())?])
            .await
            .map_err(|err| Error::TransactionSubmissionFailed(format!("no status yet: {err:#?}")))?;

        if status == "ERROR" {
            let error = error_result_xdr
                .ok_or(Error::MissingError)
                .and_then(|x| {
                    xdr::TransactionResult::from_xdr_base64(x, Limits::none())
                        .map_err(|_| Error::InvalidResponse)
                })
                .map(|r| r.result)?;
            tracing::error!("transaction submission failed:\n{error:#?}");
            return Err(Error::TransactionSubmissionFailed(format!("{error:#?}")));
        }

        let start = std::time::Instant::now();
        loop {
            let response: GetTransactionResponse = self.get_transaction(&hash).await?.try_into()?;
            match response.status.as_str() {
                "SUCCESS" => {
                    let meta = response.result_meta.ok_or(Error::MissingResult)?;
                    let events = extract_events(&meta);
                    return Ok((response.result.ok_or(Error::MissingResult)?, meta, events));
                }
                "FAILED" => {
                    return Err(Error::TransactionSubmissionFailed(format!(
                        "{:#?}",
                        response.result
                    )));
                }
                "NOT_FOUND" => (),
                _ => return Err(Error::UnexpectedTransactionStatus(response.status)),
            }
            if start.elapsed() > SEND_TRANSACTION_POLL_TIMEOUT {
                return Err(Error::TransactionSubmissionTimeout);
            }
            tokio::time::sleep(SEND_TRANSACTION_POLL_INTERVAL).await;
        }
    }

    pub async fn get_events(
        &self,
        start: EventStart,
        event_type: Option<EventType>,
        contract_ids: &[String],
        topics: &[String],
        limit: Option<usize>,
    ) -> Result<GetEventsResponse, Error> {
        let mut filters = serde_json::Map::new();
        if let Some(t) = event_type.and_then(|t| match t {
            EventType::All => None,
            EventType::Contract => Some("contract"),
            EventType::System => Some("system"),
        }) {
            filters.insert("type".to_string(), t.into());
        }
        filters.insert("topics".to_string(), topics.into());
        filters.insert("contractIds".to_string(), contract_ids.into());

        let mut pagination = serde_json::Map::new();
        if let Some(limit) = limit {
            pagination.insert("limit".to_string(), limit.into());
        }

        let mut params = ObjectParams::new();
        match start {
            EventStart::Ledger(l) => params.insert("startLedger", l)?,
            EventStart::Cursor(c) => {
                pagination.insert("cursor".to_string(), c.into());
            }
        }
        params.insert("filters", vec![filters])?;
        params.insert("pagination", pagination)?;

        Ok(self.client()?.request("getEvents", params).await?)
    }

    /// Simulates, assembles, signs with `signer` (and `signer` alone — any
    /// authorization entries belonging to other parties are left for the
    /// caller to route and co-sign), and submits `tx`.
    pub async fn simulate_prepare_sign_and_send(
        &self,
        tx: crate::tx::Transaction,
        signer: &KeyPair,
        network: &Network,
    ) -> Result<(xdr::TransactionResult, xdr::TransactionMeta, Vec<xdr::DiagnosticEvent>), Error> {
        let assembled = self.simulate_and_assemble(&tx).await?;
        let assembled = self.maybe_restore(assembled, signer, network).await?;
        let assembled = assembled.authorize(signer, network)?;
        let mut signed = assembled.into_inner();
        signed.sign(signer, network)?;
        self.send_transaction_envelope(&signed.to_envelope()?).await
    }

    pub async fn simulate_and_assemble(&self, tx: &crate::tx::Transaction) -> Result<Assembled, Error> {
        let envelope = xdr::TransactionEnvelope::Tx(xdr::TransactionV1Envelope {
            tx: tx.as_xdr().clone(),
            signatures: xdr::VecM::default(),
        });
        let sim_res = self.simulate_transaction_envelope(&envelope).await?;
        Assembled::new(tx.as_xdr(), sim_res)
    }

    /// If simulation reported archived entries that must be restored first,
    /// submits the restore transaction and bumps the sequence number of the
    /// pending transaction before re-simulating.
    async fn maybe_restore(
        &self,
        assembled: Assembled,
        signer: &KeyPair,
        network: &Network,
    ) -> Result<Assembled, Error> {
        let Some(restore_tx) = assembled.restore_transaction()? else {
            return Ok(assembled);
        };
        let mut restore_tx = crate::tx::Transaction::from_xdr(restore_tx);
        restore_tx.sign(signer, network)?;
        self.send_transaction_envelope(&restore_tx.to_envelope()?)
            .await?;
        let bumped = assembled.into_inner().bump_seq_num();
        self.simulate_and_assemble(&bumped).await
    }
}

fn extract_events(tx_meta: &xdr::TransactionMeta) -> Vec<xdr::DiagnosticEvent> {
    match tx_meta {
        xdr::TransactionMeta::V3(xdr::TransactionMetaV3 {
            soroban_meta: Some(meta),
            ..
        }) => meta.diagnostic_events.to_vec(),
        _ => vec![],
    }
}

/// A simulated and fee/footprint-assembled transaction, ready for
/// authorization entry signing and submission.
pub struct Assembled {
    txn: crate::tx::Transaction,
    sim_res: SimulateTransactionResponse,
}

impl Assembled {
    fn new(raw: &xdr::Transaction, sim_res: SimulateTransactionResponse) -> Result<Self, Error> {
        let txn = assemble(raw, &sim_res)?;
        Ok(Self {
            txn: crate::tx::Transaction::from_xdr(txn),
            sim_res,
        })
    }

    #[must_use]
    pub fn transaction(&self) -> &crate::tx::Transaction {
        &self.txn
    }

    #[must_use]
    pub fn sim_response(&self) -> &SimulateTransactionResponse {
        &self.sim_res
    }

    pub fn into_inner(self) -> crate::tx::Transaction {
        self.txn
    }

    /// Builds (but does not submit) a `RestoreFootprint` transaction for any
    /// archived entries named in the simulation's `restorePreamble`.
    pub fn restore_transaction(&self) -> Result<Option<xdr::Transaction>, Error> {
        let Some(preamble) = &self.sim_res.restore_preamble else {
            return Ok(None);
        };
        Ok(Some(restore(self.txn.as_xdr(), preamble)?))
    }

    #[must_use]
    pub fn requires_auth(&self) -> bool {
        requires_auth(self.txn.as_xdr()).is_some()
    }

    #[must_use]
    pub fn is_view(&self) -> bool {
        let xdr::TransactionExt::V1(xdr::SorobanTransactionData {
            resources: xdr::SorobanResources {
                footprint: xdr::LedgerFootprint { read_write, .. },
                ..
            },
            ..
        }) = &self.txn.as_xdr().ext
        else {
            return false;
        };
        read_write.is_empty()
    }

    /// Returns the addresses that must co-sign this transaction's
    /// authorization entries besides the transaction's own source account
    /// (spec §4.9's `needs_non_invoker_signing_by`).
    #[must_use]
    pub fn needs_non_invoker_signing_by(&self) -> Vec<crate::address::Address> {
        let invoker = self.txn.as_xdr().source_account.clone();
        self.auth_entries()
            .iter()
            .filter_map(|entry| match &entry.credentials {
                xdr::SorobanCredentials::Address(c) => Some(c.address.clone()),
                xdr::SorobanCredentials::SourceAccount => None,
            })
            .filter(|address| !matches_muxed_source(address, &invoker))
            .filter_map(|address| match address {
                xdr::ScAddress::Account(id) => Some(crate::address::Address::from(id)),
                xdr::ScAddress::Contract(_) => None,
            })
            .unique_by(crate::address::Address::to_string)
            .collect()
    }

    fn auth_entries(&self) -> Vec<xdr::SorobanAuthorizationEntry> {
        self.txn
            .as_xdr()
            .operations
            .first()
            .and_then(|op| match &op.body {
                xdr::OperationBody::InvokeHostFunction(body) => Some(body.auth.to_vec()),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// Signs every `Address`-credentialed authorization entry whose address
    /// matches `signer`; entries belonging to other parties are left
    /// unsigned for the caller to route.
    pub fn authorize(mut self, signer: &KeyPair, network: &Network) -> Result<Self, Error> {
        let expiration_ledger = self.sim_res.latest_ledger + 60;
        let mut tx = self.txn.as_xdr().clone();
        let mut ops = tx.operations.to_vec();
        if let xdr::OperationBody::InvokeHostFunction(op) = &ops[0].body {
            let signed = auth::sign_soroban_authorizations(op, signer, expiration_ledger, network)?;
            if let xdr::OperationBody::InvokeHostFunction(op) = &mut ops[0].body {
                op.auth = signed.try_into()?;
            }
        }
        tx.operations = ops.try_into()?;
        self.txn = crate::tx::Transaction::from_xdr(tx);
        Ok(self)
    }
}

fn matches_muxed_source(address: &xdr::ScAddress, source: &xdr::MuxedAccount) -> bool {
    let xdr::ScAddress::Account(xdr::AccountId(xdr::PublicKey::PublicKeyTypeEd25519(
        xdr::Uint256(address_bytes),
    ))) = address
    else {
        return false;
    };
    let source_bytes = match source {
        xdr::MuxedAccount::Ed25519(xdr::Uint256(b)) => b,
        xdr::MuxedAccount::MuxedEd25519(m) => &m.ed25519.0,
    };
    address_bytes == source_bytes
}

fn assemble(raw: &xdr::Transaction, simulation: &SimulateTransactionResponse) -> Result<xdr::Transaction, Error> {
    let mut tx = raw.clone();
    if tx.operations.len() != 1 {
        return Err(Error::UnexpectedOperationCount {
            count: tx.operations.len(),
        });
    }

    let transaction_data = simulation.transaction_data()?;
    let mut op = tx.operations[0].clone();
    if let xdr::OperationBody::InvokeHostFunction(ref mut body) = &mut op.body {
        if body.auth.is_empty() {
            if simulation.results.len() != 1 {
                return Err(Error::UnexpectedSimulateTransactionResultSize {
                    length: simulation.results.len(),
                });
            }
            let auths: Vec<xdr::SorobanAuthorizationEntry> = simulation.results[0]
                .auth
                .iter()
                .map(|v| Ok(xdr::SorobanAuthorizationEntry::from_xdr_base64(v, Limits::none())?))
                .collect::<Result<_, Error>>()?;
            if !auths.is_empty() {
                body.auth = auths.try_into()?;
            }
        }
    }

    let classic_tx_fee: u64 = DEFAULT_TRANSACTION_FEES.into();
    tx.fee = tx.fee.max(
        u32::try_from(classic_tx_fee + simulation.min_resource_fee)
            .map_err(|_| Error::LargeFee(simulation.min_resource_fee + classic_tx_fee))?,
    );
    tx.operations = vec![op].try_into()?;
    tx.ext = xdr::TransactionExt::V1(transaction_data);
    Ok(tx)
}

fn requires_auth(txn: &xdr::Transaction) -> Option<xdr::Operation> {
    let [op @ xdr::Operation {
        body: xdr::OperationBody::InvokeHostFunction(xdr::InvokeHostFunctionOp { auth, .. }),
        ..
    }] = txn.operations.as_slice()
    else {
        return None;
    };
    matches!(
        auth.first().map(|x| &x.root_invocation.function),
        Some(&xdr::SorobanAuthorizedFunction::ContractFn(_))
    )
    .then(|| op.clone())
}

fn restore(parent: &xdr::Transaction, restore: &RestorePreamble) -> Result<xdr::Transaction, Error> {
    let transaction_data =
        xdr::SorobanTransactionData::from_xdr_base64(&restore.transaction_data, Limits::none())?;
    let fee = u32::try_from(restore.min_resource_fee).map_err(|_| Error::LargeFee(restore.min_resource_fee))?;
    Ok(xdr::Transaction {
        source_account: parent.source_account.clone(),
        fee: parent
            .fee
            .checked_add(fee)
            .ok_or(Error::LargeFee(restore.min_resource_fee.into()))?,
        seq_num: parent.seq_num.clone(),
        cond: xdr::Preconditions::None,
        memo: xdr::Memo::None,
        operations: vec![xdr::Operation {
            source_account: None,
            body: xdr::OperationBody::RestoreFootprint(xdr::RestoreFootprintOp {
                ext: xdr::ExtensionPoint::V0,
            }),
        }]
        .try_into()?,
        ext: xdr::TransactionExt::V1(transaction_data),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_cursor() {
        assert_eq!(parse_cursor("123456789-2").unwrap(), (123456789, 2));
    }

    #[test]
    fn rejects_malformed_cursor() {
        assert!(parse_cursor("not-a-cursor-at-all").is_err() || parse_cursor("abc").is_err());
        assert!(parse_cursor("abc").is_err());
    }

    fn source_account() -> xdr::MuxedAccount {
        let bytes = crate::crypto::KeyPair::random().public_key_bytes();
        xdr::MuxedAccount::Ed25519(xdr::Uint256(bytes))
    }

    fn single_contract_fn_transaction() -> xdr::Transaction {
        xdr::Transaction {
            source_account: source_account(),
            fee: 100,
            seq_num: xdr::SequenceNumber(0),
            cond: xdr::Preconditions::None,
            memo: xdr::Memo::None,
            operations: vec![xdr::Operation {
                source_account: None,
                body: xdr::OperationBody::InvokeHostFunction(xdr::InvokeHostFunctionOp {
                    host_function: xdr::HostFunction::InvokeContract(xdr::InvokeContractArgs {
                        contract_address: xdr::ScAddress::Contract(xdr::Hash([0; 32])),
                        function_name: xdr::ScSymbol::default(),
                        args: xdr::VecM::default(),
                    }),
                    auth: xdr::VecM::default(),
                }),
            }]
            .try_into()
            .unwrap(),
            ext: xdr::TransactionExt::V0,
        }
    }

    fn transaction_data() -> xdr::SorobanTransactionData {
        xdr::SorobanTransactionData {
            resources: xdr::SorobanResources {
                footprint: xdr::LedgerFootprint {
                    read_only: xdr::VecM::default(),
                    read_write: xdr::VecM::default(),
                },
                instructions: 0,
                read_bytes: 5,
                write_bytes: 0,
            },
            resource_fee: 0,
            ext: xdr::ExtensionPoint::V0,
        }
    }

    #[test]
    fn assemble_raises_tx_fee_to_cover_resource_fee() {
        let txn = single_contract_fn_transaction();
        let sim = SimulateTransactionResponse {
            min_resource_fee: 115,
            latest_ledger: 3,
            transaction_data: transaction_data().to_xdr_base64(Limits::none()).unwrap(),
            results: vec![SimulateHostFunctionResultRaw {
                auth: vec![],
                xdr: xdr::ScVal::U32(0).to_xdr_base64(Limits::none()).unwrap(),
            }],
            ..Default::default()
        };
        let result = assemble(&txn, &sim).unwrap();
        assert_eq!(result.fee, 215);
        assert_eq!(result.ext, xdr::TransactionExt::V1(transaction_data()));
    }

    #[test]
    fn assemble_rejects_multi_operation_transactions() {
        let mut txn = single_contract_fn_transaction();
        let op = txn.operations[0].clone();
        txn.operations = vec![op.clone(), op].try_into().unwrap();
        let sim = SimulateTransactionResponse {
            min_resource_fee: 1,
            latest_ledger: 3,
            transaction_data: transaction_data().to_xdr_base64(Limits::none()).unwrap(),
            ..Default::default()
        };
        assert!(matches!(
            assemble(&txn, &sim),
            Err(Error::UnexpectedOperationCount { count: 2 })
        ));
    }

    #[test]
    fn is_view_is_true_when_no_ledger_entries_are_written() {
        let txn = single_contract_fn_transaction();
        let sim = SimulateTransactionResponse {
            min_resource_fee: 1,
            latest_ledger: 3,
            transaction_data: transaction_data().to_xdr_base64(Limits::none()).unwrap(),
            results: vec![SimulateHostFunctionResultRaw {
                auth: vec![],
                xdr: xdr::ScVal::U32(0).to_xdr_base64(Limits::none()).unwrap(),
            }],
            ..Default::default()
        };
        let assembled = Assembled::new(&txn, sim).unwrap();
        assert!(assembled.is_view());
    }
}
