//! Public ledger anchoring utilities.
//!
//! This module owns all communication with the ledger's JSON-RPC
//! endpoint: checking the operator balance, submitting memo-carrying
//! anchoring transactions and reading them back for verification.
//!
//! The [`LedgerClient`] is constructed explicitly from configuration and
//! injected where needed; it owns the operator signing key and the RPC
//! endpoint for its whole lifetime. The [`Anchor`] trait is the seam that
//! lets request handlers run against [`MockLedger`] in tests.

mod response;
mod wire;

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use ed25519_dalek::SigningKey;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::config;

/// Well-known address of the ledger's memo program.
pub const MEMO_PROGRAM_ID: &str = "MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr";

/// ASCII tag prepended to every anchored digest, so that memo payloads
/// written by this application are recognizable among arbitrary memos.
pub const MEMO_TAG: &str = "LABORSEAL:";

const CONFIRMATION_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Errors that may occur while talking to the ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid operator key: {0}")]
    InvalidOperatorKey(String),

    #[error("ledger transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("ledger rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("unexpected ledger reply: {0}")]
    UnexpectedReply(String),

    /// Operational error requiring an operator to fund the account;
    /// never retried automatically.
    #[error(
        "operator balance of {balance} lamports on {address} is below \
         the required minimum of {required}; top up the account and retry"
    )]
    InsufficientBalance {
        balance: u64,
        required: u64,
        address: String,
    },

    #[error("transaction {signature} failed on the ledger: {reason}")]
    TransactionFailed { signature: String, reason: String },

    #[error("transaction {signature} was not confirmed within {timeout:?}; safe to retry")]
    ConfirmationTimeout { signature: String, timeout: Duration },
}

/// Why a verification could not be performed.
///
/// Both values mean "not verifiable" rather than "tampered": the absence
/// or unreadability of the anchoring record is a lookup failure, not
/// evidence against the contract data.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationFailure {
    NotFound,
    Undecodable,
}

/// Outcome of comparing a freshly computed digest against the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verification {
    /// Whether the recorded memo digest equals the expected one.
    pub matches: bool,

    /// Digest extracted from the recorded memo, if one was found.
    pub blockchain_hash: Option<String>,

    /// Present when the anchoring record could not be read at all.
    pub error: Option<VerificationFailure>,
}

impl Verification {
    fn failure(reason: VerificationFailure) -> Self {
        Self {
            matches: false,
            blockchain_hash: None,
            error: Some(reason),
        }
    }
}

/// Ledger anchoring operations as seen by request handlers.
#[async_trait]
pub trait Anchor: Send + Sync {
    /// Durably anchor `digest` to the ledger, returning the identifier
    /// under which the anchoring transaction can later be retrieved.
    ///
    /// Blocks until the network confirms the transaction.
    async fn record_digest(&self, digest: &str) -> Result<String, LedgerError>;

    /// Fetch the anchoring transaction `tx_id` and compare its recorded
    /// digest against `expected`, byte for byte.
    async fn verify_digest(&self, tx_id: &str, expected: &str)
        -> Result<Verification, LedgerError>;
}

/// JSON-RPC ledger client owning the operator signing key.
pub struct LedgerClient {
    http: reqwest::Client,
    rpc_url: String,
    signing_key: SigningKey,
    address: String,
    min_balance: u64,
    confirmation_timeout: Duration,
}

impl LedgerClient {
    /// Create a client from ledger configuration.
    ///
    /// The operator key is accepted either as a base58-encoded 64-byte
    /// secret-and-public pair or as a 32-byte seed.
    pub fn new(config: &config::Ledger) -> Result<Self, LedgerError> {
        let bytes = bs58::decode(&config.operator_key)
            .into_vec()
            .map_err(|err| LedgerError::InvalidOperatorKey(err.to_string()))?;

        let seed: [u8; 32] = match bytes.len() {
            32 | 64 => bytes[..32]
                .try_into()
                .expect("a 32-byte prefix always fits a 32-byte array"),
            other => {
                return Err(LedgerError::InvalidOperatorKey(format!(
                    "expected 32 or 64 key bytes, got {other}"
                )))
            }
        };

        let signing_key = SigningKey::from_bytes(&seed);
        let address = bs58::encode(signing_key.verifying_key().to_bytes()).into_string();

        Ok(Self {
            http: reqwest::Client::new(),
            rpc_url: config.rpc_url.clone(),
            signing_key,
            address,
            min_balance: config.min_balance,
            confirmation_timeout: Duration::from_secs(config.confirmation_timeout),
        })
    }

    /// Base58 address of the operator account paying the anchoring fees.
    pub fn address(&self) -> &str {
        &self.address
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, LedgerError> {
        #[derive(Deserialize)]
        struct RpcReply {
            // `result` must stay a plain `Value`: `getTransaction` uses
            // JSON null to signal a missing transaction, which must not
            // collapse into "field absent".
            #[serde(default)]
            result: Value,
            error: Option<RpcFault>,
        }

        #[derive(Deserialize)]
        struct RpcFault {
            code: i64,
            message: String,
        }

        let reply: RpcReply = self
            .http
            .post(&self.rpc_url)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": method,
                "params": params,
            }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(fault) = reply.error {
            return Err(LedgerError::Rpc {
                code: fault.code,
                message: fault.message,
            });
        }

        Ok(reply.result)
    }

    async fn balance(&self) -> Result<u64, LedgerError> {
        let result = self
            .request(
                "getBalance",
                json!([self.address, { "commitment": "confirmed" }]),
            )
            .await?;

        result
            .pointer("/value")
            .and_then(Value::as_u64)
            .ok_or_else(|| unexpected("getBalance", &result))
    }

    async fn latest_blockhash(&self) -> Result<[u8; 32], LedgerError> {
        let result = self
            .request("getLatestBlockhash", json!([{ "commitment": "confirmed" }]))
            .await?;

        let encoded = result
            .pointer("/value/blockhash")
            .and_then(Value::as_str)
            .ok_or_else(|| unexpected("getLatestBlockhash", &result))?;

        bs58::decode(encoded)
            .into_vec()
            .ok()
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or_else(|| {
                LedgerError::UnexpectedReply(format!("blockhash {encoded} is not a 32-byte key"))
            })
    }

    async fn await_confirmation(&self, signature: &str) -> Result<(), LedgerError> {
        let deadline = tokio::time::Instant::now() + self.confirmation_timeout;

        loop {
            let result = self
                .request("getSignatureStatuses", json!([[signature]]))
                .await?;

            let status = result.pointer("/value/0").cloned().unwrap_or(Value::Null);

            if !status.is_null() {
                if let Some(err) = status.get("err").filter(|err| !err.is_null()) {
                    return Err(LedgerError::TransactionFailed {
                        signature: signature.to_owned(),
                        reason: err.to_string(),
                    });
                }

                if matches!(
                    status.pointer("/confirmationStatus").and_then(Value::as_str),
                    Some("confirmed" | "finalized")
                ) {
                    return Ok(());
                }
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(LedgerError::ConfirmationTimeout {
                    signature: signature.to_owned(),
                    timeout: self.confirmation_timeout,
                });
            }

            debug!(%signature, "waiting for transaction confirmation");
            tokio::time::sleep(CONFIRMATION_POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl Anchor for LedgerClient {
    async fn record_digest(&self, digest: &str) -> Result<String, LedgerError> {
        let balance = self.balance().await?;

        if balance < self.min_balance {
            return Err(LedgerError::InsufficientBalance {
                balance,
                required: self.min_balance,
                address: self.address.clone(),
            });
        }

        let memo = format!("{MEMO_TAG}{digest}");

        let message = wire::MemoMessage {
            payer: self.signing_key.verifying_key().to_bytes(),
            recent_blockhash: self.latest_blockhash().await?,
            memo: memo.as_bytes(),
        }
        .encode();

        let transaction = base64::engine::general_purpose::STANDARD
            .encode(wire::sign_transaction(&self.signing_key, &message));

        let result = self
            .request(
                "sendTransaction",
                json!([transaction, { "encoding": "base64", "preflightCommitment": "confirmed" }]),
            )
            .await?;

        let signature = result
            .as_str()
            .ok_or_else(|| unexpected("sendTransaction", &result))?
            .to_owned();

        self.await_confirmation(&signature).await?;

        info!(%signature, "anchored contract digest");

        Ok(signature)
    }

    async fn verify_digest(
        &self,
        tx_id: &str,
        expected: &str,
    ) -> Result<Verification, LedgerError> {
        let result = self
            .request(
                "getTransaction",
                json!([tx_id, {
                    "encoding": "json",
                    "commitment": "confirmed",
                    "maxSupportedTransactionVersion": 0,
                }]),
            )
            .await?;

        if result.is_null() {
            return Ok(Verification::failure(VerificationFailure::NotFound));
        }

        let envelope: response::TransactionEnvelope = serde_json::from_value(result)
            .map_err(|err| LedgerError::UnexpectedReply(format!("getTransaction: {err}")))?;

        let message = response::Message::from(envelope.transaction.message);

        Ok(match message.tagged_memo(MEMO_TAG) {
            Some(blockchain_hash) => Verification {
                matches: blockchain_hash == expected,
                blockchain_hash: Some(blockchain_hash),
                error: None,
            },
            None => Verification::failure(VerificationFailure::Undecodable),
        })
    }
}

fn unexpected(method: &str, result: &Value) -> LedgerError {
    LedgerError::UnexpectedReply(format!("{method} returned {result}"))
}

/// In-memory [`Anchor`] implementation for tests.
#[cfg(feature = "test-utils")]
pub struct MockLedger {
    memos: std::sync::Mutex<std::collections::HashMap<String, String>>,
    funded: bool,
}

#[cfg(feature = "test-utils")]
impl MockLedger {
    /// Ledger whose operator account can always pay the fees.
    pub fn funded() -> Self {
        Self {
            memos: Default::default(),
            funded: true,
        }
    }

    /// Ledger whose operator account is below the funding threshold.
    pub fn broke() -> Self {
        Self {
            memos: Default::default(),
            funded: false,
        }
    }

    /// Record an arbitrary memo payload under `signature`.
    pub fn seed_memo(&self, signature: &str, memo: &str) {
        self.memos
            .lock()
            .expect("mock ledger lock")
            .insert(signature.to_owned(), memo.to_owned());
    }
}

#[cfg(feature = "test-utils")]
#[async_trait]
impl Anchor for MockLedger {
    async fn record_digest(&self, digest: &str) -> Result<String, LedgerError> {
        if !self.funded {
            return Err(LedgerError::InsufficientBalance {
                balance: 0,
                required: 1_000_000,
                address: String::from("mock-operator"),
            });
        }

        let mut memos = self.memos.lock().expect("mock ledger lock");

        let signature = format!("mock-tx-{}", memos.len() + 1);
        memos.insert(signature.clone(), format!("{MEMO_TAG}{digest}"));

        Ok(signature)
    }

    async fn verify_digest(
        &self,
        tx_id: &str,
        expected: &str,
    ) -> Result<Verification, LedgerError> {
        let memos = self.memos.lock().expect("mock ledger lock");

        Ok(match memos.get(tx_id).map(String::as_str) {
            Some(memo) => match memo.strip_prefix(MEMO_TAG) {
                Some(hash) => Verification {
                    matches: hash == expected,
                    blockchain_hash: Some(hash.to_owned()),
                    error: None,
                },
                None => Verification::failure(VerificationFailure::Undecodable),
            },
            None => Verification::failure(VerificationFailure::NotFound),
        })
    }
}
