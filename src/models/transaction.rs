//! Transaction models

use serde_json::Value;

/// Lamports in one SOL
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// One ledger transaction as reported for the monitored address.
///
/// `getSignaturesForAddress` only guarantees `signature`; `fee` and `owner` are
/// present when the record was enriched (or a richer ledger supplies them), so every
/// consumer has to treat them as optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub signature: String,
    pub slot: Option<u64>,
    /// Seconds since the Unix epoch
    pub block_time: Option<i64>,
    /// Fee in lamports
    pub fee: Option<u64>,
    /// Wallet that paid for / owns the transaction
    pub owner: Option<String>,
}

impl TransactionRecord {
    pub fn new(signature: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
            slot: None,
            block_time: None,
            fee: None,
            owner: None,
        }
    }

    pub fn with_fee(mut self, fee: u64) -> Self {
        self.fee = Some(fee);
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_block_time(mut self, block_time: i64) -> Self {
        self.block_time = Some(block_time);
        self
    }

    /// Decode one entry of an RPC result leniently.
    ///
    /// A field with the wrong JSON type counts as absent. Returns `None` only when the
    /// entry has no string `signature`, since nothing downstream can identify it.
    pub fn from_json(value: &Value) -> Option<Self> {
        let signature = value.get("signature")?.as_str()?.to_string();

        Some(Self {
            signature,
            slot: value.get("slot").and_then(Value::as_u64),
            block_time: value.get("blockTime").and_then(Value::as_i64),
            fee: value.get("fee").and_then(Value::as_u64),
            owner: value
                .get("owner")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }

    /// Fee used for classification; a missing fee never makes a record notable
    pub fn fee_or_zero(&self) -> u64 {
        self.fee.unwrap_or(0)
    }
}
