use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC 2.0 request envelope
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: Value,
}

impl<'a> RpcRequest<'a> {
    pub fn new(id: u64, method: &'a str, params: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

/// JSON-RPC 2.0 response envelope; exactly one of `result`/`error` is expected
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<RpcErrorObject>,
}

/// Error object from a failed JSON-RPC call
#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

/// `getTransaction` result, reduced to what enrichment needs
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetail {
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub meta: Option<TransactionMeta>,
    #[serde(default)]
    pub transaction: Option<TransactionEnvelope>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionMeta {
    #[serde(default)]
    pub fee: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionEnvelope {
    pub message: TransactionMessage,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMessage {
    #[serde(default)]
    pub account_keys: Vec<String>,
}

impl TransactionDetail {
    /// The first account key pays the fee
    pub fn fee_payer(&self) -> Option<&str> {
        self.transaction
            .as_ref()
            .and_then(|tx| tx.message.account_keys.first())
            .map(String::as_str)
    }
}

/// One `logsNotification` pushed by a `logsSubscribe` subscription.
///
/// The payload is not interpreted; it only signals that something touched the address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogNotification {
    pub slot: Option<u64>,
    pub signature: Option<String>,
}

impl LogNotification {
    /// Parse a WebSocket text frame. Subscription confirmations and other methods yield `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(text).ok()?;
        if value.get("method")?.as_str()? != "logsNotification" {
            return None;
        }

        let result = value.get("params")?.get("result")?;
        Some(Self {
            slot: result
                .get("context")
                .and_then(|c| c.get("slot"))
                .and_then(Value::as_u64),
            signature: result
                .get("value")
                .and_then(|v| v.get("signature"))
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_logs_notification() {
        let frame = r#"{
            "jsonrpc": "2.0",
            "method": "logsNotification",
            "params": {
                "result": {
                    "context": { "slot": 5208469 },
                    "value": {
                        "signature": "5h6xBEauJ3PK6SWCZ1PGjBvj8vDdWG3KpwATGy1ARAXFSDwt8GFXM7W5Ncn16wmqokgpiKRLuS83KUxyZyv2sUYv",
                        "err": null,
                        "logs": ["Program 11111111111111111111111111111111 invoke [1]"]
                    }
                },
                "subscription": 24040
            }
        }"#;

        let notification = LogNotification::parse(frame).unwrap();
        assert_eq!(notification.slot, Some(5208469));
        assert!(notification.signature.unwrap().starts_with("5h6x"));
    }

    #[test]
    fn test_parse_ignores_subscription_confirmation() {
        assert!(LogNotification::parse(r#"{"jsonrpc":"2.0","result":24040,"id":1}"#).is_none());
        assert!(LogNotification::parse("not json").is_none());
    }

    #[test]
    fn test_transaction_detail_fee_payer() {
        let detail: TransactionDetail = serde_json::from_str(
            r#"{
                "blockTime": 1700000000,
                "slot": 430,
                "meta": { "fee": 5000, "err": null },
                "transaction": {
                    "message": { "accountKeys": ["Payer111", "Other222"] },
                    "signatures": ["sig"]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(detail.meta.unwrap().fee, Some(5000));
        assert_eq!(detail.block_time, Some(1_700_000_000));
    }

    #[test]
    fn test_fee_payer_is_first_account_key() {
        let detail: TransactionDetail = serde_json::from_str(
            r#"{ "transaction": { "message": { "accountKeys": ["Payer111", "Other222"] } } }"#,
        )
        .unwrap();
        assert_eq!(detail.fee_payer(), Some("Payer111"));
    }
}
