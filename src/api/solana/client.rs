use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use serenity::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use super::models::{RpcRequest, RpcResponse, TransactionDetail};
use crate::api::LedgerClient;
use crate::models::TransactionRecord;
use crate::utils::errors::FetchError;
use crate::utils::rpc_ratelimit::RpcRateLimiter;

/// Solana JSON-RPC client for reading an address's transaction history
pub struct SolanaClient {
    http_client: HttpClient,
    rpc_url: String,
    pub(super) ws_url: String,
    rate_limiter: RpcRateLimiter,
    signature_limit: Option<u32>,
    enrich: bool,
    next_id: AtomicU64,
}

impl SolanaClient {
    pub const DEFAULT_RPC_URL: &'static str = "https://api.mainnet-beta.solana.com";
    pub const DEFAULT_WS_URL: &'static str = "wss://api.mainnet-beta.solana.com";
    const DEFAULT_MAX_RPS: u32 = 10;

    /// Create a new client against the given HTTP and WebSocket endpoints
    pub fn new(rpc_url: String, ws_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            rpc_url,
            ws_url,
            rate_limiter: RpcRateLimiter::new(Self::DEFAULT_MAX_RPS),
            signature_limit: None,
            enrich: false,
            next_id: AtomicU64::new(1),
        }
    }

    /// Cap the number of signatures requested per poll (RPC default is 1000)
    pub fn with_signature_limit(mut self, limit: Option<u32>) -> Self {
        self.signature_limit = limit;
        self
    }

    /// Look up each signature with `getTransaction` to fill in fee and fee payer
    pub fn with_enrichment(mut self, enrich: bool) -> Self {
        self.enrich = enrich;
        self
    }

    /// Use a preconfigured HTTP client (proxy, TLS or timeout settings)
    pub fn with_http_client(mut self, http_client: HttpClient) -> Self {
        self.http_client = http_client;
        self
    }

    pub fn with_max_requests_per_second(mut self, max_rps: u32) -> Self {
        self.rate_limiter = RpcRateLimiter::new(max_rps);
        self
    }

    /// Seconds from a `Retry-After` header, when it is a plain integer
    fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
        headers
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse().ok())
    }

    /// Map a non-success HTTP response onto a fetch error
    async fn handle_error_response(response: reqwest::Response) -> FetchError {
        let status = response.status().as_u16();

        if status == 429 {
            let retry_after_secs = Self::retry_after_secs(response.headers());
            warn!("Solana RPC rate limited us, retry after {:?}s", retry_after_secs);
            return FetchError::RateLimited { retry_after_secs };
        }

        let body = response.text().await.unwrap_or_default();
        if status >= 500 {
            warn!("Solana RPC server error {}: {}", status, body);
        }
        FetchError::Http { status, body }
    }

    /// POST one JSON-RPC request. `Ok(None)` means the call succeeded with a null result.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<Option<T>, FetchError> {
        self.rate_limiter.acquire().await;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest::new(id, method, params);

        let response = self
            .http_client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| FetchError::Request(format!("{} failed: {}", method, e)))?;

        if !response.status().is_success() {
            return Err(Self::handle_error_response(response).await);
        }

        let body = response
            .json::<RpcResponse<T>>()
            .await
            .map_err(|e| FetchError::Malformed(format!("{}: {}", method, e)))?;

        if let Some(err) = body.error {
            return Err(FetchError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        Ok(body.result)
    }

    /// Decode the `getSignaturesForAddress` result, skipping entries without a signature
    pub(crate) fn parse_signatures(entries: &[Value]) -> Vec<TransactionRecord> {
        entries
            .iter()
            .filter_map(|entry| {
                let record = TransactionRecord::from_json(entry);
                if record.is_none() {
                    warn!("Skipping signature entry without a signature: {}", entry);
                }
                record
            })
            .collect()
    }

    /// Fill fields the signature listing lacks. Values already present win.
    pub(crate) fn enrich_record(
        mut record: TransactionRecord,
        detail: &TransactionDetail,
    ) -> TransactionRecord {
        if record.fee.is_none() {
            record.fee = detail.meta.as_ref().and_then(|m| m.fee);
        }
        if record.owner.is_none() {
            record.owner = detail.fee_payer().map(str::to_string);
        }
        if record.block_time.is_none() {
            record.block_time = detail.block_time;
        }
        record
    }

    async fn enrich_one(&self, record: TransactionRecord, timeout: Duration) -> TransactionRecord {
        let params = json!([
            record.signature,
            { "encoding": "json", "maxSupportedTransactionVersion": 0, "commitment": "confirmed" }
        ]);

        let lookup = self.call::<TransactionDetail>("getTransaction", params);
        match tokio::time::timeout(timeout, lookup).await {
            Ok(Ok(Some(detail))) => Self::enrich_record(record, &detail),
            Ok(Ok(None)) => {
                debug!("Transaction {} not available yet", record.signature);
                record
            }
            Ok(Err(e)) => {
                warn!("Failed to enrich transaction {}: {}", record.signature, e);
                record
            }
            Err(_) => {
                warn!("Timed out enriching transaction {} after {:?}", record.signature, timeout);
                record
            }
        }
    }
}

#[async_trait]
impl LedgerClient for SolanaClient {
    async fn signatures_for_address(
        &self,
        address: &str,
    ) -> Result<Vec<TransactionRecord>, FetchError> {
        let params = match self.signature_limit {
            Some(limit) => json!([address, { "limit": limit }]),
            None => json!([address]),
        };

        let entries = self
            .call::<Vec<Value>>("getSignaturesForAddress", params)
            .await?
            .ok_or_else(|| {
                FetchError::Malformed("getSignaturesForAddress returned no result".to_string())
            })?;

        let records = Self::parse_signatures(&entries);
        debug!("Fetched {} signatures for {}", records.len(), address);
        Ok(records)
    }

    async fn enrich(
        &self,
        records: Vec<TransactionRecord>,
        timeout: Duration,
    ) -> Vec<TransactionRecord> {
        if !self.enrich {
            return records;
        }

        let mut enriched = Vec::with_capacity(records.len());
        for record in records {
            enriched.push(self.enrich_one(record, timeout).await);
        }
        enriched
    }
}
