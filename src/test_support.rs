//! In-memory collaborators for unit tests

use serde_json::{json, Value};
use serenity::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::api::{ChatTransport, LedgerClient, SolanaClient};
use crate::models::TransactionRecord;
use crate::utils::errors::{DeliveryError, FetchError};

/// Ledger that replays scripted responses, then keeps returning `fallback`
pub struct MockLedger {
    responses: Mutex<VecDeque<Result<Vec<TransactionRecord>, FetchError>>>,
    fallback: Vec<TransactionRecord>,
    calls: Mutex<Vec<String>>,
    enriched: Mutex<Vec<String>>,
}

impl MockLedger {
    pub fn scripted(
        responses: Vec<Result<Vec<TransactionRecord>, FetchError>>,
        fallback: Vec<TransactionRecord>,
    ) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            fallback,
            calls: Mutex::new(Vec::new()),
            enriched: Mutex::new(Vec::new()),
        }
    }

    pub fn with_records(records: Vec<TransactionRecord>) -> Self {
        Self::scripted(Vec::new(), records)
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn requested_addresses(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Every signature handed to `enrich`, across all calls
    pub fn enriched_signatures(&self) -> Vec<String> {
        self.enriched.lock().unwrap().clone()
    }

    /// Wait (up to two seconds) until the ledger has been polled `n` times
    pub async fn wait_for_calls(&self, n: usize) {
        let waited = tokio::time::timeout(Duration::from_secs(2), async {
            while self.call_count() < n {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
        .await;
        assert!(waited.is_ok(), "ledger polled {} times, wanted {}", self.call_count(), n);
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn signatures_for_address(
        &self,
        address: &str,
    ) -> Result<Vec<TransactionRecord>, FetchError> {
        self.calls.lock().unwrap().push(address.to_string());
        match self.responses.lock().unwrap().pop_front() {
            Some(response) => response,
            None => Ok(self.fallback.clone()),
        }
    }

    async fn enrich(
        &self,
        records: Vec<TransactionRecord>,
        _timeout: Duration,
    ) -> Vec<TransactionRecord> {
        let mut enriched = self.enriched.lock().unwrap();
        enriched.extend(records.iter().map(|r| r.signature.clone()));
        records
    }
}

/// Ledger that never answers within any sensible timeout
pub struct SlowLedger {
    delay: Duration,
}

impl SlowLedger {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl LedgerClient for SlowLedger {
    async fn signatures_for_address(
        &self,
        _address: &str,
    ) -> Result<Vec<TransactionRecord>, FetchError> {
        tokio::time::sleep(self.delay).await;
        Ok(Vec::new())
    }
}

/// Transport that records every attempted send and fails the first `failures` of them
pub struct MockTransport {
    attempts: Mutex<Vec<(u64, String)>>,
    failures: Mutex<usize>,
    fail_on: Mutex<Vec<usize>>,
    limit: Option<usize>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::failing(0)
    }

    pub fn failing(failures: usize) -> Self {
        Self {
            attempts: Mutex::new(Vec::new()),
            failures: Mutex::new(failures),
            fail_on: Mutex::new(Vec::new()),
            limit: None,
        }
    }

    /// Advertise a per-message length limit
    pub fn with_message_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Also fail the attempts at these zero-based positions
    pub fn failing_at(self, attempts: Vec<usize>) -> Self {
        *self.fail_on.lock().unwrap() = attempts;
        self
    }

    /// Every attempted send, successful or not
    pub fn attempts(&self) -> Vec<(u64, String)> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.attempts().into_iter().map(|(_, text)| text).collect()
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn send_message(&self, target: u64, text: &str) -> Result<(), DeliveryError> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            attempts.push((target, text.to_string()));
            attempts.len() - 1
        };
        if self.fail_on.lock().unwrap().contains(&attempt) {
            return Err(DeliveryError::Api("mock delivery failure".to_string()));
        }

        let mut failures = self.failures.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return Err(DeliveryError::Api("mock delivery failure".to_string()));
        }
        Ok(())
    }

    fn message_limit(&self) -> Option<usize> {
        self.limit
    }
}

/// Canned HTTP reply from `serve_json_rpc`
pub struct RpcReply {
    status: u16,
    headers: Vec<(&'static str, String)>,
    body: String,
    delay: Duration,
}

impl RpcReply {
    /// 200 with a JSON-RPC `result`
    pub fn result(result: Value) -> Self {
        Self::status(200, &json!({ "jsonrpc": "2.0", "result": result, "id": 1 }).to_string())
    }

    /// 200 with a JSON-RPC `error` object
    pub fn rpc_error(code: i64, message: &str) -> Self {
        let body = json!({
            "jsonrpc": "2.0",
            "error": { "code": code, "message": message },
            "id": 1
        });
        Self::status(200, &body.to_string())
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn with_header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Serve JSON-RPC over plain HTTP on a local port, answering each request body with
/// `reply`. Returns the base URL.
pub async fn serve_json_rpc<F>(reply: F) -> String
where
    F: Fn(&Value) -> RpcReply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let reply = Arc::new(reply);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let reply = reply.clone();
            tokio::spawn(async move {
                let request = read_request_body(&mut socket).await;
                let answer = reply(&request);
                tokio::time::sleep(answer.delay).await;

                let mut response = format!(
                    "HTTP/1.1 {} Stub\r\ncontent-type: application/json\r\n\
                     content-length: {}\r\nconnection: close\r\n",
                    answer.status,
                    answer.body.len()
                );
                for (name, value) in &answer.headers {
                    response.push_str(&format!("{}: {}\r\n", name, value));
                }
                response.push_str("\r\n");
                response.push_str(&answer.body);

                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{}", addr)
}

async fn read_request_body(socket: &mut TcpStream) -> Value {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break end;
        }
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return Value::Null,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
    let length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let body_start = header_end + 4;
    while buf.len() < body_start + length {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    let body_end = (body_start + length).min(buf.len());
    serde_json::from_slice(&buf[body_start..body_end]).unwrap_or(Value::Null)
}

/// Client pointed at a local stub, bypassing any proxy configured in the environment
pub fn local_client(url: &str) -> SolanaClient {
    SolanaClient::new(url.to_string(), "ws://127.0.0.1:1".to_string())
        .with_http_client(reqwest::Client::builder().no_proxy().build().unwrap())
}
