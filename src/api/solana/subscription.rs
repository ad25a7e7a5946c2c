use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use super::client::SolanaClient;
use super::models::LogNotification;

/// Reconnection base delay (milliseconds)
const WS_RECONNECT_BASE_MS: u64 = 1000;

/// Maximum reconnection delay (milliseconds)
const WS_RECONNECT_MAX_MS: u64 = 30000;

/// Consecutive failed connections before the subscription gives up
const WS_MAX_RECONNECT_ATTEMPTS: u32 = 10;

impl SolanaClient {
    /// Subscribe to logs mentioning `address`.
    ///
    /// The subscription runs on its own task and reconnects with exponential backoff.
    /// The receiver closes once reconnection is abandoned or the receiver side is dropped.
    pub fn subscribe_logs(&self, address: &str) -> mpsc::Receiver<LogNotification> {
        let (tx, rx) = mpsc::channel(100);
        let url = self.ws_url.clone();
        let params = json!([
            { "mentions": [address] },
            { "commitment": "confirmed" }
        ]);

        tokio::spawn(async move {
            run_subscription(url, params, tx).await;
        });

        rx
    }
}

async fn run_subscription(
    url: String,
    params: serde_json::Value,
    tx: mpsc::Sender<LogNotification>,
) {
    let mut reconnect_attempts = 0;
    let mut reconnect_delay = WS_RECONNECT_BASE_MS;

    loop {
        match connect_async(url.as_str()).await {
            Ok((ws_stream, _)) => {
                info!("🔌 Log subscription connected to {}", url);
                reconnect_attempts = 0;
                reconnect_delay = WS_RECONNECT_BASE_MS;

                let (mut write, mut read) = ws_stream.split();

                let subscribe_msg = json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "method": "logsSubscribe",
                    "params": params,
                });

                if let Err(e) = write.send(Message::Text(subscribe_msg.to_string())).await {
                    error!("Failed to send logsSubscribe: {}", e);
                } else {
                    while let Some(msg_result) = read.next().await {
                        match msg_result {
                            Ok(Message::Text(text)) => {
                                if let Some(notification) = LogNotification::parse(&text) {
                                    debug!("Log notification at slot {:?}", notification.slot);
                                    if tx.send(notification).await.is_err() {
                                        info!("Log subscription receiver dropped, stopping");
                                        return;
                                    }
                                }
                            }
                            Ok(Message::Ping(data)) => {
                                let _ = write.send(Message::Pong(data)).await;
                            }
                            Ok(Message::Close(_)) => {
                                warn!("Log subscription closed by server");
                                break;
                            }
                            Err(e) => {
                                error!("Log subscription error: {}", e);
                                break;
                            }
                            _ => {}
                        }
                    }
                }
            }
            Err(e) => {
                error!("Log subscription connection failed: {}", e);
            }
        }

        if tx.is_closed() {
            return;
        }

        reconnect_attempts += 1;
        if reconnect_attempts >= WS_MAX_RECONNECT_ATTEMPTS {
            error!("Log subscription gave up after {} attempts", reconnect_attempts);
            return;
        }

        warn!(
            "🔄 Reconnecting log subscription in {}ms (attempt {}/{})",
            reconnect_delay, reconnect_attempts, WS_MAX_RECONNECT_ATTEMPTS
        );
        tokio::time::sleep(Duration::from_millis(reconnect_delay)).await;
        reconnect_delay = (reconnect_delay * 2).min(WS_RECONNECT_MAX_MS);
    }
}
