//! External collaborators: the ledger the bot reads from and the chat service it writes to.

use serenity::async_trait;
use std::time::Duration;

use crate::models::TransactionRecord;
use crate::utils::errors::{DeliveryError, FetchError};

pub mod discord;
pub mod solana;

pub use discord::DiscordTransport;
pub use solana::SolanaClient;

/// Source of transaction records for an address
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Most recent transactions touching `address`, newest first
    async fn signatures_for_address(
        &self,
        address: &str,
    ) -> Result<Vec<TransactionRecord>, FetchError>;

    /// Fill in details the listing lacks. Each lookup is bounded by `timeout`;
    /// a lookup that fails or times out leaves its record unchanged.
    async fn enrich(
        &self,
        records: Vec<TransactionRecord>,
        _timeout: Duration,
    ) -> Vec<TransactionRecord> {
        records
    }
}

/// Delivers text to a conversation.
///
/// Implementations make a single attempt; any retry policy belongs in a wrapper.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_message(&self, target: u64, text: &str) -> Result<(), DeliveryError>;

    /// Longest text the service accepts in one message, if it has a limit
    fn message_limit(&self) -> Option<usize> {
        None
    }
}
