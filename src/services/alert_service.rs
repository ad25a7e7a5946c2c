use chrono::{DateTime, Utc};

use crate::models::{TransactionRecord, LAMPORTS_PER_SOL};

/// Shown for any field the ledger did not supply
pub const UNKNOWN: &str = "Unknown";

const ALERT_HEADER: &str = "🚨 MEV Activity Detected 🚨";

/// Render lamports as an exact SOL amount with nine decimals
pub fn format_sol(lamports: u64) -> String {
    format!("{}.{:09}", lamports / LAMPORTS_PER_SOL, lamports % LAMPORTS_PER_SOL)
}

/// Render a Unix timestamp as UTC, or `Unknown` when absent or out of range
pub fn format_timestamp(block_time: Option<i64>) -> String {
    block_time
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// One block of the alert for a single transaction
fn format_record(record: &TransactionRecord) -> String {
    let fee = record.fee_or_zero();
    format!(
        "Transaction ID: {}\nWallet: {}\nFee: {} SOL ({} lamports)\nTimestamp: {}\n",
        record.signature,
        record.owner.as_deref().unwrap_or(UNKNOWN),
        format_sol(fee),
        fee,
        format_timestamp(record.block_time),
    )
}

/// Build the alert text for a batch of notable transactions, one block per record in input order
pub fn format_alert(records: &[TransactionRecord]) -> String {
    let mut message = format!("{}\n", ALERT_HEADER);

    for record in records {
        message.push('\n');
        message.push_str(&format_record(record));
    }

    message
}

/// Group `records` into consecutive batches whose `format_alert` text stays within
/// `limit` characters. A record too large for any batch still gets one of its own.
pub fn batch_for_limit(records: &[TransactionRecord], limit: usize) -> Vec<&[TransactionRecord]> {
    let header_len = ALERT_HEADER.chars().count() + 1;
    let mut batches = Vec::new();
    let mut start = 0;
    let mut len = header_len;

    for (i, record) in records.iter().enumerate() {
        let block_len = format_record(record).chars().count() + 1;
        if i > start && len + block_len > limit {
            batches.push(&records[start..i]);
            start = i;
            len = header_len;
        }
        len += block_len;
    }

    if start < records.len() {
        batches.push(&records[start..]);
    }
    batches
}
