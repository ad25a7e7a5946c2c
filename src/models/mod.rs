//! Data models shared by the ledger client, the detection services and the commands.

pub mod transaction;

pub use transaction::{TransactionRecord, LAMPORTS_PER_SOL};
