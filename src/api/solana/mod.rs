pub mod client;
pub mod models;
pub mod subscription;

pub use client::SolanaClient;
pub use models::LogNotification;
