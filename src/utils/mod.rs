pub mod errors;
pub mod ratelimit;
pub mod rpc_ratelimit;
pub mod seen;

pub use errors::{ConfigError, DeliveryError, FetchError};
pub use ratelimit::CommandCooldowns;
pub use rpc_ratelimit::RpcRateLimiter;
pub use seen::RecentSignatures;
