pub mod alert_service;
pub mod detection_service;
pub mod filter_service;
pub mod monitor_service;

pub use detection_service::MevScanner;
pub use filter_service::{FeeThresholdStrategy, MevStrategy};
pub use monitor_service::{CycleOutcome, MonitorLoop, MonitorState, MonitorTrigger};
