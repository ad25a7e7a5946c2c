use tracing::error;

use crate::api::ChatTransport;
use crate::services::alert_service;
use crate::services::detection_service::MevScanner;
use crate::utils::errors::DeliveryError;

pub const CHECKING: &str = "Checking for MEV activity...";
pub const NO_ACTIVITY: &str = "No MEV activity detected.";
pub const CHECK_FAILED: &str = "An error occurred while checking for MEV activity.";

/// One on-demand scan, answered in the channel that asked
pub async fn execute(
    scanner: &MevScanner,
    transport: &dyn ChatTransport,
    channel: u64,
) -> Result<(), DeliveryError> {
    transport.send_message(channel, CHECKING).await?;

    match scanner.scan().await {
        Ok(notable) if notable.is_empty() => transport.send_message(channel, NO_ACTIVITY).await,
        Ok(notable) => {
            let alert = alert_service::format_alert(&notable);
            transport.send_message(channel, &alert).await
        }
        Err(e) => {
            error!("check_mev failed for {}: {}", scanner.address(), e);
            transport.send_message(channel, CHECK_FAILED).await
        }
    }
}
