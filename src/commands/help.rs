use crate::api::ChatTransport;
use crate::utils::errors::DeliveryError;

/// Static command list, rendered with the configured prefix
pub fn help_text(prefix: &str) -> String {
    format!(
        "**Available commands:**\n\
         `{p}start` - Start the bot\n\
         `{p}help` - Show this help message\n\
         `{p}check_mev` - Check for MEV activity",
        p = prefix
    )
}

pub async fn execute(
    transport: &dyn ChatTransport,
    channel: u64,
    prefix: &str,
) -> Result<(), DeliveryError> {
    transport.send_message(channel, &help_text(prefix)).await
}
