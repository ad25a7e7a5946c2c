use crate::api::ChatTransport;
use crate::utils::errors::DeliveryError;

pub async fn execute(
    transport: &dyn ChatTransport,
    channel: u64,
    prefix: &str,
) -> Result<(), DeliveryError> {
    let text = format!("Welcome! Use `{}help` to see available commands.", prefix);
    transport.send_message(channel, &text).await
}
