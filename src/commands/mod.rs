pub mod check_mev;
pub mod help;
pub mod start;

use std::sync::Arc;
use tracing::{debug, error};

use crate::api::ChatTransport;
use crate::services::detection_service::MevScanner;
use crate::utils::ratelimit::CommandCooldowns;

/// Reply sent when a command fails for a reason the command did not handle itself
pub const GENERIC_ERROR: &str = "An error occurred. Please try again.";

/// Everything command handlers need, built once at startup
pub struct BotState {
    pub scanner: Arc<MevScanner>,
    pub cooldowns: CommandCooldowns,
    pub prefix: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    CheckMev,
}

impl Command {
    /// Canonical name, also the cooldown key
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::CheckMev => "check_mev",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            "check_mev" | "mev" => Some(Command::CheckMev),
            _ => None,
        }
    }

    /// Parse the first word of a message; anything without `prefix` is not a command
    pub fn parse(content: &str, prefix: &str) -> Option<Self> {
        let first = content.split_whitespace().next()?;
        let name = first.strip_prefix(prefix)?;
        Self::from_name(name)
    }
}

/// Route one incoming message. Bot authors must be filtered out by the caller.
pub async fn handle_message(
    state: &BotState,
    transport: &dyn ChatTransport,
    channel: u64,
    author: u64,
    content: &str,
) {
    let Some(command) = Command::parse(content, &state.prefix) else {
        return;
    };

    if let Err((remaining, should_warn)) = state.cooldowns.check(author, command.name()).await {
        debug!("User {} on cooldown for {}", author, command.name());
        if should_warn {
            let secs = (remaining.as_millis() as u64 + 999) / 1000;
            let notice = format!("⏳ Please wait {} seconds before using this command again.", secs);
            let _ = transport.send_message(channel, &notice).await;
        }
        return;
    }

    let result = match command {
        Command::Start => start::execute(transport, channel, &state.prefix).await,
        Command::Help => help::execute(transport, channel, &state.prefix).await,
        Command::CheckMev => check_mev::execute(&state.scanner, transport, channel).await,
    };

    if let Err(e) = result {
        error!("❌ Error executing command {}: {}", command.name(), e);
        if let Err(e) = transport.send_message(channel, GENERIC_ERROR).await {
            error!("Failed to report command error to {}: {}", channel, e);
        }
    }
}
