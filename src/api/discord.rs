use serenity::async_trait;
use serenity::builder::CreateMessage;
use serenity::http::Http;
use serenity::model::id::ChannelId;
use std::sync::Arc;
use tracing::debug;

use super::ChatTransport;
use crate::utils::errors::DeliveryError;

/// Discord rejects message content longer than this
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;

/// Sends plain-text messages to Discord channels over the REST API
#[derive(Clone)]
pub struct DiscordTransport {
    http: Arc<Http>,
}

impl DiscordTransport {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ChatTransport for DiscordTransport {
    async fn send_message(&self, target: u64, text: &str) -> Result<(), DeliveryError> {
        if text.trim().is_empty() {
            return Err(DeliveryError::EmptyMessage);
        }
        if target == 0 {
            return Err(DeliveryError::Api("channel id 0 is not a valid target".to_string()));
        }

        let channel = ChannelId::new(target);
        let chunks = split_message(text, DISCORD_MESSAGE_LIMIT);
        debug!("Sending {} chunk(s) to channel {}", chunks.len(), target);

        for chunk in chunks {
            channel
                .send_message(&self.http, CreateMessage::default().content(chunk))
                .await
                .map_err(|e| DeliveryError::Api(e.to_string()))?;
        }

        Ok(())
    }

    fn message_limit(&self) -> Option<usize> {
        Some(DISCORD_MESSAGE_LIMIT)
    }
}

/// Split `text` into pieces of at most `limit` characters, preferring line boundaries.
/// Lines longer than `limit` are hard-split on character boundaries.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();

        if current_len + line_len > limit && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len > limit {
            for c in line.chars() {
                if current_len == limit {
                    chunks.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                current.push(c);
                current_len += 1;
            }
        } else {
            current.push_str(line);
            current_len += line_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
