//! Startup configuration read from the environment (after `.env` is loaded)

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::api::SolanaClient;
use crate::services::filter_service::DEFAULT_FEE_THRESHOLD;
use crate::utils::errors::ConfigError;

/// Token mint watched when `MEV_MONITORED_ADDRESS` is unset
pub const DEFAULT_MONITORED_ADDRESS: &str = "7TTcLchHbXz5fQqbBcoWi1Zen87AiziaqFCrf9Enpump";

/// Signatures fetched per poll when enrichment is on and no limit is set
pub const DEFAULT_ENRICHED_SIGNATURE_LIMIT: u32 = 25;

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// What starts each background poll cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerMode {
    Interval,
    Logs,
}

impl FromStr for TriggerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "interval" | "poll" => Ok(TriggerMode::Interval),
            "logs" => Ok(TriggerMode::Logs),
            other => Err(format!("expected `interval` or `logs`, got `{}`", other)),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub discord_token: String,
    pub alert_channel_id: u64,
    pub rpc_url: String,
    pub ws_url: String,
    pub monitored_address: String,
    pub fee_threshold: u64,
    pub poll_interval: Duration,
    pub trigger: TriggerMode,
    pub seen_cache_size: usize,
    pub rpc_timeout: Duration,
    pub rpc_max_rps: u32,
    pub signature_limit: Option<u32>,
    pub enrich_transactions: bool,
    pub command_prefix: String,
    pub command_cooldown: Duration,
}

// Hand-written so the token never reaches the logs
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"<redacted>")
            .field("alert_channel_id", &self.alert_channel_id)
            .field("rpc_url", &self.rpc_url)
            .field("ws_url", &self.ws_url)
            .field("monitored_address", &self.monitored_address)
            .field("fee_threshold", &self.fee_threshold)
            .field("poll_interval", &self.poll_interval)
            .field("trigger", &self.trigger)
            .field("seen_cache_size", &self.seen_cache_size)
            .field("rpc_timeout", &self.rpc_timeout)
            .field("rpc_max_rps", &self.rpc_max_rps)
            .field("signature_limit", &self.signature_limit)
            .field("enrich_transactions", &self.enrich_transactions)
            .field("command_prefix", &self.command_prefix)
            .field("command_cooldown", &self.command_cooldown)
            .finish()
    }
}

/// Environment lookup that treats empty values as unset
struct Env<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn get(&self, key: &'static str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::Missing(key))
    }

    fn parse<T>(&self, key: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        match self.get(key) {
            Some(raw) => raw.parse::<T>().map(Some).map_err(|e| ConfigError::Invalid {
                key,
                value: raw.clone(),
                reason: e.to_string(),
            }),
            None => Ok(None),
        }
    }

    fn flag(&self, key: &'static str) -> Result<Option<bool>, ConfigError> {
        match self.get(key) {
            Some(raw) => match raw.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(Some(true)),
                "0" | "false" | "no" | "off" => Ok(Some(false)),
                _ => Err(ConfigError::Invalid {
                    key,
                    value: raw,
                    reason: "expected true or false".to_string(),
                }),
            },
            None => Ok(None),
        }
    }
}

fn positive_millis(key: &'static str, value: u64) -> Result<Duration, ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(Duration::from_millis(value))
}

/// Solana addresses are 32 bytes of base58, which encodes to 32-44 characters
pub fn validate_address(address: &str) -> Result<(), String> {
    if !(32..=44).contains(&address.len()) {
        return Err(format!("expected 32-44 characters, got {}", address.len()));
    }
    if let Some(c) = address.chars().find(|c| !BASE58_ALPHABET.contains(*c)) {
        return Err(format!("`{}` is not a base58 character", c));
    }
    Ok(())
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        let discord_token = env.required("DISCORD_TOKEN")?;
        let alert_channel_id = env
            .parse::<u64>("MEV_ALERT_CHANNEL_ID")?
            .ok_or(ConfigError::Missing("MEV_ALERT_CHANNEL_ID"))?;
        if alert_channel_id == 0 {
            return Err(ConfigError::Invalid {
                key: "MEV_ALERT_CHANNEL_ID",
                value: "0".to_string(),
                reason: "channel id must be non-zero".to_string(),
            });
        }

        let monitored_address = env
            .get("MEV_MONITORED_ADDRESS")
            .unwrap_or_else(|| DEFAULT_MONITORED_ADDRESS.to_string());
        validate_address(&monitored_address).map_err(|reason| ConfigError::Invalid {
            key: "MEV_MONITORED_ADDRESS",
            value: monitored_address.clone(),
            reason,
        })?;

        let poll_interval = positive_millis(
            "MEV_POLL_INTERVAL_MS",
            env.parse::<u64>("MEV_POLL_INTERVAL_MS")?.unwrap_or(1000),
        )?;
        let rpc_timeout = positive_millis(
            "SOLANA_RPC_TIMEOUT_SECS",
            env.parse::<u64>("SOLANA_RPC_TIMEOUT_SECS")?
                .unwrap_or(10)
                .saturating_mul(1000),
        )?;

        let rpc_max_rps = env.parse::<u32>("SOLANA_RPC_MAX_RPS")?.unwrap_or(10);
        let enrich_transactions = env.flag("SOLANA_ENRICH_TRANSACTIONS")?.unwrap_or(false);
        let mut signature_limit = env.parse::<u32>("SOLANA_SIGNATURE_LIMIT")?;
        if enrich_transactions {
            let limit = *signature_limit.get_or_insert(DEFAULT_ENRICHED_SIGNATURE_LIMIT);
            // Every signature costs one throttled getTransaction per poll
            let per_timeout = u64::from(rpc_max_rps.max(1)).saturating_mul(rpc_timeout.as_secs());
            if u64::from(limit) >= per_timeout {
                return Err(ConfigError::Invalid {
                    key: "SOLANA_SIGNATURE_LIMIT",
                    value: limit.to_string(),
                    reason: format!(
                        "{} lookups at {} requests/s exceed the {}s RPC timeout",
                        limit,
                        rpc_max_rps.max(1),
                        rpc_timeout.as_secs()
                    ),
                });
            }
        }

        let command_cooldown =
            Duration::from_secs(env.parse::<u64>("COMMAND_COOLDOWN_SECS")?.unwrap_or(5));

        Ok(Self {
            discord_token,
            alert_channel_id,
            rpc_url: env
                .get("SOLANA_RPC_URL")
                .unwrap_or_else(|| SolanaClient::DEFAULT_RPC_URL.to_string()),
            ws_url: env
                .get("SOLANA_WS_URL")
                .unwrap_or_else(|| SolanaClient::DEFAULT_WS_URL.to_string()),
            monitored_address,
            fee_threshold: env
                .parse::<u64>("MEV_FEE_THRESHOLD")?
                .unwrap_or(DEFAULT_FEE_THRESHOLD),
            poll_interval,
            trigger: env.parse::<TriggerMode>("MEV_TRIGGER")?.unwrap_or(TriggerMode::Interval),
            seen_cache_size: env.parse::<usize>("MEV_SEEN_CACHE_SIZE")?.unwrap_or(1024),
            rpc_timeout,
            rpc_max_rps,
            signature_limit,
            enrich_transactions,
            command_prefix: env.get("COMMAND_PREFIX").unwrap_or_else(|| "$".to_string()),
            command_cooldown,
        })
    }
}
