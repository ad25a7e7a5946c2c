use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use mev_alert_bot::api::{DiscordTransport, SolanaClient};
use mev_alert_bot::commands::{self, BotState};
use mev_alert_bot::config::{Config, TriggerMode};
use mev_alert_bot::services::{FeeThresholdStrategy, MevScanner, MonitorLoop, MonitorTrigger};
use mev_alert_bot::utils::CommandCooldowns;

struct Handler {
    state: Arc<BotState>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let transport = DiscordTransport::new(ctx.http.clone());
        commands::handle_message(
            &self.state,
            &transport,
            msg.channel_id.get(),
            msg.author.id.get(),
            &msg.content,
        )
        .await;
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);
    }
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("mev_alert_bot=debug".parse().unwrap())
                .add_directive("serenity=warn".parse().unwrap()),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("🤖 Starting MEV alert bot...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!("Loaded configuration: {:?}", config);

    let solana = Arc::new(
        SolanaClient::new(config.rpc_url.clone(), config.ws_url.clone())
            .with_signature_limit(config.signature_limit)
            .with_enrichment(config.enrich_transactions)
            .with_max_requests_per_second(config.rpc_max_rps),
    );
    let strategy = Arc::new(FeeThresholdStrategy::new(config.fee_threshold));
    let scanner = Arc::new(MevScanner::new(
        solana.clone(),
        strategy,
        config.monitored_address.clone(),
        config.rpc_timeout,
    ));

    let state = Arc::new(BotState {
        scanner: scanner.clone(),
        cooldowns: CommandCooldowns::new(config.command_cooldown),
        prefix: config.command_prefix.clone(),
    });

    let intents = GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MESSAGES;

    let mut client = match Client::builder(&config.discord_token, intents)
        .event_handler(Handler { state })
        .await
    {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create client: {}", e);
            std::process::exit(1);
        }
    };

    let trigger = match config.trigger {
        TriggerMode::Interval => MonitorTrigger::Interval,
        TriggerMode::Logs => {
            MonitorTrigger::Logs(solana.subscribe_logs(&config.monitored_address))
        }
    };

    let monitor = MonitorLoop::new(
        scanner,
        Arc::new(DiscordTransport::new(client.http.clone())),
        config.alert_channel_id,
        config.poll_interval,
    )
    .with_seen_capacity(config.seen_cache_size)
    .with_trigger(trigger);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let monitor_handle = tokio::spawn(monitor.run(shutdown_rx));

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Could not listen for Ctrl-C: {}", e);
            return;
        }
        info!("Shutting down...");
        shard_manager.shutdown_all().await;
    });

    if let Err(e) = client.start().await {
        error!("Client error: {}", e);
    }

    // Stop polling once the gateway has stopped
    let _ = shutdown_tx.send(true);
    if let Err(e) = monitor_handle.await {
        error!("Monitor task failed: {}", e);
    }
}
