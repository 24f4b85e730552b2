use std::sync::Arc;

use {
    anyhow::Context,
    clap::Parser,
    secrecy::ExposeSecret,
    tokio_util::sync::CancellationToken,
    tracing::{info, warn},
    tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    relaygram_config::RelaygramConfig,
    relaygram_relay::{Identities, RelayOptions, RelayPipeline, RetryPolicy},
    relaygram_telegram::{BotConfig, BotSession},
};

#[derive(Parser)]
#[command(name = "relaygram", about = "relaygram — Telegram media relay bot")]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, default_value_t = false)]
    json_logs: bool,

    /// Config file path (overrides discovery).
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Health probe port (overrides config value).
    #[arg(long)]
    port: Option<u16>,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Last characters of the bot token, for boot logging without leaking it.
fn token_tail(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    let start = chars.len().saturating_sub(6);
    chars[start..].iter().collect()
}

fn relay_options(config: &RelaygramConfig) -> RelayOptions {
    RelayOptions {
        retry: RetryPolicy {
            max_rate_limit_retries: config.relay.rate_limit_max_retries,
        },
        spool_dir: config
            .relay
            .spool_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("relaygram")),
        require_delegated: config.relay.require_delegated,
    }
}

fn build_bot(config: &BotConfig) -> anyhow::Result<teloxide::Bot> {
    let client = teloxide::net::default_reqwest_settings()
        .timeout(std::time::Duration::from_secs(45))
        .build()?;
    Ok(teloxide::Bot::with_client(
        config.token.expose_secret(),
        client,
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "relaygram starting");

    let mut config = match cli.config {
        Some(ref path) => {
            relaygram_config::load_config(path).context("failed to load config file")?
        },
        None => relaygram_config::discover_and_load(),
    };
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let token = config.telegram.token.expose_secret();
    if token.is_empty() {
        anyhow::bail!("telegram bot token is required (RELAYGRAM_BOT_TOKEN or relaygram.toml)");
    }
    info!(
        token_tail = %token_tail(token),
        require_delegated = config.relay.require_delegated,
        port = config.server.port,
        "boot configuration"
    );

    // Health probe first, so platform liveness checks pass while the bot
    // connects.
    let cancel = CancellationToken::new();
    let probe_cancel = cancel.clone();
    let bind = config.server.bind.clone();
    let port = config.server.port;
    let probe = tokio::spawn(async move {
        if let Err(e) = relaygram_gateway::serve(&bind, port, probe_cancel).await {
            warn!(error = %e, "health server exited with error");
        }
    });

    // The bot account fills the identity pair's public slot; a delegated
    // MTProto session is wired in by embedders through the relay crate.
    let bot_config = BotConfig::new(config.telegram.token.clone());
    let identities = Identities::public_only(Arc::new(BotSession::new(build_bot(&bot_config)?)));
    let pipeline = Arc::new(RelayPipeline::new(identities, relay_options(&config)));

    let polling_cancel = relaygram_telegram::start_polling(bot_config, pipeline)
        .await
        .context("failed to start telegram polling")?;

    tokio::signal::ctrl_c().await?;
    info!("shutting down on SIGINT");
    polling_cancel.cancel();
    cancel.cancel();
    let _ = probe.await;

    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_tail_is_char_safe() {
        assert_eq!(token_tail("1234567890:ABCDEF"), "ABCDEF");
        assert_eq!(token_tail("abc"), "abc");
        assert_eq!(token_tail(""), "");
    }

    #[test]
    fn relay_options_fall_back_to_temp_spool() {
        let config = RelaygramConfig::default();
        let options = relay_options(&config);
        assert!(options.spool_dir.ends_with("relaygram"));
        assert_eq!(options.retry.max_rate_limit_retries, 5);
        assert!(options.require_delegated);
    }
}
