//! Entry point: load config, build the SDK client and run one command.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use socketbus::config::Config;
use socketbus::crypto::{decrypt_payload, derive_password};
use socketbus::models::{ChannelType, EncryptedEnvelope};
use socketbus::{ChannelAuthenticator, SocketBus};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "socketbus", about = "SocketBus broadcast service tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Total of users online
    Status,
    /// Channels in use
    Channels,
    /// Number of users connected to a channel
    Count { channel: String },
    /// Users connected to a channel
    Users { channel: String },
    /// Broadcast an event with a JSON payload to one or more channels
    Broadcast {
        event: String,
        data: String,
        #[arg(required = true)]
        channels: Vec<String>,
    },
    /// Sign socket auth for a channel
    Auth {
        socket_id: String,
        channel: String,
        /// Presence member data (JSON), required for presence channels
        #[arg(long)]
        data: Option<String>,
        #[arg(long, default_value = "")]
        user_id: String,
    },
    /// Check an inbound webhook's Authorization header
    VerifyWebhook { signature: String },
    /// Decrypt a `{ct, iv, s}` envelope received on a channel
    Decrypt { channel: String, envelope: String },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let credentials = config.credentials()?;

    match cli.command {
        Command::Status => print_json(&SocketBus::new(credentials)?.get_status().await?)?,
        Command::Channels => print_json(&SocketBus::new(credentials)?.get_channels().await?)?,
        Command::Count { channel } => print_json(
            &SocketBus::new(credentials)?
                .get_count_users_in_channel(&channel)
                .await?,
        )?,
        Command::Users { channel } => print_json(
            &SocketBus::new(credentials)?
                .get_users_in_channel(&channel)
                .await?,
        )?,
        Command::Broadcast {
            event,
            data,
            channels,
        } => {
            let data: serde_json::Value =
                serde_json::from_str(&data).context("payload must be JSON")?;
            let results = SocketBus::new(credentials)?
                .broadcast(channels, &event, &data)
                .await;
            print_json(&results)?;
        }
        Command::Auth {
            socket_id,
            channel,
            data,
            user_id,
        } => {
            let authenticator = ChannelAuthenticator::new(credentials);
            let response = match ChannelType::from_name(&channel) {
                ChannelType::Presence => {
                    let data = data
                        .map(|d| serde_json::from_str::<serde_json::Value>(&d))
                        .transpose()
                        .context("--data must be JSON")?;
                    authenticator.auth_presence(&socket_id, &channel, &user_id, data.as_ref())?
                }
                _ => authenticator.auth(&socket_id, &channel, true),
            };
            print_json(&response)?;
        }
        Command::VerifyWebhook { signature } => {
            let valid = SocketBus::new(credentials)?.auth_webhook(&signature);
            print_json(&serde_json::json!({ "valid": valid }))?;
            if !valid {
                std::process::exit(1);
            }
        }
        Command::Decrypt { channel, envelope } => {
            let key = credentials
                .encryption_key()
                .context("SOCKETBUS_ENCRYPTION_KEY is not set")?;
            let envelope: EncryptedEnvelope =
                serde_json::from_str(&envelope).context("envelope must be {ct, iv, s} JSON")?;
            print_json(&decrypt_payload(&envelope, &derive_password(key, &channel))?)?;
        }
    }

    Ok(())
}
