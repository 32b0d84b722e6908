use clap::{Parser, Subcommand};
use relay::settings;
use relay::{Relay, Service};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "relay", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Serve the GraphQL passthrough endpoints
    Serve {
        /// Address to listen on (overrides relay.toml and RELAY_BIND)
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },
    /// Forward a single GraphQL body and print the upstream reply
    Query {
        /// Upstream to query: leetcode (lc) or github (gh)
        service: Service,

        /// File holding the JSON body (reads stdin when omitted)
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let mut settings = settings::load_settings()?;

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                settings.bind = bind;
            }
            relay::serve(&settings, shutdown_signal()).await?;
        }
        Commands::Query { service, file } => {
            let body = match file {
                Some(path) => fs_err::read_to_string(path)?,
                None => std::io::read_to_string(std::io::stdin())?,
            };
            let reply = Relay::new(&settings)?
                .relay(service, body.as_bytes())
                .await?;
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Received Ctrl+C, shutting down");
}
