mod config;
mod controller;
mod errors;
mod event;
mod format;
mod processor;
mod request;
mod response;
mod routes;
mod storage;


#[macro_use]
extern crate tracing;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use poem::listener::TcpListener;
use poem::Server;
use tracing_subscriber::EnvFilter;

use crate::controller::EdgeController;
use crate::event::EdgeEvent;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Debug, Parser)]
#[clap(author, version, about)]
pub struct ServerConfig {
    /// The file path to the config file, YAML unless it ends in `.json`.
    #[clap(long, env = "EDGE_RESIZE_CONFIG_FILE", default_value = "config.yaml")]
    config_file: PathBuf,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve edge events over HTTP.
    Serve {
        /// The binding host address of the server.
        #[clap(long, env = "EDGE_RESIZE_HOST", default_value = "127.0.0.1")]
        host: String,

        #[clap(long, env = "EDGE_RESIZE_PORT", default_value = "8000")]
        port: u16,
    },

    /// Handle a single event file and print the resulting record.
    Invoke {
        #[clap(long)]
        event: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: ServerConfig = ServerConfig::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    config::init(&args.config_file).await?;
    let cfg = config::config();

    let storage = cfg.backend.connect()?;
    let controller = Arc::new(EdgeController::new(storage, cfg.write_back_prefix.clone()));

    match args.command {
        Command::Serve { host, port } => {
            let bind: SocketAddr = format!("{}:{}", host, port).parse()?;

            info!("Edge resize listening on http://{}", bind);
            Server::new(TcpListener::bind(bind))
                .name("edge-resize")
                .run(routes::app(controller))
                .await?;
        },
        Command::Invoke { event } => {
            let raw = tokio::fs::read(&event).await?;
            let event: EdgeEvent = serde_json::from_slice(&raw)?;

            let result = controller.handle(event).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        },
    }

    Ok(())
}
