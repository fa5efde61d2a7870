use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use regchat_core::config::ClientConfig;
use regchat_infrastructure::ConfigService;

mod commands;

#[derive(Parser)]
#[command(name = "regchat")]
#[command(about = "regchat - chat client for the regulation summarization API", long_about = None)]
struct Cli {
    /// Config file (default: ~/.config/regchat/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Summarization API base URL
    #[arg(long, global = true)]
    api_base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the web front end and its client configuration
    Serve {
        #[arg(long)]
        port: Option<u16>,

        /// Directory holding index.html and the bundled assets
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
    /// Chat in the terminal
    Chat {
        /// Message pairs kept in context
        #[arg(long)]
        window: Option<usize>,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let service = match &cli.config {
        Some(path) => ConfigService::with_path(path.clone()),
        None => ConfigService::new()?,
    };
    let mut config = service.load()?;

    if let Some(url) = &cli.api_base_url {
        config.api_base_url = url.clone();
    }
    match &cli.command {
        Commands::Serve { port, static_dir } => {
            if let Some(port) = port {
                config.server.port = *port;
            }
            if let Some(dir) = static_dir {
                config.server.static_dir = dir.clone();
            }
        }
        Commands::Chat { window } => {
            if let Some(window) = window {
                config.context_window_pairs = *window;
            }
        }
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Serve { .. } => commands::serve::run(config).await?,
        Commands::Chat { .. } => commands::chat::run(config).await?,
    }

    Ok(())
}
