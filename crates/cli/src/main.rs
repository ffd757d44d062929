use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sheetrelay")]
#[command(about = "sheetrelay: chat relay with remote sheet logging", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and default files (config and the public pairing page).
    Init {
        /// Config file path (default: SHEETRELAY_CONFIG_PATH or ~/.sheetrelay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Run the relay: pairing endpoint, bridge webhook, and static files on one port.
    Serve {
        /// Config file path (default: SHEETRELAY_CONFIG_PATH or ~/.sheetrelay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from PORT, then config, then 3000)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Ask a running relay whether a pairing code is available and print its data URL.
    Pairing {
        /// Config file path (default: SHEETRELAY_CONFIG_PATH or ~/.sheetrelay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("sheetrelay {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Serve { config, port }) => {
            if let Err(e) = run_serve(config, port).await {
                log::error!("serve failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Pairing { config }) => {
            if let Err(e) = run_pairing(config).await {
                log::error!("pairing failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(sheetrelay::config::default_config_path);
    let dir = sheetrelay::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

async fn run_serve(config_path: Option<std::path::PathBuf>, port: Option<u16>) -> anyhow::Result<()> {
    let (mut config, path) = sheetrelay::config::load_config(config_path)?;
    if let Some(p) = port {
        config.server.port = p;
    }
    sheetrelay::gateway::run_server(config, path).await
}

async fn run_pairing(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let (config, _) = sheetrelay::config::load_config(config_path)?;
    let host = if config.server.bind.trim() == "0.0.0.0" {
        "127.0.0.1".to_string()
    } else {
        config.server.bind.trim().to_string()
    };
    let url = format!("http://{}:{}/api/qr-code", host, config.server.port);
    let res = reqwest::get(&url).await?;
    let status = res.status();
    let body: serde_json::Value = res.json().await?;
    if status.is_success() {
        let data_url = body
            .get("qrCode")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("missing qrCode in response"))?;
        println!("{}", data_url);
    } else {
        let message = body
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("pairing code not available");
        println!("{}", message);
    }
    Ok(())
}
