//! 翻译代理主程序入口

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

use htmledit::env::{self, EnvVar};
use htmledit::web::{WebConfig, WebServer};

#[derive(Parser)]
#[command(name = "htmledit-proxy")]
#[command(about = "Stateless translation proxy in front of the upstream model API")]
#[command(version)]
struct Cli {
    /// Bind address (overrides HTMLEDIT_WEB_BIND_ADDRESS)
    #[arg(short, long)]
    bind: Option<String>,

    /// Port number (overrides HTMLEDIT_WEB_PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _ = dotenv::dotenv();

    let level = env::core::LogLevel::get_or_default("info".to_string());
    tracing_subscriber::fmt()
        .with_max_level(level.parse::<LevelFilter>().unwrap_or(LevelFilter::INFO))
        .with_ansi(env::color_enabled())
        .init();

    let mut config = match WebConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let server = WebServer::new(config);
    match server.start().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
