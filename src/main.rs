//! imessage-otp - serve the latest verification code from Messages.db
//!
//! Runs a loopback HTTP endpoint (`GET /get_code`) for browser automation,
//! plus one-shot `check` and `status` commands.
//!
//! CHANGELOG:
//! - 10/18/2026 - check and status commands
//! - 10/18/2026 - Initial CLI with serve command

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::{SocketAddr, TcpStream};
use std::process::ExitCode;
use std::time::Duration;

use imessage_otp::config::{expand_path, ServerConfig};
use imessage_otp::output::{format_error, CodeResponse};
use imessage_otp::server::{self, CodeService};

/// Serve the latest SMS/iMessage verification code over loopback HTTP.
#[derive(Parser, Debug)]
#[command(name = "imessage-otp")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Messages database (default: ~/Library/Messages/chat.db)
    #[arg(long, global = true)]
    db: Option<String>,

    /// Only consider messages from the last N seconds
    #[arg(long, global = true)]
    window: Option<u64>,

    /// Loopback address to listen on (default: 127.0.0.1:65530)
    #[arg(long, global = true)]
    listen: Option<SocketAddr>,

    /// Trigger keyword; repeat to replace the default set
    #[arg(long = "keyword", global = true)]
    keywords: Vec<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP endpoint (default)
    Serve,

    /// Look up the current code once and print the JSON body
    Check {
        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Check whether an endpoint is listening
    Status,
}

impl Cli {
    /// Environment-derived config with CLI flags applied on top.
    fn config(&self) -> Result<ServerConfig> {
        let mut config = ServerConfig::from_env().context("Invalid environment configuration")?;

        if let Some(db) = &self.db {
            config.store_path = expand_path(db);
        }
        if let Some(window) = self.window {
            config.window_seconds = window;
        }
        if let Some(listen) = self.listen {
            config.listen_address = listen;
        }
        if !self.keywords.is_empty() {
            config.keywords = self.keywords.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result = cli.config().and_then(|config| match cli.command {
        None | Some(Command::Serve) => cmd_serve(config),
        Some(Command::Check { compact }) => cmd_check(&config, compact),
        Some(Command::Status) => cmd_status(&config),
    });

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn cmd_serve(config: ServerConfig) -> Result<ExitCode> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(config.listen_address)
            .await
            .with_context(|| format!("Failed to bind {}", config.listen_address))?;

        tracing::info!(db = %config.store_path.display(), "reading messages");
        let service = CodeService::from_config(&config);

        server::serve(listener, service, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await
    })?;

    Ok(ExitCode::SUCCESS)
}

fn cmd_check(config: &ServerConfig, compact: bool) -> Result<ExitCode> {
    let service = CodeService::from_config(config);

    match service.lookup() {
        Ok(result) => {
            println!("{}", CodeResponse::from(&result).emit(compact));
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            println!("{}", format_error(&e.to_string()));
            Ok(ExitCode::from(2))
        }
    }
}

fn cmd_status(config: &ServerConfig) -> Result<ExitCode> {
    let addr = config.listen_address;

    match TcpStream::connect_timeout(&addr, Duration::from_millis(500)) {
        Ok(_) => {
            println!("Endpoint running at http://{}/get_code", addr);
            Ok(ExitCode::SUCCESS)
        }
        Err(_) => {
            println!("Endpoint not running at {}", addr);
            Ok(ExitCode::from(1))
        }
    }
}
