//! vmouse - virtual mouse control daemon and client
//!
//! `vmouse serve` registers the virtual mouse and listens on the control
//! socket; the other subcommands write commands to a running instance.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use vmouse::device::UinputBackend;
use vmouse::protocol::Command;
use vmouse::VmouseConfig;

mod cli;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Load config
    let config_path = cli.config.unwrap_or_else(VmouseConfig::default_path);
    let mut config = VmouseConfig::load(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;
    if let Some(socket) = cli.socket {
        config.socket_path = socket;
    }

    match cli.command {
        Commands::Serve {
            allow_non_root_write,
            name,
        } => {
            config.allow_non_root_write |= allow_non_root_write;
            if let Some(name) = name {
                config.device.name = name;
            }
            serve(config).await
        }
        Commands::Send { commands } => send(&config, &commands),
        Commands::Click { button } => send(&config, &[Command::ButtonClick(button)]),
        Commands::Down { button } => send(&config, &[Command::ButtonDown(button)]),
        Commands::Up { button } => send(&config, &[Command::ButtonUp(button)]),
        Commands::Reset => send(&config, &[Command::Reset]),
        Commands::Raw { bytes } => {
            let sent = vmouse::send_raw(&config.socket_path, &bytes)?;
            info!("Sent {sent} raw bytes to {}", config.socket_path.display());
            Ok(())
        }
        Commands::Config { save } => {
            print!("{}", config.to_toml()?);
            if save {
                config.save(&config_path)?;
                info!("Saved config to {}", config_path.display());
            }
            Ok(())
        }
    }
}

/// Run the endpoint until SIGINT or SIGTERM
async fn serve(config: VmouseConfig) -> Result<()> {
    let server = match vmouse::start(&config, UinputBackend::new()) {
        Ok(server) => server,
        Err(e) => {
            error!("{e}");
            std::process::exit(e.exit_code());
        }
    };

    info!(
        "Ready on {} ({}). Ctrl+C to stop.",
        server.socket_path().display(),
        if config.allow_non_root_write {
            "all users may write"
        } else {
            "owner only"
        }
    );

    server.run_until(shutdown_signal()).await;
    info!("Done.");
    Ok(())
}

async fn shutdown_signal() {
    let mut term =
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(term) => term,
            Err(e) => {
                error!("Cannot listen for SIGTERM: {e}");
                tokio::signal::ctrl_c().await.ok();
                return;
            }
        };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = term.recv() => {}
    }
}

fn send(config: &VmouseConfig, commands: &[Command]) -> Result<()> {
    let sent = vmouse::send_commands(&config.socket_path, commands)?;
    let list: Vec<String> = commands.iter().map(|c| c.to_string()).collect();
    info!(
        "Sent {} ({sent} bytes) to {}",
        list.join(", "),
        config.socket_path.display()
    );
    Ok(())
}
