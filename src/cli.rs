// CLI definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vmouse::protocol::{ButtonIndex, Command};

#[derive(Parser)]
#[command(name = "vmouse")]
#[command(author, version, about = "Virtual mouse with a write-only button control socket")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file path (default: ~/.config/vmouse/vmouse.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Control socket path (overrides the config file)
    #[arg(short, long, global = true)]
    pub socket: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the virtual mouse and serve the control socket until Ctrl+C
    #[command(visible_aliases = ["daemon", "run"])]
    Serve {
        /// Make the control socket writable by all users
        #[arg(long)]
        allow_non_root_write: bool,

        /// Device name shown to the input subsystem
        #[arg(long)]
        name: Option<String>,
    },

    /// Send commands (reset, down:N, up:N, click:N) as a single write
    Send {
        #[arg(required = true)]
        commands: Vec<Command>,
    },

    /// Click a button (0=left, 1=right, 2=middle, 3-7=side..task)
    Click {
        #[arg(value_parser = parse_button)]
        button: ButtonIndex,
    },

    /// Press and hold a button
    #[command(visible_aliases = ["press"])]
    Down {
        #[arg(value_parser = parse_button)]
        button: ButtonIndex,
    },

    /// Release a button
    #[command(visible_aliases = ["release"])]
    Up {
        #[arg(value_parser = parse_button)]
        button: ButtonIndex,
    },

    /// Release all buttons
    Reset,

    /// Send raw command bytes (hex, e.g. 10 33 or 0x80)
    Raw {
        #[arg(required = true, value_parser = parse_hex_byte)]
        bytes: Vec<u8>,
    },

    /// Print the effective configuration
    Config {
        /// Also write it to the config file
        #[arg(long)]
        save: bool,
    },
}

fn parse_button(s: &str) -> Result<ButtonIndex, String> {
    let value: u8 = s.parse().map_err(|_| format!("invalid button \"{s}\""))?;
    ButtonIndex::new(value).map_err(|e| e.to_string())
}

fn parse_hex_byte(s: &str) -> Result<u8, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u8::from_str_radix(digits, 16).map_err(|_| format!("invalid hex byte \"{s}\""))
}
