//! Binary entrypoint for the Wires-X gateway CLI.
//!
//! Commands:
//! - `start [--repeater <addr>]` - run the gateway against a repeater
//! - `init` - write a starter `wiresx.toml`
//! - `id --name <label>` - print the five-digit station id for a display name
//! - `hosts [--file <path>]` - parse a hosts list and print a JSON summary
//!
//! See the library crate docs for module-level details: `wiresx::`.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{info, LevelFilter};
use std::str::FromStr;

use wiresx::config::Config;
use wiresx::gateway::Gateway;
use wiresx::reflectors::parse_hosts;
use wiresx::wiresx::station_id;

#[derive(Parser)]
#[command(name = "wiresx")]
#[command(about = "Wires-X control channel for a YSF gateway")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "wiresx.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway
    Start {
        /// Repeater address, overriding network.repeater_address
        #[arg(short, long)]
        repeater: Option<String>,
    },
    /// Write a default configuration file
    Init,
    /// Print the station id derived from a display name
    Id {
        /// Display name (defaults to wiresx.name from the config)
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Parse a hosts list and print its entries as JSON
    Hosts {
        /// Hosts file (defaults to reflectors.hosts_file from the config)
        #[arg(short, long)]
        file: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let pre_config = match cli.command {
        Commands::Init => None,
        _ => Config::load(&cli.config).await.ok(),
    };
    init_logging(&pre_config, cli.verbose);

    match cli.command {
        Commands::Start { repeater } => {
            let mut config = match pre_config {
                Some(c) => c,
                None => Config::load(&cli.config).await?,
            };
            if let Some(addr) = repeater {
                config.network.repeater_address = addr;
            }

            info!("Starting wiresx v{}", env!("CARGO_PKG_VERSION"));
            let mut gateway = Gateway::new(&config).await?;
            gateway.run().await?;
        }
        Commands::Init => {
            if std::path::Path::new(&cli.config).exists() {
                return Err(anyhow!(
                    "{} already exists; remove it first to regenerate",
                    cli.config
                ));
            }
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
        }
        Commands::Id { name } => {
            let label = match (name, &pre_config) {
                (Some(n), _) => n,
                (None, Some(cfg)) => cfg.wiresx.name.clone(),
                (None, None) => return Err(anyhow!("No --name given and {} not loaded", cli.config)),
            };
            if !label.is_ascii() {
                return Err(anyhow!("Gateway name must be plain ASCII"));
            }
            println!("{}", String::from_utf8_lossy(&station_id(&label)));
        }
        Commands::Hosts { file } => {
            let path = match (file, &pre_config) {
                (Some(f), _) => f,
                (None, Some(cfg)) => cfg.reflectors.hosts_file.clone(),
                (None, None) => return Err(anyhow!("No --file given and {} not loaded", cli.config)),
            };
            let text = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| anyhow!("Failed to read hosts file {}: {}", path, e))?;
            let entries = parse_hosts(&text);
            let payload = serde_json::json!({
                "file": path,
                "count": entries.len(),
                "reflectors": entries,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }

    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();

    // CLI verbosity wins over the configured level
    let configured = config
        .as_ref()
        .and_then(|c| LevelFilter::from_str(&c.logging.level).ok())
        .unwrap_or(LevelFilter::Info);
    let base_level = match verbosity {
        0 => configured,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|c| c.logging.file.as_ref())
        .and_then(|path| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        });

    match log_file {
        Some(f) => {
            let file = std::sync::Mutex::new(f);
            // When stdout is not a terminal only the file gets the line
            let is_tty = atty::is(atty::Stream::Stdout);

            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());

                if let Ok(mut guard) = file.lock() {
                    let _ = writeln!(guard, "{}", line);
                }

                if is_tty {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
        }
        None => {
            builder.format(|fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
            });
        }
    }
    let _ = builder.try_init();
}
