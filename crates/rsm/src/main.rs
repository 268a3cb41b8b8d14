//! Resumable Runtime - Command Line
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rsm dispatch` | Dispatch an event in a JSON document and print the serialized document |
//! | `rsm qrl` | Parse a QRL and print its parts |
//! | `rsm key encode` / `rsm key decode` | Composite key encoding |
//! | `rsm modules` | List the modules compiled into the registry |

use clap::{Parser, Subcommand};
use rsm::commands::{self, DispatchRequest};
use rsm::domain::error::{Error, Result};
use std::path::PathBuf;

/// Command line interface for the resumable runtime
#[derive(Parser, Debug)]
#[command(name = "rsm")]
#[command(about = "Resumable runtime - lazy symbols and node-scoped injection")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Dispatch an event at a node of a JSON document
    Dispatch {
        /// JSON document fixture
        #[arg(short, long)]
        document: PathBuf,

        /// `id` attribute of the target node
        #[arg(short, long)]
        target: String,

        /// Event type
        #[arg(short, long, default_value = "click")]
        event: String,

        /// Event property as `name=value` (repeatable)
        #[arg(short, long = "prop", value_parser = parse_property)]
        props: Vec<(String, String)>,

        /// Write the serialized document here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse a QRL and print its parts
    Qrl {
        /// QRL string (`./todo.js#toggle?id=3`)
        qrl: String,
    },

    /// Encode or decode composite keys
    Key {
        #[command(subcommand)]
        action: KeyCommand,
    },

    /// List registered modules
    Modules,
}

#[derive(Subcommand, Debug)]
pub enum KeyCommand {
    /// Encode a type tag and identity values
    Encode {
        type_tag: String,
        identity: Vec<String>,
    },
    /// Decode an encoded key
    Decode { key: String },
}

fn parse_property(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Dispatch {
            document,
            target,
            event,
            props,
            output,
        } => {
            let config = commands::init(cli.config.as_deref())?;
            let request = DispatchRequest {
                document,
                target,
                event,
                properties: props.into_iter().collect(),
            };
            let summary = commands::dispatch(config, &request).await?;
            eprintln!("{}", summary.headline());
            match output {
                Some(path) => std::fs::write(&path, &summary.document).map_err(Error::from)?,
                None => println!("{}", summary.document),
            }
        }
        Command::Qrl { qrl } => println!("{}", commands::describe_qrl(&qrl)?),
        Command::Key { action } => match action {
            KeyCommand::Encode { type_tag, identity } => {
                println!("{}", commands::encode_key(&type_tag, &identity)?);
            }
            KeyCommand::Decode { key } => println!("{}", commands::decode_key(&key)?),
        },
        Command::Modules => println!("{}", commands::modules()),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}
