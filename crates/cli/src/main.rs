//! Workload template CLI
//!
//! A command-line tool for validating workload templates, previewing the
//! resource requests a registration would derive, building registration
//! envelopes, and browsing the preloaded template catalog.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::catalog::{self, TemplateSource};
use commands::template;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

/// Workload template CLI
#[derive(Parser)]
#[command(name = "wlt")]
#[command(author, version, about = "CLI for workload template validation and registration", long_about = None)]
pub struct Cli {
    /// Backend URL (can also be set via WLT_API_URL env var)
    #[arg(long, env = "WLT_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Local template catalog YAML, used instead of the backend
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Output format
    #[arg(long, short, global = true)]
    pub format: Option<output::OutputFormat>,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate every field of a template file
    Validate {
        /// Template file (bare form or wrapped document)
        file: PathBuf,
    },

    /// Show the per-session resource requests a registration would derive
    Summary {
        /// Template file
        file: PathBuf,
    },

    /// Build a register_workload envelope
    Register {
        /// Template file
        file: Option<PathBuf>,

        /// Preloaded template key from the catalog
        #[arg(long, short)]
        template: Option<String>,

        /// Message ID to use instead of a generated one
        #[arg(long)]
        msg_id: Option<Uuid>,

        /// Output file path (stdout if not specified)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Write a default template
    Defaults {
        /// Output file or directory (stdout if not specified)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Assign random resources to one training event
    Randomize {
        /// Template file
        file: PathBuf,

        /// Session index
        #[arg(long)]
        session: usize,

        /// Training event index within the session
        #[arg(long)]
        training: usize,

        /// Output file path (stdout if not specified)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Browse the preloaded template catalog
    #[command(subcommand)]
    Templates(TemplateCommands),
}

#[derive(Subcommand)]
pub enum TemplateCommands {
    /// List preloaded templates
    List,

    /// Fetch one template document
    Fetch {
        /// Template key
        key: String,

        /// Output file path (stdout if not specified)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    // Flags win over environment, which wins over the config file
    let config = config::Config::load()?;
    let format = config.format(cli.format);
    let api_url = config.api_url(cli.api_url.as_deref());
    let catalog_path = cli
        .catalog
        .clone()
        .or_else(|| config.catalog_path.as_ref().map(PathBuf::from));
    let source = || TemplateSource::new(catalog_path.as_deref(), &api_url, config.token.clone());

    match cli.command {
        Commands::Validate { file } => {
            template::validate(&file, format)?;
        }
        Commands::Summary { file } => {
            template::summary(&file, format)?;
        }
        Commands::Register {
            file,
            template: key,
            msg_id,
            output,
        } => {
            let source = match key {
                Some(_) => Some(source()?),
                None => None,
            };
            template::register(file, key, source.as_ref(), msg_id, output).await?;
        }
        Commands::Defaults { output } => {
            template::defaults(output)?;
        }
        Commands::Randomize {
            file,
            session,
            training,
            output,
        } => {
            template::randomize(&file, session, training, output)?;
        }
        Commands::Templates(templates_cmd) => match templates_cmd {
            TemplateCommands::List => {
                catalog::list_templates(&source()?, format).await?;
            }
            TemplateCommands::Fetch { key, output } => {
                catalog::fetch_template(&source()?, &key, output).await?;
            }
        },
    }

    Ok(())
}
