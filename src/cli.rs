use crate::config::{load_config, validate_config};
use crate::error::{Result, WizardError};
use crate::generator::generate_subgraph_project;
use crate::wizard::run_wizard;
use std::path::PathBuf;
use structopt::clap::AppSettings;
use structopt::StructOpt;
use tracing::info;

#[derive(Clone, Debug, Default, StructOpt)]
#[structopt(
    name = "subgraph-wizard",
    about = "Generate subgraph projects for The Graph",
    global_settings = &[AppSettings::DisableVersion]
)]
pub struct Cli {
    /// Path to a subgraph-config.json file
    #[structopt(long, parse(from_os_str), value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Generate the subgraph project described by --config
    #[structopt(long)]
    pub generate: bool,

    /// Preview what would be generated without writing files
    #[structopt(long)]
    pub dry_run: bool,

    /// Show version and exit
    #[structopt(long)]
    pub version: bool,
}

/// What a parsed command line asks for
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Version,
    /// Load, validate and generate (or preview) from a config file
    Generate { config: PathBuf, dry_run: bool },
    /// Load and validate a config file without generating
    Validate { config: PathBuf },
    Wizard,
}

impl Cli {
    pub fn command(&self) -> Result<Command> {
        if self.version {
            return Ok(Command::Version);
        }

        match (&self.config, self.generate || self.dry_run) {
            (Some(config), true) => Ok(Command::Generate {
                config: config.clone(),
                dry_run: self.dry_run,
            }),
            (Some(config), false) => Ok(Command::Validate {
                config: config.clone(),
            }),
            (None, true) => Err(WizardError::validation(
                "--generate and --dry-run require --config <path>",
            )),
            (None, false) => Ok(Command::Wizard),
        }
    }

    /// Short description of the requested mode for the startup log
    fn mode(&self) -> String {
        let mut parts = Vec::new();
        if let Some(config) = &self.config {
            parts.push(format!("config={}", config.display()));
        }
        if self.generate {
            parts.push("generate".to_string());
        }
        if self.dry_run {
            parts.push("dry-run".to_string());
        }

        if parts.is_empty() {
            "interactive wizard (no flags provided)".to_string()
        } else {
            parts.join(" ")
        }
    }
}

pub fn version_string() -> String {
    format!("subgraph-wizard version {}", env!("CARGO_PKG_VERSION"))
}

pub fn run(cli: Cli) -> Result<()> {
    let command = cli.command()?;
    if command != Command::Version {
        info!("CLI mode: {}", cli.mode());
    }

    match command {
        Command::Version => {
            println!("{}", version_string());
            Ok(())
        }
        Command::Generate { config, dry_run } => {
            let config = load_config(&config)?;
            validate_config(&config)?;
            generate_subgraph_project(&config, dry_run)
        }
        Command::Validate { config: path } => {
            let config = load_config(&path)?;
            validate_config(&config)?;
            info!(
                "Configuration {} is valid. Run with --generate to create the project.",
                path.display()
            );
            Ok(())
        }
        Command::Wizard => run_wizard(),
    }
}
