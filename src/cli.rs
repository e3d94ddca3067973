use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Harvester console - install wizard and node status dashboard
#[derive(Parser, Debug)]
#[command(name = "harvester-console")]
#[command(about = "Terminal install wizard and status console for Harvester nodes")]
#[command(version)]
pub struct Cli {
    /// Dry-run mode: log destructive actions instead of running them.
    ///
    /// The installer is not started and the reboot after a declined
    /// installation is skipped. Probes still run so the wizard behaves
    /// as it would on a real node.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// JSON file overriding the built-in settings
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Log file; the terminal belongs to the console
    #[arg(long, global = true, default_value = "/var/log/harvester-console.log")]
    pub log_file: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the interactive install wizard
    Install {
        /// Where to write the target configuration before installing
        #[arg(long)]
        save_config: Option<PathBuf>,
    },
    /// Show the node status dashboard
    Dashboard {
        /// Print one status evaluation and exit
        #[arg(long)]
        once: bool,
    },
    /// Validate a saved target configuration file
    Validate {
        /// Path to configuration file to validate
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
