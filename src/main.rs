//! Harvester console - Main entry point
//!
//! Runs the install wizard from the ISO or the status dashboard on an
//! installed node, in the terminal the console owns.

use anyhow::{Context, Result};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::fs::OpenOptions;
use std::io::{Stdout, stdout};
use std::path::Path;
use std::process::Command;
use std::sync::Mutex;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use harvester_console::app::{App, Console, ExitReason};
use harvester_console::cli::{Cli, Commands};
use harvester_console::config::InstallConfig;
use harvester_console::probes::Probes;
use harvester_console::screens::dashboard;
use harvester_console::settings::ConsoleSettings;
use harvester_console::status::{NodeRole, evaluate_once, management_url};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Initialize logging into `log_file`.
///
/// The terminal belongs to the console, so nothing is logged to it. When the
/// file cannot be opened the logs are dropped. `RUST_LOG` overrides the
/// default `info` level.
fn init_logger(log_file: &Path) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    match OpenOptions::new().create(true).append(true).open(log_file) {
        Ok(file) => builder.with_writer(Mutex::new(file)).init(),
        Err(_) => builder.with_writer(std::io::sink).init(),
    }
}

/// Main application entry point
fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_logger(&cli.log_file);
    info!("Harvester console starting up");

    let mut settings = ConsoleSettings::load(cli.settings.as_deref())?;
    if cli.dry_run {
        settings.dry_run = true;
    }
    debug!("Settings: {:?}", settings);

    match cli.command {
        Some(Commands::Validate { config }) => validate_config(&config),
        Some(Commands::Dashboard { once: true }) => print_status_once(&settings),
        Some(Commands::Dashboard { once: false }) => run_dashboard(settings),
        Some(Commands::Install { save_config }) => {
            if let Some(path) = save_config {
                info!("Target configuration will be written to {:?}", path);
                settings.install_config_path = path;
            }
            run_installer(settings)
        }
        None => {
            info!("No command specified, launching the install wizard");
            run_installer(settings)
        }
    }
}

fn validate_config(path: &Path) -> Result<()> {
    info!("Validating configuration file: {:?}", path);
    let config = InstallConfig::load_from_file(path)?;
    match config.validate() {
        Ok(()) => {
            info!("Configuration validation successful");
            println!("Configuration file is valid: {}", path.display());
            Ok(())
        }
        Err(e) => {
            error!("Configuration validation failed: {}", e);
            eprintln!("Configuration validation failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn dashboard_probes(settings: &ConsoleSettings) -> (Probes, NodeRole) {
    let role = NodeRole::detect(&settings.k3s_env_file);
    info!("Detected node role: {:?}", role);
    let probes = Probes::host(&settings.system_config_file, role.kubeconfig(settings));
    (probes, role)
}

fn print_status_once(settings: &ConsoleSettings) -> Result<()> {
    let (probes, role) = dashboard_probes(settings);
    println!("{}", dashboard::status_text(&evaluate_once(&probes, role).render()));
    if let Some(url) = management_url(&probes, settings.node_port) {
        println!("{}", dashboard::url_text(&url));
    }
    Ok(())
}

fn enter_tui() -> Result<Tui> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    crossterm::execute!(stdout(), EnterAlternateScreen)
        .context("Failed to enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout())).context("Failed to create terminal")
}

fn leave_tui() {
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(stdout(), LeaveAlternateScreen);
}

/// Run the install wizard
fn run_installer(settings: ConsoleSettings) -> Result<()> {
    let probes = Probes::host(&settings.system_config_file, None);
    let mut app = App::new(Console::install(probes, settings)?);

    let mut terminal = enter_tui()?;
    let result = app.run(&mut terminal);
    // Always attempt cleanup, even if the app failed
    leave_tui();

    let reason = result?;
    info!("Install wizard finished: {:?}", reason);
    Ok(())
}

/// Run the dashboard until the user quits, dropping to a shell on request
fn run_dashboard(settings: ConsoleSettings) -> Result<()> {
    let shell = settings.shell.clone();
    let (probes, role) = dashboard_probes(&settings);
    let mut app = App::new(Console::dashboard(probes, settings, role)?);

    let mut terminal = enter_tui()?;
    loop {
        let reason = match app.run(&mut terminal) {
            Ok(reason) => reason,
            Err(e) => {
                leave_tui();
                return Err(e.into());
            }
        };

        match reason {
            ExitReason::Quit => break,
            ExitReason::Shell => {
                leave_tui();
                info!("Starting shell {}", shell);
                match Command::new(&shell).status() {
                    Ok(status) => info!("Shell exited with {}", status),
                    Err(e) => warn!("Failed to start shell {}: {}", shell, e),
                }
                terminal = enter_tui()?;
                terminal.clear()?;
                app.console_mut().resume()?;
            }
        }
    }

    app.console_mut().stop_pollers();
    leave_tui();
    Ok(())
}
