//! Installer module
//!
//! Runs the external installer with the saved target configuration and
//! streams its output back to the render loop, and schedules the reboot
//! that follows a declined installation.

use crate::app::UiEvent;
use crate::error::{ConsoleError, Result};
use crate::settings::ConsoleSettings;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use tracing::{error, info, warn};

const REBOOT_COMMAND: &str = "reboot";

/// Start the installer on `config_path`.
///
/// Every output line arrives as `UiEvent::InstallOutput`, then one
/// `UiEvent::InstallFinished`. Nothing is executed in dry-run mode.
pub fn spawn_installer(
    settings: &ConsoleSettings,
    config_path: &Path,
    updates: Sender<UiEvent>,
) -> Result<()> {
    let mut words = settings.installer_command.split_whitespace();
    let program = words
        .next()
        .ok_or_else(|| ConsoleError::config("installer_command is empty"))?;
    let args: Vec<&str> = words.collect();
    let command_line = std::iter::once(program.to_string())
        .chain(args.iter().map(|a| a.to_string()))
        .chain(std::iter::once(config_path.display().to_string()))
        .collect::<Vec<_>>()
        .join(" ");

    if settings.dry_run {
        info!("Dry run, not starting installer: {}", command_line);
        let _ = updates.send(UiEvent::InstallOutput(format!("Dry run: {}", command_line)));
        let _ = updates.send(UiEvent::InstallFinished {
            success: true,
            message: "Dry run complete, nothing was installed".to_string(),
        });
        return Ok(());
    }

    info!("Starting installer: {}", command_line);
    // stdin is null - the installer is non-interactive
    let mut child = Command::new(program)
        .args(&args)
        .arg(config_path)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(Stdio::null())
        .spawn()
        .map_err(|e| ConsoleError::general(format!("Failed to start {}: {}", program, e)))?;

    let readers: Vec<JoinHandle<()>> = [
        child.stdout.take().map(|out| forward_lines(out, "", updates.clone())),
        child.stderr.take().map(|err| forward_lines(err, "ERROR: ", updates.clone())),
    ]
    .into_iter()
    .flatten()
    .collect();

    // Wait for completion in a separate thread
    thread::spawn(move || {
        let status = child.wait();
        for reader in readers {
            let _ = reader.join();
        }
        let event = match status {
            Ok(status) if status.success() => {
                info!("Installer finished successfully");
                UiEvent::InstallFinished {
                    success: true,
                    message: "Installation completed successfully!".to_string(),
                }
            }
            Ok(status) => {
                let code = status.code().unwrap_or(-1);
                error!("Installer failed with exit code {}", code);
                UiEvent::InstallFinished {
                    success: false,
                    message: format!("Installation failed with exit code: {}", code),
                }
            }
            Err(e) => {
                error!("Failed to wait for installer: {}", e);
                UiEvent::InstallFinished {
                    success: false,
                    message: format!("ERROR: Failed to wait for installer: {}", e),
                }
            }
        };
        let _ = updates.send(event);
    });

    Ok(())
}

fn forward_lines<R: Read + Send + 'static>(
    source: R,
    prefix: &'static str,
    updates: Sender<UiEvent>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let reader = BufReader::new(source);
        for line in reader.lines().map_while(std::result::Result::ok) {
            if updates
                .send(UiEvent::InstallOutput(format!("{}{}", prefix, line)))
                .is_err()
            {
                break;
            }
        }
    })
}

/// Reboot after the configured delay on a background thread
pub fn schedule_reboot(settings: &ConsoleSettings) -> Result<()> {
    let delay = settings.reboot_delay();
    let dry_run = settings.dry_run;
    info!("Rebooting in {:?}", delay);

    thread::Builder::new()
        .name("reboot".to_string())
        .spawn(move || {
            thread::sleep(delay);
            if dry_run {
                info!("Dry run, not rebooting");
                return;
            }
            match Command::new(REBOOT_COMMAND).status() {
                Ok(status) if status.success() => {}
                Ok(status) => warn!("{} exited with {}", REBOOT_COMMAND, status),
                Err(e) => error!("Failed to run {}: {}", REBOOT_COMMAND, e),
            }
        })
        .map_err(|e| ConsoleError::general(format!("Failed to schedule reboot: {}", e)))?;
    Ok(())
}
