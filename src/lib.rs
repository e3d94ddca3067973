//! Harvester console library
//!
//! Terminal install wizard and node status dashboard for Harvester. The
//! binary in `main.rs` is a thin shell over these modules.

pub mod app;
pub mod cli;
pub mod components;
pub mod config;
pub mod error;
pub mod installer;
pub mod probes;
pub mod screens;
pub mod settings;
pub mod status;
pub mod theme;
pub mod types;
pub mod ui;
pub mod validation;

// Re-export main types for convenience
pub use app::{App, Console, ConsoleMode, ExitReason, Session, Transition, WizardState};
pub use config::{InstallConfig, InstallTarget};
pub use error::{ConsoleError, ProbeError};
pub use probes::{ClusterProbe, PasswordHasher, Probes, RemoteProbe, SystemProbe};
pub use screens::ScreenId;
pub use settings::ConsoleSettings;
pub use status::{NodeRole, StatusSnapshot, StatusTracker};
pub use types::{ConfirmChoice, InstallMode, NetworkMode, SelectOption};
