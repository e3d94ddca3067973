//! Screen catalogue
//!
//! Every screen the console can show, registered once at start-up by
//! `build_install_screens` or `build_dashboard_screens`. Layout constants
//! live next to the registration so the whole form can be read in one place.
//!
//! # Module Structure
//! - `panels` - title, note, validator, footer, spinner and install panels
//! - `install` - install mode, disk, management address, token, password, SSH keys
//! - `network` - interface and address group
//! - `finish` - proxy, cloud-init, confirmation
//! - `dashboard` - logo, URL, status and the shell credential prompt

pub mod dashboard;
pub mod finish;
pub mod install;
pub mod network;
pub mod panels;

use crate::app::Step;
use crate::error::{ConsoleError, Result};
use crate::ui::{Context, ScreenRegistry};
use std::str::FromStr;
use strum::{Display, EnumIter};

/// Stable name of every screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ScreenId {
    // Support panels
    Title,
    Note,
    Validator,
    Footer,
    Spinner,
    Install,

    // Wizard
    AskCreate,
    Disk,
    ServerUrl,
    Token,
    Password,
    PasswordConfirm,
    SshKey,
    Network,
    AskNetworkMode,
    HostName,
    Address,
    Gateway,
    DnsServers,
    NetworkValidator,
    Proxy,
    CloudInit,
    Confirm,

    // Dashboard
    Logo,
    Url,
    Status,
    DashboardFooter,
    AdminPasswordFrame,
    AdminPassword,
    AdminValidator,
}

/// Register the wizard screens. Must run exactly once per registry.
pub fn build_install_screens(registry: &mut ScreenRegistry) -> Result<()> {
    panels::register(registry)?;
    install::register(registry)?;
    network::register(registry)?;
    finish::register(registry)?;
    Ok(())
}

/// Register the dashboard screens. Must run exactly once per registry.
pub fn build_dashboard_screens(registry: &mut ScreenRegistry) -> Result<()> {
    dashboard::register(registry)
}

/// Panels visible from the first frame of the wizard
pub const INSTALL_PANELS: [ScreenId; 4] = [
    ScreenId::Title,
    ScreenId::Note,
    ScreenId::Validator,
    ScreenId::Footer,
];

/// First interactive step of the wizard
pub fn install_entry() -> Step {
    Step::one(ScreenId::AskCreate)
}

/// Panels visible from the first frame of the dashboard
pub const DASHBOARD_PANELS: [ScreenId; 4] = [
    ScreenId::Logo,
    ScreenId::Url,
    ScreenId::Status,
    ScreenId::DashboardFooter,
];

/// Parse the highlighted value of a select screen
pub(crate) fn selected<T: FromStr>(ctx: &Context<'_>, id: ScreenId) -> Result<T> {
    let value = ctx.value(id)?;
    value
        .parse()
        .map_err(|_| ConsoleError::state(format!("unexpected selection {:?} on {}", value, id)))
}
