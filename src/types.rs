//! Type-safe wizard choice types
//!
//! Select screens hand back one of these enums instead of raw strings, so the
//! branching in the wizard flow is exhaustively matched.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Whether this node starts a new cluster or joins an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InstallMode {
    #[default]
    Create,
    Join,
}

impl InstallMode {
    /// Text shown in the install mode list
    pub fn description(self) -> &'static str {
        match self {
            Self::Create => "Create a new Harvester cluster",
            Self::Join => "Join an existing Harvester cluster",
        }
    }
}

/// How the management interface gets its address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NetworkMode {
    #[default]
    Dhcp,
    Static,
}

impl NetworkMode {
    pub fn is_static(self) -> bool {
        matches!(self, Self::Static)
    }
}

/// Answer on the final confirmation screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ConfirmChoice {
    Yes,
    No,
}

impl ConfirmChoice {
    pub fn label(self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }
}

/// One entry of a single-select list: the value handed back on confirm and
/// the text shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub text: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
        }
    }

    /// Build the option list for an enum whose string form is its value
    pub fn from_enum<E, F>(describe: F) -> Vec<Self>
    where
        E: IntoEnumIterator + std::fmt::Display,
        F: Fn(&E) -> String,
    {
        E::iter()
            .map(|item| Self::new(item.to_string(), describe(&item)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_install_mode_strings() {
        assert_eq!(InstallMode::Create.to_string(), "create");
        assert_eq!(InstallMode::from_str("join").ok(), Some(InstallMode::Join));
    }

    #[test]
    fn test_network_mode_options() {
        let options = SelectOption::from_enum::<NetworkMode, _>(|m| m.to_string());
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].value, "dhcp");
        assert_eq!(options[1].text, "static");
    }

    #[test]
    fn test_confirm_choice_parse() {
        assert_eq!(ConfirmChoice::from_str("no").ok(), Some(ConfirmChoice::No));
        assert!(ConfirmChoice::from_str("maybe").is_err());
    }
}
