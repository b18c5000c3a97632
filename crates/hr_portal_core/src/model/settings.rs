//! User settings stored under `settings`.

use serde::{Deserialize, Serialize};

/// Email notification cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Immediate,
    Daily,
    Weekly,
}

impl Frequency {
    pub fn label(self) -> &'static str {
        match self {
            Self::Immediate => "Immediate",
            Self::Daily => "Daily Digest",
            Self::Weekly => "Weekly Summary",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "immediate" => Some(Self::Immediate),
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            _ => None,
        }
    }
}

/// Proxy allowed to act on the user's behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegate {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub notifications: bool,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub delegates: Vec<Delegate>,
}
