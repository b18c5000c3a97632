//! Portal runtime configuration.
//!
//! # Responsibility
//! - Load optional JSON configuration with every field defaulted.
//! - Validate values the router and services rely on.
//!
//! # Invariants
//! - `default_route` starts with `/`.
//! - `approval.required_approvals` is at least 1.

use log::info;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid { field, reason } => write!(f, "invalid config `{field}`: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// How many approving decisions finalize a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApprovalPolicy {
    pub required_approvals: usize,
}

impl Default for ApprovalPolicy {
    fn default() -> Self {
        Self {
            required_approvals: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PortalConfig {
    pub default_route: String,
    /// Appended to page titles as `"{title} - {suffix}"`.
    pub title_suffix: String,
    pub approval: ApprovalPolicy,
    pub toast_dismiss_ms: u64,
    pub search_debounce_ms: u64,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            default_route: "/dashboard".to_string(),
            title_suffix: "HR Portal".to_string(),
            approval: ApprovalPolicy::default(),
            toast_dismiss_ms: 3000,
            search_debounce_ms: 200,
        }
    }
}

impl PortalConfig {
    /// Reads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json(&raw)?;
        info!(
            "event=config_load module=config status=ok path={}",
            path.display()
        );
        Ok(config)
    }

    pub fn from_json(raw: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !self.default_route.starts_with('/') {
            return Err(ConfigError::Invalid {
                field: "defaultRoute",
                reason: format!("must start with `/`, got `{}`", self.default_route),
            });
        }
        if self.approval.required_approvals == 0 {
            return Err(ConfigError::Invalid {
                field: "approval.requiredApprovals",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Formats a document title for a page.
    pub fn document_title(&self, page_title: &str) -> String {
        format!("{page_title} - {}", self.title_suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, PortalConfig};

    #[test]
    fn empty_object_yields_defaults() {
        let config = PortalConfig::from_json("{}").expect("empty config is valid");
        assert_eq!(config, PortalConfig::default());
        assert_eq!(config.approval.required_approvals, 1);
    }

    #[test]
    fn partial_config_overrides_fields() {
        let config = PortalConfig::from_json(
            r#"{"defaultRoute":"/requests","approval":{"requiredApprovals":2}}"#,
        )
        .expect("partial config is valid");
        assert_eq!(config.default_route, "/requests");
        assert_eq!(config.approval.required_approvals, 2);
        assert_eq!(config.search_debounce_ms, 200);
    }

    #[test]
    fn rejects_relative_default_route_and_zero_approvals() {
        let err = PortalConfig::from_json(r#"{"defaultRoute":"dashboard"}"#)
            .expect_err("relative route must fail");
        assert!(matches!(err, ConfigError::Invalid { field: "defaultRoute", .. }));

        let err = PortalConfig::from_json(r#"{"approval":{"requiredApprovals":0}}"#)
            .expect_err("zero approvals must fail");
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn document_title_uses_suffix() {
        assert_eq!(
            PortalConfig::default().document_title("Dashboard"),
            "Dashboard - HR Portal"
        );
    }
}
