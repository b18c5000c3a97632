//! Notification preferences and delegate management.
//!
//! # Invariants
//! - Delegate emails match `^[^\s@]+@[^\s@]+\.[^\s@]+$`.
//! - Unknown keys under `settings` survive every update.

use super::{ServiceError, ServiceResult};
use crate::model::settings::{Delegate, Frequency, Settings};
use crate::state::StateStore;
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub struct SettingsService<'s> {
    store: &'s mut StateStore,
}

impl<'s> SettingsService<'s> {
    pub fn new(store: &'s mut StateStore) -> Self {
        Self { store }
    }

    pub fn current(&self) -> Settings {
        self.store.settings()
    }

    pub fn save_notifications(&mut self, enabled: bool, frequency: Frequency) -> ServiceResult<Settings> {
        self.store.set("settings.notifications", Value::Bool(enabled))?;
        self.store
            .set("settings.frequency", serde_json::to_value(frequency)?)?;
        info!(
            "event=settings_save module=service status=ok notifications={enabled} frequency={frequency:?}"
        );
        Ok(self.store.settings())
    }

    /// Appends a delegate after trimming and validating both fields.
    pub fn add_delegate(&mut self, name: &str, email: &str) -> ServiceResult<Delegate> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() || email.is_empty() {
            let field = if name.is_empty() { "name" } else { "email" };
            return Err(ServiceError::validation(field, "Please fill in all fields"));
        }
        if !is_valid_email(email) {
            return Err(ServiceError::validation(
                "email",
                "Please enter a valid email address",
            ));
        }

        let delegate = Delegate {
            name: name.to_string(),
            email: email.to_string(),
        };
        self.store
            .push("settings.delegates", serde_json::to_value(&delegate)?)?;
        info!("event=delegate_add module=service status=ok");
        Ok(delegate)
    }

    /// Removes the delegate at `index`.
    pub fn remove_delegate(&mut self, index: usize) -> ServiceResult<Delegate> {
        let mut delegates = match self.store.get("settings.delegates", Value::Null) {
            Value::Array(delegates) if index < delegates.len() => delegates,
            _ => {
                return Err(ServiceError::NotFound {
                    kind: "delegate",
                    id: index.to_string(),
                })
            }
        };
        let removed = delegates.remove(index);
        self.store.set("settings.delegates", Value::Array(delegates))?;
        info!("event=delegate_remove module=service status=ok index={index}");
        Ok(serde_json::from_value(removed)?)
    }
}

#[cfg(test)]
mod tests {
    use super::is_valid_email;

    #[test]
    fn email_pattern_requires_user_domain_and_tld() {
        assert!(is_valid_email("sam@dept.edu"));
        assert!(!is_valid_email("sam@dept"));
        assert!(!is_valid_email("sam dept@x.io"));
        assert!(!is_valid_email("@dept.edu"));
    }
}
