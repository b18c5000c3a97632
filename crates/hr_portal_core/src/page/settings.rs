//! Notification preferences and delegation.

use super::{toast_validation, Mount, PageAction, PageModule, PageResult, Reaction};
use crate::model::settings::Frequency;
use crate::service::settings_service::SettingsService;
use crate::service::ServiceError;
use crate::ui::{Block, Tone};

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Default)]
pub struct NotificationsPage {
    enabled: Option<bool>,
    frequency: Option<Frequency>,
}

impl PageModule for NotificationsPage {
    fn title(&self) -> Option<&'static str> {
        Some("Notification Settings")
    }

    fn render(&mut self, mount: &mut Mount<'_>) -> PageResult<()> {
        let current = SettingsService::new(mount.store).current();
        let enabled = self.enabled.unwrap_or(current.notifications);
        let frequency = self.frequency.unwrap_or(current.frequency);

        let surface = &mut *mount.container;
        surface.heading(1, "Notification Settings");
        surface.push(Block::Field {
            name: "notifications".to_string(),
            label: "Email Notifications".to_string(),
            value: enabled.to_string(),
            required: false,
        });
        surface.push(Block::Field {
            name: "frequency".to_string(),
            label: "Frequency [immediate|daily|weekly]".to_string(),
            value: serde_json::to_value(frequency)
                .ok()
                .and_then(|value| value.as_str().map(str::to_string))
                .unwrap_or_default(),
            required: false,
        });
        surface
            .text(format!("Currently: {}", frequency.label()))
            .button("Save Settings", PageAction::Submit);
        Ok(())
    }

    fn handle(&mut self, action: PageAction, mount: &mut Mount<'_>) -> PageResult<Reaction> {
        match action {
            PageAction::Input { field, value } => {
                match field.as_str() {
                    "notifications" => self.enabled = parse_flag(&value).or(self.enabled),
                    "frequency" => self.frequency = Frequency::parse(&value).or(self.frequency),
                    _ => {}
                }
                Ok(Reaction::None)
            }
            PageAction::Submit => {
                let mut service = SettingsService::new(mount.store);
                let current = service.current();
                service.save_notifications(
                    self.enabled.unwrap_or(current.notifications),
                    self.frequency.unwrap_or(current.frequency),
                )?;
                self.cleanup();
                mount
                    .toasts
                    .success("Notification settings saved successfully");
                Ok(Reaction::Rerender)
            }
            PageAction::Navigate(route) => Ok(Reaction::Navigate(route)),
            _ => Ok(Reaction::None),
        }
    }

    fn cleanup(&mut self) {
        self.enabled = None;
        self.frequency = None;
    }
}

#[derive(Debug, Default)]
pub struct DelegationPage {
    name: String,
    email: String,
}

impl PageModule for DelegationPage {
    fn title(&self) -> Option<&'static str> {
        Some("Delegation Settings")
    }

    fn render(&mut self, mount: &mut Mount<'_>) -> PageResult<()> {
        let delegates = SettingsService::new(mount.store).current().delegates;
        let surface = &mut *mount.container;
        surface.heading(1, "Delegation Settings");
        if delegates.is_empty() {
            surface.notice(Tone::Neutral, "No delegates configured.");
        } else {
            let rows = delegates
                .iter()
                .map(|delegate| vec![delegate.name.clone(), delegate.email.clone()])
                .collect();
            surface.table(&["Name", "Email"], rows);
            for (index, delegate) in delegates.iter().enumerate() {
                surface.button(format!("Remove {}", delegate.name), PageAction::Remove(index));
            }
        }

        surface.heading(2, "Add Delegate");
        for (name, label, value) in [("name", "Name", &self.name), ("email", "Email", &self.email)] {
            surface.push(Block::Field {
                name: name.to_string(),
                label: label.to_string(),
                value: value.clone(),
                required: true,
            });
        }
        surface.button("Add Delegate", PageAction::Submit);
        Ok(())
    }

    fn handle(&mut self, action: PageAction, mount: &mut Mount<'_>) -> PageResult<Reaction> {
        match action {
            PageAction::Input { field, value } => {
                match field.as_str() {
                    "name" => self.name = value,
                    "email" => self.email = value,
                    _ => {}
                }
                Ok(Reaction::None)
            }
            PageAction::Submit => {
                let result = SettingsService::new(mount.store).add_delegate(&self.name, &self.email);
                if toast_validation(mount, result)?.is_none() {
                    return Ok(Reaction::None);
                }
                self.cleanup();
                mount.toasts.success("Delegate added successfully");
                Ok(Reaction::Rerender)
            }
            PageAction::Remove(index) => {
                match SettingsService::new(mount.store).remove_delegate(index) {
                    Ok(_) => {
                        mount.toasts.success("Delegate removed successfully");
                    }
                    Err(err @ ServiceError::NotFound { .. }) => {
                        mount.toasts.error(err.user_message());
                    }
                    Err(err) => return Err(err.into()),
                }
                Ok(Reaction::Rerender)
            }
            PageAction::Navigate(route) => Ok(Reaction::Navigate(route)),
            _ => Ok(Reaction::None),
        }
    }

    fn cleanup(&mut self) {
        self.name.clear();
        self.email.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::parse_flag;

    #[test]
    fn flags_accept_common_spellings() {
        assert_eq!(parse_flag("on"), Some(true));
        assert_eq!(parse_flag(" FALSE "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
