//! Top-level document: title, navigation chrome and the mount container.

use super::surface::Surface;

pub const APP_CONTAINER_ID: &str = "app";

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    /// `None` when the mount container is missing.
    pub container: Option<Surface>,
    /// Hidden for embedded sessions.
    pub sidebar_visible: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            title: String::new(),
            container: Some(Surface::new(APP_CONTAINER_ID)),
            sidebar_visible: true,
        }
    }
}

impl Document {
    pub fn container(&self) -> Option<&Surface> {
        self.container.as_ref()
    }

    /// Removes the mount container, returning it.
    pub fn detach_container(&mut self) -> Option<Surface> {
        self.container.take()
    }

    pub fn attach_container(&mut self, surface: Surface) {
        self.container = Some(surface);
    }
}
