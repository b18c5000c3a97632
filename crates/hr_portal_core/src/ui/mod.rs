//! Headless rendering targets.
//!
//! # Responsibility
//! - Model the document and its mount container as typed blocks.
//! - Queue transient notifications with timed dismissal.

mod document;
mod surface;
mod toast;

pub use document::{Document, APP_CONTAINER_ID};
pub use surface::{Block, Surface, Tone};
pub use toast::{Toast, ToastKind, ToastQueue};
