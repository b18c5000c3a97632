//! Typed projections of the state document.
//!
//! # Responsibility
//! - Give services a typed view over the untyped JSON collections.
//!
//! # Invariants
//! - Field names serialize in camelCase to match the persisted document.
//! - Projections never own persistence; writes go through the state store.

pub mod approval;
pub mod directory;
pub mod person;
pub mod request;
pub mod settings;
pub mod user;
