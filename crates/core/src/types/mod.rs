//! Core types for Marigold.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catalog;
pub mod email;
pub mod id;
pub mod money;

pub use catalog::{Badge, BadgeField, ColorField, ColorSpec};
pub use email::{Email, EmailError};
pub use id::*;
pub use money::Money;
