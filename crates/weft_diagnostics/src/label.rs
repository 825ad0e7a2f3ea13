//! Labels that point a diagnostic at related entities.

use crate::target::Target;
use serde::{Deserialize, Serialize};

/// Whether a label marks the offending entity or related context.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum LabelStyle {
    /// The entity the diagnostic is about.
    Primary,
    /// Another entity involved, e.g. the reference field a member was reached through.
    Secondary,
}

/// An annotated target within a diagnostic.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Label {
    /// The entity this label annotates.
    pub target: Target,
    /// The message displayed next to the entity.
    pub message: String,
    /// Whether this is a primary or secondary label.
    pub style: LabelStyle,
}

impl Label {
    /// Creates a primary label.
    pub fn primary(target: Target, message: impl Into<String>) -> Self {
        Self {
            target,
            message: message.into(),
            style: LabelStyle::Primary,
        }
    }

    /// Creates a secondary label.
    pub fn secondary(target: Target, message: impl Into<String>) -> Self {
        Self {
            target,
            message: message.into(),
            style: LabelStyle::Secondary,
        }
    }
}
