//! Boundary errors for the inference engine

use thiserror::Error;

/// Structurally invalid input rejected before inference starts
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("label '{content}' has a non-finite coordinate")]
    NonFiniteLabel { content: String },

    #[error("wire spec '{diameter},{color}' has a non-finite coordinate")]
    NonFiniteWireSpec { diameter: String, color: String },

    #[error("{kind} #{index} has a non-finite coordinate")]
    NonFiniteGeometry { kind: &'static str, index: usize },

    #[error("invalid inference rule '{name}': {reason}")]
    InvalidRule { name: &'static str, reason: String },
}
