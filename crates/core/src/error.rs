//! Error types for the Rendition builder.
//!
//! Uses `thiserror` for ergonomic error definitions. The builder contract
//! itself is total except for dynamic dispatch; the remaining variants come
//! from response emission and macro bodies.

use thiserror::Error;

/// The top-level error type for all Rendition operations.
#[derive(Debug, Error)]
pub enum RenderError {
    // --- Dispatch ---
    #[error("Method {class}::{method} does not exist.")]
    UnknownMethod { class: String, method: String },

    #[error("Macro {name} failed: {reason}")]
    Macro { name: String, reason: String },

    // --- Emission ---
    #[error("Invalid JSONP callback: {0}")]
    InvalidCallback(String),

    #[error("Invalid HTTP status code: {0}")]
    InvalidStatus(u16),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RenderError {
    /// Build an `UnknownMethod` error for a method looked up on `T`.
    pub fn unknown_method<T: ?Sized>(method: &str) -> Self {
        Self::UnknownMethod {
            class: std::any::type_name::<T>().to_string(),
            method: method.to_string(),
        }
    }

    /// Build a `Macro` error from inside a macro body.
    pub fn macro_failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Macro {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias using our error.
pub type Result<T> = std::result::Result<T, RenderError>;
