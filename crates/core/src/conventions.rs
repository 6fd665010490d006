//! Stock `success` / `error` macros.
//!
//! Both write a fixed envelope in a fixed order:
//!
//! | macro     | fields                                          |
//! |-----------|-------------------------------------------------|
//! | `success` | `state=true, message, url, data, timestamp`     |
//! | `error`   | `state=false, error, url, errors, timestamp`    |
//!
//! Positional arguments are `(message, url, payload)`. A missing argument
//! takes its default; an explicit `null` is kept.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::Utc;
use serde_json::Value;

use crate::registry::MacroRegistry;

pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Defaults for the stock macros.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conventions {
    pub success_message: String,
    pub error_message: String,
    /// `strftime` pattern rendered in UTC.
    pub timestamp_format: String,
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            success_message: "SUCCESS".into(),
            error_message: "ERROR".into(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.into(),
        }
    }
}

impl Conventions {
    /// Current UTC time in the configured format. Falls back to the default
    /// format if the configured one cannot be rendered.
    pub fn timestamp(&self) -> String {
        let now = Utc::now();
        let mut out = String::new();
        if write!(out, "{}", now.format(&self.timestamp_format)).is_err() {
            out.clear();
            let _ = write!(out, "{}", now.format(DEFAULT_TIMESTAMP_FORMAT));
        }
        out
    }
}

/// Whether `format` is a usable `strftime` pattern.
pub fn is_valid_timestamp_format(format: &str) -> bool {
    !format.is_empty() && StrftimeItems::new(format).all(|item| !matches!(item, Item::Error))
}

/// Register `success` and `error` on `registry`.
pub fn register(registry: &MacroRegistry, conventions: &Conventions) {
    let c = conventions.clone();
    registry.register("success", move |render, args| {
        render
            .with("state", true)
            .with("message", arg_or(args, 0, &c.success_message))
            .with("url", arg_or_null(args, 1))
            .with("data", arg_or_null(args, 2))
            .with("timestamp", c.timestamp());
        Ok(None)
    });

    let c = conventions.clone();
    registry.register("error", move |render, args| {
        render
            .with("state", false)
            .with("error", arg_or(args, 0, &c.error_message))
            .with("url", arg_or_null(args, 1))
            .with("errors", arg_or_null(args, 2))
            .with("timestamp", c.timestamp());
        Ok(None)
    });
}

fn arg_or(args: &[Value], idx: usize, default: &str) -> Value {
    args.get(idx)
        .cloned()
        .unwrap_or_else(|| Value::from(default))
}

fn arg_or_null(args: &[Value], idx: usize) -> Value {
    args.get(idx).cloned().unwrap_or(Value::Null)
}
