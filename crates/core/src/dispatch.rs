//! Dynamic method calls on a [`Render`].
//!
//! Resolution order for a method name:
//! 1. a macro registered under that name
//! 2. `with<Suffix>` → `with("<suffix>", args[0])`, suffix lower-cased
//! 3. `RenderError::UnknownMethod`

use serde_json::Value;
use tracing::debug;

use crate::error::{RenderError, Result};
use crate::registry::MacroResult;
use crate::render::Render;

const WITH_PREFIX: &str = "with";

impl Render {
    /// Invoke `method` dynamically. Returns the macro's value, or `None`
    /// when the call yields the builder itself.
    pub fn call(&mut self, method: &str, args: &[Value]) -> MacroResult {
        if let Some(f) = self.registry().get(method) {
            debug!(method, args = args.len(), "Dispatching to macro");
            return f(self, args);
        }

        if let Some(key) = with_key(method) {
            // Extra arguments are ignored; a missing one stores null.
            let value = args.first().cloned().unwrap_or(Value::Null);
            debug!(method, key = %key, "Dispatching to with()");
            self.with(key, value);
            return Ok(None);
        }

        Err(RenderError::unknown_method::<Render>(method))
    }

    /// Chaining form of [`call`](Self::call); a macro's value is dropped.
    pub fn apply(&mut self, method: &str, args: &[Value]) -> Result<&mut Self> {
        self.call(method, args)?;
        Ok(self)
    }
}

/// `withFooBar` → `foobar`. `None` for anything else, including bare `with`.
fn with_key(method: &str) -> Option<String> {
    method
        .strip_prefix(WITH_PREFIX)
        .filter(|suffix| !suffix.is_empty())
        .map(str::to_lowercase)
}
