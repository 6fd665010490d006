//! Macro registry: named extensions invocable as builder methods.
//!
//! A registry is shared by every builder attached to it. A macro is cloned
//! out of the read guard before it runs, so it may register or flush on its
//! own registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;
use tracing::{debug, info};

use crate::error::Result;
use crate::render::Render;

/// What a macro hands back: `None` means "the builder itself", `Some` is a
/// produced value.
pub type MacroResult = Result<Option<Value>>;

/// A registered extension. The builder is passed explicitly, followed by the
/// positional call arguments.
pub type Macro = Arc<dyn Fn(&mut Render, &[Value]) -> MacroResult + Send + Sync>;

static GLOBAL: LazyLock<Arc<MacroRegistry>> = LazyLock::new(|| Arc::new(MacroRegistry::new()));

/// Table of macros keyed by method name.
#[derive(Default)]
pub struct MacroRegistry {
    macros: RwLock<HashMap<String, Macro>>,
}

impl MacroRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry, created on first use.
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL)
    }

    /// Register a macro. Replaces any existing macro with the same name.
    pub fn register<F>(&self, name: impl Into<String>, f: F)
    where
        F: Fn(&mut Render, &[Value]) -> MacroResult + Send + Sync + 'static,
    {
        self.insert(name.into(), Arc::new(f));
    }

    /// Register an already shared macro.
    pub fn insert(&self, name: String, f: Macro) {
        let replaced = self.write().insert(name.clone(), f).is_some();
        info!(name = %name, replaced, "Registered macro");
    }

    /// Register many macros at once. Names already present are kept unless
    /// `replace` is set.
    pub fn mixin<I>(&self, entries: I, replace: bool)
    where
        I: IntoIterator<Item = (String, Macro)>,
    {
        let mut macros = self.write();
        for (name, f) in entries {
            if !replace && macros.contains_key(&name) {
                debug!(name = %name, "Mixin kept existing macro");
                continue;
            }
            macros.insert(name, f);
        }
        info!(count = macros.len(), "Mixed macros into registry");
    }

    /// Whether a macro named `name` is registered.
    pub fn has_macro(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Get a handle to a macro by name.
    pub fn get(&self, name: &str) -> Option<Macro> {
        self.read().get(name).cloned()
    }

    /// Snapshot of every registered macro, e.g. for mixing into another registry.
    pub fn entries(&self) -> Vec<(String, Macro)> {
        self.read()
            .iter()
            .map(|(name, f)| (name.clone(), Arc::clone(f)))
            .collect()
    }

    /// Registered macro names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Remove every macro. Affects all builders sharing this registry.
    pub fn flush(&self) {
        let mut macros = self.write();
        let count = macros.len();
        macros.clear();
        info!(count, "Flushed macro registry");
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Macro>> {
        self.macros.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Macro>> {
        self.macros.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl fmt::Debug for MacroRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MacroRegistry")
            .field("macros", &self.names())
            .finish()
    }
}
