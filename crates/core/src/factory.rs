//! Builder provisioning.
//!
//! A [`RenderFactory`] bundles the pieces every builder shares (macro
//! registry, emitter, response defaults) and hands out fresh builders, one
//! per unit of work.

use std::fmt;
use std::sync::Arc;

use crate::emit::{Emitter, JsonEmitter, ResponseDefaults};
use crate::registry::MacroRegistry;
use crate::render::Render;

#[derive(Clone)]
pub struct RenderFactory {
    registry: Arc<MacroRegistry>,
    emitter: Arc<dyn Emitter>,
    defaults: ResponseDefaults,
}

impl RenderFactory {
    /// Factory over the process-wide registry and the stock JSON emitter.
    pub fn new() -> Self {
        Self {
            registry: MacroRegistry::global(),
            emitter: Arc::new(JsonEmitter),
            defaults: ResponseDefaults::default(),
        }
    }

    pub fn with_registry(mut self, registry: Arc<MacroRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_emitter(mut self, emitter: Arc<dyn Emitter>) -> Self {
        self.emitter = emitter;
        self
    }

    pub fn with_defaults(mut self, defaults: ResponseDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn registry(&self) -> &Arc<MacroRegistry> {
        &self.registry
    }

    pub fn defaults(&self) -> &ResponseDefaults {
        &self.defaults
    }

    /// A fresh builder with empty stores.
    pub fn make(&self) -> Render {
        Render::from_parts(
            Arc::clone(&self.registry),
            Arc::clone(&self.emitter),
            self.defaults.clone(),
        )
    }
}

impl Default for RenderFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RenderFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderFactory")
            .field("registry", &self.registry)
            .field("defaults", &self.defaults)
            .finish()
    }
}
