//! The response-shaping builder.
//!
//! A [`Render`] accumulates key/value pairs, lets callers rename, hide and
//! forget keys, and finally hands the resulting mapping to a formatter.
//!
//! Four stores back the builder:
//! - attributes: original key → output key, in insertion order
//! - values: original key → value
//! - hidden: output keys left out of the default listing
//! - forgotten: output keys left out of every listing
//!
//! ```
//! use rendition_core::Render;
//!
//! let mut render = Render::new();
//! render.with("message", "ok").with("code", 0).replace("message", "msg");
//! assert_eq!(render.get("msg"), Some("ok".into()));
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::attributes::AttributeStore;
use crate::emit::{Emitter, Headers, JsonEmitter, Rendered, ResponseDefaults};
use crate::error::Result;
use crate::format::EncodeOptions;
use crate::keys::Keys;
use crate::registry::MacroRegistry;

/// A stored response formatter: final mapping in, response artifact out.
pub type Formatter = Arc<dyn Fn(&Map<String, Value>) -> Result<Rendered> + Send + Sync>;

pub struct Render {
    attributes: AttributeStore,
    values: HashMap<String, Value>,
    hidden: HashSet<String>,
    forgotten: HashSet<String>,
    format: Option<Formatter>,
    registry: Arc<MacroRegistry>,
    emitter: Arc<dyn Emitter>,
    defaults: ResponseDefaults,
}

impl Render {
    /// A builder attached to the process-wide macro registry.
    pub fn new() -> Self {
        Self::using(MacroRegistry::global())
    }

    /// A builder attached to an explicit macro registry.
    pub fn using(registry: Arc<MacroRegistry>) -> Self {
        Self::from_parts(registry, Arc::new(JsonEmitter), ResponseDefaults::default())
    }

    pub(crate) fn from_parts(
        registry: Arc<MacroRegistry>,
        emitter: Arc<dyn Emitter>,
        defaults: ResponseDefaults,
    ) -> Self {
        Self {
            attributes: AttributeStore::new(),
            values: HashMap::new(),
            hidden: HashSet::new(),
            forgotten: HashSet::new(),
            format: None,
            registry,
            emitter,
            defaults,
        }
    }

    pub fn registry(&self) -> &Arc<MacroRegistry> {
        &self.registry
    }

    pub fn defaults(&self) -> &ResponseDefaults {
        &self.defaults
    }

    // ── Mutation ──────────────────────────────────────────────────────

    /// Set `key` to `value`. A new key is exposed under its own name; an
    /// existing key keeps its output name and position.
    pub fn with(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let key = key.into();
        self.attributes.ensure(&key);
        self.values.insert(key, value.into());
        self
    }

    /// Like [`with`](Self::with) for any serializable value.
    pub fn with_serialized<T>(&mut self, key: impl Into<String>, value: &T) -> Result<&mut Self>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(value)?;
        Ok(self.with(key, value))
    }

    /// Expose the value stored under `old` as `new`. Ignored when `old` was
    /// never set.
    pub fn replace(&mut self, old: &str, new: &str) -> &mut Self {
        if !self.attributes.rename(old, new) {
            debug!(key = old, "replace ignored for unknown key");
        }
        self
    }

    /// Leave output keys out of `all(true)` and the response.
    pub fn hide(&mut self, keys: impl Keys) -> &mut Self {
        self.hidden.extend(keys.into_keys());
        self
    }

    /// Leave output keys out of every listing, for the life of this builder.
    pub fn forget(&mut self, keys: impl Keys) -> &mut Self {
        self.forgotten.extend(keys.into_keys());
        self
    }

    /// Clear attributes, values, hidden and forgotten keys. Macros and the
    /// stored format survive.
    pub fn reset(&mut self) -> &mut Self {
        self.attributes.clear();
        self.values.clear();
        self.hidden.clear();
        self.forgotten.clear();
        self
    }

    /// Flush the attached macro registry, then reset. Every builder sharing
    /// the registry loses its macros.
    pub fn flush(&mut self) -> &mut Self {
        self.registry.flush();
        self.reset()
    }

    /// Bulk assignment. Without `append` the builder is reset first.
    pub fn data<I, K, V>(&mut self, data: I, append: bool) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        if !append {
            self.reset();
        }
        for (key, value) in data {
            self.with(key, value);
        }
        self
    }

    // ── Reading ───────────────────────────────────────────────────────

    fn build(&self) -> Map<String, Value> {
        let mut out = Map::new();
        for attr in self.attributes.iter() {
            if self.forgotten.contains(&attr.output) {
                continue;
            }
            let value = self
                .values
                .get(&attr.original)
                .cloned()
                .unwrap_or(Value::Null);
            out.insert(attr.output.clone(), value);
        }
        out
    }

    /// The output mapping. With `hidden` set, hidden keys are left out.
    pub fn all(&self, hidden: bool) -> Map<String, Value> {
        let built = self.build();
        if !hidden {
            return built;
        }
        built
            .into_iter()
            .filter(|(key, _)| !self.hidden.contains(key))
            .collect()
    }

    /// Value exposed under output key `key`, hidden or not. `None` when the
    /// key is unknown or forgotten.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.build().get(key).cloned()
    }

    /// Whether `key` is exposed, counting hidden keys.
    pub fn contains(&self, key: &str) -> bool {
        self.build().contains_key(key)
    }

    /// Number of exposed keys, counting hidden keys.
    pub fn len(&self) -> usize {
        self.build().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ── Formatting ────────────────────────────────────────────────────

    /// Store a JSON formatter with explicit parameters.
    pub fn json(&mut self, status: u16, headers: Headers, options: EncodeOptions) -> &mut Self {
        let emitter = Arc::clone(&self.emitter);
        self.format = Some(Arc::new(move |data: &Map<String, Value>| {
            emitter.json(data, status, &headers, options)
        }));
        self
    }

    /// Store a JSONP formatter with explicit parameters.
    pub fn jsonp(
        &mut self,
        callback: impl Into<String>,
        status: u16,
        headers: Headers,
        options: EncodeOptions,
    ) -> &mut Self {
        let emitter = Arc::clone(&self.emitter);
        let callback = callback.into();
        self.format = Some(Arc::new(move |data: &Map<String, Value>| {
            emitter.jsonp(&callback, data, status, &headers, options)
        }));
        self
    }

    /// Store a JSON formatter built from this builder's defaults.
    pub fn json_default(&mut self) -> &mut Self {
        let d = self.defaults.clone();
        self.json(d.status, d.headers, d.options)
    }

    /// Store a JSONP formatter built from this builder's defaults.
    pub fn jsonp_default(&mut self) -> &mut Self {
        let d = self.defaults.clone();
        self.jsonp(d.callback, d.status, d.headers, d.options)
    }

    /// Store a custom formatter, replacing any previous one.
    pub fn set_format<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Map<String, Value>) -> Result<Rendered> + Send + Sync + 'static,
    {
        self.format = Some(Arc::new(f));
        self
    }

    pub fn clear_format(&mut self) -> &mut Self {
        self.format = None;
        self
    }

    pub fn has_format(&self) -> bool {
        self.format.is_some()
    }

    /// Format `all(true)` with the stored formatter, or the default JSON one.
    /// The builder is reset whether or not formatting succeeds.
    pub fn response(&mut self) -> Result<Rendered> {
        let formatter = match &self.format {
            Some(f) => Arc::clone(f),
            None => self.default_formatter(),
        };
        self.response_with(|data| formatter(data))
    }

    /// Format `all(true)` with `formatter`, bypassing the stored one.
    /// The builder is reset before `formatter` runs.
    pub fn response_with<T, F>(&mut self, formatter: F) -> Result<T>
    where
        F: FnOnce(&Map<String, Value>) -> Result<T>,
    {
        let data = self.all(true);
        self.reset();
        debug!(keys = data.len(), "Formatting response");
        formatter(&data)
    }

    fn default_formatter(&self) -> Formatter {
        let emitter = Arc::clone(&self.emitter);
        let d = self.defaults.clone();
        Arc::new(move |data: &Map<String, Value>| {
            emitter.json(data, d.status, &d.headers, d.options)
        })
    }
}

impl Default for Render {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Render {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Render")
            .field("attributes", &self.attributes)
            .field("values", &self.values)
            .field("hidden", &self.hidden)
            .field("forgotten", &self.forgotten)
            .field("has_format", &self.format.is_some())
            .field("defaults", &self.defaults)
            .finish()
    }
}
