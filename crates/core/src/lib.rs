//! # Rendition Core
//!
//! A fluent, mutable response-shaping builder. Callers accumulate key/value
//! pairs, rename, hide or forget keys, and finally serialize the result
//! through a pluggable formatter.
//!
//! This crate has no web-framework dependency. Response emission sits
//! behind the [`Emitter`] trait; framework glue lives in `rendition-gateway`.

pub mod attributes;
pub mod conventions;
pub mod dispatch;
pub mod emit;
pub mod error;
pub mod factory;
pub mod format;
pub mod keys;
pub mod registry;
pub mod render;

// Re-export key types at crate root for ergonomics
pub use conventions::Conventions;
pub use emit::{Emitter, Headers, JsonEmitter, Rendered, ResponseDefaults};
pub use error::{RenderError, Result};
pub use factory::RenderFactory;
pub use format::EncodeOptions;
pub use keys::Keys;
pub use registry::{Macro, MacroRegistry, MacroResult};
pub use render::{Formatter, Render};
