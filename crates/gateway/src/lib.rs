//! Axum integration for Rendition.
//!
//! Wires the builder into an axum application:
//! - [`boot`] builds a [`RenderFactory`] from configuration and seeds the
//!   stock `success` / `error` macros
//! - [`Renderer`] hands every request its own builder
//! - [`Reply`] and [`ApiError`] turn builder output and failures into
//!   responses
//!
//! Routing and serving stay with the host application.

pub mod extract;
pub mod reply;

use std::sync::Arc;

use rendition_config::RenditionConfig;
use rendition_core::{MacroRegistry, RenderFactory, conventions};
use tracing::info;

pub use extract::Renderer;
pub use reply::{ApiError, ErrorResponse, Reply};

/// Build a factory over a fresh registry.
pub fn boot(config: &RenditionConfig) -> RenderFactory {
    boot_with(config, Arc::new(MacroRegistry::new()))
}

/// Build a factory over `registry`, e.g. [`MacroRegistry::global`].
pub fn boot_with(config: &RenditionConfig, registry: Arc<MacroRegistry>) -> RenderFactory {
    if config.conventions.enabled {
        conventions::register(&registry, &config.conventions());
    }

    let factory = RenderFactory::new()
        .with_registry(registry)
        .with_defaults(config.response_defaults());

    info!(
        macros = ?factory.registry().names(),
        status = factory.defaults().status,
        "Render factory booted"
    );
    factory
}
