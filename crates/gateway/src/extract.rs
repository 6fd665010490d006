//! Per-request builder extraction.

use std::convert::Infallible;
use std::ops::{Deref, DerefMut};

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};

use rendition_core::{Render, RenderFactory};

use crate::reply::{ApiError, Reply};

/// A fresh [`Render`] for the current request, made by the application's
/// [`RenderFactory`].
///
/// Returning a `Renderer` from a handler renders it with its stored or
/// default formatter.
#[derive(Debug)]
pub struct Renderer(pub Render);

impl Renderer {
    pub fn into_inner(self) -> Render {
        self.0
    }
}

impl Deref for Renderer {
    type Target = Render;

    fn deref(&self) -> &Render {
        &self.0
    }
}

impl DerefMut for Renderer {
    fn deref_mut(&mut self) -> &mut Render {
        &mut self.0
    }
}

impl<S> FromRequestParts<S> for Renderer
where
    RenderFactory: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(RenderFactory::from_ref(state).make()))
    }
}

impl IntoResponse for Renderer {
    fn into_response(mut self) -> Response {
        match self.0.response() {
            Ok(rendered) => Reply(rendered).into_response(),
            Err(err) => ApiError(err).into_response(),
        }
    }
}
