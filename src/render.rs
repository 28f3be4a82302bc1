//! Error bodies and content negotiation.
//!
//! A failed request is answered in one of three formats, picked from what the
//! caller can consume:
//!
//! | Priority | Condition | Body |
//! |---|---|---|
//! | 1 | `X-Requested-With: XMLHttpRequest` | `{"message":…,"code":…,"trace":…}` |
//! | 2 | a [`TemplateRenderer`] is bound to the request | template `error-<status>` |
//! | 3 | otherwise | plain text |
//!
//! backstop ships no template engine. Bind your own by implementing
//! [`TemplateRenderer`]; the [`ErrorPage`] context is `Serialize`, so it can
//! be handed straight to any engine that takes serde data.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use serde::Serialize;
use thiserror::Error;

use crate::failure::PipelineFailure;
use crate::request::Request;
use crate::response::ContentType;

// ── TemplateRenderer ──────────────────────────────────────────────────────────

/// A capability that turns a named template and an [`ErrorPage`] into HTML.
///
/// Bound to individual requests (see
/// [`Request::bind_renderer`](crate::Request::bind_renderer) and
/// [`BindRenderer`](crate::middleware::BindRenderer)). Shared across
/// concurrent requests, hence `Send + Sync`.
///
/// ```rust
/// use backstop::{ErrorPage, RenderError, TemplateRenderer};
///
/// struct Inline;
///
/// impl TemplateRenderer for Inline {
///     fn render(&self, name: &str, page: &ErrorPage<'_>) -> Result<Vec<u8>, RenderError> {
///         match name {
///             "error-404" | "error-500" => {
///                 Ok(format!("<h1>{}</h1><p>{}</p>", page.status, page.message).into_bytes())
///             }
///             _ => Err(RenderError::NotFound { name: name.to_owned() }),
///         }
///     }
/// }
/// ```
pub trait TemplateRenderer: Send + Sync + 'static {
    fn render(&self, name: &str, page: &ErrorPage<'_>) -> Result<Vec<u8>, RenderError>;
}

/// Why a [`TemplateRenderer`] could not produce a page.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template `{name}` not found")]
    NotFound { name: String },

    #[error("template `{name}` failed to render: {reason}")]
    Failed { name: String, reason: String },
}

/// Context handed to a [`TemplateRenderer`] for an error page.
///
/// `trace` is empty unless detailed errors are enabled. `detail` is the
/// message and trace joined for templates that print a single block:
/// `"\n<message>\n<trace>"`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ErrorPage<'a> {
    pub status: u16,
    pub message: &'a str,
    pub code: i64,
    pub trace: &'a str,
    pub detail: String,
}

/// The JSON body sent to AJAX callers. Field order is part of the wire format.
#[derive(Serialize)]
struct ErrorPayload<'a> {
    message: &'a str,
    code: i64,
    trace: &'a str,
}

// ── RenderedErrorBody ─────────────────────────────────────────────────────────

/// A rendered error body and the content type it must be sent with.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RenderedErrorBody {
    pub content_type: ContentType,
    pub bytes: Bytes,
}

// ── ErrorFormat ───────────────────────────────────────────────────────────────

/// The negotiated format of an error body.
#[derive(Clone)]
pub enum ErrorFormat {
    Json,
    Template(Arc<dyn TemplateRenderer>),
    Plain,
}

impl ErrorFormat {
    /// Picks a format from the request, highest priority first.
    pub fn negotiate(req: &Request) -> Self {
        if req.is_ajax() {
            Self::Json
        } else if let Some(renderer) = req.renderer() {
            Self::Template(Arc::clone(renderer))
        } else {
            Self::Plain
        }
    }

    /// Renders `failure` in this format.
    ///
    /// `trace` is what the client is allowed to see, already filtered by the
    /// caller. An error here means the renderer itself broke; it is not
    /// recovered from.
    pub fn render(
        &self,
        status: StatusCode,
        failure: &PipelineFailure,
        trace: &str,
    ) -> Result<RenderedErrorBody, PipelineFailure> {
        match self {
            Self::Json => render_json(failure, trace),
            Self::Template(renderer) => render_template(&**renderer, status, failure, trace),
            Self::Plain => Ok(render_plain(failure, trace)),
        }
    }
}

impl fmt::Debug for ErrorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("Json"),
            Self::Template(_) => f.write_str("Template(..)"),
            Self::Plain => f.write_str("Plain"),
        }
    }
}

/// Name of the template used for an error with the given status.
pub fn template_name(status: StatusCode) -> String {
    format!("error-{}", status.as_u16())
}

fn render_json(
    failure: &PipelineFailure,
    trace: &str,
) -> Result<RenderedErrorBody, PipelineFailure> {
    let payload = ErrorPayload { message: failure.message(), code: failure.code(), trace };
    Ok(RenderedErrorBody {
        content_type: ContentType::Json,
        bytes: Bytes::from(serde_json::to_vec(&payload)?),
    })
}

fn render_template(
    renderer: &dyn TemplateRenderer,
    status: StatusCode,
    failure: &PipelineFailure,
    trace: &str,
) -> Result<RenderedErrorBody, PipelineFailure> {
    let page = ErrorPage {
        status: status.as_u16(),
        message: failure.message(),
        code: failure.code(),
        trace,
        detail: format!("\n{}\n{trace}", failure.message()),
    };
    let html = renderer.render(&template_name(status), &page)?;
    Ok(RenderedErrorBody { content_type: ContentType::Html, bytes: Bytes::from(html) })
}

fn render_plain(failure: &PipelineFailure, trace: &str) -> RenderedErrorBody {
    RenderedErrorBody {
        content_type: ContentType::Text,
        bytes: Bytes::from(format!("exception:\n{}\n{trace}", failure.message())),
    }
}
