//! Incoming HTTP request type.

use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};
use http_body_util::BodyExt;

use crate::render::TemplateRenderer;

const X_REQUESTED_WITH: &str = "x-requested-with";

/// An incoming HTTP request with its body fully buffered.
///
/// Besides the usual HTTP parts, a request may carry a bound
/// [`TemplateRenderer`]: the capability error pages are rendered with. It is
/// absent unless something upstream binds one.
pub struct Request {
    parts: http::request::Parts,
    body: Bytes,
    renderer: Option<Arc<dyn TemplateRenderer>>,
}

impl Request {
    /// Wraps an already-buffered [`http::Request`].
    pub fn new(req: http::Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();
        Self { parts, body, renderer: None }
    }

    /// Buffers the body of a request straight off a hyper connection.
    pub(crate) async fn from_hyper(
        req: hyper::Request<hyper::body::Incoming>,
    ) -> Result<Self, hyper::Error> {
        let (parts, body) = req.into_parts();
        let body = body.collect().await?.to_bytes();
        Ok(Self { parts, body, renderer: None })
    }

    pub fn method(&self) -> &Method { &self.parts.method }
    pub fn uri(&self) -> &Uri { &self.parts.uri }
    pub fn path(&self) -> &str { self.parts.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.parts.headers }
    pub fn body(&self) -> &Bytes { &self.body }

    /// Case-insensitive header lookup. Values that are not visible ASCII are
    /// treated as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// `true` when the client sent `X-Requested-With: XMLHttpRequest`
    /// (value compared case-insensitively).
    pub fn is_ajax(&self) -> bool {
        self.header(X_REQUESTED_WITH)
            .is_some_and(|v| v.eq_ignore_ascii_case("xmlhttprequest"))
    }

    pub fn renderer(&self) -> Option<&Arc<dyn TemplateRenderer>> {
        self.renderer.as_ref()
    }

    /// Binds a template renderer, replacing any previously bound one.
    pub fn bind_renderer(&mut self, renderer: Arc<dyn TemplateRenderer>) {
        self.renderer = Some(renderer);
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn TemplateRenderer>) -> Self {
        self.bind_renderer(renderer);
        self
    }
}

impl From<http::Request<Bytes>> for Request {
    fn from(req: http::Request<Bytes>) -> Self {
        Self::new(req)
    }
}
