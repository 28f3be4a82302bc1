//! Shared fixtures for the integration tests.
//!
//! Each file under `tests/` is its own crate, so helpers used by only one of
//! them would warn as dead code in the others.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use backstop::{
    ErrorPage, Handler, PipelineFailure, RenderError, Request, Response, TemplateRenderer,
};
use bytes::Bytes;

pub fn get(path: &str) -> Request {
    Request::new(http::Request::builder().uri(path).body(Bytes::new()).unwrap())
}

pub fn ajax(path: &str) -> Request {
    with_header(path, "X-Requested-With", "XMLHttpRequest")
}

pub fn with_header(path: &str, name: &str, value: &str) -> Request {
    Request::new(
        http::Request::builder()
            .uri(path)
            .header(name, value)
            .body(Bytes::new())
            .unwrap(),
    )
}

/// An endpoint that fails every request with a copy of `failure`.
pub fn failing_with(failure: PipelineFailure) -> impl Handler {
    move |_req: Request| {
        let failure = failure.clone();
        async move { Err::<Response, _>(failure) }
    }
}

/// One call into [`RecordingRenderer`].
#[derive(Clone, Debug, PartialEq)]
pub struct RenderCall {
    pub name: String,
    pub status: u16,
    pub message: String,
    pub trace: String,
    pub detail: String,
}

/// Renders a tiny HTML page and remembers what it was asked for.
#[derive(Clone, Default)]
pub struct RecordingRenderer {
    pub calls: Arc<Mutex<Vec<RenderCall>>>,
}

impl RecordingRenderer {
    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl TemplateRenderer for RecordingRenderer {
    fn render(&self, name: &str, page: &ErrorPage<'_>) -> Result<Vec<u8>, RenderError> {
        self.calls.lock().unwrap().push(RenderCall {
            name: name.to_owned(),
            status: page.status,
            message: page.message.to_owned(),
            trace: page.trace.to_owned(),
            detail: page.detail.clone(),
        });
        Ok(format!("<h1>{}</h1><pre>{}</pre>", page.status, page.detail).into_bytes())
    }
}

/// A renderer whose templates are all missing.
pub struct BrokenRenderer;

impl TemplateRenderer for BrokenRenderer {
    fn render(&self, name: &str, _page: &ErrorPage<'_>) -> Result<Vec<u8>, RenderError> {
        Err(RenderError::NotFound { name: name.to_owned() })
    }
}
