//! Pipeline failures and their classification.
//!
//! A handler that cannot produce a response returns a [`PipelineFailure`]
//! instead. The failure travels back up the pipeline until a middleware such
//! as [`ErrorTranslation`](crate::middleware::ErrorTranslation) turns it into
//! a [`Response`](crate::Response).
//!
//! ```text
//! handler ── Err(PipelineFailure) ──▶ classify() ──▶ ClassifiedError
//!                                                     ├─ NotFound  → 404
//!                                                     └─ Internal  → 500
//! ```

use std::error::Error as StdError;
use std::fmt::Write as _;
use std::panic::Location;

use http::StatusCode;
use thiserror::Error;

use crate::render::RenderError;

// ── FailureKind ───────────────────────────────────────────────────────────────

/// The kind a failure is declared with when it is raised.
///
/// Classification looks at nothing else: not the message, not the code.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FailureKind {
    /// Nothing in the pipeline answers for the requested path.
    RouteNotFound,
    /// Everything else.
    Internal,
}

// ── PipelineFailure ───────────────────────────────────────────────────────────

/// A failure raised by a handler or middleware while processing one request.
///
/// Carries a human-readable message, a numeric code (`0` unless set) and a
/// diagnostic trace. The trace starts out as the source location the failure
/// was built at, followed by the error's `source()` chain when there is one;
/// [`with_trace`](PipelineFailure::with_trace) replaces it. It is only ever
/// shown to clients when [`ErrorConfig::display`](crate::ErrorConfig) is
/// enabled.
///
/// ```rust
/// use backstop::{FailureKind, PipelineFailure};
///
/// let failure = PipelineFailure::internal("database unavailable")
///     .with_code(1049)
///     .with_trace("at repo::load_user\nat handler::get_user");
///
/// assert_eq!(failure.kind(), FailureKind::Internal);
/// assert_eq!(failure.code(), 1049);
/// ```
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{message}")]
pub struct PipelineFailure {
    kind: FailureKind,
    message: String,
    code: i64,
    trace: String,
}

impl PipelineFailure {
    #[track_caller]
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), code: 0, trace: origin(Location::caller()) }
    }

    /// A routing miss. Translated to `404 Not Found`.
    #[track_caller]
    pub fn route_not_found(message: impl Into<String>) -> Self {
        Self::new(FailureKind::RouteNotFound, message)
    }

    /// Any other failure. Translated to `500 Internal Server Error`.
    #[track_caller]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Internal, message)
    }

    /// Wraps an arbitrary error as an [`FailureKind::Internal`] failure.
    ///
    /// The message is the error's `Display` output. The trace is the call
    /// site followed by the `source()` chain, one `caused by:` line per link.
    #[track_caller]
    pub fn from_error(err: &(dyn StdError + 'static)) -> Self {
        let mut trace = origin(Location::caller());
        let mut source = err.source();
        while let Some(cause) = source {
            // Writing into a String cannot fail.
            let _ = write!(trace, "\ncaused by: {cause}");
            source = cause.source();
        }
        Self { kind: FailureKind::Internal, message: err.to_string(), code: 0, trace }
    }

    pub fn with_code(mut self, code: i64) -> Self {
        self.code = code;
        self
    }

    /// Replaces the recorded trace, e.g. with a captured backtrace.
    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = trace.into();
        self
    }

    pub fn kind(&self) -> FailureKind { self.kind }
    pub fn message(&self) -> &str { &self.message }
    pub fn code(&self) -> i64 { self.code }
    pub fn trace(&self) -> &str { &self.trace }
}

/// `at src/handlers.rs:42:17`
fn origin(location: &Location<'_>) -> String {
    format!("at {}:{}:{}", location.file(), location.line(), location.column())
}

impl From<std::io::Error> for PipelineFailure {
    #[track_caller]
    fn from(e: std::io::Error) -> Self { Self::from_error(&e) }
}

impl From<hyper::Error> for PipelineFailure {
    #[track_caller]
    fn from(e: hyper::Error) -> Self { Self::from_error(&e) }
}

impl From<serde_json::Error> for PipelineFailure {
    #[track_caller]
    fn from(e: serde_json::Error) -> Self { Self::from_error(&e) }
}

impl From<RenderError> for PipelineFailure {
    #[track_caller]
    fn from(e: RenderError) -> Self { Self::from_error(&e) }
}

// ── Classification ────────────────────────────────────────────────────────────

/// The two outcomes of [`classify`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Classification {
    NotFound,
    Internal,
}

impl Classification {
    /// The HTTP status this class of failure is answered with.
    pub fn status(self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A failure together with its classification.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClassifiedError {
    pub class: Classification,
    pub failure: PipelineFailure,
}

impl ClassifiedError {
    pub fn status(&self) -> StatusCode {
        self.class.status()
    }
}

/// Classifies a failure by its declared kind alone.
pub fn classify(failure: PipelineFailure) -> ClassifiedError {
    let class = match failure.kind() {
        FailureKind::RouteNotFound => Classification::NotFound,
        FailureKind::Internal => Classification::Internal,
    };
    ClassifiedError { class, failure }
}
