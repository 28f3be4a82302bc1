//! The error boundary of a pipeline.
//!
//! [`ErrorTranslation`] sits around the rest of the pipeline and guarantees
//! that no [`PipelineFailure`] raised below it reaches the caller unconverted:
//!
//! 1. delegate to `next`; a successful response passes through untouched
//! 2. classify the failure: route miss → `404`, anything else → `500`
//! 3. negotiate a body format (JSON for AJAX, bound template, plain text)
//! 4. render and return the response
//!
//! Traces are only included when [`ErrorConfig::display`] is set.
//!
//! The one thing it does not contain is its own breakage: if the bound
//! template renderer fails, that new failure is returned to the caller. The
//! original failure is never re-raised.

use tracing::{error, info, warn};

use crate::config::ErrorConfig;
use crate::failure::{Classification, ClassifiedError, PipelineFailure, classify};
use crate::handler::{BoxFuture, HandlerResult};
use crate::middleware::{Middleware, Next};
use crate::render::ErrorFormat;
use crate::request::Request;
use crate::response::Response;

/// Translates pipeline failures into HTTP error responses.
///
/// ```rust
/// use backstop::middleware::{ErrorTranslation, Pipeline};
/// use backstop::{ErrorConfig, HandlerResult, PipelineFailure, Request, Response};
///
/// async fn app(req: Request) -> HandlerResult {
///     match req.path() {
///         "/" => Ok(Response::text("home")),
///         other => Err(PipelineFailure::route_not_found(format!("no route for {other}"))),
///     }
/// }
///
/// let pipeline = Pipeline::new(app).wrap(ErrorTranslation::new(ErrorConfig::default()));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct ErrorTranslation {
    config: ErrorConfig,
}

impl ErrorTranslation {
    /// Captures `config` for the lifetime of the middleware.
    pub fn new(config: ErrorConfig) -> Self {
        info!(
            reporting = config.reporting,
            display = config.display,
            "error translation configured"
        );
        Self { config }
    }

    pub fn config(&self) -> ErrorConfig {
        self.config
    }

    /// Converts one failure into a response in the given format.
    ///
    /// Returns `Err` only when rendering the error body itself fails.
    pub fn translate(&self, format: &ErrorFormat, failure: PipelineFailure) -> HandlerResult {
        let classified = classify(failure);
        self.report(&classified);

        let status = classified.status();
        let trace = if self.config.display { classified.failure.trace() } else { "" };

        let body = format.render(status, &classified.failure, trace)?;
        Ok(Response::builder().status(status).bytes(body.content_type, body.bytes))
    }

    fn report(&self, classified: &ClassifiedError) {
        if !self.config.reports(classified.class) {
            return;
        }
        let failure = &classified.failure;
        match classified.class {
            Classification::Internal => error!(
                status = classified.status().as_u16(),
                code = failure.code(),
                trace = failure.trace(),
                "request failed: {failure}"
            ),
            Classification::NotFound => warn!(
                status = classified.status().as_u16(),
                "route not found: {failure}"
            ),
        }
    }
}

impl Middleware for ErrorTranslation {
    fn handle(&self, req: Request, next: Next) -> BoxFuture<HandlerResult> {
        // `next` takes the request, so negotiate while we still have it.
        let format = ErrorFormat::negotiate(&req);
        let this = *self;
        Box::pin(async move {
            match next.run(req).await {
                Ok(response) => Ok(response),
                Err(failure) => this.translate(&format, failure),
            }
        })
    }
}
