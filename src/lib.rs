//! # backstop
//!
//! An error boundary for HTTP request pipelines. Whatever fails below it,
//! the client still gets an answer.
//!
//! ## The contract
//!
//! Handlers fail by returning a [`PipelineFailure`]. The
//! [`ErrorTranslation`](middleware::ErrorTranslation) middleware catches every
//! one of them and answers with:
//!
//! - **404** when the failure is a route miss ([`FailureKind::RouteNotFound`])
//! - **500** for everything else
//!
//! in whichever format the caller can use:
//!
//! - **JSON** `{"message","code","trace"}` for AJAX requests (`X-Requested-With: XMLHttpRequest`)
//! - **HTML** from a bound [`TemplateRenderer`] (templates `error-404`, `error-500`)
//! - **plain text** otherwise
//!
//! Traces stay server-side unless [`ErrorConfig::display`] is switched on.
//!
//! What backstop intentionally leaves to you: routing, the template engine,
//! configuration files. Bring your own; the interfaces are one function wide.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use backstop::middleware::{ErrorTranslation, Pipeline};
//! use backstop::{ErrorConfig, HandlerResult, PipelineFailure, Request, Response, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), backstop::Error> {
//!     let config = ErrorConfig::from_env()?;
//!     let app = Pipeline::new(app).wrap(ErrorTranslation::new(config));
//!
//!     Server::bind("0.0.0.0:3000")?.serve(app).await
//! }
//!
//! async fn app(req: Request) -> HandlerResult {
//!     match req.path() {
//!         "/" => Ok(Response::text("hello")),
//!         "/boom" => Err(PipelineFailure::internal("something broke").with_code(42)),
//!         other => Err(PipelineFailure::route_not_found(format!("no route for {other}"))),
//!     }
//! }
//! ```

mod config;
mod error;
mod failure;
mod handler;
mod render;
mod request;
mod response;
mod server;

pub mod middleware;

pub use config::{ConfigError, DISPLAY_KEY, ErrorConfig, REPORTING_KEY};
pub use error::Error;
pub use failure::{Classification, ClassifiedError, FailureKind, PipelineFailure, classify};
pub use handler::{BoxFuture, Handler, HandlerResult, IntoOutcome};
pub use http::{Method, StatusCode};
pub use render::{
    ErrorFormat, ErrorPage, RenderError, RenderedErrorBody, TemplateRenderer, template_name,
};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use server::Server;
