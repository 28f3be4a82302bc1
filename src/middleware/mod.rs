//! Middleware layer.
//!
//! Middleware wraps the rest of the pipeline: it sees every request on the
//! way in and every [`HandlerResult`] on the way out, and may short-circuit
//! either. It is the right place for cross-cutting concerns.
//!
//! ```text
//! Pipeline::new(app).wrap(BindRenderer::new(r)).wrap(ErrorTranslation::new(cfg))
//!
//!   request ─▶ BindRenderer ─▶ ErrorTranslation ─▶ app
//!   result  ◀─ BindRenderer ◀─ ErrorTranslation ◀─ app
//! ```
//!
//! The first middleware wrapped is the outermost one.
//!
//! Built-in middleware:
//! - [`ErrorTranslation`]: turns failures into 404/500 responses
//! - [`BindRenderer`]: binds a [`TemplateRenderer`](crate::TemplateRenderer) to every request

mod bind;
mod errors;

use std::fmt;
use std::sync::Arc;

use crate::handler::{BoxFuture, BoxedHandler, Handler, HandlerResult};
use crate::request::Request;

pub use bind::BindRenderer;
pub use errors::ErrorTranslation;

/// A pipeline stage that wraps the remaining chain.
///
/// ```rust
/// use backstop::middleware::{Middleware, Next};
/// use backstop::{BoxFuture, HandlerResult, Request};
///
/// struct Logging;
///
/// impl Middleware for Logging {
///     fn handle(&self, req: Request, next: Next) -> BoxFuture<HandlerResult> {
///         let path = req.path().to_owned();
///         Box::pin(async move {
///             let result = next.run(req).await;
///             tracing::info!(%path, ok = result.is_ok(), "handled");
///             result
///         })
///     }
/// }
/// ```
pub trait Middleware: Send + Sync + 'static {
    fn handle(&self, req: Request, next: Next) -> BoxFuture<HandlerResult>;
}

/// The middleware stack and the endpoint it wraps, shared by every request.
#[derive(Clone)]
struct Chain {
    layers: Vec<Arc<dyn Middleware>>,
    endpoint: BoxedHandler,
}

/// The rest of the pipeline, as seen from one middleware.
///
/// Consumed by [`Next::run`], so a middleware delegates at most once.
pub struct Next {
    chain: Arc<Chain>,
    index: usize,
}

impl Next {
    /// Runs the next middleware, or the endpoint once none remain.
    pub fn run(self, req: Request) -> BoxFuture<HandlerResult> {
        let Some(layer) = self.chain.layers.get(self.index).cloned() else {
            return self.chain.endpoint.call(req);
        };
        layer.handle(req, Next { chain: self.chain, index: self.index + 1 })
    }
}

/// An endpoint handler wrapped in zero or more middleware.
///
/// Build it once at startup and pass it to
/// [`Server::serve`](crate::Server::serve). Cloning is one `Arc` increment.
#[derive(Clone)]
pub struct Pipeline {
    chain: Arc<Chain>,
}

impl Pipeline {
    pub fn new(endpoint: impl Handler) -> Self {
        Self {
            chain: Arc::new(Chain { layers: Vec::new(), endpoint: endpoint.into_boxed_handler() }),
        }
    }

    /// Adds `middleware` inside every middleware added before it.
    pub fn wrap(mut self, middleware: impl Middleware) -> Self {
        Arc::make_mut(&mut self.chain).layers.push(Arc::new(middleware));
        self
    }

    /// Runs `req` through the whole pipeline.
    pub fn call(&self, req: Request) -> BoxFuture<HandlerResult> {
        Next { chain: Arc::clone(&self.chain), index: 0 }.run(req)
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("layers", &self.chain.layers.len())
            .finish_non_exhaustive()
    }
}
