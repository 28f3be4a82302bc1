//! Handler trait and type erasure.
//!
//! # How async handlers are stored
//!
//! A [`Pipeline`](crate::middleware::Pipeline) ends in exactly one endpoint
//! handler, but every application's endpoint has a different concrete type.
//! We hide it behind a trait object (`dyn ErasedHandler`) so the pipeline can
//! hold any of them.
//!
//! ```text
//! async fn app(req: Request) -> HandlerResult { … }   ← user writes this
//!        ↓ Pipeline::new(app)
//! app.into_boxed_handler()                             ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(app))                             ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(req)  at request time                   ← one vtable dispatch
//!        ↓
//! Box::pin(async { app(req).await.into_outcome() })    ← BoxFuture
//! ```
//!
//! # Failing
//!
//! A handler fails by returning `Err(PipelineFailure)`. Anything convertible
//! into a [`PipelineFailure`] works as the error type, so `?` on an
//! `io::Error` inside a handler returning `Result<Response, PipelineFailure>`
//! just works.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http::StatusCode;

use crate::failure::PipelineFailure;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// What every stage of a pipeline produces: a response, or a failure for an
/// outer stage to deal with.
pub type HandlerResult = Result<Response, PipelineFailure>;

/// A heap-allocated, type-erased future.
///
/// `Send + 'static` let tokio move the future across threads safely.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

// ── Internal types ────────────────────────────────────────────────────────────

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture<HandlerResult>;
}

#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── IntoOutcome ───────────────────────────────────────────────────────────────

/// Conversion of a handler's return value into a [`HandlerResult`].
pub trait IntoOutcome {
    fn into_outcome(self) -> HandlerResult;
}

impl IntoOutcome for Response {
    fn into_outcome(self) -> HandlerResult { Ok(self) }
}

impl IntoOutcome for &'static str {
    fn into_outcome(self) -> HandlerResult { Ok(self.into_response()) }
}

impl IntoOutcome for String {
    fn into_outcome(self) -> HandlerResult { Ok(self.into_response()) }
}

impl IntoOutcome for StatusCode {
    fn into_outcome(self) -> HandlerResult { Ok(self.into_response()) }
}

impl<T, E> IntoOutcome for Result<T, E>
where
    T: IntoResponse,
    E: Into<PipelineFailure>,
{
    fn into_outcome(self) -> HandlerResult {
        self.map(IntoResponse::into_response).map_err(Into::into)
    }
}

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid endpoint handler.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` with the signature:
///
/// ```text
/// async fn name(req: Request) -> impl IntoOutcome
/// ```
///
/// The trait is **sealed** (via the private `Sealed` supertrait): only the
/// blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Newtype wrapper that holds a concrete handler `F` and implements
/// [`ErasedHandler`], bridging the typed world to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture<HandlerResult> {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_outcome() })
    }
}
