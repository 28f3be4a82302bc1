//! Minimal backstop example: one endpoint behind an error boundary, with a toy renderer.
//!
//! Run with:
//!   RUST_LOG=info ERROR_DISPLAY=on cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/
//!   curl -i http://localhost:3000/nope
//!   curl -i http://localhost:3000/boom
//!   curl -i -H 'X-Requested-With: XMLHttpRequest' http://localhost:3000/boom
//!   curl -i -H 'Accept: text/html' http://localhost:3000/nope

use backstop::middleware::{BindRenderer, ErrorTranslation, Middleware, Next, Pipeline};
use backstop::{
    BoxFuture, ErrorConfig, ErrorPage, HandlerResult, PipelineFailure, RenderError, Request,
    Response, Server, TemplateRenderer,
};

#[tokio::main]
async fn main() -> Result<(), backstop::Error> {
    tracing_subscriber::fmt::init();

    let config = ErrorConfig::from_env()?;

    let app = Pipeline::new(app)
        .wrap(HtmlOnly(BindRenderer::new(InlinePages)))
        .wrap(ErrorTranslation::new(config));

    Server::bind("0.0.0.0:3000")?.serve(app).await
}

// GET /      → 200
// GET /boom  → handler failure, 500
// GET /*     → route miss, 404
async fn app(req: Request) -> HandlerResult {
    match req.path() {
        "/" => Ok(Response::text("hello")),
        "/boom" => Err(PipelineFailure::internal("the widget store is unreachable")
            .with_code(1042)
            .with_trace("at widgets::load\nat app")),
        other => Err(PipelineFailure::route_not_found(format!("no route for {other}"))),
    }
}

/// Binds the renderer only for browsers that asked for HTML.
struct HtmlOnly(BindRenderer);

impl Middleware for HtmlOnly {
    fn handle(&self, req: Request, next: Next) -> BoxFuture<HandlerResult> {
        let wants_html = req.header("accept").is_some_and(|v| v.contains("text/html"));
        if wants_html {
            self.0.handle(req, next)
        } else {
            next.run(req)
        }
    }
}

/// Stand-in for a real template engine.
struct InlinePages;

impl TemplateRenderer for InlinePages {
    fn render(&self, name: &str, page: &ErrorPage<'_>) -> Result<Vec<u8>, RenderError> {
        let title = match name {
            "error-404" => "Page not found",
            "error-500" => "Something went wrong",
            _ => return Err(RenderError::NotFound { name: name.to_owned() }),
        };
        Ok(format!(
            "<!doctype html><title>{title}</title><h1>{}: {title}</h1><pre>{}</pre>",
            page.status, page.detail
        )
        .into_bytes())
    }
}
