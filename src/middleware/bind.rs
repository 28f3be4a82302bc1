use std::sync::Arc;

use crate::handler::{BoxFuture, HandlerResult};
use crate::middleware::{Middleware, Next};
use crate::render::TemplateRenderer;
use crate::request::Request;

/// Binds one shared [`TemplateRenderer`] to every request that passes through.
///
/// [`ErrorTranslation`](super::ErrorTranslation) negotiates from the request
/// as it arrives, so wrap this *before* it (further out) for error pages to
/// use the renderer.
pub struct BindRenderer {
    renderer: Arc<dyn TemplateRenderer>,
}

impl BindRenderer {
    pub fn new(renderer: impl TemplateRenderer) -> Self {
        Self { renderer: Arc::new(renderer) }
    }
}

impl Middleware for BindRenderer {
    fn handle(&self, mut req: Request, next: Next) -> BoxFuture<HandlerResult> {
        req.bind_renderer(Arc::clone(&self.renderer));
        next.run(req)
    }
}
