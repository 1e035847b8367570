use std::fmt;
use std::sync::Arc;

use crate::record::Properties;

/// A slide body that is produced by code rather than written as markup.
/// The function receives the slide's resolved properties.
#[derive(Clone)]
pub struct Renderer(Arc<dyn Fn(&Properties) -> String + Send + Sync>);

impl Renderer {
    pub fn new(render: impl Fn(&Properties) -> String + Send + Sync + 'static) -> Self {
        Renderer(Arc::new(render))
    }

    pub fn render(&self, properties: &Properties) -> String {
        (self.0)(properties)
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Renderer(..)")
    }
}

/// The body of a slide. Exactly one kind is populated; deck assembly never
/// looks inside, rendering dispatches on the kind.
#[derive(Debug, Clone)]
pub enum SlidePayload {
    /// Markdown source text.
    Markdown(String),
    /// Pre-rendered HTML.
    Html(String),
    /// Body produced on demand.
    Renderer(Renderer),
}

impl SlidePayload {
    /// The textual body, if this payload is markup.
    pub fn text(&self) -> Option<&str> {
        match self {
            SlidePayload::Markdown(text) | SlidePayload::Html(text) => Some(text),
            SlidePayload::Renderer(_) => None,
        }
    }

    pub fn text_mut(&mut self) -> Option<&mut String> {
        match self {
            SlidePayload::Markdown(text) | SlidePayload::Html(text) => Some(text),
            SlidePayload::Renderer(_) => None,
        }
    }

    /// Produce the body as a string, invoking the renderer when there is one.
    pub fn render(&self, properties: &Properties) -> String {
        match self {
            SlidePayload::Markdown(text) | SlidePayload::Html(text) => text.clone(),
            SlidePayload::Renderer(renderer) => renderer.render(properties),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SlidePayload::Markdown(_) => "markdown",
            SlidePayload::Html(_) => "html",
            SlidePayload::Renderer(_) => "renderer",
        }
    }
}

impl Default for SlidePayload {
    fn default() -> Self {
        SlidePayload::Markdown(String::new())
    }
}
