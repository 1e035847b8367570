pub mod payload;
pub mod properties;

use std::collections::BTreeMap;
use std::ops::Range;

pub use payload::{Renderer, SlidePayload};
pub use properties::Properties;

/// One slide definition as produced by the parser, before deck assembly.
/// Records are never mutated once built; assembly derives everything it
/// needs into its own entities.
#[derive(Debug, Clone)]
pub struct RawSlideRecord {
    /// Free-form `key: value` properties (`name`, `template`, `layout`, ...).
    pub properties: Properties,
    /// Slide body.
    pub payload: SlidePayload,
    /// Presenter notes (the text after a `???` line).
    pub notes: String,
    /// Link reference definitions scoped to this slide: id → URL.
    pub links: BTreeMap<String, String>,
    /// Byte span in source for error reporting. Empty for records built in code.
    pub span: Range<usize>,
}

impl RawSlideRecord {
    pub fn new(payload: SlidePayload) -> Self {
        RawSlideRecord {
            properties: Properties::new(),
            payload,
            notes: String::new(),
            links: BTreeMap::new(),
            span: 0..0,
        }
    }

    pub fn markdown(content: impl Into<String>) -> Self {
        Self::new(SlidePayload::Markdown(content.into()))
    }

    pub fn html(markup: impl Into<String>) -> Self {
        Self::new(SlidePayload::Html(markup.into()))
    }

    pub fn rendered(renderer: Renderer) -> Self {
        Self::new(SlidePayload::Renderer(renderer))
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key, value);
        self
    }

    pub fn with_link(mut self, id: impl Into<String>, url: impl Into<String>) -> Self {
        self.links.insert(id.into(), url.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Shorthand for `properties.get(key)`.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key)
    }
}
