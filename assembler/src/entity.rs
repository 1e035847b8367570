use std::collections::BTreeMap;

use slidemark::{Properties, RawSlideRecord, SlidePayload};

use crate::expand;

/// Position of an entity among every record scanned for a deck, layouts and
/// excluded slides included. Valid only for the deck that produced it.
pub type EntityId = usize;

/// Properties a slide never takes from its template.
const NOT_INHERITED: &[&str] = &["name", "layout", "count"];

/// The resolved view of one slide record.
///
/// Inheritance from the template is materialised when the entity is built:
/// properties, body and notes already include what the template contributes.
#[derive(Debug, Clone)]
pub struct SlideEntity {
    id: EntityId,
    sequence_index: usize,
    display_number: usize,
    template: Option<EntityId>,
    is_layout: bool,
    included: bool,
    properties: Properties,
    payload: SlidePayload,
    notes: String,
    links: BTreeMap<String, String>,
}

/// Where the assembler placed a record.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Placement {
    pub id: EntityId,
    pub sequence_index: usize,
    pub display_number: usize,
    pub is_layout: bool,
    pub included: bool,
}

impl SlideEntity {
    pub(crate) fn build(
        record: &RawSlideRecord,
        placement: Placement,
        template: Option<&SlideEntity>,
    ) -> Self {
        let mut entity = SlideEntity {
            id: placement.id,
            sequence_index: placement.sequence_index,
            display_number: placement.display_number,
            template: template.map(|t| t.id),
            is_layout: placement.is_layout,
            included: placement.included,
            properties: record.properties.clone(),
            payload: record.payload.clone(),
            notes: record.notes.clone(),
            links: record.links.clone(),
        };
        if let Some(template) = template {
            entity.inherit(template);
        }
        entity
    }

    fn inherit(&mut self, template: &SlideEntity) {
        for (key, value) in template.properties.iter() {
            if NOT_INHERITED.contains(&key) {
                continue;
            }
            if key == "class" {
                let merged = match self.properties.get("class") {
                    Some(own) => format!("{}, {}", value, own),
                    None => value.to_string(),
                };
                self.properties.insert("class", merged);
            } else if !self.properties.contains(key) {
                self.properties.insert(key, value);
            }
        }

        if let (Some(base), Some(own)) = (template.payload.text(), self.payload.text_mut()) {
            *own = expand::inherit_content(base, own);
        }

        if !template.notes.is_empty() {
            self.notes = if self.notes.is_empty() {
                template.notes.clone()
            } else {
                format!("{}\n\n{}", template.notes, self.notes)
            };
        }
    }

    /// Expand `{{ variables }}` and `![:macros]` in body, notes and link URLs.
    pub(crate) fn expand_variables(&mut self, macros: &BTreeMap<String, String>) {
        if let Some(text) = self.payload.text_mut() {
            *text = expand::expand(text, &self.properties, macros);
        }
        self.notes = expand::expand(&self.notes, &self.properties, macros);
        for url in self.links.values_mut() {
            *url = expand::expand(url, &self.properties, macros);
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    /// 0-based position in the deck's slide order at the time this entity
    /// was built.
    pub fn sequence_index(&self) -> usize {
        self.sequence_index
    }

    /// The slide number shown to the audience; 0 if no slide so far has
    /// advanced the counter.
    pub fn display_number(&self) -> usize {
        self.display_number
    }

    /// The entity this one inherits from. Look it up with
    /// [`Deck::entity`](crate::Deck::entity).
    pub fn template(&self) -> Option<EntityId> {
        self.template
    }

    pub fn is_layout(&self) -> bool {
        self.is_layout
    }

    pub fn is_included(&self) -> bool {
        self.included
    }

    pub fn name(&self) -> Option<&str> {
        self.properties.get("name")
    }

    /// Own properties merged with inherited ones.
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn payload(&self) -> &SlidePayload {
        &self.payload
    }

    /// The markup body, or `None` for rendered slides.
    pub fn content(&self) -> Option<&str> {
        self.payload.text()
    }

    /// The body as text, invoking the renderer if the slide has one.
    pub fn render(&self) -> String {
        self.payload.render(&self.properties)
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn links(&self) -> &BTreeMap<String, String> {
        &self.links
    }
}
