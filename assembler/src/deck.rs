use std::collections::{BTreeMap, HashMap};

use crate::entity::{EntityId, SlideEntity};

/// An assembled deck: the displayable slides in order, plus lookup indices
/// built once during assembly.
///
/// Entities for layout and excluded records are kept too, so that template
/// references stay resolvable, but they never appear in the slide order or
/// the public indices.
#[derive(Debug, Clone, Default)]
pub struct Deck {
    /// Every scanned record's entity, indexed by [`EntityId`].
    entities: Vec<SlideEntity>,
    /// Included, non-layout entities in display order.
    order: Vec<EntityId>,
    by_name: HashMap<String, EntityId>,
    /// Display number → slides sharing it. Number 0 (no counted slide yet)
    /// is not a bucket.
    by_number: BTreeMap<usize, Vec<EntityId>>,
    links: BTreeMap<String, String>,
}

impl Deck {
    pub fn empty() -> Self {
        Deck::default()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn slide_count(&self) -> usize {
        self.order.len()
    }

    /// Slide at a 0-based position in display order.
    pub fn slide(&self, position: usize) -> Option<&SlideEntity> {
        self.order.get(position).map(|&id| &self.entities[id])
    }

    pub fn slides(&self) -> impl Iterator<Item = &SlideEntity> + '_ {
        self.order.iter().map(|&id| &self.entities[id])
    }

    pub fn slide_by_name(&self, name: &str) -> Option<&SlideEntity> {
        self.by_name.get(name).map(|&id| &self.entities[id])
    }

    /// Slides sharing a display number, in order. Empty if there are none.
    pub fn slides_by_number(&self, number: usize) -> Vec<&SlideEntity> {
        self.by_number
            .get(&number)
            .map(|ids| ids.iter().map(|&id| &self.entities[id]).collect())
            .unwrap_or_default()
    }

    /// The distinct display numbers in use, ascending.
    pub fn numbers(&self) -> impl Iterator<Item = usize> + '_ {
        self.by_number.keys().copied()
    }

    /// Link id → URL over all slides; later slides win on a shared id.
    pub fn links(&self) -> &BTreeMap<String, String> {
        &self.links
    }

    /// Any scanned entity, including layouts and excluded slides.
    pub fn entity(&self, id: EntityId) -> Option<&SlideEntity> {
        self.entities.get(id)
    }

    pub fn entities(&self) -> &[SlideEntity] {
        &self.entities
    }

    pub fn template_of(&self, slide: &SlideEntity) -> Option<&SlideEntity> {
        slide.template().and_then(|id| self.entity(id))
    }

    pub(crate) fn next_id(&self) -> EntityId {
        self.entities.len()
    }

    pub(crate) fn push(&mut self, entity: SlideEntity) {
        let id = entity.id();
        debug_assert_eq!(id, self.entities.len());

        if entity.is_included() && !entity.is_layout() {
            self.order.push(id);
            if entity.display_number() > 0 {
                self.by_number
                    .entry(entity.display_number())
                    .or_default()
                    .push(id);
            }
            if let Some(name) = entity.name() {
                self.by_name.insert(name.to_string(), id);
            }
        }

        self.entities.push(entity);
    }

    /// Expand variables in every displayed slide, then fold their links.
    pub(crate) fn finish(&mut self, macros: &BTreeMap<String, String>) {
        for &id in &self.order {
            self.entities[id].expand_variables(macros);
        }
        for &id in &self.order {
            for (link, url) in self.entities[id].links() {
                self.links.insert(link.clone(), url.clone());
            }
        }
    }
}
