use std::collections::HashMap;

use slidemark::RawSlideRecord;
use tracing::debug;

use crate::config::DeckOptions;
use crate::deck::Deck;
use crate::entity::{EntityId, Placement, SlideEntity};
use crate::resolver::{ScanContext, is_count_suppressed, resolve_template};

/// Builds a [`Deck`] from raw records in a single forward scan.
pub struct DeckAssembler<'a> {
    options: &'a DeckOptions,
}

/// Everything the scan carries from one record to the next.
#[derive(Default)]
struct ScanState {
    counter: usize,
    /// Every named entity so far, for `template:` lookups.
    names: HashMap<String, EntityId>,
    active_layout: Option<EntityId>,
    /// Last non-layout entity, included or not. Continuations extend it.
    last_slide: Option<EntityId>,
    deck: Deck,
}

impl<'a> DeckAssembler<'a> {
    pub fn new(options: &'a DeckOptions) -> Self {
        DeckAssembler { options }
    }

    pub fn assemble(&self, records: &[RawSlideRecord]) -> Deck {
        let mut scan = ScanState::default();
        for (position, record) in records.iter().enumerate() {
            self.step(&mut scan, position, record);
        }

        let mut deck = scan.deck;
        deck.finish(&self.options.macros);
        debug!(
            records = records.len(),
            slides = deck.slide_count(),
            "assembled deck"
        );
        deck
    }

    fn step(&self, scan: &mut ScanState, position: usize, record: &RawSlideRecord) {
        let included = self.is_included(record);
        let id = scan.deck.next_id();

        let context = ScanContext {
            position,
            previous: scan.last_slide,
            names: &scan.names,
        };
        let resolution = resolve_template(record, &context, &mut scan.active_layout);

        let is_layout = record.properties.is("layout", "true");
        let suppressed = is_count_suppressed(record, self.options.count_incremental_slides);
        if included && !is_layout && !suppressed {
            scan.counter += 1;
        }

        let placement = Placement {
            id,
            sequence_index: scan.deck.slide_count(),
            display_number: scan.counter,
            is_layout,
            included,
        };
        let template = resolution.template.and_then(|t| scan.deck.entity(t));
        let entity = SlideEntity::build(record, placement, template);

        debug!(
            position,
            number = scan.counter,
            rule = ?resolution.rule,
            template = ?resolution.template,
            included,
            is_layout,
            "resolved slide"
        );

        if let Some(name) = record.property("name") {
            scan.names.insert(name.to_string(), id);
        }
        scan.deck.push(entity);
        if is_layout {
            scan.active_layout = Some(id);
        } else {
            scan.last_slide = Some(id);
        }
    }

    /// A record is included unless one of its classes is excluded.
    fn is_included(&self, record: &RawSlideRecord) -> bool {
        record
            .property("class")
            .is_none_or(|classes| !split_classes(classes).any(|c| self.options.is_excluded(c)))
    }
}

/// Split a `class` property on commas and whitespace.
pub fn split_classes(classes: &str) -> impl Iterator<Item = &str> {
    classes
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|class| !class.is_empty())
}
