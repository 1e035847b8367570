//! Template precedence for one record in scan order.
//!
//! Rules are tried in order and the first match wins:
//!
//! 1. `continued: true` (not the first record): the last non-layout entity
//!    built before it.
//! 2. `template: <name>` naming an entity already seen.
//! 3. `layout: false`: no template, and the active layout is dropped.
//! 4. An active layout exists and the record is not itself a layout: that layout.
//! 5. Otherwise no template.
//!
//! Flags match only the exact strings `"true"` and `"false"`.

use std::collections::HashMap;

use slidemark::RawSlideRecord;

use crate::entity::EntityId;

/// Which rule produced a [`Resolution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateRule {
    Continuation,
    Named,
    LayoutCleared,
    ActiveLayout,
    Unresolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub template: Option<EntityId>,
    pub rule: TemplateRule,
}

impl Resolution {
    fn to(template: EntityId, rule: TemplateRule) -> Self {
        Resolution {
            template: Some(template),
            rule,
        }
    }

    fn none(rule: TemplateRule) -> Self {
        Resolution {
            template: None,
            rule,
        }
    }
}

/// What the resolver may see of the scan so far.
#[derive(Debug, Clone, Copy)]
pub struct ScanContext<'a> {
    /// Index of the record in the input sequence.
    pub position: usize,
    /// The last non-layout entity built so far, whatever its inclusion.
    pub previous: Option<EntityId>,
    /// Every named entity seen so far, layouts and excluded slides included.
    pub names: &'a HashMap<String, EntityId>,
}

/// Decide the template for `record`. Rule 3 clears `active_layout`.
///
/// Installing a `layout: true` record as the new active layout is the
/// caller's job, once the entity exists.
pub fn resolve_template(
    record: &RawSlideRecord,
    scan: &ScanContext<'_>,
    active_layout: &mut Option<EntityId>,
) -> Resolution {
    let properties = &record.properties;

    if properties.is("continued", "true") && scan.position > 0 {
        if let Some(previous) = scan.previous {
            return Resolution::to(previous, TemplateRule::Continuation);
        }
    }

    if let Some(named) = properties.get("template").and_then(|name| scan.names.get(name)) {
        return Resolution::to(*named, TemplateRule::Named);
    }

    if properties.is("layout", "false") {
        *active_layout = None;
        return Resolution::none(TemplateRule::LayoutCleared);
    }

    match *active_layout {
        Some(layout) if !properties.is("layout", "true") => {
            Resolution::to(layout, TemplateRule::ActiveLayout)
        }
        _ => Resolution::none(TemplateRule::Unresolved),
    }
}

/// Whether `record` is barred from advancing the slide counter.
///
/// Besides an explicit `count: false`, a continuation is suppressed when
/// incremental slides are not counted, but only if it declares no `count`
/// at all; an empty or other `count` value leaves it counting.
pub fn is_count_suppressed(record: &RawSlideRecord, count_incremental_slides: bool) -> bool {
    let properties = &record.properties;
    if properties.is("count", "false") {
        return true;
    }
    properties.is("continued", "true")
        && !count_incremental_slides
        && !properties.contains("count")
}
