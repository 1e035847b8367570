use std::collections::BTreeMap;

use assembler::{Deck, DeckAssembler, DeckOptions};
use slidemark::parser::Parser;
use slidemark::{RawSlideRecord, Renderer};

fn record(pairs: &[(&str, &str)]) -> RawSlideRecord {
    pairs
        .iter()
        .fold(RawSlideRecord::markdown(""), |r, (k, v)| r.with_property(*k, *v))
}

fn assemble(records: &[RawSlideRecord]) -> Deck {
    assemble_with(records, &DeckOptions::default())
}

fn assemble_with(records: &[RawSlideRecord], options: &DeckOptions) -> Deck {
    DeckAssembler::new(options).assemble(records)
}

fn assemble_markdown(source: &str, options: &DeckOptions) -> Deck {
    let parsed = Parser::new(source, 0).parse().expect("parse failed");
    assemble_with(&parsed.records, options)
}

fn excluding(classes: &[&str]) -> DeckOptions {
    DeckOptions {
        excluded_classes: classes.iter().map(|c| c.to_string()).collect(),
        ..DeckOptions::default()
    }
}

fn without_incremental_count() -> DeckOptions {
    DeckOptions {
        count_incremental_slides: false,
        ..DeckOptions::default()
    }
}

fn numbers(deck: &Deck) -> Vec<usize> {
    deck.slides().map(|s| s.display_number()).collect()
}

fn content(deck: &Deck, position: usize) -> String {
    deck.slide(position)
        .and_then(|s| s.content())
        .expect("slide with markup")
        .to_string()
}

// ---------------------------------------------------------------------------
// Order and numbering
// ---------------------------------------------------------------------------

#[test]
fn empty_input_gives_empty_deck() {
    let deck = assemble(&[]);
    assert!(deck.is_empty());
    assert_eq!(deck.slide_count(), 0);
    assert!(deck.slide(0).is_none());
    assert!(deck.links().is_empty());
    assert!(deck.slides_by_number(1).is_empty());
}

#[test]
fn plain_slides_number_from_one() {
    let deck = assemble(&[record(&[]), record(&[]), record(&[])]);
    assert_eq!(numbers(&deck), vec![1, 2, 3]);
    let positions: Vec<usize> = deck.slides().map(|s| s.sequence_index()).collect();
    assert_eq!(positions, vec![0, 1, 2]);
}

#[test]
fn continuation_counts_when_incremental_slides_count() {
    let records = [record(&[]), record(&[("continued", "true")]), record(&[])];
    assert_eq!(numbers(&assemble(&records)), vec![1, 2, 3]);
}

#[test]
fn continuation_shares_number_when_incremental_slides_do_not_count() {
    let records = [record(&[]), record(&[("continued", "true")]), record(&[])];
    let deck = assemble_with(&records, &without_incremental_count());
    assert_eq!(numbers(&deck), vec![1, 1, 2]);

    let shared = deck.slides_by_number(1);
    assert_eq!(shared.len(), 2);
    assert_eq!(shared[1].template(), Some(shared[0].id()));
}

#[test]
fn explicit_count_on_continuation_disables_suppression() {
    let options = without_incremental_count();

    let empty = [record(&[]), record(&[("continued", "true"), ("count", "")])];
    assert_eq!(numbers(&assemble_with(&empty, &options)), vec![1, 2]);

    let truthy = [record(&[]), record(&[("continued", "true"), ("count", "true")])];
    assert_eq!(numbers(&assemble_with(&truthy, &options)), vec![1, 2]);

    let counted_false = [record(&[]), record(&[("continued", "true"), ("count", "false")])];
    assert_eq!(numbers(&assemble(&counted_false)), vec![1, 1]);
}

#[test]
fn uncounted_slides_have_no_number_bucket() {
    let deck = assemble(&[record(&[("count", "false")]), record(&[])]);
    assert_eq!(numbers(&deck), vec![0, 1]);
    assert_eq!(deck.slide_count(), 2);
    assert!(deck.slides_by_number(0).is_empty());
    assert_eq!(deck.numbers().collect::<Vec<_>>(), vec![1]);
}

#[test]
fn numbers_increase_exactly_at_counted_slides() {
    let records = [
        record(&[("layout", "true"), ("name", "base")]),
        record(&[]),
        record(&[("continued", "true")]),
        record(&[("class", "draft")]),
        record(&[("count", "false")]),
        record(&[("template", "base")]),
        record(&[("continued", "true"), ("count", "")]),
        record(&[("layout", "false")]),
    ];
    let options = DeckOptions {
        count_incremental_slides: false,
        ..excluding(&["draft"])
    };
    let deck = assemble_with(&records, &options);

    assert_eq!(numbers(&deck), vec![1, 1, 1, 2, 3, 4]);
    let counted = [true, false, false, true, true, true];
    for (i, pair) in numbers(&deck).windows(2).enumerate() {
        assert!(pair[0] <= pair[1]);
        assert_eq!(pair[1] > pair[0], counted[i + 1], "slide {}", i + 1);
    }
}

#[test]
fn order_holds_only_included_non_layout_slides() {
    let records = [
        record(&[("layout", "true")]),
        record(&[("class", "a")]),
        record(&[("class", "b c")]),
        record(&[("class", "c,d")]),
        record(&[]),
    ];
    let deck = assemble_with(&records, &excluding(&["c"]));
    assert_eq!(deck.slide_count(), 2);
    assert_eq!(deck.entities().len(), 5);
    let expected = deck
        .entities()
        .iter()
        .filter(|e| e.is_included() && !e.is_layout())
        .count();
    assert_eq!(deck.slide_count(), expected);
    assert_eq!(deck.slide(1).map(|s| s.id()), Some(4));
}

#[test]
fn sequence_index_counts_deck_order_only() {
    let records = [
        record(&[("layout", "true")]),
        record(&[]),
        record(&[("class", "skip")]),
        record(&[]),
    ];
    let deck = assemble_with(&records, &excluding(&["skip"]));
    let indices: Vec<usize> = deck.entities().iter().map(|e| e.sequence_index()).collect();
    assert_eq!(indices, vec![0, 0, 1, 1]);
    assert_eq!(deck.slide(1).map(|s| s.sequence_index()), Some(1));
}

#[test]
fn assembly_is_repeatable() {
    let records = [
        record(&[("name", "a")]),
        record(&[("continued", "true")]),
        record(&[("template", "a")]),
    ];
    let options = without_incremental_count();
    let first = assemble_with(&records, &options);
    let second = assemble_with(&records, &options);
    assert_eq!(numbers(&first), numbers(&second));
    assert_eq!(numbers(&first), vec![1, 1, 2]);
}

// ---------------------------------------------------------------------------
// Templates and layouts
// ---------------------------------------------------------------------------

#[test]
fn layout_template_scenario() {
    let records = [
        record(&[("layout", "true"), ("name", "L")]),
        record(&[("template", "L")]),
        record(&[("class", "skip")]),
    ];
    let deck = assemble_with(&records, &excluding(&["skip"]));

    assert_eq!(deck.slide_count(), 1);
    let slide = deck.slide(0).expect("one slide");
    assert_eq!(slide.id(), 1);
    assert_eq!(slide.template(), Some(0));
    assert!(deck.slide_by_name("L").is_none());
    assert_eq!(deck.slides_by_number(1).len(), 1);
    assert_eq!(deck.entities().len(), 3);
    assert!(!deck.entities()[2].is_included());
}

#[test]
fn layout_is_hidden_but_referenced_by_name() {
    let records = [
        record(&[("layout", "true"), ("name", "base")]),
        record(&[("layout", "false")]),
        record(&[("template", "base")]),
    ];
    let deck = assemble(&records);
    assert_eq!(deck.slide_count(), 2);
    assert!(deck.slides().all(|s| !s.is_layout()));
    assert_eq!(deck.slide(0).and_then(|s| s.template()), None);
    let templated = deck.slide(1).expect("second slide");
    assert_eq!(deck.template_of(templated).map(|t| t.is_layout()), Some(true));
    assert_eq!(numbers(&deck), vec![1, 2]);
}

#[test]
fn active_layout_applies_until_cleared() {
    let records = [
        record(&[("layout", "true")]),
        record(&[]),
        record(&[("layout", "false")]),
        record(&[]),
        record(&[("layout", "true")]),
        record(&[]),
    ];
    let deck = assemble(&records);
    let templates: Vec<Option<usize>> = deck.slides().map(|s| s.template()).collect();
    assert_eq!(templates, vec![Some(0), None, None, Some(4)]);
}

#[test]
fn new_layout_replaces_active_layout() {
    let records = [
        record(&[("layout", "true"), ("name", "first")]),
        record(&[("layout", "true"), ("name", "second")]),
        record(&[]),
    ];
    let deck = assemble(&records);
    assert_eq!(deck.slide(0).and_then(|s| s.template()), Some(1));
    // a layout never inherits the active layout
    assert_eq!(deck.entities()[1].template(), None);
}

#[test]
fn continuation_overrides_named_template() {
    let records = [
        record(&[("name", "other")]),
        record(&[]),
        record(&[("continued", "true"), ("template", "other")]),
    ];
    let deck = assemble_with(&records, &without_incremental_count());
    let last = deck.slide(2).expect("third slide");
    assert_eq!(last.template(), Some(1));
    assert_eq!(last.display_number(), 2);
}

#[test]
fn continuation_follows_previous_entity_even_if_excluded() {
    let records = [
        record(&[]),
        record(&[("class", "skip")]),
        record(&[("continued", "true")]),
    ];
    let deck = assemble_with(&records, &excluding(&["skip"]));
    assert_eq!(deck.slide_count(), 2);
    let continued = deck.slide(1).expect("continuation");
    let template = deck.template_of(continued).expect("template");
    assert_eq!(template.id(), 1);
    assert!(!template.is_included());
}

#[test]
fn continuation_after_layout_extends_last_slide() {
    let source = "# Intro\n---\nlayout: true\nname: L\n\nLAYOUT {{ content }}\n--\nmore";
    let deck = assemble_markdown(source, &DeckOptions::default());

    assert_eq!(deck.slide_count(), 2);
    assert_eq!(numbers(&deck), vec![1, 2]);
    let continued = deck.slide(1).expect("continuation");
    let template = deck.template_of(continued).expect("template");
    assert_eq!(template.id(), 0);
    assert!(!template.is_layout());
    assert_eq!(content(&deck, 1), "# Intro\n\nmore");
}

#[test]
fn continuation_on_first_record_has_no_template() {
    let deck = assemble(&[record(&[("continued", "true")])]);
    assert_eq!(deck.slide(0).and_then(|s| s.template()), None);
    assert_eq!(numbers(&deck), vec![1]);
}

#[test]
fn template_must_be_defined_before_use() {
    let records = [record(&[("template", "later")]), record(&[("name", "later")])];
    let deck = assemble(&records);
    assert_eq!(deck.slide(0).and_then(|s| s.template()), None);
}

#[test]
fn malformed_flags_match_nothing() {
    let records = [
        record(&[("layout", "TRUE")]),
        record(&[("continued", "yes")]),
        record(&[("count", "no")]),
    ];
    let deck = assemble_with(&records, &without_incremental_count());
    assert_eq!(deck.slide_count(), 3);
    assert_eq!(numbers(&deck), vec![1, 2, 3]);
    assert!(deck.slides().all(|s| s.template().is_none()));
}

// ---------------------------------------------------------------------------
// Name index
// ---------------------------------------------------------------------------

#[test]
fn excluded_slides_still_serve_as_named_templates() {
    let records = [
        record(&[("name", "hidden"), ("class", "skip"), ("title", "T")]),
        record(&[("template", "hidden")]),
    ];
    let deck = assemble_with(&records, &excluding(&["skip"]));
    assert!(deck.slide_by_name("hidden").is_none());
    let slide = deck.slide(0).expect("one slide");
    assert_eq!(slide.template(), Some(0));
    assert_eq!(slide.properties().get("title"), Some("T"));
}

#[test]
fn included_named_slides_are_indexed() {
    let records = [record(&[("name", "intro")]), record(&[("name", "outro")])];
    let deck = assemble(&records);
    assert_eq!(deck.slide_by_name("outro").map(|s| s.id()), Some(1));
    assert_eq!(deck.slide_by_name("intro").map(|s| s.display_number()), Some(1));
    assert!(deck.slide_by_name("missing").is_none());
}

#[test]
fn later_name_wins_in_template_lookup() {
    let records = [
        record(&[("name", "x"), ("title", "first")]),
        record(&[("name", "x"), ("title", "second")]),
        record(&[("template", "x")]),
    ];
    let deck = assemble(&records);
    assert_eq!(deck.slide(2).and_then(|s| s.template()), Some(1));
    assert_eq!(deck.slide_by_name("x").map(|s| s.id()), Some(1));
}

// ---------------------------------------------------------------------------
// Links
// ---------------------------------------------------------------------------

#[test]
fn later_slide_wins_link_collisions() {
    let records = [
        record(&[]).with_link("x", "https://first.example").with_link("y", "https://y.example"),
        record(&[]).with_link("x", "https://second.example"),
    ];
    let deck = assemble(&records);
    let expected = BTreeMap::from([
        ("x".to_string(), "https://second.example".to_string()),
        ("y".to_string(), "https://y.example".to_string()),
    ]);
    assert_eq!(deck.links(), &expected);
}

#[test]
fn hidden_slides_contribute_no_links() {
    let records = [
        record(&[("layout", "true")]).with_link("layout", "https://layout.example"),
        record(&[("class", "skip")]).with_link("skip", "https://skip.example"),
        record(&[]).with_link("kept", "https://kept.example"),
    ];
    let deck = assemble_with(&records, &excluding(&["skip"]));
    assert_eq!(deck.links().keys().collect::<Vec<_>>(), vec!["kept"]);
}

#[test]
fn link_urls_expand_variables() {
    let records = [record(&[("base", "https://docs.example")]).with_link("api", "{{ base }}/api")];
    let deck = assemble(&records);
    assert_eq!(
        deck.links().get("api").map(String::as_str),
        Some("https://docs.example/api")
    );
}

// ---------------------------------------------------------------------------
// Inheritance and expansion
// ---------------------------------------------------------------------------

#[test]
fn layout_content_wraps_slide_content() {
    let source = "\
layout: true
class: inverse

# Header
{{ content }}
---
Body one
---
layout: false
Plain
";
    let deck = assemble_markdown(source, &DeckOptions::default());
    assert_eq!(deck.slide_count(), 2);
    assert_eq!(content(&deck, 0), "# Header\nBody one");
    assert_eq!(
        deck.slide(0).and_then(|s| s.properties().get("class")),
        Some("inverse")
    );
    assert_eq!(content(&deck, 1), "Plain");
}

#[test]
fn classes_merge_and_name_is_not_inherited() {
    let records = [
        record(&[("name", "base"), ("class", "center"), ("layout", "true")]),
        record(&[("class", "middle")]),
    ];
    let deck = assemble(&records);
    let slide = deck.slide(0).expect("slide");
    assert_eq!(slide.properties().get("class"), Some("center, middle"));
    assert_eq!(slide.name(), None);
    assert!(deck.slide_by_name("base").is_none());
}

#[test]
fn own_properties_beat_inherited_ones() {
    let records = [
        record(&[("name", "base"), ("title", "Base"), ("footer", "F")]),
        record(&[("template", "base"), ("title", "Own")]),
    ];
    let deck = assemble(&records);
    let slide = deck.slide(1).expect("slide");
    assert_eq!(slide.properties().get("title"), Some("Own"));
    assert_eq!(slide.properties().get("footer"), Some("F"));
}

#[test]
fn continuation_accumulates_previous_content() {
    let source = "# Points\n- one\n--\n- two\n--\n- three";
    let deck = assemble_markdown(source, &without_incremental_count());
    assert_eq!(numbers(&deck), vec![1, 1, 1]);
    assert_eq!(content(&deck, 2), "# Points\n- one\n\n- two\n\n- three");
}

#[test]
fn notes_are_inherited() {
    let records = [
        record(&[("layout", "true")]).with_notes("layout notes"),
        record(&[]).with_notes("own notes"),
        record(&[("layout", "false")]),
    ];
    let deck = assemble(&records);
    assert_eq!(deck.slide(0).map(|s| s.notes()), Some("layout notes\n\nown notes"));
    assert_eq!(deck.slide(1).map(|s| s.notes()), Some(""));
}

#[test]
fn variables_expand_from_resolved_properties() {
    let source = "\
layout: true
author: Ada

.footer[{{ author }}]
---
title: Welcome

# {{ title }} \\{{ title }}
";
    let deck = assemble_markdown(source, &DeckOptions::default());
    assert_eq!(
        content(&deck, 0),
        ".footer[Ada]\n\n# Welcome {{ title }}"
    );
}

#[test]
fn macros_expand_with_arguments() {
    let options = DeckOptions {
        macros: BTreeMap::from([("hl".to_string(), "<mark>%</mark>".to_string())]),
        ..DeckOptions::default()
    };
    let deck = assemble_markdown("Remember ![:hl the key point]", &options);
    assert_eq!(content(&deck, 0), "Remember <mark>the key point</mark>");
}

#[test]
fn rendered_slides_keep_their_renderer() {
    let renderer = Renderer::new(|props| format!("<h1>{}</h1>", props.get("title").unwrap_or("")));
    let records = [
        record(&[("layout", "true"), ("title", "From layout")]).with_property("class", "dark"),
        RawSlideRecord::rendered(renderer),
    ];
    let deck = assemble(&records);
    let slide = deck.slide(0).expect("slide");
    assert!(slide.content().is_none());
    assert_eq!(slide.payload().kind(), "renderer");
    assert_eq!(slide.render(), "<h1>From layout</h1>");
}

#[test]
fn html_payload_is_expanded_in_place() {
    let records = [RawSlideRecord::html("<p>{{ who }}</p>").with_property("who", "world")];
    let deck = assemble(&records);
    assert_eq!(deck.slide(0).map(|s| s.render()).as_deref(), Some("<p>world</p>"));
    assert_eq!(deck.slide(0).map(|s| s.payload().kind()), Some("html"));
}
