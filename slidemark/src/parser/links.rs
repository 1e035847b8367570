use std::collections::BTreeMap;
use std::ops::Range;

use pulldown_cmark::{Options, Parser as CmarkParser};

/// Pull link reference definitions (`[id]: url`) out of a slide body.
///
/// Returns the body with the definition lines removed, and the id → URL
/// table. Definitions inside code blocks are not definitions and stay put.
pub(crate) fn extract_links(content: &str) -> (String, BTreeMap<String, String>) {
    let parser = CmarkParser::new_ext(content, Options::empty());

    let mut links = BTreeMap::new();
    let mut lines: Vec<Range<usize>> = Vec::new();
    for (label, def) in parser.reference_definitions().iter() {
        links.insert(label.to_string(), def.dest.to_string());
        lines.push(whole_lines(content, def.span.clone()));
    }

    if lines.is_empty() {
        return (content.to_string(), links);
    }

    lines.sort_by_key(|range| range.start);
    let mut stripped = String::with_capacity(content.len());
    let mut cursor = 0;
    for range in lines {
        if range.start >= cursor {
            stripped.push_str(&content[cursor..range.start]);
        }
        cursor = cursor.max(range.end);
    }
    stripped.push_str(&content[cursor..]);

    (stripped.trim_end().to_string(), links)
}

/// Widen a byte span to the full lines it touches, trailing newline included.
fn whole_lines(content: &str, span: Range<usize>) -> Range<usize> {
    let start = content[..span.start].rfind('\n').map_or(0, |i| i + 1);
    let end = if span.end > span.start && content.as_bytes()[span.end - 1] == b'\n' {
        span.end
    } else {
        match content[span.end..].find('\n') {
            Some(i) => span.end + i + 1,
            None => content.len(),
        }
    };
    start..end
}
