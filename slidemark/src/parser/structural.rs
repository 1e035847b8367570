use std::collections::HashMap;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::parser::error::ParseError;
use crate::parser::links::extract_links;
use crate::record::{Properties, RawSlideRecord, SlidePayload};

static PROPERTY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_-]+):(.*)$").unwrap());

const NOTES_SEPARATOR: &str = "???";

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Split deck source into slide records.
///
/// Returns the records plus warning diagnostics; any error-severity
/// diagnostic fails the whole parse.
pub fn parse_records(
    source: &str,
    file_id: usize,
) -> Result<(Vec<RawSlideRecord>, Vec<ParseError>), Vec<ParseError>> {
    if source.trim().is_empty() {
        return Ok((Vec::new(), Vec::new()));
    }

    let segments = split_slides(source, file_id)?;

    let mut warnings = Vec::new();
    let records = segments
        .into_iter()
        .map(|segment| build_record(source, segment, file_id, &mut warnings))
        .collect();

    Ok((records, warnings))
}

// ---------------------------------------------------------------------------
// Slide splitting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Separator {
    /// `---`: a new slide.
    Slide,
    /// `--`: a new slide continuing the previous one.
    Continuation,
}

/// The body of one slide, without its separator line.
#[derive(Debug)]
struct Segment {
    body: Range<usize>,
    continued: bool,
}

struct OpenFence {
    marker: char,
    width: usize,
    span: Range<usize>,
}

fn split_slides(source: &str, file_id: usize) -> Result<Vec<Segment>, Vec<ParseError>> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut continued = false;
    let mut fence: Option<OpenFence> = None;
    let mut offset = 0;

    for line in source.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let text = line.trim_end_matches('\n');

        if let Some(open) = &fence {
            if closes_fence(text, open) {
                fence = None;
            }
            continue;
        }

        if let Some((marker, width)) = opening_fence(text) {
            fence = Some(OpenFence {
                marker,
                width,
                span: line_start..line_start + text.len(),
            });
            continue;
        }

        if let Some(separator) = separator(text) {
            segments.push(Segment {
                body: start..line_start,
                continued,
            });
            start = offset;
            continued = separator == Separator::Continuation;
        }
    }

    if let Some(open) = fence {
        let closing = open.marker.to_string().repeat(open.width);
        return Err(vec![
            ParseError::error("unterminated code fence", open.span, file_id).with_note(format!(
                "slide separators inside a fence are ignored; add a closing `{}`",
                closing
            )),
        ]);
    }

    segments.push(Segment {
        body: start..source.len(),
        continued,
    });
    Ok(segments)
}

fn separator(line: &str) -> Option<Separator> {
    match line.trim_end() {
        "---" => Some(Separator::Slide),
        "--" => Some(Separator::Continuation),
        _ => None,
    }
}

/// Up to three spaces of indentation are allowed before a fence marker.
fn strip_fence_indent(line: &str) -> Option<&str> {
    let trimmed = line.trim_start_matches(' ');
    (line.len() - trimmed.len() <= 3).then_some(trimmed)
}

fn opening_fence(line: &str) -> Option<(char, usize)> {
    let trimmed = strip_fence_indent(line)?;
    let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let width = trimmed.chars().take_while(|c| *c == marker).count();
    (width >= 3).then_some((marker, width))
}

fn closes_fence(line: &str, open: &OpenFence) -> bool {
    let Some(trimmed) = strip_fence_indent(line) else {
        return false;
    };
    let width = trimmed.chars().take_while(|c| *c == open.marker).count();
    width >= open.width && trimmed[width * open.marker.len_utf8()..].trim().is_empty()
}

// ---------------------------------------------------------------------------
// Record building
// ---------------------------------------------------------------------------

fn build_record(
    source: &str,
    segment: Segment,
    file_id: usize,
    warnings: &mut Vec<ParseError>,
) -> RawSlideRecord {
    let text = &source[segment.body.clone()];
    let (mut properties, body_start) =
        collect_properties(text, segment.body.start, file_id, warnings);

    let (content, notes) = split_notes(&text[body_start..]);
    let (content, links) = extract_links(content.trim_start_matches('\n').trim_end());

    if segment.continued && !properties.contains("continued") {
        properties.insert("continued", "true");
    }

    RawSlideRecord {
        properties,
        payload: SlidePayload::Markdown(content),
        notes: notes.trim().to_string(),
        links,
        span: segment.body,
    }
}

/// Read the `key: value` lines at the top of a slide. Blank lines may sit
/// between them; the first other line ends the block.
///
/// Returns the properties and the offset (within `text`) where the body starts.
fn collect_properties(
    text: &str,
    base: usize,
    file_id: usize,
    warnings: &mut Vec<ParseError>,
) -> (Properties, usize) {
    let mut properties = Properties::new();
    let mut declared: HashMap<String, Range<usize>> = HashMap::new();
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_end_matches('\n');
        if trimmed.trim().is_empty() {
            offset += line.len();
            continue;
        }

        let Some(captures) = PROPERTY_LINE.captures(trimmed) else {
            break;
        };
        let key = &captures[1];
        let value = captures[2].trim();

        let start = base + offset;
        let span = start..start + trimmed.len();
        properties.insert(key, value);
        match declared.get(key) {
            Some(first) => warnings.push(
                ParseError::warning(
                    format!("property `{}` is declared more than once", key),
                    span,
                    file_id,
                )
                .with_related(first.clone(), "first declared here")
                .with_note("the last declaration wins"),
            ),
            None => {
                declared.insert(key.to_string(), span);
            }
        }
        offset += line.len();
    }

    (properties, offset)
}

/// Split a slide body at its `???` line into (content, notes).
fn split_notes(body: &str) -> (&str, &str) {
    let mut offset = 0;
    for line in body.split_inclusive('\n') {
        if line.trim_end() == NOTES_SEPARATOR {
            return (&body[..offset], &body[offset + line.len()..]);
        }
        offset += line.len();
    }
    (body, "")
}
