//! Text substitution inside a single slide.
//!
//! `{{ key }}` expands to a property value, `\{{ key }}` is an escape for the
//! literal text, and `![:name args]` expands to a configured macro with `%`
//! standing for the trimmed arguments.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use slidemark::Properties;

static VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\\)?(\{\{([^}\n]+)\}\})").unwrap());

static MACRO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[:([A-Za-z0-9_-]+)([^\]\n]*)\]").unwrap());

/// The placeholder a template uses to position the inheriting slide's body.
const CONTENT: &str = "content";

/// Expand macros, then property variables.
pub fn expand(text: &str, properties: &Properties, macros: &BTreeMap<String, String>) -> String {
    let text = expand_macros(text, macros);
    expand_variables(&text, properties)
}

/// Unknown variables are left as written, except a leftover `{{ content }}`
/// which expands to nothing.
pub fn expand_variables(text: &str, properties: &Properties) -> String {
    VARIABLE
        .replace_all(text, |caps: &Captures<'_>| {
            if caps.get(1).is_some() {
                return caps[2].to_string();
            }
            let key = caps[3].trim();
            match properties.get(key) {
                Some(value) => value.to_string(),
                None if key == CONTENT => String::new(),
                None => caps[2].to_string(),
            }
        })
        .into_owned()
}

pub fn expand_macros(text: &str, macros: &BTreeMap<String, String>) -> String {
    if macros.is_empty() {
        return text.to_string();
    }
    MACRO
        .replace_all(text, |caps: &Captures<'_>| match macros.get(&caps[1]) {
            Some(value) => value.replace('%', caps[2].trim()),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Merge a template body with an inheriting slide's own body.
///
/// The slide body replaces every unescaped `{{ content }}` in the template;
/// with no placeholder, the template body comes first.
pub fn inherit_content(template: &str, own: &str) -> String {
    let mut placed = false;
    let merged = VARIABLE.replace_all(template, |caps: &Captures<'_>| {
        if caps.get(1).is_none() && caps[3].trim() == CONTENT {
            placed = true;
            own.to_string()
        } else {
            caps[0].to_string()
        }
    });
    if placed {
        return merged.into_owned();
    }

    match (template.is_empty(), own.is_empty()) {
        (true, _) => own.to_string(),
        (_, true) => template.to_string(),
        _ => format!("{}\n\n{}", template, own),
    }
}
