//! Runner for `.test.md` deck fixtures.
//!
//! A fixture is a TOML frontmatter block between two `---` lines, followed by
//! the deck source. The frontmatter holds the deck options and the
//! expectations checked against the assembled deck:
//!
//! ```text
//! ---
//! description = "continuations share a number"
//! expect_numbers = [1, 1, 2]
//!
//! [options]
//! count_incremental_slides = false
//! ---
//! # One
//! --
//! More
//! ---
//! # Two
//! ```
//!
//! Fixtures in subdirectories are grouped into categories named after the
//! directory.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use codespan_reporting::term::termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use serde::Deserialize;
use walkdir::WalkDir;

use assembler::{Deck, DeckAssembler, DeckOptions};
use slidemark::parser::Parser;

use crate::template_label;

const FIXTURE_SUFFIX: &str = ".test.md";

#[derive(Debug, Deserialize)]
pub struct ExpectedContent {
    /// Position in the presentation order.
    pub slide: usize,
    /// Text the expanded slide body must contain.
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub description: Option<String>,
    pub options: DeckOptions,
    pub expect_parse_error: bool,
    pub expect_count: Option<usize>,
    pub expect_numbers: Option<Vec<usize>>,
    /// Names of the named slides, in presentation order.
    pub expect_names: Option<Vec<String>>,
    /// One label per slide, as printed by `slidemark build`.
    pub expect_templates: Option<Vec<String>>,
    pub expect_links: Option<BTreeMap<String, String>>,
    pub expect_contains: Vec<ExpectedContent>,
}

pub struct TestResult {
    pub path: PathBuf,
    pub label: String,
    pub failures: Vec<String>,
}

impl TestResult {
    fn failed(path: &Path, label: String, failure: String) -> Self {
        TestResult {
            path: path.to_path_buf(),
            label,
            failures: vec![failure],
        }
    }

    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Split a fixture into its frontmatter and deck source.
fn split_fixture(content: &str) -> Result<(Fixture, String), String> {
    let content = content.replace("\r\n", "\n");
    let rest = content
        .strip_prefix("---\n")
        .ok_or("missing opening --- frontmatter delimiter")?;

    let mut offset = 0;
    let mut end = None;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            end = Some((offset, offset + line.len()));
            break;
        }
        offset += line.len();
    }
    let (toml_end, source_start) = end.ok_or("missing closing --- frontmatter delimiter")?;

    let fixture: Fixture = toml::from_str(&rest[..toml_end])
        .map_err(|e| format!("invalid frontmatter: {}", e))?;
    Ok((fixture, rest[source_start..].to_string()))
}

fn compare<T: PartialEq + Debug>(what: &str, expected: &T, actual: &T, failures: &mut Vec<String>) {
    if expected != actual {
        failures.push(format!(
            "{} mismatch\n      expected: {:?}\n      actual:   {:?}",
            what, expected, actual
        ));
    }
}

/// Every expectation the deck misses.
fn check_deck(fixture: &Fixture, deck: &Deck) -> Vec<String> {
    let mut failures = Vec::new();

    if let Some(expected) = &fixture.expect_count {
        compare("slide count", expected, &deck.slide_count(), &mut failures);
    }
    if let Some(expected) = &fixture.expect_numbers {
        let actual: Vec<usize> = deck.slides().map(|s| s.display_number()).collect();
        compare("display numbers", expected, &actual, &mut failures);
    }
    if let Some(expected) = &fixture.expect_names {
        let actual: Vec<String> = deck
            .slides()
            .filter_map(|s| s.name().map(str::to_string))
            .collect();
        compare("slide names", expected, &actual, &mut failures);
    }
    if let Some(expected) = &fixture.expect_templates {
        let actual: Vec<String> = deck.slides().map(|s| template_label(deck, s)).collect();
        compare("templates", expected, &actual, &mut failures);
    }
    if let Some(expected) = &fixture.expect_links {
        compare("links", expected, deck.links(), &mut failures);
    }

    for expected in &fixture.expect_contains {
        match deck.slide(expected.slide) {
            Some(slide) => {
                let body = slide.render();
                if !body.contains(&expected.text) {
                    failures.push(format!(
                        "slide {} does not contain {:?}\n      body: {:?}",
                        expected.slide, expected.text, body
                    ));
                }
            }
            None => failures.push(format!("slide {} does not exist", expected.slide)),
        }
    }

    failures
}

fn run_fixture(path: &Path) -> TestResult {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let fallback = file_name
        .strip_suffix(FIXTURE_SUFFIX)
        .unwrap_or(&file_name)
        .to_string();

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => return TestResult::failed(path, fallback, format!("cannot read file: {}", e)),
    };
    let (fixture, source) = match split_fixture(&content) {
        Ok(split) => split,
        Err(e) => return TestResult::failed(path, fallback, e),
    };
    let label = fixture.description.clone().unwrap_or(fallback);

    let failures = match (fixture.expect_parse_error, Parser::new(source, 0).parse()) {
        (true, Err(_)) => Vec::new(),
        (true, Ok(_)) => vec!["expected a parse error, but the deck parsed".to_string()],
        (false, Err(errors)) => {
            let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
            vec![format!("unexpected parse error: {}", messages.join("; "))]
        }
        (false, Ok(parsed)) => {
            let deck = DeckAssembler::new(&fixture.options).assemble(&parsed.records);
            check_deck(&fixture, &deck)
        }
    };

    TestResult {
        path: path.to_path_buf(),
        label,
        failures,
    }
}

/// Fixture files under `root`, keyed by their directory relative to it.
fn discover(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    let entries = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok);

    for entry in entries {
        if !entry.file_type().is_file()
            || !entry.file_name().to_string_lossy().ends_with(FIXTURE_SUFFIX)
        {
            continue;
        }
        let category = entry
            .path()
            .parent()
            .and_then(|dir| dir.strip_prefix(root).ok())
            .map(|dir| dir.to_string_lossy().replace('\\', "/"))
            .unwrap_or_default();
        categories
            .entry(category)
            .or_default()
            .push(entry.path().to_path_buf());
    }
    categories
}

/// A category is selected by its exact name or by any parent directory.
fn is_selected(category: &str, filters: &[String]) -> bool {
    filters.is_empty()
        || filters.iter().any(|f| {
            category == f
                || category
                    .strip_prefix(f.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
}

pub fn list_categories(path: &Path) {
    let categories = discover(path);
    if categories.is_empty() {
        eprintln!("no {} files found in {}", FIXTURE_SUFFIX, path.display());
        return;
    }
    for (category, files) in &categories {
        let name = if category.is_empty() { "(root)" } else { category };
        println!("{} ({} fixtures)", name, files.len());
    }
}

struct Reporter {
    out: StandardStream,
}

impl Reporter {
    fn new(no_color: bool) -> Self {
        let choice = if no_color {
            ColorChoice::Never
        } else {
            ColorChoice::Auto
        };
        Reporter {
            out: StandardStream::stderr(choice),
        }
    }

    fn painted(&mut self, text: &str, color: Color) {
        let _ = self
            .out
            .set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
        let _ = write!(self.out, "{}", text);
        let _ = self.out.reset();
    }

    fn category(&mut self, name: &str) {
        let _ = self.out.set_color(ColorSpec::new().set_bold(true));
        let _ = writeln!(self.out, "\n{}", name);
        let _ = self.out.reset();
    }

    fn result(&mut self, result: &TestResult) {
        let _ = write!(self.out, "  ");
        if result.passed() {
            self.painted("PASS", Color::Green);
        } else {
            self.painted("FAIL", Color::Red);
        }
        let _ = writeln!(self.out, " {}", result.label);
    }

    fn failures(&mut self, results: &[TestResult]) {
        for result in results.iter().filter(|r| !r.passed()) {
            let _ = writeln!(self.out, "\n{} ({})", result.label, result.path.display());
            for failure in &result.failures {
                let _ = writeln!(self.out, "    {}", failure);
            }
        }
    }

    fn summary(&mut self, passed: usize, failed: usize) {
        let _ = writeln!(self.out);
        if failed == 0 {
            self.painted("ok", Color::Green);
        } else {
            self.painted("FAILED", Color::Red);
        }
        let _ = writeln!(self.out, ": {} passed, {} failed", passed, failed);
    }
}

/// Run the fixtures at `path` and return the process exit code.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let selected: Vec<(String, Vec<PathBuf>)> = if path.is_file() {
        vec![(String::new(), vec![path.to_path_buf()])]
    } else {
        discover(path)
            .into_iter()
            .filter(|(category, _)| is_selected(category, categories))
            .collect()
    };

    if selected.iter().all(|(_, files)| files.is_empty()) {
        eprintln!("no {} files found in {}", FIXTURE_SUFFIX, path.display());
        return 1;
    }

    let mut reporter = Reporter::new(no_color);
    let mut results = Vec::new();
    for (category, files) in selected {
        if !category.is_empty() {
            reporter.category(&category);
        }
        for file in files {
            let result = run_fixture(&file);
            reporter.result(&result);
            results.push(result);
        }
    }

    let passed = results.iter().filter(|r| r.passed()).count();
    let failed = results.len() - passed;
    reporter.failures(&results);
    reporter.summary(passed, failed);

    if failed == 0 { 0 } else { 1 }
}
