//! Deck options.
//!
//! Only `excluded_classes`, `count_incremental_slides` and `macros` affect
//! assembly. Presentation settings are carried so a TOML options file can
//! hold them, but nothing here interprets them.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeckOptions {
    /// Inline deck source, used when no `source_url` is set.
    pub source: Option<String>,
    /// URL to fetch the deck source from.
    pub source_url: Option<String>,
    /// Slides carrying any of these classes are left out of the deck.
    pub excluded_classes: BTreeSet<String>,
    /// When false, continuation slides (`continued: true`) that declare no
    /// `count` of their own do not advance the slide number.
    pub count_incremental_slides: bool,
    /// Macro name → replacement text for `![:name]` expansion.
    pub macros: BTreeMap<String, String>,
    /// Slide aspect ratio, e.g. `"16:9"`.
    pub ratio: String,
    pub slide_number_format: String,
    /// Any other presentation option, passed through untouched.
    #[serde(flatten)]
    pub extra: toml::Table,
}

impl Default for DeckOptions {
    fn default() -> Self {
        DeckOptions {
            source: None,
            source_url: None,
            excluded_classes: BTreeSet::new(),
            count_incremental_slides: true,
            macros: BTreeMap::new(),
            ratio: "4:3".to_string(),
            slide_number_format: "%current% / %total%".to_string(),
            extra: toml::Table::new(),
        }
    }
}

impl DeckOptions {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: PathBuf::from(path),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn is_excluded(&self, class: &str) -> bool {
        self.excluded_classes.contains(class)
    }
}
