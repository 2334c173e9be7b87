//! Row and exchange types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::xliff;

/// Surrogate row identifier.
pub type RowId = i64;

/// A registered language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub id: RowId,
    pub name: String,
    pub code: String,
}

/// A translation row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub id: RowId,
    pub string_id: RowId,
    pub language_id: RowId,
    pub content: String,
}

/// One `(string name, content)` pair of an interchange file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationUnit {
    pub name: String,
    pub content: String,
}

impl TranslationUnit {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// The content of one interchange file: a domain's strings in a single language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainFile {
    /// Domain name.
    pub name: String,
    /// Language code shared by every unit.
    pub language: String,
    /// Units in file order.
    pub units: Vec<TranslationUnit>,
}

impl DomainFile {
    /// Create an empty domain file.
    pub fn new(name: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language: language.into(),
            units: Vec::new(),
        }
    }

    /// Append a unit.
    pub fn with_unit(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.units.push(TranslationUnit::new(name, content));
        self
    }

    /// Conventional file name, `<domain>.<language>.xliff`.
    ///
    /// Both parts are escaped with [`xliff::encode_name_component`], so the
    /// result is always a single path component.
    pub fn file_name(&self) -> String {
        format!(
            "{}.{}.{}",
            xliff::encode_name_component(&self.name),
            xliff::encode_name_component(&self.language),
            xliff::EXTENSION
        )
    }
}

/// A string with its translations across all languages, keyed by language code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringEntry {
    pub name: String,
    pub translations: BTreeMap<String, String>,
}

/// A full domain as stored: every string, each with all of its translations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainTree {
    pub name: String,
    /// Strings ordered by name.
    pub strings: Vec<StringEntry>,
}

impl DomainTree {
    /// Language codes present in the tree, sorted.
    pub fn languages(&self) -> Vec<String> {
        let mut codes: Vec<String> = self
            .strings
            .iter()
            .flat_map(|s| s.translations.keys().cloned())
            .collect();
        codes.sort();
        codes.dedup();
        codes
    }

    /// Project the tree onto a single language.
    ///
    /// Strings without a translation in `language` are left out.
    pub fn to_domain_file(&self, language: &str) -> DomainFile {
        let units = self
            .strings
            .iter()
            .filter_map(|s| {
                s.translations
                    .get(language)
                    .map(|content| TranslationUnit::new(s.name.clone(), content.clone()))
            })
            .collect();

        DomainFile {
            name: self.name.clone(),
            language: language.to_string(),
            units,
        }
    }

    /// Find a string by name.
    pub fn string(&self, name: &str) -> Option<&StringEntry> {
        self.strings.iter().find(|s| s.name == name)
    }
}

/// Outcome of a single upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Upserted {
    /// Id of the written translation row.
    pub id: RowId,
    /// True when a new row was inserted.
    pub created: bool,
}
