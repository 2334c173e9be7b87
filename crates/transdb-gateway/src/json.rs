//! JSON request and response types for the HTTP gateway.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use transdb_core::{CacheStats, DomainTree, Upserted};

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status.
    pub status: String,
    /// Gateway version.
    pub version: String,
    /// Identifier cache counters.
    pub cache: CacheStats,
}

/// Body of a translation write.
#[derive(Debug, Deserialize)]
pub struct TranslationBody {
    pub content: String,
}

/// Result of a translation write.
#[derive(Debug, Serialize)]
pub struct WriteResponse {
    pub result: &'static str,
    /// Row id of the translation.
    pub id: i64,
    /// Whether the translation row was created by this request.
    pub created: bool,
}

impl From<Upserted> for WriteResponse {
    fn from(upserted: Upserted) -> Self {
        Self {
            result: "ok",
            id: upserted.id,
            created: upserted.created,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DomainListResponse {
    pub domains: Vec<String>,
}

/// A domain with every string and its translations keyed by language code.
#[derive(Debug, Serialize)]
pub struct DomainResponse {
    pub name: String,
    pub strings: Vec<StringJson>,
}

#[derive(Debug, Serialize)]
pub struct StringJson {
    pub name: String,
    pub translations: BTreeMap<String, String>,
}

impl From<DomainTree> for DomainResponse {
    fn from(tree: DomainTree) -> Self {
        Self {
            name: tree.name,
            strings: tree
                .strings
                .into_iter()
                .map(|s| StringJson {
                    name: s.name,
                    translations: s.translations,
                })
                .collect(),
        }
    }
}

/// Files written by an on-demand export.
#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub result: &'static str,
    pub files: Vec<String>,
}

impl From<Vec<PathBuf>> for ExportResponse {
    fn from(mut files: Vec<PathBuf>) -> Self {
        files.sort();
        Self {
            result: "ok",
            files: files
                .into_iter()
                .map(|p| p.display().to_string())
                .collect(),
        }
    }
}
