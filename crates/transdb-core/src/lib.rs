//! transdb core: synchronization between XLIFF translation files and a
//! SQLite store.
//!
//! The store holds languages, domains, strings and translations. Imports map
//! parsed files onto rows through the [`Resolver`] (natural key to row id,
//! cached) and the upsert engine (one translation per string and language).
//! Exports read a domain back and write one file per language.

pub mod engine;
pub mod error;
pub mod export;
pub mod import;
pub mod metrics;
pub mod model;
pub mod resolver;
pub mod store;
pub mod upsert;
pub mod xliff;

pub use engine::Engine;
pub use error::{Error, Result};
pub use import::{ImportError, ImportProgress, ImportReport, Importer};
pub use metrics::ImportMetrics;
pub use model::{
    DomainFile, DomainTree, Language, RowId, StringEntry, Translation, TranslationUnit, Upserted,
};
pub use resolver::{CacheStats, Resolver};
pub use store::{Store, StoreCounts};
