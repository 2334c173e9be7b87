//! Identifier resolution.
//!
//! Maps natural keys (language code, domain name, string name within a
//! domain) to surrogate row ids. Domain and string ids are cached
//! write-through: every id obtained from the store is recorded before it is
//! returned, so a repeated lookup for the same key never reaches the store.
//!
//! The caches are append-only for the lifetime of the resolver. If another
//! process deletes a cached domain or string, the stale id is handed out and
//! the next write against it fails with a foreign-key error from the store.
//!
//! Creation goes through the store's insert-if-absent statements, so two
//! flows resolving the same new name concurrently both receive the id of the
//! single row that ends up existing.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{Language, RowId};
use crate::store::Store;

/// Cache key for strings: names are only unique within a domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StringKey {
    pub domain_id: RowId,
    pub name: String,
}

impl StringKey {
    pub fn new(domain_id: RowId, name: impl Into<String>) -> Self {
        Self {
            domain_id,
            name: name.into(),
        }
    }
}

/// Cache counters and sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Cached domain ids.
    pub domains: usize,
    /// Cached string ids.
    pub strings: usize,
}

/// Natural-key to row-id resolver with process-lifetime caches.
#[derive(Default)]
pub struct Resolver {
    domains: DashMap<String, RowId>,
    strings: DashMap<StringKey, RowId>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Resolver {
    /// Create a resolver with empty caches.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a language by code. Not cached.
    pub fn resolve_language(&self, store: &Store, code: &str) -> Result<Language> {
        store
            .find_language(code)?
            .ok_or_else(|| Error::NotFound(format!("language '{code}'")))
    }

    /// Get the id of a domain, creating the domain if it does not exist.
    pub fn resolve_domain(&self, store: &Store, name: &str) -> Result<RowId> {
        if let Some(id) = self.cached_domain(name) {
            return Ok(id);
        }

        let id = match store.find_domain_id(name)? {
            Some(id) => id,
            None => store.insert_domain_if_absent(name)?,
        };
        self.domains.insert(name.to_string(), id);
        Ok(id)
    }

    /// Get the id of an existing domain.
    pub fn lookup_domain(&self, store: &Store, name: &str) -> Result<RowId> {
        if let Some(id) = self.cached_domain(name) {
            return Ok(id);
        }

        let id = store
            .find_domain_id(name)?
            .ok_or_else(|| Error::NotFound(format!("domain '{name}'")))?;
        self.domains.insert(name.to_string(), id);
        Ok(id)
    }

    /// Get the id of a string within a domain, creating it if it does not exist.
    pub fn resolve_string(&self, store: &Store, name: &str, domain_id: RowId) -> Result<RowId> {
        let key = StringKey::new(domain_id, name);
        if let Some(id) = self.cached_string(&key) {
            return Ok(id);
        }

        let id = match store.find_string_id(name, domain_id)? {
            Some(id) => id,
            None => {
                let id = store.insert_string_if_absent(name, domain_id)?;
                debug!(string = name, domain_id, id, "string created");
                id
            }
        };
        self.strings.insert(key, id);
        Ok(id)
    }

    /// Get the id of an existing string within a domain.
    pub fn lookup_string(&self, store: &Store, name: &str, domain_id: RowId) -> Result<RowId> {
        let key = StringKey::new(domain_id, name);
        if let Some(id) = self.cached_string(&key) {
            return Ok(id);
        }

        let id = store
            .find_string_id(name, domain_id)?
            .ok_or_else(|| Error::NotFound(format!("string '{name}'")))?;
        self.strings.insert(key, id);
        Ok(id)
    }

    /// Hit/miss counters since creation, and current cache sizes.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            domains: self.domains.len(),
            strings: self.strings.len(),
        }
    }

    fn cached_domain(&self, name: &str) -> Option<RowId> {
        self.record(self.domains.get(name).map(|id| *id))
    }

    fn cached_string(&self, key: &StringKey) -> Option<RowId> {
        self.record(self.strings.get(key).map(|id| *id))
    }

    fn record(&self, hit: Option<RowId>) -> Option<RowId> {
        let counter = if hit.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        hit
    }
}
