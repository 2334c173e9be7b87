//! Engine facade: one store plus its identifier caches.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::export;
use crate::import::{ImportError, ImportProgress, ImportReport, Importer};
use crate::model::{DomainFile, DomainTree, Language, Upserted};
use crate::resolver::Resolver;
use crate::store::Store;
use crate::upsert::{update_existing_translation, upsert_translation};

/// Synchronization engine.
///
/// Shareable across threads (`Arc<Engine>`); the resolver's caches are
/// shared by every operation run through the same engine.
pub struct Engine {
    store: Store,
    resolver: Resolver,
}

impl Engine {
    /// Wrap an opened store with fresh, empty caches.
    pub fn new(store: Store) -> Self {
        Self {
            store,
            resolver: Resolver::new(),
        }
    }

    /// Open a database file.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(Store::open(path)?))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Store::open_in_memory()?))
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Register a language.
    pub fn add_language(&self, code: &str, name: &str) -> Result<Language> {
        self.store.add_language(code, name)
    }

    /// All registered languages.
    pub fn languages(&self) -> Result<Vec<Language>> {
        self.store.list_languages()
    }

    /// All domain names.
    pub fn domain_names(&self) -> Result<Vec<String>> {
        self.store.list_domains()
    }

    /// Full tree of an existing domain.
    pub fn domain_tree(&self, name: &str) -> Result<DomainTree> {
        let domain_id = self.resolver.lookup_domain(&self.store, name)?;
        self.store.load_domain_tree(domain_id, name)
    }

    /// Create or overwrite the translation of `string` in `language`.
    ///
    /// The domain and the language must exist; the string is created on
    /// first use.
    pub fn create_or_update_translation(
        &self,
        domain: &str,
        string: &str,
        language: &str,
        content: &str,
    ) -> Result<Upserted> {
        let language = self.resolver.resolve_language(&self.store, language)?;
        let domain_id = self.resolver.lookup_domain(&self.store, domain)?;
        let string_id = self.resolver.resolve_string(&self.store, string, domain_id)?;
        upsert_translation(&self.store, string_id, language.id, content, None)
    }

    /// Overwrite an existing translation. Domain, string, language and the
    /// translation itself must all exist.
    pub fn update_translation(
        &self,
        domain: &str,
        string: &str,
        language: &str,
        content: &str,
    ) -> Result<Upserted> {
        let language = self.resolver.resolve_language(&self.store, language)?;
        let domain_id = self.resolver.lookup_domain(&self.store, domain)?;
        let string_id = self.resolver.lookup_string(&self.store, string, domain_id)?;
        update_existing_translation(&self.store, string_id, language.id, content)
    }

    /// Start an import run sharing this engine's caches.
    pub fn importer(&self) -> Importer<'_> {
        Importer::new(&self.store, &self.resolver)
    }

    /// Import an already parsed domain file.
    pub fn import_domain(&self, file: &DomainFile) -> Result<ImportReport> {
        let mut importer = self.importer();
        importer.import_domain(file)?;
        Ok(ImportReport {
            files: 1,
            metrics: *importer.metrics(),
        })
    }

    /// Import a single interchange file.
    pub fn import_file(&self, path: &Path) -> Result<ImportReport> {
        let mut importer = self.importer();
        importer.import_file(path)?;
        Ok(ImportReport {
            files: 1,
            metrics: *importer.metrics(),
        })
    }

    /// Import every interchange file of a directory.
    pub fn import_directory(
        &self,
        dir: &Path,
        progress: &impl ImportProgress,
    ) -> std::result::Result<ImportReport, ImportError> {
        self.importer().import_directory(dir, progress)
    }

    /// Export a domain to one interchange file per language.
    pub fn export_domain(&self, name: &str, output_dir: &Path) -> Result<Vec<PathBuf>> {
        export::export_domain(&self.store, &self.resolver, name, output_dir)
    }
}
