//! Import pipeline: interchange files into the store.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{Sender, SyncSender};

use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::metrics::{timed, ImportMetrics};
use crate::model::DomainFile;
use crate::resolver::Resolver;
use crate::store::Store;
use crate::upsert::upsert_translation;
use crate::xliff;

/// Receives one notification per fully imported file.
pub trait ImportProgress {
    /// Called with the base name of a file once all of its translations are written.
    fn file_imported(&self, file_name: &str);
}

impl ImportProgress for () {
    fn file_imported(&self, _file_name: &str) {}
}

/// Blocks while the channel is full, so a slow consumer stalls the import.
impl ImportProgress for SyncSender<String> {
    fn file_imported(&self, file_name: &str) {
        if self.send(file_name.to_string()).is_err() {
            debug!(file = file_name, "progress receiver gone");
        }
    }
}

impl ImportProgress for Sender<String> {
    fn file_imported(&self, file_name: &str) {
        if self.send(file_name.to_string()).is_err() {
            debug!(file = file_name, "progress receiver gone");
        }
    }
}

/// Summary of a completed import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Files fully processed.
    pub files: usize,
    /// Phase timings and row counts.
    pub metrics: ImportMetrics,
}

/// An import run that stopped at its first error.
#[derive(Debug, Error)]
#[error("import aborted after {files_processed} file(s): {source}")]
pub struct ImportError {
    /// Files fully processed before the failure.
    pub files_processed: usize,
    /// Metrics gathered up to the failure.
    pub metrics: ImportMetrics,
    /// The failure.
    #[source]
    pub source: Error,
}

/// Interchange files directly inside `dir`, sorted by file name. Symlinked
/// files are included.
pub fn list_interchange_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path();
        if entry.file_type().is_file()
            && path.extension().map(|e| e == xliff::EXTENSION).unwrap_or(false)
        {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

/// Feeds parsed domain files through the resolver and the upsert engine.
///
/// Translations are written one by one; a failure part-way through a file
/// leaves the rows already written for that file in place.
pub struct Importer<'a> {
    store: &'a Store,
    resolver: &'a Resolver,
    metrics: ImportMetrics,
}

impl<'a> Importer<'a> {
    pub fn new(store: &'a Store, resolver: &'a Resolver) -> Self {
        Self {
            store,
            resolver,
            metrics: ImportMetrics::default(),
        }
    }

    /// Metrics accumulated so far.
    pub fn metrics(&self) -> &ImportMetrics {
        &self.metrics
    }

    /// Write every unit of `file`. Returns the number of translations written.
    ///
    /// The language is resolved before anything else, so a file declaring an
    /// unregistered language writes no rows at all.
    pub fn import_domain(&mut self, file: &DomainFile) -> Result<usize> {
        let language = self.resolver.resolve_language(self.store, &file.language)?;
        let domain_id = self.resolver.resolve_domain(self.store, &file.name)?;

        for unit in &file.units {
            let (store, resolver) = (self.store, self.resolver);
            let string_id = timed(&mut self.metrics.resolve_strings, || {
                resolver.resolve_string(store, &unit.name, domain_id)
            })?;
            let written = timed(&mut self.metrics.upsert, || {
                upsert_translation(store, string_id, language.id, &unit.content, None)
            })?;
            if written.created {
                self.metrics.inserted += 1;
            } else {
                self.metrics.updated += 1;
            }
        }

        debug!(
            domain = %file.name,
            language = %file.language,
            units = file.units.len(),
            "domain imported"
        );
        Ok(file.units.len())
    }

    /// Parse and import a single interchange file.
    pub fn import_file(&mut self, path: &Path) -> Result<DomainFile> {
        let file = timed(&mut self.metrics.parse, || xliff::read_file(path))?;
        self.import_domain(&file)?;
        Ok(file)
    }

    /// Import every interchange file in `dir`, in file-name order.
    ///
    /// Stops at the first error of any kind; the error carries the number of
    /// files completed before it.
    pub fn import_directory(
        mut self,
        dir: &Path,
        progress: &impl ImportProgress,
    ) -> std::result::Result<ImportReport, ImportError> {
        let files = match list_interchange_files(dir) {
            Ok(files) => files,
            Err(source) => {
                return Err(ImportError {
                    files_processed: 0,
                    metrics: self.metrics,
                    source,
                })
            }
        };

        for (index, path) in files.iter().enumerate() {
            if let Err(source) = self.import_file(path) {
                return Err(ImportError {
                    files_processed: index,
                    metrics: self.metrics,
                    source,
                });
            }

            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            info!(file = %name, "file imported");
            progress.file_imported(&name);
        }

        Ok(ImportReport {
            files: files.len(),
            metrics: self.metrics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;
    use std::sync::mpsc;

    fn write(dir: &Path, name: &str, file: &DomainFile) {
        fs::write(dir.join(name), xliff::to_string(file).unwrap()).unwrap();
    }

    #[test]
    fn test_lists_only_xliff_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.fr.xliff", "a.fr.xliff", "notes.txt", "c.xliff.bak"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("nested.xliff")).unwrap();

        let names: Vec<String> = list_interchange_files(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.fr.xliff", "b.fr.xliff"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_lists_symlinked_files() {
        let source = tempfile::tempdir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        fs::write(source.path().join("shared.fr.xliff"), "").unwrap();
        fs::write(dir.path().join("local.fr.xliff"), "").unwrap();
        std::os::unix::fs::symlink(
            source.path().join("shared.fr.xliff"),
            dir.path().join("linked.fr.xliff"),
        )
        .unwrap();

        let names: Vec<String> = list_interchange_files(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["linked.fr.xliff", "local.fr.xliff"]);
    }

    #[test]
    fn test_missing_directory_fails_with_zero_files() {
        let store = Store::open_in_memory().unwrap();
        let resolver = Resolver::new();
        let err = Importer::new(&store, &resolver)
            .import_directory(Path::new("/definitely/not/here"), &())
            .unwrap_err();
        assert_eq!(err.files_processed, 0);
        assert!(matches!(err.source, Error::Io(_)));
    }

    #[test]
    fn test_notifications_follow_file_order() {
        let store = Store::open_in_memory().unwrap();
        store.add_language("fr", "French").unwrap();
        let resolver = Resolver::new();

        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "zeta.fr.xliff",
            &DomainFile::new("zeta", "fr").with_unit("a", "A"),
        );
        write(
            dir.path(),
            "alpha.fr.xliff",
            &DomainFile::new("alpha", "fr").with_unit("b", "B").with_unit("c", "C"),
        );

        let (tx, rx) = mpsc::sync_channel(100);
        let report = Importer::new(&store, &resolver)
            .import_directory(dir.path(), &tx)
            .unwrap();
        drop(tx);

        assert_eq!(report.files, 2);
        assert_eq!(report.metrics.inserted, 3);
        assert_eq!(report.metrics.updated, 0);
        let seen: Vec<String> = rx.iter().collect();
        assert_eq!(seen, vec!["alpha.fr.xliff", "zeta.fr.xliff"]);
    }

    #[test]
    fn test_later_unit_wins_within_run() {
        let store = Store::open_in_memory().unwrap();
        store.add_language("fr", "French").unwrap();
        let resolver = Resolver::new();

        let file = DomainFile::new("messages", "fr")
            .with_unit("hello", "Bonjour")
            .with_unit("hello", "Salut");
        let mut importer = Importer::new(&store, &resolver);
        assert_eq!(importer.import_domain(&file).unwrap(), 2);
        assert_eq!(importer.metrics().inserted, 1);
        assert_eq!(importer.metrics().updated, 1);

        let domain = store.find_domain_id("messages").unwrap().unwrap();
        let tree = store.load_domain_tree(domain, "messages").unwrap();
        assert_eq!(tree.strings[0].translations["fr"], "Salut");
    }
}
