//! Subcommand execution.

use std::path::Path;
use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use transdb_core::Engine;

use crate::formatter;
use crate::{Command, LanguageCommand};

/// Progress notifications buffered before the importer waits on the printer.
const PROGRESS_CAPACITY: usize = 100;

/// Run a subcommand and return its output.
pub fn execute(engine: &Engine, command: Command) -> anyhow::Result<String> {
    match command {
        Command::Import { dir } => import(engine, &dir),
        Command::Export { domain, dir } => {
            let files = engine
                .export_domain(&domain, &dir)
                .with_context(|| format!("exporting domain {}", domain))?;
            Ok(formatter::export_summary(&domain, &files))
        }
        Command::Language(LanguageCommand::Add { code, name }) => {
            let language = engine
                .add_language(&code, &name)
                .with_context(|| format!("adding language {}", code))?;
            Ok(format!(
                "Added language {} ({}) with id {}",
                language.code, language.name, language.id
            ))
        }
        Command::Language(LanguageCommand::List) => {
            Ok(formatter::language_table(&engine.languages()?))
        }
        Command::Domains => Ok(formatter::domain_list(&engine.domain_names()?)),
    }
}

/// Import a directory while a printer thread reports each finished file.
fn import(engine: &Engine, dir: &Path) -> anyhow::Result<String> {
    let (tx, rx) = mpsc::sync_channel::<String>(PROGRESS_CAPACITY);
    let printer = thread::spawn(move || {
        for file in rx {
            println!("Imported: {}", file);
        }
    });

    let result = engine.import_directory(dir, &tx);
    drop(tx);
    if printer.join().is_err() {
        tracing::warn!("progress printer panicked");
    }

    match result {
        Ok(report) => Ok(formatter::import_summary(
            &report,
            &engine.resolver().stats(),
        )),
        Err(e) => {
            tracing::warn!(files = e.files_processed, "partial import:\n{}", e.metrics);
            Err(e).with_context(|| format!("importing {}", dir.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use transdb_core::{xliff, DomainFile};

    fn engine() -> Engine {
        let engine = Engine::open_in_memory().unwrap();
        execute(
            &engine,
            Command::Language(LanguageCommand::Add {
                code: "fr".to_string(),
                name: "French".to_string(),
            }),
        )
        .unwrap();
        engine
    }

    #[test]
    fn test_import_then_export() {
        let engine = engine();
        let dir = tempfile::tempdir().unwrap();
        let import_dir = dir.path().join("in");
        let export_dir = dir.path().join("out");
        std::fs::create_dir_all(&import_dir).unwrap();
        xliff::write_file(
            &DomainFile::new("messages", "fr").with_unit("hello", "Bonjour"),
            &import_dir,
        )
        .unwrap();

        let output = execute(&engine, Command::Import { dir: import_dir }).unwrap();
        assert!(output.starts_with("Imported 1 file(s), 1 translation(s)"));
        assert!(output.contains("inserted: 1, updated: 0"));
        assert!(output.contains("Resolver cache: 0 hits, 2 misses"));

        let output = execute(&engine, Command::Domains).unwrap();
        assert_eq!(output, "messages");

        let output = execute(
            &engine,
            Command::Export {
                domain: "messages".to_string(),
                dir: export_dir.clone(),
            },
        )
        .unwrap();
        assert!(output.starts_with("Exported domain messages to 1 file(s)"));
        assert!(export_dir.join("messages.fr.xliff").exists());
    }

    #[test]
    fn test_import_failure_is_reported() {
        let engine = engine();
        let dir = tempfile::tempdir().unwrap();
        xliff::write_file(
            &DomainFile::new("messages", "xx").with_unit("hello", "?"),
            dir.path(),
        )
        .unwrap();

        let err = execute(
            &engine,
            Command::Import {
                dir: dir.path().to_path_buf(),
            },
        )
        .unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("import aborted after 0 file(s)"));
        assert!(message.contains("language 'xx' not found"));
    }

    #[test]
    fn test_duplicate_language_fails() {
        let engine = engine();
        let err = execute(
            &engine,
            Command::Language(LanguageCommand::Add {
                code: "fr".to_string(),
                name: "Français".to_string(),
            }),
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("adding language fr"));

        let output = execute(&engine, Command::Language(LanguageCommand::List)).unwrap();
        assert!(output.contains("French"));
        assert!(!output.contains("Français"));
    }
}
