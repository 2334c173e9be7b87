//! Output formatting.

use std::path::PathBuf;

use comfy_table::{Cell, Table};
use transdb_core::{CacheStats, ImportReport, Language};

/// Languages as a table, one row per language.
pub fn language_table(languages: &[Language]) -> String {
    if languages.is_empty() {
        return "(no languages)".to_string();
    }

    let mut table = Table::new();
    table.set_header(vec!["Code", "Name", "Id"]);
    for language in languages {
        table.add_row(vec![
            Cell::new(&language.code),
            Cell::new(&language.name),
            Cell::new(language.id),
        ]);
    }
    table.to_string()
}

pub fn domain_list(domains: &[String]) -> String {
    if domains.is_empty() {
        return "(no domains)".to_string();
    }
    domains.join("\n")
}

pub fn import_summary(report: &ImportReport, cache: &CacheStats) -> String {
    format!(
        "Imported {} file(s), {} translation(s) in {:?}\n{}\nResolver cache: {} hits, {} misses",
        report.files,
        report.metrics.translations(),
        report.metrics.total(),
        report.metrics,
        cache.hits,
        cache.misses
    )
}

pub fn export_summary(domain: &str, files: &[PathBuf]) -> String {
    let mut files: Vec<_> = files.iter().map(|f| f.display().to_string()).collect();
    files.sort();
    let mut out = format!("Exported domain {} to {} file(s)", domain, files.len());
    for file in files {
        out.push_str("\n  ");
        out.push_str(&file);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_table() {
        let languages = vec![Language {
            id: 1,
            name: "French".to_string(),
            code: "fr".to_string(),
        }];
        let table = language_table(&languages);
        assert!(table.contains("Code"));
        assert!(table.contains("French"));
        assert!(table.contains("fr"));
        assert_eq!(language_table(&[]), "(no languages)");
    }

    #[test]
    fn test_export_summary_is_sorted() {
        let files = vec![PathBuf::from("out/m.fr.xliff"), PathBuf::from("out/m.de.xliff")];
        assert_eq!(
            export_summary("m", &files),
            "Exported domain m to 2 file(s)\n  out/m.de.xliff\n  out/m.fr.xliff"
        );
    }
}
