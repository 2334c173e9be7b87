//! Integration tests for import, export and translation updates.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use transdb_core::{xliff, DomainFile, Engine, Error};

struct TestContext {
    engine: Engine,
    dir: tempfile::TempDir,
}

impl TestContext {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::open(&dir.path().join("translations.db")).unwrap();
        engine.add_language("fr", "French").unwrap();
        engine.add_language("de", "German").unwrap();
        Self { engine, dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(&path).unwrap();
        path
    }

    fn translation_count(&self) -> usize {
        self.engine.store().counts().unwrap().translations
    }
}

fn write_file(dir: &Path, file: &DomainFile) {
    xliff::write_file(file, dir).unwrap();
}

fn messages_fr() -> DomainFile {
    DomainFile::new("messages", "fr")
        .with_unit("hello", "Bonjour")
        .with_unit("bye", "Au revoir")
}

// ============== Tests ==============

#[test]
fn test_import_example_domain() {
    let ctx = TestContext::new();
    ctx.engine.store().insert_domain_if_absent("messages").unwrap();
    let import = ctx.path("import");
    write_file(&import, &messages_fr());

    let report = ctx.engine.import_directory(&import, &()).unwrap();
    assert_eq!(report.files, 1);

    let tree = ctx.engine.domain_tree("messages").unwrap();
    assert_eq!(tree.strings.len(), 2);
    assert_eq!(tree.string("hello").unwrap().translations["fr"], "Bonjour");
    assert_eq!(tree.string("bye").unwrap().translations["fr"], "Au revoir");
    assert!(tree.strings.iter().all(|s| s.translations.len() == 1));

    let before = ctx.engine.store().counts().unwrap();
    ctx.engine.import_directory(&import, &()).unwrap();
    assert_eq!(ctx.engine.store().counts().unwrap(), before);
}

#[test]
fn test_reimport_is_idempotent() {
    let ctx = TestContext::new();
    let import = ctx.path("import");
    write_file(&import, &messages_fr());
    write_file(
        &import,
        &DomainFile::new("messages", "de").with_unit("hello", "Hallo"),
    );

    let first = ctx.engine.import_directory(&import, &()).unwrap();
    assert_eq!(first.metrics.inserted, 3);
    let count = ctx.translation_count();

    // A fresh engine has empty caches and must still find every row.
    let reopened = Engine::open(&ctx.dir.path().join("translations.db")).unwrap();
    let second = reopened.import_directory(&import, &()).unwrap();
    assert_eq!(second.metrics.inserted, 0);
    assert_eq!(second.metrics.updated, 3);
    assert_eq!(reopened.store().counts().unwrap().translations, count);
    assert_eq!(
        reopened.domain_tree("messages").unwrap(),
        ctx.engine.domain_tree("messages").unwrap()
    );
}

#[test]
fn test_same_string_name_in_two_domains() {
    let ctx = TestContext::new();
    ctx.engine
        .import_domain(&DomainFile::new("admin", "fr").with_unit("title", "Administration"))
        .unwrap();
    ctx.engine
        .import_domain(&DomainFile::new("shop", "fr").with_unit("title", "Boutique"))
        .unwrap();
    assert_eq!(ctx.engine.store().counts().unwrap().strings, 2);

    ctx.engine
        .update_translation("shop", "title", "fr", "Magasin")
        .unwrap();

    let admin = ctx.engine.domain_tree("admin").unwrap();
    let shop = ctx.engine.domain_tree("shop").unwrap();
    assert_eq!(admin.string("title").unwrap().translations["fr"], "Administration");
    assert_eq!(shop.string("title").unwrap().translations["fr"], "Magasin");
}

#[test]
fn test_export_then_import_round_trip() {
    let ctx = TestContext::new();
    ctx.engine.import_domain(&messages_fr()).unwrap();
    ctx.engine
        .import_domain(
            &DomainFile::new("messages", "de")
                .with_unit("hello", "Hallo")
                .with_unit("special", "<Grüße> & \"Zitate\""),
        )
        .unwrap();

    let out = ctx.path("export");
    let mut files = ctx.engine.export_domain("messages", &out).unwrap();
    files.sort();
    assert_eq!(
        files,
        vec![out.join("messages.de.xliff"), out.join("messages.fr.xliff")]
    );

    let other = Engine::open_in_memory().unwrap();
    other.add_language("fr", "French").unwrap();
    other.add_language("de", "German").unwrap();
    let report = other.import_directory(&out, &()).unwrap();
    assert_eq!(report.files, 2);

    assert_eq!(
        other.domain_tree("messages").unwrap(),
        ctx.engine.domain_tree("messages").unwrap()
    );
}

#[test]
fn test_domain_names_with_path_separators_stay_in_export_dir() {
    let ctx = TestContext::new();
    for name in ["app/messages", "../escaped", "forms.v2"] {
        ctx.engine
            .import_domain(&DomainFile::new(name, "fr").with_unit("title", name))
            .unwrap();
    }

    let out = ctx.path("export");
    let mut written = Vec::new();
    for name in ["app/messages", "../escaped", "forms.v2"] {
        written.extend(ctx.engine.export_domain(name, &out).unwrap());
    }
    assert_eq!(written.len(), 3);
    for path in &written {
        assert_eq!(path.parent(), Some(out.as_path()), "{}", path.display());
        assert!(path.exists());
    }
    assert!(!ctx.dir.path().join("escaped.fr.xliff").exists());

    let other = Engine::open_in_memory().unwrap();
    other.add_language("fr", "French").unwrap();
    other.import_directory(&out, &()).unwrap();
    assert_eq!(
        other.domain_names().unwrap(),
        vec!["../escaped", "app/messages", "forms.v2"]
    );
    assert_eq!(
        other.domain_tree("app/messages").unwrap(),
        ctx.engine.domain_tree("app/messages").unwrap()
    );
}

#[test]
fn test_export_unknown_domain_is_not_found() {
    let ctx = TestContext::new();
    let err = ctx
        .engine
        .export_domain("nope", &ctx.path("export"))
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_create_then_update() {
    let ctx = TestContext::new();
    ctx.engine.import_domain(&messages_fr()).unwrap();
    let before = ctx.translation_count();

    let created = ctx
        .engine
        .create_or_update_translation("messages", "hello", "de", "Hallo")
        .unwrap();
    assert!(created.created);
    assert_eq!(ctx.translation_count(), before + 1);

    let updated = ctx
        .engine
        .update_translation("messages", "hello", "de", "Guten Tag")
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert!(!updated.created);
    assert_eq!(ctx.translation_count(), before + 1);

    let tree = ctx.engine.domain_tree("messages").unwrap();
    assert_eq!(tree.string("hello").unwrap().translations["de"], "Guten Tag");
}

#[test]
fn test_create_adds_missing_string_but_not_domain() {
    let ctx = TestContext::new();
    ctx.engine.import_domain(&messages_fr()).unwrap();

    ctx.engine
        .create_or_update_translation("messages", "welcome", "fr", "Bienvenue")
        .unwrap();
    assert!(ctx.engine.domain_tree("messages").unwrap().string("welcome").is_some());

    let err = ctx
        .engine
        .create_or_update_translation("unknown", "welcome", "fr", "Bienvenue")
        .unwrap_err();
    assert!(err.is_not_found());
    let err = ctx
        .engine
        .create_or_update_translation("messages", "welcome", "xx", "?")
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(ctx.engine.domain_names().unwrap(), vec!["messages"]);
}

#[test]
fn test_update_requires_existing_translation() {
    let ctx = TestContext::new();
    ctx.engine.import_domain(&messages_fr()).unwrap();
    let before = ctx.engine.store().counts().unwrap();

    for (domain, string, lang) in [
        ("messages", "hello", "de"),
        ("messages", "missing", "fr"),
        ("missing", "hello", "fr"),
        ("messages", "hello", "xx"),
    ] {
        let err = ctx
            .engine
            .update_translation(domain, string, lang, "x")
            .unwrap_err();
        assert!(err.is_not_found(), "{domain}/{string}/{lang}: {err:?}");
    }
    assert_eq!(ctx.engine.store().counts().unwrap(), before);
}

#[test]
fn test_unregistered_language_aborts_run() {
    let ctx = TestContext::new();
    let import = ctx.path("import");
    write_file(&import, &DomainFile::new("a", "fr").with_unit("one", "un"));
    write_file(&import, &DomainFile::new("b", "xx").with_unit("two", "?"));
    write_file(&import, &DomainFile::new("c", "fr").with_unit("three", "trois"));

    let err = ctx.engine.import_directory(&import, &()).unwrap_err();
    assert_eq!(err.files_processed, 1);
    assert!(err.source.is_not_found());
    assert_eq!(err.source.to_string(), "language 'xx' not found");

    // Nothing from the failing file, nothing after it.
    assert_eq!(ctx.engine.domain_names().unwrap(), vec!["a"]);
    assert_eq!(ctx.translation_count(), 1);
}

#[test]
fn test_parse_error_aborts_run() {
    let ctx = TestContext::new();
    let import = ctx.path("import");
    write_file(&import, &DomainFile::new("a", "fr").with_unit("one", "un"));
    std::fs::write(import.join("b.fr.xliff"), "<xliff><file").unwrap();

    let err = ctx.engine.import_directory(&import, &()).unwrap_err();
    assert_eq!(err.files_processed, 1);
    assert!(matches!(err.source, Error::Parse { .. }));
}

#[test]
fn test_concurrent_resolution_of_new_domain() {
    let engine = Arc::new(Engine::open_in_memory().unwrap());
    engine.add_language("fr", "French").unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = engine.clone();
            thread::spawn(move || {
                let file = DomainFile::new("shared", "fr").with_unit("title", format!("t{i}"));
                engine.import_domain(&file).unwrap();
                engine
                    .resolver()
                    .resolve_domain(engine.store(), "shared")
                    .unwrap()
            })
        })
        .collect();

    let ids: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(ids.windows(2).all(|w| w[0] == w[1]));

    let counts = engine.store().counts().unwrap();
    assert_eq!(counts.domains, 1);
    assert_eq!(counts.strings, 1);
    assert_eq!(counts.translations, 1);
}
