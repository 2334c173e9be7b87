//! SQLite schema.

/// Tables and indexes. Idempotent.
pub(crate) const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS language (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    code TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS domain (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS string (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    domain_id INTEGER NOT NULL,
    UNIQUE (name, domain_id),
    FOREIGN KEY (domain_id) REFERENCES domain(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS translation (
    id INTEGER PRIMARY KEY,
    string_id INTEGER NOT NULL,
    language_id INTEGER NOT NULL,
    content TEXT NOT NULL,
    UNIQUE (string_id, language_id),
    FOREIGN KEY (string_id) REFERENCES string(id) ON DELETE CASCADE,
    FOREIGN KEY (language_id) REFERENCES language(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_string_domain ON string(domain_id);
CREATE INDEX IF NOT EXISTS idx_translation_language ON translation(language_id);
"#;
