//! Relational store.
//!
//! A single SQLite connection guarded by a mutex. Every method runs one
//! statement (or one statement pair for the insert-if-absent helpers) while
//! holding the lock, so statements from concurrent flows are serialized but
//! no transaction ever spans more than a single call.

mod schema;

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{DomainTree, Language, RowId, StringEntry, Translation};

/// SQLite-backed translation store.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) a database file and apply the schema.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        let mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.execute_batch(schema::SCHEMA)?;
        debug!(journal_mode = %mode, "store initialized");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run `f` against the locked connection.
    pub fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.conn.lock();
        f(&conn)
    }

    // -------------------------------------------------------------------------
    // Languages
    // -------------------------------------------------------------------------

    /// Find a language by code.
    pub fn find_language(&self, code: &str) -> Result<Option<Language>> {
        self.with_connection(|conn| {
            conn.query_row(
                "SELECT id, name, code FROM language WHERE code = ?1",
                [code],
                |row| {
                    Ok(Language {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        code: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(Error::from)
        })
    }

    /// Register a language. Fails with `Conflict` if the code is taken.
    pub fn add_language(&self, code: &str, name: &str) -> Result<Language> {
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO language (name, code) VALUES (?1, ?2)",
                params![name, code],
            )?;
            Ok(Language {
                id: conn.last_insert_rowid(),
                name: name.to_string(),
                code: code.to_string(),
            })
        })
    }

    /// All languages ordered by code.
    pub fn list_languages(&self) -> Result<Vec<Language>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare("SELECT id, name, code FROM language ORDER BY code")?;
            let rows = stmt.query_map([], |row| {
                Ok(Language {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    code: row.get(2)?,
                })
            })?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(Error::from)
        })
    }

    // -------------------------------------------------------------------------
    // Domains
    // -------------------------------------------------------------------------

    /// Find a domain id by name.
    pub fn find_domain_id(&self, name: &str) -> Result<Option<RowId>> {
        self.with_connection(|conn| {
            conn.query_row("SELECT id FROM domain WHERE name = ?1", [name], |row| row.get(0))
                .optional()
                .map_err(Error::from)
        })
    }

    /// Create the domain unless it exists, returning its id either way.
    pub fn insert_domain_if_absent(&self, name: &str) -> Result<RowId> {
        self.with_connection(|conn| {
            let inserted = conn.execute(
                "INSERT INTO domain (name) VALUES (?1) ON CONFLICT (name) DO NOTHING",
                [name],
            )?;
            if inserted == 1 {
                debug!(domain = name, "domain created");
                return Ok(conn.last_insert_rowid());
            }
            conn.query_row("SELECT id FROM domain WHERE name = ?1", [name], |row| row.get(0))
                .map_err(Error::from)
        })
    }

    /// All domain names, sorted.
    pub fn list_domains(&self) -> Result<Vec<String>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare("SELECT name FROM domain ORDER BY name")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            rows.collect::<rusqlite::Result<Vec<String>>>()
                .map_err(Error::from)
        })
    }

    /// Read every string of a domain along with all of its translations.
    pub fn load_domain_tree(&self, domain_id: RowId, name: &str) -> Result<DomainTree> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT s.name, l.code, t.content
                FROM string s
                LEFT JOIN translation t ON t.string_id = s.id
                LEFT JOIN language l ON l.id = t.language_id
                WHERE s.domain_id = ?1
                ORDER BY s.name, l.code
                "#,
            )?;
            let mut rows = stmt.query([domain_id])?;

            let mut strings: Vec<StringEntry> = Vec::new();
            while let Some(row) = rows.next()? {
                let string_name: String = row.get(0)?;
                let code: Option<String> = row.get(1)?;
                let content: Option<String> = row.get(2)?;

                if strings.last().map(|s| s.name != string_name).unwrap_or(true) {
                    strings.push(StringEntry {
                        name: string_name,
                        translations: Default::default(),
                    });
                }
                if let (Some(code), Some(content), Some(entry)) = (code, content, strings.last_mut())
                {
                    entry.translations.insert(code, content);
                }
            }

            Ok(DomainTree {
                name: name.to_string(),
                strings,
            })
        })
    }

    // -------------------------------------------------------------------------
    // Strings
    // -------------------------------------------------------------------------

    /// Find a string id by name within a domain.
    pub fn find_string_id(&self, name: &str, domain_id: RowId) -> Result<Option<RowId>> {
        self.with_connection(|conn| {
            conn.query_row(
                "SELECT id FROM string WHERE name = ?1 AND domain_id = ?2",
                params![name, domain_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(Error::from)
        })
    }

    /// Create the string unless it exists in the domain, returning its id either way.
    pub fn insert_string_if_absent(&self, name: &str, domain_id: RowId) -> Result<RowId> {
        self.with_connection(|conn| {
            let inserted = conn.execute(
                "INSERT INTO string (name, domain_id) VALUES (?1, ?2) \
                 ON CONFLICT (name, domain_id) DO NOTHING",
                params![name, domain_id],
            )?;
            if inserted == 1 {
                return Ok(conn.last_insert_rowid());
            }
            conn.query_row(
                "SELECT id FROM string WHERE name = ?1 AND domain_id = ?2",
                params![name, domain_id],
                |row| row.get(0),
            )
            .map_err(Error::from)
        })
    }

    // -------------------------------------------------------------------------
    // Translations
    // -------------------------------------------------------------------------

    /// Find the translation of a string in a language.
    pub fn find_translation(
        &self,
        string_id: RowId,
        language_id: RowId,
    ) -> Result<Option<Translation>> {
        self.with_connection(|conn| {
            conn.query_row(
                "SELECT id, string_id, language_id, content FROM translation \
                 WHERE string_id = ?1 AND language_id = ?2",
                params![string_id, language_id],
                translation_from_row,
            )
            .optional()
            .map_err(Error::from)
        })
    }

    /// Fetch a translation by id.
    pub fn get_translation(&self, id: RowId) -> Result<Option<Translation>> {
        self.with_connection(|conn| {
            conn.query_row(
                "SELECT id, string_id, language_id, content FROM translation WHERE id = ?1",
                [id],
                translation_from_row,
            )
            .optional()
            .map_err(Error::from)
        })
    }

    /// Insert a translation unless the string already has one in the
    /// language. Returns the row id and whether this call created it; an
    /// existing row is left untouched.
    pub fn insert_translation_if_absent(
        &self,
        string_id: RowId,
        language_id: RowId,
        content: &str,
    ) -> Result<(RowId, bool)> {
        self.with_connection(|conn| {
            let inserted = conn.execute(
                "INSERT INTO translation (string_id, language_id, content) VALUES (?1, ?2, ?3) \
                 ON CONFLICT (string_id, language_id) DO NOTHING",
                params![string_id, language_id, content],
            )?;
            if inserted == 1 {
                return Ok((conn.last_insert_rowid(), true));
            }
            let id = conn.query_row(
                "SELECT id FROM translation WHERE string_id = ?1 AND language_id = ?2",
                params![string_id, language_id],
                |row| row.get(0),
            )?;
            Ok((id, false))
        })
    }

    /// Overwrite the content of a translation, leaving its associations alone.
    pub fn update_translation_content(&self, id: RowId, content: &str) -> Result<()> {
        self.with_connection(|conn| {
            let updated = conn.execute(
                "UPDATE translation SET content = ?1 WHERE id = ?2",
                params![content, id],
            )?;
            if updated == 0 {
                return Err(Error::NotFound(format!("translation {id}")));
            }
            Ok(())
        })
    }

    // -------------------------------------------------------------------------
    // Statistics
    // -------------------------------------------------------------------------

    /// Row counts per table.
    pub fn counts(&self) -> Result<StoreCounts> {
        self.with_connection(|conn| {
            let count = |table: &str| -> rusqlite::Result<usize> {
                conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get::<_, i64>(0)
                })
                .map(|n| n as usize)
            };
            Ok(StoreCounts {
                languages: count("language")?,
                domains: count("domain")?,
                strings: count("string")?,
                translations: count("translation")?,
            })
        })
    }
}

/// Number of rows in each table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounts {
    pub languages: usize,
    pub domains: usize,
    pub strings: usize,
    pub translations: usize,
}

fn translation_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Translation> {
    Ok(Translation {
        id: row.get(0)?,
        string_id: row.get(1)?,
        language_id: row.get(2)?,
        content: row.get(3)?,
    })
}
