//! SQLite-backed parse cache

use super::traits::{cache_key, OpenStore, ParseCache, StorageResult};
use crate::parse::ParsedSentence;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// Parse cache stored in a single SQLite table
///
/// Rows are keyed by [`cache_key`] of the sentence; the payload is the
/// JSON-serialized [`ParsedSentence`].
pub struct SqliteParseCache {
    conn: Mutex<Connection>,
}

impl SqliteParseCache {
    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS parsed (
                id TEXT PRIMARY KEY,
                result TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            -- Several workers share one file
            PRAGMA journal_mode = WAL;
            "#,
        )?;
        Ok(())
    }

    /// Drop every cached parse
    pub fn clear(&self) -> StorageResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM parsed", [])?;
        Ok(())
    }
}

impl OpenStore for SqliteParseCache {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl ParseCache for SqliteParseCache {
    fn get(&self, sentence: &str) -> StorageResult<Option<ParsedSentence>> {
        let conn = self.conn.lock().unwrap();
        let json: Option<String> = conn
            .query_row(
                "SELECT result FROM parsed WHERE id = ?1",
                params![cache_key(sentence)],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn put(&self, sentence: &str, parsed: &ParsedSentence) -> StorageResult<()> {
        let json = serde_json::to_string(parsed)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO parsed (id, result, created_at) VALUES (?1, ?2, ?3)",
            params![cache_key(sentence), json, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn len(&self) -> StorageResult<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM parsed", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{Chunk, ChunkKind, PredicateTag};

    fn sample() -> ParsedSentence {
        ParsedSentence::new()
            .with_chunk(Chunk::new("熊", "熊が", ChunkKind::Noun).with_parent(1))
            .with_chunk(Chunk::new("泳ぐ", "泳ぐ", ChunkKind::Verb))
            .with_predicate(PredicateTag::new("泳ぐ").with_argument("ガ", "熊"))
    }

    #[test]
    fn missing_entry_is_none() {
        let cache = SqliteParseCache::open_in_memory().unwrap();
        assert!(cache.get("熊が泳ぐ").unwrap().is_none());
        assert!(cache.is_empty().unwrap());
    }

    #[test]
    fn stores_and_loads_parse() {
        let cache = SqliteParseCache::open_in_memory().unwrap();
        cache.put("熊が泳ぐ", &sample()).unwrap();
        assert_eq!(cache.get("熊が泳ぐ").unwrap(), Some(sample()));
    }

    #[test]
    fn repeated_put_is_idempotent() {
        let cache = SqliteParseCache::open_in_memory().unwrap();
        cache.put("熊が泳ぐ", &sample()).unwrap();
        cache.put("熊が泳ぐ", &sample()).unwrap();
        assert_eq!(cache.len().unwrap(), 1);

        cache.put("熊が泳ぐ", &ParsedSentence::new()).unwrap();
        assert_eq!(cache.len().unwrap(), 1);
        assert_eq!(cache.get("熊が泳ぐ").unwrap(), Some(ParsedSentence::new()));
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("parse-cache.db");

        {
            let cache = SqliteParseCache::open(&path).unwrap();
            cache.put("熊が泳ぐ", &sample()).unwrap();
        }

        let cache = SqliteParseCache::open(&path).unwrap();
        assert_eq!(cache.get("熊が泳ぐ").unwrap(), Some(sample()));
    }

    #[test]
    fn wal_mode_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SqliteParseCache::open(dir.path().join("wal.db")).unwrap();
        let conn = cache.conn.lock().unwrap();
        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode, "wal");
    }

    #[test]
    fn clear_removes_everything() {
        let cache = SqliteParseCache::open_in_memory().unwrap();
        cache.put("a", &sample()).unwrap();
        cache.put("b", &sample()).unwrap();
        cache.clear().unwrap();
        assert!(cache.is_empty().unwrap());
    }
}
