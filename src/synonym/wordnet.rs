//! Japanese WordNet (`wnjpn.db`) synonym lookup
//!
//! Uses two tables of the database:
//! `word(wordid, lang, lemma, ...)` and `sense(synset, wordid, lang, ...)`.
//! The synonyms of a lemma are the Japanese words sharing a synset with it.

use super::SynonymLookup;
use crate::storage::StorageResult;
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;
use std::sync::Mutex;

pub struct WordNetSynonyms {
    conn: Mutex<Connection>,
}

impl WordNetSynonyms {
    /// Open an existing database read-only
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lookup(&self, lemma: &str) -> rusqlite::Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();

        // A lemma can have several rows; the last one wins
        let mut stmt = conn.prepare_cached("SELECT wordid FROM word WHERE lemma = ?1")?;
        let word_ids = stmt
            .query_map(params![lemma], |row| row.get::<_, i64>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        let Some(&word_id) = word_ids.last() else {
            return Ok(Vec::new());
        };

        let mut stmt = conn.prepare_cached("SELECT synset FROM sense WHERE wordid = ?1")?;
        let synsets = stmt
            .query_map(params![word_id], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare_cached(
            "SELECT w.lemma FROM sense s JOIN word w ON w.wordid = s.wordid \
             WHERE s.synset = ?1 AND s.wordid != ?2 AND s.lang = 'jpn'",
        )?;
        let mut synonyms = Vec::new();
        for synset in &synsets {
            let lemmas = stmt.query_map(params![synset, word_id], |row| row.get::<_, String>(0))?;
            for lemma in lemmas {
                synonyms.push(lemma?);
            }
        }
        Ok(synonyms)
    }
}

impl SynonymLookup for WordNetSynonyms {
    fn synonyms_of(&self, lemma: &str) -> Vec<String> {
        match self.lookup(lemma) {
            Ok(synonyms) => synonyms,
            Err(e) => {
                tracing::debug!(lemma, error = %e, "wordnet lookup failed");
                Vec::new()
            }
        }
    }
}
