use chrono::{DateTime, Utc};
use log::{error, info, warn};
use rusqlite::{params, Connection, Row};
use std::path::Path;

/// Longest name accepted on the leaderboard
pub const MAX_NAME_CHARS: usize = 12;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("score database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("could not prepare score database location: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid name: {0}")]
    InvalidName(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// A persisted leaderboard entry
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRecord {
    pub id: i64,
    pub name: String,
    pub score: i64,
    pub level: u8,
    pub created_at: DateTime<Utc>,
}

/// Insert payload; `id` and `created_at` are assigned by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScore {
    pub name: String,
    pub score: i64,
    pub level: u8,
}

/// Trims the name and checks it fits the leaderboard
pub fn validate_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(StoreError::InvalidName("name must not be empty".into()));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(StoreError::InvalidName(format!(
            "name must be at most {MAX_NAME_CHARS} characters"
        )));
    }
    Ok(name.to_string())
}

/// The two operations the game needs from the shared score table
pub trait ScoreStore {
    fn insert(&self, score: &NewScore) -> Result<ScoreRecord>;

    /// Highest scores first; ties go to the older record
    fn top_scores(&self, level: Option<u8>, limit: usize) -> Result<Vec<ScoreRecord>>;
}

impl<S: ScoreStore + ?Sized> ScoreStore for Box<S> {
    fn insert(&self, score: &NewScore) -> Result<ScoreRecord> {
        (**self).insert(score)
    }

    fn top_scores(&self, level: Option<u8>, limit: usize) -> Result<Vec<ScoreRecord>> {
        (**self).top_scores(level, limit)
    }
}

const CREATE_SCORES_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS scores (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        score INTEGER NOT NULL,
        level INTEGER NOT NULL,
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
    )
"#;

/// SQLite-backed score table, shareable between players through a common file
#[derive(Debug)]
pub struct SqliteScoreStore {
    conn: Connection,
}

impl SqliteScoreStore {
    /// Open (and create if needed) the database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(CREATE_SCORES_TABLE, [])?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_scores_level_score ON scores(level, score DESC)",
            [],
        )?;
        Ok(Self { conn })
    }

    fn record_from_row(row: &Row) -> rusqlite::Result<ScoreRecord> {
        let created_at_str: String = row.get(4)?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|_| {
                rusqlite::Error::InvalidColumnType(
                    4,
                    "created_at".to_string(),
                    rusqlite::types::Type::Text,
                )
            })?
            .with_timezone(&Utc);

        Ok(ScoreRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            score: row.get(2)?,
            level: row.get(3)?,
            created_at,
        })
    }
}

impl ScoreStore for SqliteScoreStore {
    fn insert(&self, score: &NewScore) -> Result<ScoreRecord> {
        self.conn.execute(
            "INSERT INTO scores (name, score, level) VALUES (?1, ?2, ?3)",
            params![score.name, score.score, score.level],
        )?;
        let id = self.conn.last_insert_rowid();

        let record = self.conn.query_row(
            "SELECT id, name, score, level, created_at FROM scores WHERE id = ?1",
            [id],
            Self::record_from_row,
        )?;
        Ok(record)
    }

    fn top_scores(&self, level: Option<u8>, limit: usize) -> Result<Vec<ScoreRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, score, level, created_at
            FROM scores
            WHERE ?1 IS NULL OR level = ?1
            ORDER BY score DESC, created_at ASC, id ASC
            LIMIT ?2
            "#,
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![level, limit], Self::record_from_row)?;

        let mut records = Vec::new();
        for record in rows {
            records.push(record?);
        }
        Ok(records)
    }
}

/// Client-side view of the leaderboard: wraps a store and keeps the last good fetch
#[derive(Debug)]
pub struct Leaderboard<S: ScoreStore> {
    store: S,
    cached: Vec<ScoreRecord>,
    limit: usize,
}

impl<S: ScoreStore> Leaderboard<S> {
    pub fn new(store: S, limit: usize) -> Self {
        Self {
            store,
            cached: Vec::new(),
            limit,
        }
    }

    pub fn scores(&self) -> &[ScoreRecord] {
        &self.cached
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Refresh the cache; on failure the previous list stays in place
    pub fn fetch_top_scores(&mut self, level: Option<u8>) -> &[ScoreRecord] {
        match self.store.top_scores(level, self.limit) {
            Ok(records) => self.cached = records,
            Err(e) => warn!("error fetching scores: {e}"),
        }
        &self.cached
    }

    /// Persist one score, then refresh the cached list for that level
    pub fn submit_score(&mut self, name: &str, score: i64, level: u8) -> Result<ScoreRecord> {
        let name = validate_name(name)?;
        let record = self
            .store
            .insert(&NewScore { name, score, level })
            .map_err(|e| {
                error!("error saving score: {e}");
                e
            })?;
        info!(
            "saved score {} for {} on level {}",
            record.score, record.name, record.level
        );
        self.fetch_top_scores(Some(level));
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::cell::Cell;

    fn seeded_store() -> SqliteScoreStore {
        let store = SqliteScoreStore::open_in_memory().unwrap();
        for (name, score, level) in [("bo", 10, 1), ("cy", 50, 1), ("di", 99, 2), ("ed", 30, 1)] {
            store
                .insert(&NewScore {
                    name: name.into(),
                    score,
                    level,
                })
                .unwrap();
        }
        store
    }

    /// Serves one good fetch, then fails everything
    struct FlakyStore {
        inner: SqliteScoreStore,
        healthy: Cell<bool>,
    }

    impl ScoreStore for FlakyStore {
        fn insert(&self, score: &NewScore) -> Result<ScoreRecord> {
            if self.healthy.get() {
                self.inner.insert(score)
            } else {
                Err(StoreError::Database(rusqlite::Error::QueryReturnedNoRows))
            }
        }

        fn top_scores(&self, level: Option<u8>, limit: usize) -> Result<Vec<ScoreRecord>> {
            if self.healthy.get() {
                self.inner.top_scores(level, limit)
            } else {
                Err(StoreError::Database(rusqlite::Error::QueryReturnedNoRows))
            }
        }
    }

    #[test]
    fn test_insert_assigns_id_and_timestamp() {
        let store = SqliteScoreStore::open_in_memory().unwrap();
        let before = Utc::now() - chrono::Duration::seconds(1);
        let record = store
            .insert(&NewScore {
                name: "Ada".into(),
                score: 42,
                level: 1,
            })
            .unwrap();
        assert!(record.id > 0);
        assert_eq!(record.name, "Ada");
        assert_eq!(record.score, 42);
        assert_eq!(record.level, 1);
        assert!(record.created_at >= before);
    }

    #[test]
    fn test_top_scores_orders_descending_and_filters_level() {
        let store = seeded_store();

        let all: Vec<i64> = store
            .top_scores(None, 10)
            .unwrap()
            .iter()
            .map(|r| r.score)
            .collect();
        assert_eq!(all, vec![99, 50, 30, 10]);

        let level_one = store.top_scores(Some(1), 10).unwrap();
        assert_eq!(level_one.len(), 3);
        assert!(level_one.iter().all(|r| r.level == 1));

        let top_two = store.top_scores(Some(1), 2).unwrap();
        assert_eq!(top_two.len(), 2);
        assert_eq!(top_two[0].name, "cy");
        assert_eq!(top_two[1].name, "ed");
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let store = SqliteScoreStore::open_in_memory().unwrap();
        for name in ["first", "second"] {
            store
                .insert(&NewScore {
                    name: name.into(),
                    score: 5,
                    level: 3,
                })
                .unwrap();
        }
        let names: Vec<String> = store
            .top_scores(Some(3), 10)
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  Ada ").unwrap(), "Ada");
        assert_eq!(validate_name("abcdefghijkl").unwrap(), "abcdefghijkl");
        assert_matches!(validate_name("   "), Err(StoreError::InvalidName(_)));
        assert_matches!(validate_name("abcdefghijklm"), Err(StoreError::InvalidName(_)));
    }

    #[test]
    fn test_submit_score_refreshes_cache() {
        let mut board = Leaderboard::new(seeded_store(), 10);
        let record = board.submit_score("Ada", 42, 1).unwrap();
        assert_eq!(record.name, "Ada");

        let names: Vec<&str> = board.scores().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["cy", "Ada", "ed", "bo"]);
        assert_eq!(board.scores().iter().filter(|r| r.name == "Ada").count(), 1);
    }

    #[test]
    fn test_submit_rejects_bad_name_without_insert() {
        let mut board = Leaderboard::new(SqliteScoreStore::open_in_memory().unwrap(), 10);
        assert_matches!(board.submit_score("", 5, 1), Err(StoreError::InvalidName(_)));
        assert!(board.fetch_top_scores(None).is_empty());
    }

    #[test]
    fn test_fetch_failure_keeps_previous_list() {
        let store = FlakyStore {
            inner: seeded_store(),
            healthy: Cell::new(true),
        };
        let mut board = Leaderboard::new(store, 10);
        assert_eq!(board.fetch_top_scores(Some(1)).len(), 3);

        board.store.healthy.set(false);
        let stale = board.fetch_top_scores(Some(2));
        assert_eq!(stale.len(), 3);
        assert!(stale.iter().all(|r| r.level == 1));
    }

    #[test]
    fn test_submit_failure_is_reported() {
        let store = FlakyStore {
            inner: seeded_store(),
            healthy: Cell::new(false),
        };
        let mut board = Leaderboard::new(store, 10);
        assert_matches!(board.submit_score("Ada", 1, 1), Err(StoreError::Database(_)));
        assert!(board.scores().is_empty());
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("scores.db");
        let store = SqliteScoreStore::open(&path).unwrap();
        store
            .insert(&NewScore {
                name: "x".into(),
                score: 1,
                level: 1,
            })
            .unwrap();
        assert!(path.exists());
    }
}
