use rusqlite::{params, Connection, OptionalExtension};
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::metrics::TestResult;

pub const PERSONAL_BEST_KEY: &str = "typingTest_personalBest";
pub const HISTORY_KEY: &str = "typingTest_history";

/// Maximum number of results kept in the history, newest first
pub const HISTORY_LIMIT: usize = 10;

/// Key/value persistence for finished results
pub trait RecordStore {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&mut self, key: &str, value: &str) -> Result<()>;
}

/// SQLite-backed record store with a single `records` table
#[derive(Debug)]
pub struct SqliteRecordStore {
    conn: Connection,
}

impl SqliteRecordStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;
        Ok(Self { conn })
    }
}

impl RecordStore for SqliteRecordStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM records WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO records (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
            "#,
            params![key, value],
        )?;
        Ok(())
    }
}

/// Keeps the personal best and a bounded, newest-first history of results
#[derive(Debug)]
pub struct ResultRecorder<S: RecordStore> {
    store: S,
    personal_best: Option<TestResult>,
    history: Vec<TestResult>,
}

impl<S: RecordStore> ResultRecorder<S> {
    /// Load both records from `store`. Missing, unreadable or corrupt records
    /// start out empty.
    pub fn restore(store: S) -> Self {
        let personal_best = load_record::<TestResult, _>(&store, PERSONAL_BEST_KEY);
        let mut history = load_record::<Vec<TestResult>, _>(&store, HISTORY_KEY).unwrap_or_default();
        history.truncate(HISTORY_LIMIT);

        Self {
            store,
            personal_best,
            history,
        }
    }

    pub fn personal_best(&self) -> Option<&TestResult> {
        self.personal_best.as_ref()
    }

    pub fn history(&self) -> &[TestResult] {
        &self.history
    }

    /// Record a finished result. Returns true when it became the new personal best.
    pub fn record(&mut self, result: &TestResult) -> Result<bool> {
        let is_best = self
            .personal_best
            .as_ref()
            .map_or(true, |best| result.wpm > best.wpm);

        let mut history = Vec::with_capacity(HISTORY_LIMIT);
        history.push(result.clone());
        history.extend(self.history.iter().take(HISTORY_LIMIT - 1).cloned());

        // in-memory records only change once the store has both
        if is_best {
            self.store
                .save(PERSONAL_BEST_KEY, &serde_json::to_string(result)?)?;
        }
        self.store
            .save(HISTORY_KEY, &serde_json::to_string(&history)?)?;

        if is_best {
            self.personal_best = Some(result.clone());
            tracing::info!(wpm = result.wpm, "new personal best");
        }
        self.history = history;

        Ok(is_best)
    }
}

fn load_record<T, S>(store: &S, key: &str) -> Option<T>
where
    T: serde::de::DeserializeOwned,
    S: RecordStore,
{
    let raw = match store.load(key) {
        Ok(raw) => raw?,
        Err(err) => {
            tracing::warn!(key, %err, "could not read record");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(key, %err, "discarding corrupt record");
            None
        }
    }
}

/// Write `history` as CSV, one row per result
pub fn export_history_csv<W: Write>(history: &[TestResult], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        "timestamp",
        "wpm",
        "accuracy",
        "time",
        "errors",
        "raw_wpm",
        "net_wpm",
        "consistency",
    ])?;

    for result in history {
        wtr.write_record(&[
            result.timestamp.to_rfc3339(),
            result.wpm.to_string(),
            result.accuracy.to_string(),
            format!("{:.1}", result.time),
            result.errors.to_string(),
            result.raw_wpm.to_string(),
            result.net_wpm.to_string(),
            result.consistency.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
