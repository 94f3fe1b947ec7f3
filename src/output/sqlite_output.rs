//! SQLite report sink
//!
//! Each report becomes one row in `reports`, with its words and hosts in
//! child tables. Reports accumulate, so successive crawls can be compared.

use crate::output::traits::{CrawlReport, OutputError, OutputResult, ReportSink};
use crate::state::LongestPage;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// SQL schema for the report database
pub const REPORT_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS reports (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    generated_at TEXT NOT NULL,
    config_hash TEXT,
    unique_pages INTEGER NOT NULL,
    longest_url TEXT,
    longest_word_count INTEGER
);

CREATE TABLE IF NOT EXISTS report_words (
    report_id INTEGER NOT NULL REFERENCES reports(id),
    position INTEGER NOT NULL,
    word TEXT NOT NULL,
    count INTEGER NOT NULL,
    PRIMARY KEY (report_id, position)
);

CREATE TABLE IF NOT EXISTS report_hosts (
    report_id INTEGER NOT NULL REFERENCES reports(id),
    host TEXT NOT NULL,
    count INTEGER NOT NULL,
    PRIMARY KEY (report_id, host)
);
"#;

/// A report read back from the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredReport {
    pub id: i64,
    pub generated_at: DateTime<Utc>,
    pub config_hash: Option<String>,
    pub report: CrawlReport,
}

/// Report sink writing to a SQLite database file
#[derive(Debug, Clone)]
pub struct SqliteReportSink {
    path: PathBuf,
    config_hash: Option<String>,
}

impl SqliteReportSink {
    /// Creates a sink for the database at `path`
    ///
    /// The file and schema are created on first write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            config_hash: None,
        }
    }

    /// Records the hash of the configuration the crawl ran with
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }
}

/// Opens (or creates) the report database and ensures the schema exists
fn open_database(path: &Path) -> Result<Connection, rusqlite::Error> {
    let conn = Connection::open(path)?;

    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
    ",
    )?;
    conn.execute_batch(REPORT_SCHEMA_SQL)?;

    Ok(conn)
}

impl ReportSink for SqliteReportSink {
    fn write_report(&self, report: &CrawlReport) -> OutputResult<()> {
        let mut conn = open_database(&self.path)?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO reports (generated_at, config_hash, unique_pages, longest_url, longest_word_count)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                Utc::now().to_rfc3339(),
                self.config_hash,
                report.unique_pages as i64,
                report.longest_page.as_ref().map(|p| p.url.as_str()),
                report.longest_page.as_ref().map(|p| p.word_count as i64),
            ],
        )?;
        let report_id = tx.last_insert_rowid();

        {
            let mut insert_word = tx.prepare(
                "INSERT INTO report_words (report_id, position, word, count) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (position, (word, count)) in report.top_words.iter().enumerate() {
                insert_word.execute(params![report_id, position as i64, word, *count as i64])?;
            }

            let mut insert_host = tx.prepare(
                "INSERT INTO report_hosts (report_id, host, count) VALUES (?1, ?2, ?3)",
            )?;
            for (host, count) in &report.hosts {
                insert_host.execute(params![report_id, host, *count as i64])?;
            }
        }

        tx.commit()?;
        tracing::info!(
            "Crawl report {} stored in {}",
            report_id,
            self.path.display()
        );
        Ok(())
    }
}

/// Loads the most recently written report, if any
pub fn load_latest_report(path: &Path) -> OutputResult<Option<StoredReport>> {
    let conn = open_database(path)?;

    let row = conn
        .query_row(
            "SELECT id, generated_at, config_hash, unique_pages, longest_url, longest_word_count
             FROM reports ORDER BY id DESC LIMIT 1",
            [],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<i64>>(5)?,
                ))
            },
        )
        .optional()?;

    let Some((id, generated_at, config_hash, unique_pages, longest_url, longest_count)) = row
    else {
        return Ok(None);
    };

    let generated_at = generated_at
        .parse::<DateTime<Utc>>()
        .map_err(|e| OutputError::Write(format!("Bad report timestamp: {}", e)))?;

    let mut words_stmt =
        conn.prepare("SELECT word, count FROM report_words WHERE report_id = ?1 ORDER BY position")?;
    let top_words = words_stmt
        .query_map(params![id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut hosts_stmt =
        conn.prepare("SELECT host, count FROM report_hosts WHERE report_id = ?1 ORDER BY host")?;
    let hosts = hosts_stmt
        .query_map(params![id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let longest_page = match (longest_url, longest_count) {
        (Some(url), Some(count)) => Some(LongestPage {
            url,
            word_count: count as usize,
        }),
        _ => None,
    };

    Ok(Some(StoredReport {
        id,
        generated_at,
        config_hash,
        report: CrawlReport {
            unique_pages: unique_pages as usize,
            longest_page,
            top_words,
            hosts,
        },
    }))
}
