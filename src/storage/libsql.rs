//! LibSQL history store
//!
//! Holds a single connection behind an async mutex. Every operation takes
//! the lock, so appends are serialised: ids come out unique and increasing
//! and a record is either fully committed or absent.

use crate::error::{ReposcoreError, Result};
use crate::storage::{check_scores, validate_html_url, HistoryStore};
use crate::types::{
    AnalysisId, AnalysisRecord, AnalysisRecordDraft, RepositoryId, Scores,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{params, Builder, Connection, Database};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Embedded schema, applied idempotently on open
const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS repositories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    html_url TEXT NOT NULL UNIQUE,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS analysis_results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    repository_id INTEGER NOT NULL,
    created_at INTEGER NOT NULL,
    summary TEXT NOT NULL CHECK(length(trim(summary)) > 0),
    strengths TEXT NOT NULL DEFAULT '[]',
    improvements TEXT NOT NULL DEFAULT '[]',
    readme_score INTEGER NOT NULL CHECK(readme_score BETWEEN 0 AND 25),
    test_score INTEGER NOT NULL CHECK(test_score BETWEEN 0 AND 25),
    commit_score INTEGER NOT NULL CHECK(commit_score BETWEEN 0 AND 25),
    cicd_score INTEGER NOT NULL CHECK(cicd_score BETWEEN 0 AND 25),
    FOREIGN KEY (repository_id) REFERENCES repositories(id)
);

CREATE INDEX IF NOT EXISTS idx_analysis_results_repository
    ON analysis_results(repository_id, created_at DESC, id DESC);

CREATE TRIGGER IF NOT EXISTS analysis_results_no_update
BEFORE UPDATE ON analysis_results
BEGIN
    SELECT RAISE(ABORT, 'analysis results are immutable');
END;

CREATE TRIGGER IF NOT EXISTS analysis_results_no_delete
BEFORE DELETE ON analysis_results
BEGIN
    SELECT RAISE(ABORT, 'analysis results are immutable');
END;
"#;

const RECORD_COLUMNS: &str = "id, repository_id, created_at, summary, strengths, improvements, \
     readme_score, test_score, commit_score, cicd_score";

/// Database connection mode
#[derive(Debug, Clone)]
pub enum ConnectionMode {
    /// Local file-based database
    Local(String),
    /// In-memory database (for testing)
    InMemory,
}

impl ConnectionMode {
    /// ":memory:" selects the in-memory mode, anything else is a file path
    pub fn from_path(path: &str) -> Self {
        if path == ":memory:" {
            ConnectionMode::InMemory
        } else {
            ConnectionMode::Local(path.to_string())
        }
    }
}

/// Durable [`HistoryStore`] on libSQL
pub struct LibsqlHistoryStore {
    // Keeps the database handle alive for the connection's lifetime
    _db: Database,
    conn: Mutex<Connection>,
}

impl LibsqlHistoryStore {
    /// Open (creating if needed) a store and apply the schema
    pub async fn open(mode: ConnectionMode) -> Result<Self> {
        info!("Opening history store: {:?}", mode);

        let db = match mode {
            ConnectionMode::Local(ref path) => {
                if let Some(parent) = std::path::Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent).map_err(|e| {
                            ReposcoreError::PersistenceFailure(format!(
                                "Failed to create database directory {}: {}",
                                parent.display(),
                                e
                            ))
                        })?;
                    }
                }

                Builder::new_local(path).build().await.map_err(|e| {
                    ReposcoreError::PersistenceFailure(format!(
                        "Failed to create local database: {}",
                        e
                    ))
                })?
            }
            ConnectionMode::InMemory => {
                Builder::new_local(":memory:").build().await.map_err(|e| {
                    ReposcoreError::PersistenceFailure(format!(
                        "Failed to create in-memory database: {}",
                        e
                    ))
                })?
            }
        };

        let conn = db.connect().map_err(|e| {
            ReposcoreError::PersistenceFailure(format!("Failed to get connection: {}", e))
        })?;

        conn.execute_batch(SCHEMA).await.map_err(|e| {
            ReposcoreError::PersistenceFailure(format!("Failed to apply schema: {}", e))
        })?;

        debug!("History store schema ready");

        Ok(Self {
            _db: db,
            conn: Mutex::new(conn),
        })
    }

    /// Open a store from a configured path string
    pub async fn from_path(path: &str) -> Result<Self> {
        Self::open(ConnectionMode::from_path(path)).await
    }

    fn row_to_record(row: &libsql::Row) -> Result<AnalysisRecord> {
        let created_micros: i64 = row.get(2)?;
        let created_at = DateTime::<Utc>::from_timestamp_micros(created_micros).ok_or_else(|| {
            ReposcoreError::PersistenceFailure(format!(
                "stored timestamp out of range: {}",
                created_micros
            ))
        })?;

        let strengths: String = row.get(4)?;
        let improvements: String = row.get(5)?;

        let scores = Scores::new(row.get(6)?, row.get(7)?, row.get(8)?, row.get(9)?).map_err(
            |e| ReposcoreError::PersistenceFailure(format!("stored record is invalid: {}", e)),
        )?;

        Ok(AnalysisRecord {
            id: AnalysisId(row.get(0)?),
            repository_id: RepositoryId(row.get(1)?),
            created_at,
            summary: row.get(3)?,
            strengths: serde_json::from_str(&strengths)?,
            improvements: serde_json::from_str(&improvements)?,
            scores,
        })
    }

    async fn query_records(
        conn: &Connection,
        sql: &str,
        param: i64,
    ) -> Result<Vec<AnalysisRecord>> {
        let mut rows = conn.query(sql, params![param]).await?;
        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(Self::row_to_record(&row)?);
        }
        Ok(records)
    }
}

#[async_trait]
impl HistoryStore for LibsqlHistoryStore {
    async fn register_repository(&self, html_url: &str) -> Result<RepositoryId> {
        let html_url = validate_html_url(html_url)?;
        let conn = self.conn.lock().await;

        conn.execute(
            "INSERT INTO repositories (html_url, created_at) VALUES (?, ?) \
             ON CONFLICT(html_url) DO NOTHING",
            params![html_url, Utc::now().timestamp_micros()],
        )
        .await?;

        let mut rows = conn
            .query(
                "SELECT id FROM repositories WHERE html_url = ?",
                params![html_url],
            )
            .await?;

        match rows.next().await? {
            Some(row) => {
                let id = RepositoryId(row.get(0)?);
                debug!("Repository {} registered as {}", html_url, id);
                Ok(id)
            }
            None => Err(ReposcoreError::PersistenceFailure(format!(
                "repository {} vanished after insert",
                html_url
            ))),
        }
    }

    async fn append(&self, draft: AnalysisRecordDraft) -> Result<AnalysisRecord> {
        check_scores(&draft)?;
        let repository_id = draft.repository_id;
        let strengths = serde_json::to_string(&draft.evaluation.strengths)?;
        let improvements = serde_json::to_string(&draft.evaluation.improvements)?;

        let conn = self.conn.lock().await;
        let tx = conn.transaction().await?;

        let mut rows = tx
            .query(
                "SELECT 1 FROM repositories WHERE id = ?",
                params![repository_id.0],
            )
            .await?;
        if rows.next().await?.is_none() {
            drop(rows);
            tx.rollback().await?;
            return Err(ReposcoreError::PersistenceFailure(format!(
                "unknown repository {}",
                repository_id
            )));
        }
        drop(rows);

        let mut rows = tx
            .query(
                "SELECT COALESCE(MAX(created_at), 0) FROM analysis_results WHERE repository_id = ?",
                params![repository_id.0],
            )
            .await?;
        let latest_micros: i64 = match rows.next().await? {
            Some(row) => row.get(0)?,
            None => 0,
        };
        drop(rows);

        let created_micros = Utc::now().timestamp_micros().max(latest_micros);
        let scores = draft.evaluation.scores;

        tx.execute(
            r#"
            INSERT INTO analysis_results (
                repository_id, created_at, summary, strengths, improvements,
                readme_score, test_score, commit_score, cicd_score
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                repository_id.0,
                created_micros,
                draft.evaluation.summary.clone(),
                strengths,
                improvements,
                i64::from(scores.readme()),
                i64::from(scores.test()),
                i64::from(scores.commit()),
                i64::from(scores.cicd()),
            ],
        )
        .await?;

        let id = AnalysisId(tx.last_insert_rowid());

        tx.commit().await.map_err(|e| {
            ReposcoreError::PersistenceFailure(format!("Transaction commit failed: {}", e))
        })?;

        let created_at = DateTime::<Utc>::from_timestamp_micros(created_micros).ok_or_else(|| {
            ReposcoreError::PersistenceFailure(format!(
                "timestamp out of range: {}",
                created_micros
            ))
        })?;

        debug!("Analysis {} appended for repository {}", id, repository_id);
        Ok(AnalysisRecord::from_draft(id, created_at, draft))
    }

    async fn latest_for(&self, repository_id: RepositoryId) -> Result<Option<AnalysisRecord>> {
        let conn = self.conn.lock().await;
        let sql = format!(
            "SELECT {} FROM analysis_results WHERE repository_id = ? \
             ORDER BY created_at DESC, id DESC LIMIT 1",
            RECORD_COLUMNS
        );
        let records = Self::query_records(&conn, &sql, repository_id.0).await?;
        Ok(records.into_iter().next())
    }

    async fn all_for(&self, repository_id: RepositoryId) -> Result<Vec<AnalysisRecord>> {
        let conn = self.conn.lock().await;
        let sql = format!(
            "SELECT {} FROM analysis_results WHERE repository_id = ? \
             ORDER BY created_at DESC, id DESC",
            RECORD_COLUMNS
        );
        Self::query_records(&conn, &sql, repository_id.0).await
    }

    async fn count_for(&self, repository_id: RepositoryId) -> Result<u64> {
        let conn = self.conn.lock().await;
        let mut rows = conn
            .query(
                "SELECT COUNT(*) FROM analysis_results WHERE repository_id = ?",
                params![repository_id.0],
            )
            .await?;

        let count: i64 = match rows.next().await? {
            Some(row) => row.get(0)?,
            None => 0,
        };
        Ok(count.max(0) as u64)
    }

    async fn get(&self, id: AnalysisId) -> Result<Option<AnalysisRecord>> {
        let conn = self.conn.lock().await;
        let sql = format!(
            "SELECT {} FROM analysis_results WHERE id = ?",
            RECORD_COLUMNS
        );
        let records = Self::query_records(&conn, &sql, id.0).await?;
        Ok(records.into_iter().next())
    }
}
