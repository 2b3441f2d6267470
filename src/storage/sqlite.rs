//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ArticleStore
//! trait. A single connection is shared behind a mutex; adapters write short
//! batches, so contention stays low.

use crate::article::Article;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ArticleStore, StorageError, StorageResult};
use crate::storage::{InsertOutcome, RunRecord, RunStatus, SearchQuery, UpsertAction, UpsertCounts};
use chrono::{DateTime, Duration, NaiveTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, ToSql};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const ARTICLE_COLUMNS: &str = "title, link, source, scraped_at, published_at, summary, category";

const UPSERT_SQL: &str = "
    INSERT INTO articles (title, link, source, scraped_at, published_at, summary, category)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
    ON CONFLICT(link) DO UPDATE SET
        title = excluded.title,
        source = excluded.source,
        scraped_at = excluded.scraped_at,
        published_at = excluded.published_at,
        summary = excluded.summary,
        category = excluded.category
    WHERE excluded.published_at IS NULL
       OR articles.published_at IS NULL
       OR excluded.published_at >= articles.published_at
";

/// SQLite article store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens or creates a database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            PRAGMA busy_timeout = 5000;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Database("connection lock poisoned".to_string()))
    }

    fn query_articles(
        &self,
        sql: &str,
        params: &[&dyn ToSql],
    ) -> StorageResult<Vec<Article>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, ArticleRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(ArticleRow::into_article).collect()
    }
}

impl ArticleStore for SqliteStore {
    // ===== Writes =====

    fn insert_ignore(&self, articles: &[Article]) -> StorageResult<Vec<InsertOutcome>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "INSERT INTO articles ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            ARTICLE_COLUMNS
        ))?;

        let outcomes = articles
            .iter()
            .map(|article| {
                let scraped_at = to_db_time(&article.scraped_at);
                let published_at = article.published_at.as_ref().map(to_db_time);
                match stmt.execute(params![
                    article.title,
                    article.link,
                    article.source,
                    scraped_at,
                    published_at,
                    article.summary,
                    article.category,
                ]) {
                    Ok(_) => InsertOutcome::Inserted,
                    Err(e) if is_unique_violation(&e) => InsertOutcome::Duplicate,
                    Err(e) => InsertOutcome::Failed(e.to_string()),
                }
            })
            .collect();

        Ok(outcomes)
    }

    fn upsert_batch(&self, articles: &[Article]) -> StorageResult<UpsertCounts> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let mut counts = UpsertCounts::default();
        for article in articles {
            counts.record(upsert_article(&tx, article)?);
        }

        tx.commit()?;
        Ok(counts)
    }

    fn upsert_one(&self, article: &Article) -> StorageResult<UpsertAction> {
        let conn = self.lock()?;
        Ok(upsert_article(&conn, article)?)
    }

    fn delete_scraped_before(&self, cutoff: DateTime<Utc>) -> StorageResult<u64> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM articles WHERE scraped_at < ?1",
            params![to_db_time(&cutoff)],
        )?;
        Ok(deleted as u64)
    }

    // ===== Queries =====

    fn get_by_link(&self, link: &str) -> StorageResult<Option<Article>> {
        let row = {
            let conn = self.lock()?;
            conn.query_row(
                &format!("SELECT {} FROM articles WHERE link = ?1", ARTICLE_COLUMNS),
                params![link],
                ArticleRow::from_row,
            )
            .optional()?
        };
        row.map(ArticleRow::into_article).transpose()
    }

    fn count_articles(&self) -> StorageResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_by_source(&self) -> StorageResult<Vec<(String, u64)>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT source, COUNT(*) FROM articles GROUP BY source ORDER BY source")?;
        let counts = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(counts)
    }

    fn latest(&self, now: DateTime<Utc>, limit: usize) -> StorageResult<Vec<Article>> {
        let start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        let end = start + Duration::days(1);
        let limit = limit as i64;

        let today = self.query_articles(
            &format!(
                "SELECT {} FROM articles WHERE scraped_at >= ?1 AND scraped_at < ?2
                 ORDER BY scraped_at DESC, id DESC LIMIT ?3",
                ARTICLE_COLUMNS
            ),
            &[&to_db_time(&start), &to_db_time(&end), &limit],
        )?;

        if !today.is_empty() {
            return Ok(today);
        }

        self.query_articles(
            &format!(
                "SELECT {} FROM articles ORDER BY scraped_at DESC, id DESC LIMIT ?1",
                ARTICLE_COLUMNS
            ),
            &[&limit],
        )
    }

    fn by_source(&self, source: &str, limit: usize) -> StorageResult<Vec<Article>> {
        self.query_articles(
            &format!(
                "SELECT {} FROM articles WHERE source = ?1
                 ORDER BY scraped_at DESC, id DESC LIMIT ?2",
                ARTICLE_COLUMNS
            ),
            &[&source, &(limit as i64)],
        )
    }

    fn search(&self, query: &SearchQuery) -> StorageResult<Vec<Article>> {
        let mut conditions: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(keyword) = query.keyword.as_deref().filter(|k| !k.trim().is_empty()) {
            conditions.push("title LIKE ? ESCAPE '\\'");
            values.push(Box::new(format!("%{}%", escape_like(keyword.trim()))));
        }
        if let Some(from) = &query.from {
            conditions.push("scraped_at >= ?");
            values.push(Box::new(to_db_time(from)));
        }
        if let Some(to) = &query.to {
            conditions.push("scraped_at <= ?");
            values.push(Box::new(to_db_time(to)));
        }
        values.push(Box::new(query.limit as i64));

        let filter = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            "SELECT {} FROM articles {} ORDER BY scraped_at DESC, id DESC LIMIT ?",
            ARTICLE_COLUMNS, filter
        );
        let params: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
        self.query_articles(&sql, &params)
    }

    // ===== Run Management =====

    fn create_run(&self, config_hash: &str) -> StorageResult<i64> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![
                to_db_time(&Utc::now()),
                config_hash,
                RunStatus::Running.to_db_string()
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn finish_run(
        &self,
        run_id: i64,
        status: RunStatus,
        persisted: u64,
        swept: u64,
    ) -> StorageResult<()> {
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, persisted = ?3, swept = ?4 WHERE id = ?5",
            params![
                status.to_db_string(),
                to_db_time(&Utc::now()),
                persisted as i64,
                swept as i64,
                run_id
            ],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let row = {
            let conn = self.lock()?;
            conn.query_row(
                "SELECT id, started_at, finished_at, config_hash, status, persisted, swept
                 FROM runs WHERE id = ?1",
                params![run_id],
                RunRow::from_row,
            )
            .optional()?
        };
        row.ok_or(StorageError::RunNotFound(run_id))?.into_record()
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let row = {
            let conn = self.lock()?;
            conn.query_row(
                "SELECT id, started_at, finished_at, config_hash, status, persisted, swept
                 FROM runs ORDER BY id DESC LIMIT 1",
                [],
                RunRow::from_row,
            )
            .optional()?
        };
        row.map(RunRow::into_record).transpose()
    }
}

/// Runs one upsert and classifies what it did
fn upsert_article(conn: &Connection, article: &Article) -> rusqlite::Result<UpsertAction> {
    let existed = conn
        .query_row(
            "SELECT 1 FROM articles WHERE link = ?1",
            params![article.link],
            |_| Ok(()),
        )
        .optional()?
        .is_some();

    let changed = conn.execute(
        UPSERT_SQL,
        params![
            article.title,
            article.link,
            article.source,
            to_db_time(&article.scraped_at),
            article.published_at.as_ref().map(to_db_time),
            article.summary,
            article.category,
        ],
    )?;

    Ok(match (existed, changed) {
        (false, _) => UpsertAction::Inserted,
        (true, 0) => UpsertAction::Unchanged,
        (true, _) => UpsertAction::Updated,
    })
}

fn is_unique_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Escapes LIKE wildcards so a keyword matches literally
fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn to_db_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn from_db_time(value: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StorageError::InvalidTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Raw article columns, converted outside the rusqlite row callback
struct ArticleRow {
    title: String,
    link: String,
    source: String,
    scraped_at: String,
    published_at: Option<String>,
    summary: Option<String>,
    category: Option<String>,
}

impl ArticleRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            title: row.get(0)?,
            link: row.get(1)?,
            source: row.get(2)?,
            scraped_at: row.get(3)?,
            published_at: row.get(4)?,
            summary: row.get(5)?,
            category: row.get(6)?,
        })
    }

    fn into_article(self) -> StorageResult<Article> {
        Ok(Article {
            title: self.title,
            link: self.link,
            source: self.source,
            scraped_at: from_db_time(&self.scraped_at)?,
            published_at: self.published_at.as_deref().map(from_db_time).transpose()?,
            summary: self.summary,
            category: self.category,
        })
    }
}

struct RunRow {
    id: i64,
    started_at: String,
    finished_at: Option<String>,
    config_hash: String,
    status: String,
    persisted: i64,
    swept: i64,
}

impl RunRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            started_at: row.get(1)?,
            finished_at: row.get(2)?,
            config_hash: row.get(3)?,
            status: row.get(4)?,
            persisted: row.get(5)?,
            swept: row.get(6)?,
        })
    }

    fn into_record(self) -> StorageResult<RunRecord> {
        Ok(RunRecord {
            id: self.id,
            started_at: from_db_time(&self.started_at)?,
            finished_at: self.finished_at.as_deref().map(from_db_time).transpose()?,
            config_hash: self.config_hash,
            status: RunStatus::from_db_string(&self.status).unwrap_or(RunStatus::Failed),
            persisted: self.persisted.max(0) as u64,
            swept: self.swept.max(0) as u64,
        })
    }
}
