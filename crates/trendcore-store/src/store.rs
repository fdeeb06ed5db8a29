use std::collections::HashMap;
use std::path::Path;

use chrono::Utc;
use md5::{Digest, Md5};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, params_from_iter, OptionalExtension};
use tracing::{instrument, warn};

use trendcore_types::{FetchMetadata, FetchedBody, FetcherKind};

use crate::errors::StoreResult;

const CREATE_TABLE_SQL: &str = "
CREATE TABLE IF NOT EXISTS scraped_content (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT UNIQUE NOT NULL,
    url_hash TEXT NOT NULL,
    title TEXT,
    content TEXT,
    author TEXT,
    publish_time TEXT,
    word_count INTEGER DEFAULT 0,
    images TEXT,
    metadata TEXT,
    scraper_type TEXT,
    scraped_at TEXT NOT NULL,
    expires_at TEXT,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_url_hash ON scraped_content(url_hash);
CREATE INDEX IF NOT EXISTS idx_scraped_at ON scraped_content(scraped_at);
CREATE INDEX IF NOT EXISTS idx_expires_at ON scraped_content(expires_at);
";

/// Durable `url -> FetchedBody` mapping backed by a single-file SQLite
/// database. The Router consults it before dispatching a fetch and writes
/// back through it after one succeeds.
#[derive(Clone)]
pub struct ContentStore {
    pool: Pool<SqliteConnectionManager>,
    retention_days: i64,
}

/// Aggregate counters returned by [`ContentStore::stats`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoreStats {
    pub total_records: i64,
    pub today_added: i64,
    pub db_size_bytes: u64,
    pub retention_days: i64,
}

impl ContentStore {
    /// Opens (creating if absent) the SQLite file at `path`.
    pub fn open(path: impl AsRef<Path>, retention_days: i64) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder().max_size(8).build(manager)?;
        {
            let conn = pool.get()?;
            conn.execute_batch(CREATE_TABLE_SQL)?;
        }
        Ok(Self {
            pool,
            retention_days,
        })
    }

    /// In-memory store, primarily for tests.
    pub fn open_in_memory(retention_days: i64) -> StoreResult<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager)?;
        {
            let conn = pool.get()?;
            conn.execute_batch(CREATE_TABLE_SQL)?;
        }
        Ok(Self {
            pool,
            retention_days,
        })
    }

    fn hash_url(url: &str) -> String {
        let digest = Md5::digest(url.as_bytes());
        hex::encode(digest)
    }

    /// Upserts `body` by URL. Idempotent — a repeated put replaces the row
    /// and refreshes `scraped_at`/`expires_at`.
    #[instrument(skip(self, body), fields(url = %body.url))]
    pub fn put(&self, body: &FetchedBody, kind: FetcherKind) -> StoreResult<()> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(self.retention_days);
        let images = serde_json::to_string(&body.image_urls)?;
        let metadata = serde_json::to_string(&body.metadata)?;

        let conn = match self.pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                warn!(error = %e, "content store pool exhausted, dropping write");
                return Ok(());
            }
        };

        let result = conn.execute(
            "INSERT INTO scraped_content
                (url, url_hash, title, content, author, publish_time,
                 word_count, images, metadata, scraper_type, scraped_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(url) DO UPDATE SET
                url_hash = excluded.url_hash,
                title = excluded.title,
                content = excluded.content,
                author = excluded.author,
                publish_time = excluded.publish_time,
                word_count = excluded.word_count,
                images = excluded.images,
                metadata = excluded.metadata,
                scraper_type = excluded.scraper_type,
                scraped_at = excluded.scraped_at,
                expires_at = excluded.expires_at",
            params![
                body.url,
                Self::hash_url(&body.url),
                body.title,
                body.body_text,
                body.author,
                body.publish_time.map(|t| t.to_rfc3339()),
                body.word_count as i64,
                images,
                metadata,
                kind.to_string(),
                now.to_rfc3339(),
                expires_at.to_rfc3339(),
            ],
        );

        if let Err(e) = result {
            warn!(error = %e, "content store write failed, dropping write");
        }
        Ok(())
    }

    /// Returns the stored body for `url` unless it is missing or expired.
    pub fn get(&self, url: &str) -> StoreResult<Option<FetchedBody>> {
        let conn = match self.pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                warn!(error = %e, "content store pool exhausted, treating as miss");
                return Ok(None);
            }
        };
        let now = Utc::now().to_rfc3339();
        let row = conn
            .query_row(
                "SELECT url, title, content, author, publish_time, word_count,
                        images, metadata, scraper_type, scraped_at, expires_at
                 FROM scraped_content
                 WHERE url_hash = ?1 AND (expires_at IS NULL OR expires_at > ?2)",
                params![Self::hash_url(url), now],
                row_to_body,
            )
            .optional();

        match row {
            Ok(v) => Ok(v),
            Err(e) => {
                warn!(error = %e, "content store read failed, treating as miss");
                Ok(None)
            }
        }
    }

    /// Cheap existence + freshness check, used by the Router to skip a
    /// redundant fetch.
    pub fn exists(&self, url: &str) -> StoreResult<bool> {
        let conn = match self.pool.get() {
            Ok(conn) => conn,
            Err(_) => return Ok(false),
        };
        let now = Utc::now().to_rfc3339();
        let exists: rusqlite::Result<Option<i64>> = conn
            .query_row(
                "SELECT 1 FROM scraped_content
                 WHERE url_hash = ?1 AND (expires_at IS NULL OR expires_at > ?2)
                 LIMIT 1",
                params![Self::hash_url(url), now],
                |row| row.get(0),
            )
            .optional();
        Ok(exists.unwrap_or(None).is_some())
    }

    /// Batch fetch via a single parameterized `IN (...)` query; expired
    /// rows are omitted.
    pub fn get_many(&self, urls: &[String]) -> StoreResult<HashMap<String, FetchedBody>> {
        let mut out = HashMap::new();
        if urls.is_empty() {
            return Ok(out);
        }
        let conn = match self.pool.get() {
            Ok(conn) => conn,
            Err(_) => return Ok(out),
        };
        let hashes: Vec<String> = urls.iter().map(|u| Self::hash_url(u)).collect();
        let placeholders = hashes.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let now = Utc::now().to_rfc3339();
        let sql = format!(
            "SELECT url, title, content, author, publish_time, word_count,
                    images, metadata, scraper_type, scraped_at, expires_at
             FROM scraped_content
             WHERE url_hash IN ({placeholders}) AND (expires_at IS NULL OR expires_at > ?)"
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut params: Vec<&dyn rusqlite::ToSql> =
            hashes.iter().map(|h| h as &dyn rusqlite::ToSql).collect();
        params.push(&now);
        let rows = stmt.query_map(params_from_iter(params), row_to_body)?;
        for row in rows {
            let body = row?;
            out.insert(body.url.clone(), body);
        }
        Ok(out)
    }

    /// Set difference: the subset of `urls` with no fresh cache entry.
    pub fn filter_unseen(&self, urls: &[String]) -> StoreResult<Vec<String>> {
        let cached = self.get_many(urls)?;
        Ok(urls
            .iter()
            .filter(|u| !cached.contains_key(*u))
            .cloned()
            .collect())
    }

    /// Deletes expired rows, returning the number removed.
    pub fn sweep(&self) -> StoreResult<usize> {
        let conn = self.pool.get()?;
        let now = Utc::now().to_rfc3339();
        let deleted = conn.execute(
            "DELETE FROM scraped_content WHERE expires_at IS NOT NULL AND expires_at < ?1",
            params![now],
        )?;
        Ok(deleted)
    }

    pub fn stats(&self) -> StoreResult<StoreStats> {
        let conn = self.pool.get()?;
        let total: i64 = conn.query_row("SELECT COUNT(*) FROM scraped_content", [], |r| r.get(0))?;
        let today_start = Utc::now()
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .expect("midnight is a valid time")
            .and_utc()
            .to_rfc3339();
        let today_added: i64 = conn.query_row(
            "SELECT COUNT(*) FROM scraped_content WHERE scraped_at >= ?1",
            params![today_start],
            |r| r.get(0),
        )?;
        let db_size_bytes = conn
            .query_row(
                "SELECT page_count * page_size FROM pragma_page_count(), pragma_page_size()",
                [],
                |r| r.get::<_, i64>(0),
            )
            .unwrap_or(0) as u64;
        Ok(StoreStats {
            total_records: total,
            today_added,
            db_size_bytes,
            retention_days: self.retention_days,
        })
    }
}

fn row_to_body(row: &rusqlite::Row<'_>) -> rusqlite::Result<FetchedBody> {
    let url: String = row.get(0)?;
    let title: Option<String> = row.get(1)?;
    let content: Option<String> = row.get(2)?;
    let author: Option<String> = row.get(3)?;
    let publish_time: Option<String> = row.get(4)?;
    let word_count: i64 = row.get(5)?;
    let images: Option<String> = row.get(6)?;
    let metadata: Option<String> = row.get(7)?;
    let scraper_type: Option<String> = row.get(8)?;
    let scraped_at: String = row.get(9)?;
    let expires_at: Option<String> = row.get(10)?;

    let image_urls: Vec<String> = images
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default();
    let mut stored_metadata: FetchMetadata = metadata
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default();
    if stored_metadata.fetcher_kind.is_none() {
        stored_metadata.fetcher_kind = scraper_type;
    }

    Ok(FetchedBody {
        url,
        title: title.unwrap_or_default(),
        body_text: content.unwrap_or_default(),
        html_excerpt: None,
        author,
        publish_time: publish_time
            .and_then(|s| chrono::DateTime::parse_from_rfc3339(&s).ok())
            .map(|t| t.with_timezone(&Utc)),
        word_count: word_count.max(0) as usize,
        image_urls,
        metadata: stored_metadata,
        fetched_at: chrono::DateTime::parse_from_rfc3339(&scraped_at)
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        expires_at: expires_at.and_then(|s| chrono::DateTime::parse_from_rfc3339(&s).ok()).map(|t| t.with_timezone(&Utc)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use trendcore_types::FetchMetadata;

    fn sample_body(url: &str) -> FetchedBody {
        FetchedBody::new(
            url,
            "a title",
            "some body text",
            FetchMetadata::default(),
            chrono::Duration::days(1),
        )
    }

    #[test]
    fn put_then_get_round_trips() {
        let store = ContentStore::open_in_memory(7).unwrap();
        let body = sample_body("https://example.com/a");
        store.put(&body, FetcherKind::PlainHttp).unwrap();

        let fetched = store.get("https://example.com/a").unwrap().unwrap();
        assert_eq!(fetched.title, "a title");
        assert_eq!(fetched.body_text, "some body text");
    }

    #[test]
    fn put_then_get_round_trips_metadata_format() {
        let store = ContentStore::open_in_memory(7).unwrap();
        let mut body = sample_body("https://example.com/a");
        body.metadata.format = Some("markdown".to_string());
        store.put(&body, FetcherKind::ManagedReader).unwrap();

        let fetched = store.get("https://example.com/a").unwrap().unwrap();
        assert_eq!(fetched.metadata.format, Some("markdown".to_string()));
        assert_eq!(fetched.metadata.fetcher_kind, Some("managed_reader".to_string()));
    }

    #[test]
    fn exists_is_false_before_put() {
        let store = ContentStore::open_in_memory(7).unwrap();
        assert!(!store.exists("https://example.com/missing").unwrap());
    }

    #[test]
    fn put_is_idempotent_by_url() {
        let store = ContentStore::open_in_memory(7).unwrap();
        let mut body = sample_body("https://example.com/a");
        store.put(&body, FetcherKind::PlainHttp).unwrap();
        body.title = "updated title".to_string();
        store.put(&body, FetcherKind::HeadlessBrowser).unwrap();

        let fetched = store.get("https://example.com/a").unwrap().unwrap();
        assert_eq!(fetched.title, "updated title");

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_records, 1);
    }

    #[test]
    fn filter_unseen_skips_cached_urls() {
        let store = ContentStore::open_in_memory(7).unwrap();
        store
            .put(&sample_body("https://example.com/a"), FetcherKind::PlainHttp)
            .unwrap();

        let urls = vec![
            "https://example.com/a".to_string(),
            "https://example.com/b".to_string(),
        ];
        let unseen = store.filter_unseen(&urls).unwrap();
        assert_eq!(unseen, vec!["https://example.com/b".to_string()]);
    }

    #[test]
    fn get_many_omits_expired_entries() {
        let store = ContentStore::open_in_memory(-1).unwrap();
        store
            .put(&sample_body("https://example.com/a"), FetcherKind::PlainHttp)
            .unwrap();

        let cached = store
            .get_many(&["https://example.com/a".to_string()])
            .unwrap();
        assert!(cached.is_empty());
    }

    #[test]
    fn sweep_removes_expired_rows() {
        let store = ContentStore::open_in_memory(-1).unwrap();
        store
            .put(&sample_body("https://example.com/a"), FetcherKind::PlainHttp)
            .unwrap();

        let removed = store.sweep().unwrap();
        assert_eq!(removed, 1);
        assert!(store.get("https://example.com/a").unwrap().is_none());
    }
}

