//! Entry operations within a store.
//!
//! Entries are keyed by method and a normalized URL. Shell assets ignore the
//! query string; API responses keep it. Every entry also records its
//! query-less `url_base` so all variants of a listing can be dropped at once.

use super::connection::CacheDb;
use super::hash::{compute_entry_key, url_base, url_exact};
use crate::{Error, ResponseSnapshot};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;
use url::Url;

/// How a request URL maps onto an entry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Query string ignored (shell assets).
    IgnoreQuery,
    /// Full URL (API responses).
    Exact,
}

impl MatchMode {
    fn identity(self, url: &Url) -> String {
        match self {
            MatchMode::IgnoreQuery => url_base(url),
            MatchMode::Exact => url_exact(url),
        }
    }
}

/// A stored response with its bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct StoredEntry {
    pub store: String,
    pub method: String,
    pub url: String,
    pub stored_at: String,
    pub response: ResponseSnapshot,
}

fn decode_headers(json: &str) -> Result<Vec<(String, String)>, Error> {
    serde_json::from_str(json).map_err(|e| Error::CorruptEntry(e.to_string()))
}

impl CacheDb {
    /// Insert or replace the entry for a request.
    ///
    /// The store must already be open.
    pub async fn put_entry(
        &self, store: &str, method: &str, url: &Url, mode: MatchMode, response: &ResponseSnapshot,
    ) -> Result<(), Error> {
        let store = store.to_string();
        let method = method.to_ascii_uppercase();
        let identity = mode.identity(url);
        let key_hash = compute_entry_key(&method, &identity);
        let base = url_base(url);
        let headers_json = serde_json::to_string(&response.headers).map_err(|e| Error::CorruptEntry(e.to_string()))?;
        let response = response.clone();
        let stored_at = chrono::Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO cache_entries (
                        store, key_hash, method, url, url_base,
                        status, status_text, headers_json, body, stored_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                    ON CONFLICT(store, key_hash) DO UPDATE SET
                        method = excluded.method,
                        url = excluded.url,
                        url_base = excluded.url_base,
                        status = excluded.status,
                        status_text = excluded.status_text,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![
                        &store,
                        &key_hash,
                        &method,
                        &identity,
                        &base,
                        response.status as i64,
                        &response.status_text,
                        &headers_json,
                        &response.body,
                        &stored_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up the entry for a request, with bookkeeping.
    pub async fn get_entry(
        &self, store: &str, method: &str, url: &Url, mode: MatchMode,
    ) -> Result<Option<StoredEntry>, Error> {
        let store = store.to_string();
        let key_hash = compute_entry_key(method, &mode.identity(url));

        self.conn
            .call(move |conn| -> Result<Option<StoredEntry>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT method, url, status, status_text, headers_json, body, stored_at
                     FROM cache_entries WHERE store = ?1 AND key_hash = ?2",
                )?;

                let result = stmt.query_row(params![store, key_hash], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, Vec<u8>>(5)?,
                        row.get::<_, String>(6)?,
                    ))
                });

                match result {
                    Ok((method, url, status, status_text, headers_json, body, stored_at)) => {
                        let headers = decode_headers(&headers_json)?;
                        let status = u16::try_from(status)
                            .map_err(|_| Error::CorruptEntry(format!("status {status} out of range for {url}")))?;
                        Ok(Some(StoredEntry {
                            store,
                            method,
                            url,
                            stored_at,
                            response: ResponseSnapshot { status, status_text, headers, body },
                        }))
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Stored response for a request, if any.
    pub async fn match_entry(
        &self, store: &str, method: &str, url: &Url, mode: MatchMode,
    ) -> Result<Option<ResponseSnapshot>, Error> {
        Ok(self.get_entry(store, method, url, mode).await?.map(|e| e.response))
    }

    /// Delete the entry for a request.
    ///
    /// Returns false if there was nothing to delete.
    pub async fn delete_entry(&self, store: &str, method: &str, url: &Url, mode: MatchMode) -> Result<bool, Error> {
        let store = store.to_string();
        let key_hash = compute_entry_key(method, &mode.identity(url));

        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute(
                    "DELETE FROM cache_entries WHERE store = ?1 AND key_hash = ?2",
                    params![store, key_hash],
                )?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every entry whose URL, ignoring the query string, equals `url`'s.
    ///
    /// Returns the number of deleted entries.
    pub async fn delete_url_variants(&self, store: &str, url: &Url) -> Result<u64, Error> {
        let store = store.to_string();
        let base = url_base(url);

        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute(
                    "DELETE FROM cache_entries WHERE store = ?1 AND url_base = ?2",
                    params![store, base],
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Remove all entries from a store, keeping the store itself.
    ///
    /// Returns the number of deleted entries.
    pub async fn clear_store(&self, store: &str) -> Result<u64, Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM cache_entries WHERE store = ?1", params![store])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const API: &str = "story-spa-api-v2";

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    async fn db() -> CacheDb {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_store(API).await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_put_and_match() {
        let db = db().await;
        let u = url("https://story-api.dicoding.dev/v1/stories?page=1");
        let response = ResponseSnapshot::json(200, &serde_json::json!({"listStory": [1]})).with_header("X-Trace", "a");

        db.put_entry(API, "GET", &u, MatchMode::Exact, &response).await.unwrap();

        let hit = db.match_entry(API, "GET", &u, MatchMode::Exact).await.unwrap().unwrap();
        assert_eq!(hit, response);

        let other_page = url("https://story-api.dicoding.dev/v1/stories?page=2");
        assert!(db.match_entry(API, "GET", &other_page, MatchMode::Exact).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ignore_query_mode() {
        let db = db().await;
        db.put_entry(API, "GET", &url("http://localhost:3000/bundle.js?v=1"), MatchMode::IgnoreQuery, &ResponseSnapshot::new(200, "js"))
            .await
            .unwrap();

        let hit = db
            .match_entry(API, "GET", &url("http://localhost:3000/bundle.js?v=2"), MatchMode::IgnoreQuery)
            .await
            .unwrap();
        assert!(hit.is_some());
    }

    #[tokio::test]
    async fn test_upsert_overwrites() {
        let db = db().await;
        let u = url("https://story-api.dicoding.dev/v1/stories/abc");
        db.put_entry(API, "GET", &u, MatchMode::Exact, &ResponseSnapshot::new(200, "old")).await.unwrap();
        db.put_entry(API, "GET", &u, MatchMode::Exact, &ResponseSnapshot::new(200, "new")).await.unwrap();

        let entry = db.get_entry(API, "GET", &u, MatchMode::Exact).await.unwrap().unwrap();
        assert_eq!(entry.response.text(), "new");
        assert_eq!(entry.url, "https://story-api.dicoding.dev/v1/stories/abc");
    }

    #[tokio::test]
    async fn test_put_requires_open_store() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let result = db
            .put_entry("missing", "GET", &url("http://localhost:3000/"), MatchMode::Exact, &ResponseSnapshot::new(200, ""))
            .await;
        assert!(matches!(result, Err(Error::Database(_))));
    }

    #[tokio::test]
    async fn test_delete_entry() {
        let db = db().await;
        let u = url("https://story-api.dicoding.dev/v1/stories/abc");
        db.put_entry(API, "GET", &u, MatchMode::Exact, &ResponseSnapshot::new(200, "x")).await.unwrap();

        assert!(db.delete_entry(API, "GET", &u, MatchMode::Exact).await.unwrap());
        assert!(!db.delete_entry(API, "GET", &u, MatchMode::Exact).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_url_variants() {
        let db = db().await;
        for s in [
            "https://story-api.dicoding.dev/v1/stories",
            "https://story-api.dicoding.dev/v1/stories?page=1",
            "https://story-api.dicoding.dev/v1/stories?location=1",
            "https://story-api.dicoding.dev/v1/stories/abc",
        ] {
            db.put_entry(API, "GET", &url(s), MatchMode::Exact, &ResponseSnapshot::new(200, s)).await.unwrap();
        }

        let deleted = db
            .delete_url_variants(API, &url("https://story-api.dicoding.dev/v1/stories"))
            .await
            .unwrap();
        assert_eq!(deleted, 3);

        let item = url("https://story-api.dicoding.dev/v1/stories/abc");
        assert!(db.match_entry(API, "GET", &item, MatchMode::Exact).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_clear_store() {
        let db = db().await;
        db.put_entry(API, "GET", &url("https://story-api.dicoding.dev/v1/a"), MatchMode::Exact, &ResponseSnapshot::new(200, ""))
            .await
            .unwrap();
        assert_eq!(db.clear_store(API).await.unwrap(), 1);
        assert!(db.has_store(API).await.unwrap());
    }

    #[tokio::test]
    async fn test_out_of_range_status_is_corrupt() {
        let db = db().await;
        let u = url("https://story-api.dicoding.dev/v1/stories");
        db.put_entry(API, "GET", &u, MatchMode::Exact, &ResponseSnapshot::new(200, "list"))
            .await
            .unwrap();

        db.conn
            .call(|conn| conn.execute("UPDATE cache_entries SET status = 70000", []))
            .await
            .unwrap();

        let result = db.match_entry(API, "GET", &u, MatchMode::Exact).await;
        assert!(matches!(result, Err(Error::CorruptEntry(_))));
    }
}
