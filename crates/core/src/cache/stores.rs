//! Store-level operations: open, enumerate, delete.
//!
//! A store is a named container of entries. Deleting a store drops every
//! entry in it through the foreign-key cascade.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;

/// Summary of one store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct StoreInfo {
    pub name: String,
    pub created_at: String,
    pub entries: u64,
}

impl CacheDb {
    /// Open a store, creating it if it does not exist yet.
    pub async fn open_store(&self, name: &str) -> Result<(), Error> {
        if name.is_empty() {
            return Err(Error::StoreOpen { name: String::new(), reason: "store name cannot be empty".into() });
        }

        let store = name.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO cache_stores (name, created_at) VALUES (?1, ?2)",
                    params![store, chrono::Utc::now().to_rfc3339()],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
            .map_err(|e| Error::StoreOpen { name: name.to_string(), reason: e.to_string() })
    }

    pub async fn has_store(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists =
                    conn.query_row("SELECT EXISTS(SELECT 1 FROM cache_stores WHERE name = ?1)", params![name], |row| {
                        row.get(0)
                    })?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    /// Names of every existing store, sorted.
    pub async fn store_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM cache_stores ORDER BY name")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Every store with its entry count, sorted by name.
    pub async fn list_stores(&self) -> Result<Vec<StoreInfo>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<StoreInfo>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT s.name, s.created_at, COUNT(e.key_hash)
                     FROM cache_stores s
                     LEFT JOIN cache_entries e ON e.store = s.name
                     GROUP BY s.name, s.created_at
                     ORDER BY s.name",
                )?;
                let stores = stmt
                    .query_map([], |row| {
                        Ok(StoreInfo { name: row.get(0)?, created_at: row.get(1)?, entries: row.get::<_, i64>(2)? as u64 })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(stores)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a store and all of its entries.
    ///
    /// Returns false if no store had that name.
    pub async fn delete_store(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM cache_stores WHERE name = ?1", params![name])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ResponseSnapshot;
    use crate::cache::entries::MatchMode;
    use url::Url;

    #[tokio::test]
    async fn test_open_is_idempotent() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_store("story-spa-shell-v3").await.unwrap();
        db.open_store("story-spa-shell-v3").await.unwrap();

        assert_eq!(db.store_names().await.unwrap(), vec!["story-spa-shell-v3".to_string()]);
        assert!(db.has_store("story-spa-shell-v3").await.unwrap());
        assert!(!db.has_store("story-spa-shell-v2").await.unwrap());
    }

    #[tokio::test]
    async fn test_open_empty_name() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let result = db.open_store("").await;
        assert!(matches!(result, Err(Error::StoreOpen { .. })));
    }

    #[tokio::test]
    async fn test_delete_store_cascades() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let url = Url::parse("http://localhost:3000/index.html").unwrap();
        db.open_store("old").await.unwrap();
        db.put_entry("old", "GET", &url, MatchMode::IgnoreQuery, &ResponseSnapshot::new(200, "<html>"))
            .await
            .unwrap();

        assert!(db.delete_store("old").await.unwrap());
        assert!(!db.delete_store("old").await.unwrap());

        db.open_store("old").await.unwrap();
        let hit = db.match_entry("old", "GET", &url, MatchMode::IgnoreQuery).await.unwrap();
        assert!(hit.is_none());
    }

    #[tokio::test]
    async fn test_list_stores_counts_entries() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_store("a").await.unwrap();
        db.open_store("b").await.unwrap();
        for path in ["/one", "/two"] {
            let url = Url::parse(&format!("http://localhost:3000{path}")).unwrap();
            db.put_entry("a", "GET", &url, MatchMode::Exact, &ResponseSnapshot::new(200, path))
                .await
                .unwrap();
        }

        let stores = db.list_stores().await.unwrap();
        assert_eq!(stores.len(), 2);
        assert_eq!((stores[0].name.as_str(), stores[0].entries), ("a", 2));
        assert_eq!((stores[1].name.as_str(), stores[1].entries), ("b", 0));
    }
}
