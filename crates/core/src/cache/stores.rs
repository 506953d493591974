//! Store and entry operations on the SQLite cache.

use super::connection::CacheDb;
use super::entry::{CacheMatch, RequestKey, StoredResponse};
use super::storage::CacheStorage;
use crate::Error;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, Connection, Row};

const ENTRY_COLUMNS: &str = "e.response_url, e.status, e.status_text, e.headers_json, e.body, e.stored_at";

/// Raw entry columns before header decoding.
struct EntryRow {
    url: String,
    status: u16,
    status_text: String,
    headers_json: String,
    body: Vec<u8>,
    stored_at: String,
}

impl EntryRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            url: row.get(0)?,
            status: row.get(1)?,
            status_text: row.get(2)?,
            headers_json: row.get(3)?,
            body: row.get(4)?,
            stored_at: row.get(5)?,
        })
    }

    fn decode(self) -> Result<StoredResponse, Error> {
        let headers = serde_json::from_str(&self.headers_json)?;
        Ok(StoredResponse {
            url: self.url,
            status: self.status,
            status_text: self.status_text,
            headers,
            body: self.body,
            stored_at: self.stored_at,
        })
    }
}

fn ensure_store(conn: &Connection, name: &str) -> Result<(), Error> {
    conn.execute(
        "INSERT OR IGNORE INTO stores (name, created_at) VALUES (?1, ?2)",
        params![name, chrono::Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

fn insert_entry(conn: &Connection, store: &str, key: &RequestKey, response: &StoredResponse) -> Result<(), Error> {
    let headers_json = serde_json::to_string(&response.headers)?;
    conn.execute(
        "INSERT OR REPLACE INTO entries (
            store_name, key_hash, method, url, response_url, status, status_text, headers_json, body, stored_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            store,
            key.hash(),
            &key.method,
            &key.url,
            &response.url,
            response.status,
            &response.status_text,
            headers_json,
            &response.body,
            &response.stored_at,
        ],
    )?;
    Ok(())
}

fn optional_entry(result: rusqlite::Result<EntryRow>) -> Result<Option<StoredResponse>, Error> {
    match result {
        Ok(row) => row.decode().map(Some),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[async_trait::async_trait]
impl CacheStorage for CacheDb {
    async fn open_store(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> { ensure_store(conn, &name) })
            .await
            .map_err(Error::from)
    }

    async fn get(&self, store: &str, key: &RequestKey) -> Result<Option<StoredResponse>, Error> {
        let store = store.to_string();
        let hash = key.hash();
        self.conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let sql = format!("SELECT {ENTRY_COLUMNS} FROM entries e WHERE e.store_name = ?1 AND e.key_hash = ?2");
                let result = conn.query_row(&sql, params![store, hash], EntryRow::from_row);
                optional_entry(result)
            })
            .await
            .map_err(Error::from)
    }

    async fn match_any(&self, key: &RequestKey) -> Result<Option<CacheMatch>, Error> {
        let hash = key.hash();
        self.conn
            .call(move |conn| -> Result<Option<CacheMatch>, Error> {
                let sql = format!(
                    "SELECT {ENTRY_COLUMNS}, e.store_name FROM entries e
                     JOIN stores s ON s.name = e.store_name
                     WHERE e.key_hash = ?1
                     ORDER BY s.rowid ASC
                     LIMIT 1"
                );
                let result = conn.query_row(&sql, params![hash], |row| {
                    Ok((EntryRow::from_row(row)?, row.get::<_, String>(6)?))
                });
                match result {
                    Ok((entry, store_name)) => Ok(Some(CacheMatch { store_name, response: entry.decode()? })),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    async fn put(&self, store: &str, key: &RequestKey, response: &StoredResponse) -> Result<(), Error> {
        let store = store.to_string();
        let key = key.clone();
        let response = response.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                ensure_store(conn, &store)?;
                insert_entry(conn, &store, &key, &response)
            })
            .await
            .map_err(Error::from)
    }

    async fn put_all(&self, store: &str, entries: &[(RequestKey, StoredResponse)]) -> Result<(), Error> {
        let store = store.to_string();
        let entries = entries.to_vec();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                ensure_store(&tx, &store)?;
                for (key, response) in &entries {
                    insert_entry(&tx, &store, key, response)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn delete(&self, store: &str, key: &RequestKey) -> Result<bool, Error> {
        let store = store.to_string();
        let hash = key.hash();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute(
                    "DELETE FROM entries WHERE store_name = ?1 AND key_hash = ?2",
                    params![store, hash],
                )?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    async fn keys(&self, store: &str) -> Result<Vec<RequestKey>, Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<RequestKey>, Error> {
                let mut stmt =
                    conn.prepare("SELECT method, url FROM entries WHERE store_name = ?1 ORDER BY rowid ASC")?;
                let keys = stmt
                    .query_map(params![store], |row| Ok(RequestKey { method: row.get(0)?, url: row.get(1)? }))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(keys)
            })
            .await
            .map_err(Error::from)
    }

    async fn delete_store(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM stores WHERE name = ?1", params![name])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    async fn list_store_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM stores ORDER BY rowid ASC")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }
}
