//! Entry reads and writes.
//!
//! Every write is a full replace of the response stored for a
//! (partition, request key) pair; writing into a partition creates it.

use super::connection::CacheDb;
use crate::Error;
use crate::exchange::{ProxyRequest, ProxyResponse};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, Transaction};

/// Stored entry without its body.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct EntryMeta {
    pub partition: String,
    pub method: String,
    pub url: String,
    pub status_code: u16,
    pub content_type: Option<String>,
    pub body_len: u64,
    pub stored_at: String,
}

/// Column values for one write, owned so they can move to the database thread.
struct EntryRow {
    key_hash: String,
    method: String,
    url: String,
    status_code: i64,
    headers_json: String,
    body: Vec<u8>,
}

impl EntryRow {
    fn encode(request: &ProxyRequest, response: &ProxyResponse) -> Result<Self, Error> {
        let headers_json =
            serde_json::to_string(&response.headers).map_err(|e| Error::CorruptEntry(e.to_string()))?;
        Ok(Self {
            key_hash: request.cache_key(),
            method: request.method.clone(),
            url: request.url.to_string(),
            status_code: i64::from(response.status),
            headers_json,
            body: response.body.to_vec(),
        })
    }

    fn write(&self, tx: &Transaction<'_>, partition: &str, stored_at: &str) -> Result<(), rusqlite::Error> {
        tx.execute(
            "INSERT INTO entries (partition, key_hash, method, url, status_code, headers_json, body, stored_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(partition, key_hash) DO UPDATE SET
                method = excluded.method,
                url = excluded.url,
                status_code = excluded.status_code,
                headers_json = excluded.headers_json,
                body = excluded.body,
                stored_at = excluded.stored_at",
            params![
                partition,
                &self.key_hash,
                &self.method,
                &self.url,
                self.status_code,
                &self.headers_json,
                &self.body,
                stored_at,
            ],
        )?;
        Ok(())
    }
}

fn ensure_partition(tx: &Transaction<'_>, partition: &str, now: &str) -> Result<(), rusqlite::Error> {
    tx.execute(
        "INSERT OR IGNORE INTO partitions (name, created_at) VALUES (?1, ?2)",
        params![partition, now],
    )?;
    Ok(())
}

fn decode_response(status: i64, headers_json: &str, body: Vec<u8>) -> Result<ProxyResponse, Error> {
    let status = u16::try_from(status).map_err(|_| Error::CorruptEntry(format!("status {status}")))?;
    let headers: Vec<(String, String)> =
        serde_json::from_str(headers_json).map_err(|e| Error::CorruptEntry(e.to_string()))?;
    Ok(ProxyResponse::new(status, headers, body))
}

impl CacheDb {
    /// Store a response in `partition`, replacing any previous entry for the request.
    pub async fn put_entry(
        &self, partition: &str, request: &ProxyRequest, response: &ProxyResponse,
    ) -> Result<(), Error> {
        self.put_entries(partition, &[(request.clone(), response.clone())])
            .await
    }

    /// Store several responses in one transaction: either all are written or none.
    ///
    /// The partition is created even when `entries` is empty.
    pub async fn put_entries(
        &self, partition: &str, entries: &[(ProxyRequest, ProxyResponse)],
    ) -> Result<(), Error> {
        let rows = entries
            .iter()
            .map(|(request, response)| EntryRow::encode(request, response))
            .collect::<Result<Vec<_>, _>>()?;
        let partition = partition.to_string();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                let now = chrono::Utc::now().to_rfc3339();
                let tx = conn.transaction()?;
                ensure_partition(&tx, &partition, &now)?;
                for row in &rows {
                    row.write(&tx, &partition, &now)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up the request in a single partition.
    pub async fn match_entry(&self, partition: &str, request: &ProxyRequest) -> Result<Option<ProxyResponse>, Error> {
        let partition = partition.to_string();
        let key_hash = request.cache_key();
        self.conn
            .call(move |conn| -> Result<Option<ProxyResponse>, Error> {
                let result = conn.query_row(
                    "SELECT status_code, headers_json, body FROM entries WHERE partition = ?1 AND key_hash = ?2",
                    params![partition, key_hash],
                    |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, Vec<u8>>(2)?)),
                );

                match result {
                    Ok((status, headers, body)) => decode_response(status, &headers, body).map(Some),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Look up the request across every partition.
    ///
    /// When several partitions hold the key, the oldest partition wins.
    pub async fn match_any(&self, request: &ProxyRequest) -> Result<Option<ProxyResponse>, Error> {
        let key_hash = request.cache_key();
        self.conn
            .call(move |conn| -> Result<Option<ProxyResponse>, Error> {
                let result = conn.query_row(
                    "SELECT e.status_code, e.headers_json, e.body
                     FROM entries e JOIN partitions p ON p.name = e.partition
                     WHERE e.key_hash = ?1
                     ORDER BY p.rowid ASC
                     LIMIT 1",
                    params![key_hash],
                    |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, Vec<u8>>(2)?)),
                );

                match result {
                    Ok((status, headers, body)) => decode_response(status, &headers, body).map(Some),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Entries of a partition, oldest write first.
    pub async fn list_entries(&self, partition: &str) -> Result<Vec<EntryMeta>, Error> {
        let partition = partition.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<EntryMeta>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT partition, method, url, status_code, headers_json, LENGTH(body), stored_at
                     FROM entries WHERE partition = ?1
                     ORDER BY stored_at ASC, rowid ASC",
                )?;
                let rows = stmt
                    .query_map(params![partition], |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, i64>(3)?,
                            row.get::<_, String>(4)?,
                            row.get::<_, i64>(5)?,
                            row.get::<_, String>(6)?,
                        ))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;

                rows.into_iter()
                    .map(|(partition, method, url, status, headers_json, body_len, stored_at)| -> Result<EntryMeta, Error> {
                        let response = decode_response(status, &headers_json, Vec::new())?;
                        Ok(EntryMeta {
                            partition,
                            method,
                            url,
                            status_code: response.status,
                            content_type: response.content_type().map(str::to_string),
                            body_len: body_len as u64,
                            stored_at,
                        })
                    })
                    .collect()
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries in a partition (zero if it does not exist).
    pub async fn entry_count(&self, partition: &str) -> Result<u64, Error> {
        let partition = partition.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM entries WHERE partition = ?1",
                    params![partition],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
