//! Redis-backed `CounterStore`.
//!
//! A counters document maps to two hashes:
//! - `<prefix><key>`: numeric fields, changed only with `HINCRBY`
//! - `<prefix><key>#ts`: timestamp fields (RFC 3339)
//!
//! Every `MergeWrite` is sent as one `MULTI`/`EXEC` pipeline, so other
//! clients never observe a partial merge and concurrent increments from any
//! number of processes commute inside Redis. Missing hashes are created by
//! the first `HINCRBY`.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;

use tally_core::error::{Result, TallyError};

use super::{CounterStore, MergeWrite, StoredDocument};

const TIMESTAMPS_SUFFIX: &str = "#ts";

#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    prefix: String,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("conn", &"ConnectionManager")
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl RedisStore {
    /// Connect and return a store. Fails if Redis is not reachable within
    /// `timeout`.
    pub async fn connect(url: &str, prefix: &str, timeout: Duration) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| TallyError::Internal(format!("invalid redis url: {e}")))?;

        let conn = tokio::time::timeout(timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| TallyError::StoreWrite(format!("redis connect timed out after {timeout:?}")))?
            .map_err(|e| TallyError::StoreWrite(format!("redis connect failed: {e}")))?;

        tracing::info!(url = %redact_url(url), prefix, "redis counter store connected");
        Ok(Self {
            conn,
            prefix: prefix.to_string(),
        })
    }

    fn numbers_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    fn timestamps_key(&self, key: &str) -> String {
        format!("{}{}{}", self.prefix, key, TIMESTAMPS_SUFFIX)
    }

    /// Drop a document (both hashes).
    pub async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = redis::pipe()
            .atomic()
            .del(self.numbers_key(key))
            .ignore()
            .del(self.timestamps_key(key))
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| TallyError::StoreWrite(format!("redis DEL failed: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl CounterStore for RedisStore {
    async fn merge_increment(&self, write: MergeWrite) -> Result<()> {
        if write.key.is_empty() {
            return Err(TallyError::StoreWrite("empty document key".into()));
        }

        let numbers = self.numbers_key(&write.key);
        let mut pipe = redis::pipe();
        pipe.atomic();
        for (field, amount) in &write.increments {
            pipe.hincr(&numbers, field, *amount).ignore();
        }
        if let Some(field) = &write.touch {
            pipe.hset(self.timestamps_key(&write.key), field, Utc::now().to_rfc3339())
                .ignore();
        }

        // HINCRBY rejects an i64 overflow for that field; the error fails the write.
        let mut conn = self.conn.clone();
        let _: () = pipe
            .query_async(&mut conn)
            .await
            .map_err(|e| TallyError::StoreWrite(format!("redis merge on {} failed: {e}", write.key)))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<StoredDocument>> {
        let mut conn = self.conn.clone();
        let (raw_numbers, raw_timestamps): (HashMap<String, i64>, HashMap<String, String>) =
            redis::pipe()
                .atomic()
                .hgetall(self.numbers_key(key))
                .hgetall(self.timestamps_key(key))
                .query_async(&mut conn)
                .await
                .map_err(|e| TallyError::Internal(format!("redis HGETALL on {key} failed: {e}")))?;

        if raw_numbers.is_empty() && raw_timestamps.is_empty() {
            return Ok(None);
        }

        let mut timestamps = BTreeMap::new();
        for (field, raw) in raw_timestamps {
            match DateTime::parse_from_rfc3339(&raw) {
                Ok(ts) => {
                    timestamps.insert(field, ts.with_timezone(&Utc));
                }
                Err(e) => tracing::warn!(key, %field, error = %e, "ignoring unparsable timestamp"),
            }
        }

        Ok(Some(StoredDocument {
            numbers: raw_numbers.into_iter().collect(),
            timestamps,
        }))
    }
}

/// Redact credentials from a Redis URL for logging.
fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme), Some(at)) if at > scheme => format!("{}***{}", &url[..scheme + 3], &url[at..]),
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::redact_url;

    #[test]
    fn redacts_credentials() {
        assert_eq!(redact_url("redis://user:pw@host:6379/0"), "redis://***@host:6379/0");
        assert_eq!(redact_url("redis://127.0.0.1:6379"), "redis://127.0.0.1:6379");
    }
}
