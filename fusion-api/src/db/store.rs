//! Record store: history collections plus the TTL cache
//!
//! History writes surface their errors. Cache reads and writes never fail
//! from the caller's point of view: problems are logged and a read becomes
//! a miss.

use async_trait::async_trait;
use fusion_common::{time, Result};
use serde_json::Value;
use sqlx::{Row, SqlitePool};

use crate::models::{CacheEntry, CustomRecord, FusedRecord, HistoryCollection, HistoryPage};
use crate::pagination::PageRequest;

/// Persistence seam used by the fusion engine and the HTTP handlers
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Upsert a fused record into the fusion history
    async fn save_fused(&self, record: &FusedRecord) -> Result<()>;

    /// Upsert a custom record into the custom history
    async fn save_custom(&self, record: &CustomRecord) -> Result<()>;

    /// Live cache entry for `cache_key`, or `None`
    ///
    /// An expired entry is deleted before `None` is returned.
    async fn get_cache_entry(&self, cache_key: &str) -> Option<CacheEntry>;

    /// Write `data` under `cache_key`, expiring `ttl_minutes` from now
    async fn set_cache_entry(&self, cache_key: &str, data: &Value, ttl_minutes: i64);

    async fn delete_cache_entry(&self, cache_key: &str) -> Result<()>;

    /// One page of a history collection, newest first
    async fn history(&self, collection: HistoryCollection, page: PageRequest)
        -> Result<HistoryPage>;
}

/// SQLite-backed [`RecordStore`]
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn insert_history(
        &self,
        collection: HistoryCollection,
        id: &str,
        timestamp: i64,
        payload: String,
    ) -> Result<()> {
        let sql = format!(
            r#"
            INSERT INTO {} (id, timestamp, payload)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                timestamp = excluded.timestamp,
                payload = excluded.payload
            "#,
            collection.table_name()
        );

        sqlx::query(&sql)
            .bind(id)
            .bind(timestamp)
            .bind(payload)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn read_cache_entry(&self, cache_key: &str) -> Result<Option<CacheEntry>> {
        let row = sqlx::query(
            "SELECT cache_key, payload, ttl, created_at FROM cache_entries WHERE cache_key = ?",
        )
        .bind(cache_key)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let payload: String = row.get("payload");
        Ok(Some(CacheEntry {
            cache_key: row.get("cache_key"),
            data: serde_json::from_str(&payload)?,
            ttl: row.get("ttl"),
            created_at: row.get("created_at"),
        }))
    }

    async fn write_cache_entry(&self, entry: &CacheEntry) -> Result<()> {
        let payload = serde_json::to_string(&entry.data)?;

        sqlx::query(
            r#"
            INSERT INTO cache_entries (cache_key, payload, ttl, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(cache_key) DO UPDATE SET
                payload = excluded.payload,
                ttl = excluded.ttl,
                created_at = excluded.created_at
            "#,
        )
        .bind(&entry.cache_key)
        .bind(payload)
        .bind(entry.ttl)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn save_fused(&self, record: &FusedRecord) -> Result<()> {
        let payload = serde_json::to_string(record)?;
        self.insert_history(
            HistoryCollection::Fusion,
            &record.id.to_string(),
            record.timestamp,
            payload,
        )
        .await?;

        tracing::debug!(id = %record.id, "Saved fused record");
        Ok(())
    }

    async fn save_custom(&self, record: &CustomRecord) -> Result<()> {
        let payload = serde_json::to_string(record)?;
        self.insert_history(
            HistoryCollection::Custom,
            &record.id.to_string(),
            record.timestamp,
            payload,
        )
        .await?;

        tracing::debug!(id = %record.id, "Saved custom record");
        Ok(())
    }

    async fn get_cache_entry(&self, cache_key: &str) -> Option<CacheEntry> {
        let entry = match self.read_cache_entry(cache_key).await {
            Ok(entry) => entry?,
            Err(e) => {
                tracing::warn!(cache_key = %cache_key, error = %e, "Cache read failed, treating as miss");
                return None;
            }
        };

        if entry.is_expired_at(time::now_millis()) {
            tracing::debug!(cache_key = %cache_key, "Cache entry expired");
            if let Err(e) = self.delete_cache_entry(cache_key).await {
                tracing::warn!(cache_key = %cache_key, error = %e, "Failed to delete expired cache entry");
            }
            return None;
        }

        Some(entry)
    }

    async fn set_cache_entry(&self, cache_key: &str, data: &Value, ttl_minutes: i64) {
        let entry = CacheEntry {
            cache_key: cache_key.to_string(),
            data: data.clone(),
            ttl: time::expiry_from_now(ttl_minutes),
            created_at: time::now_millis(),
        };

        match self.write_cache_entry(&entry).await {
            Ok(()) => tracing::debug!(cache_key = %cache_key, ttl = entry.ttl, "Cached entry"),
            Err(e) => tracing::warn!(cache_key = %cache_key, error = %e, "Cache write failed"),
        }
    }

    async fn delete_cache_entry(&self, cache_key: &str) -> Result<()> {
        sqlx::query("DELETE FROM cache_entries WHERE cache_key = ?")
            .bind(cache_key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn history(
        &self,
        collection: HistoryCollection,
        page: PageRequest,
    ) -> Result<HistoryPage> {
        let sql = format!("SELECT timestamp, payload FROM {}", collection.table_name());
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let timestamp: i64 = row.get("timestamp");
            let payload: String = row.get("payload");
            records.push((timestamp, serde_json::from_str::<Value>(&payload)?));
        }

        records.sort_by(|a, b| b.0.cmp(&a.0));

        let total = records.len() as u64;
        let items = page
            .slice(records)
            .into_iter()
            .map(|(_, payload)| payload)
            .collect();

        Ok(HistoryPage {
            items,
            total,
            has_next: page.has_next(total),
        })
    }
}
