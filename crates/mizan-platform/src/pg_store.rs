//! Postgres-backed [`RecordStore`].
//!
//! Each entity lives in its own table keyed by `id` and scoped by
//! `company_id`; the full record is kept as a JSONB `payload`.

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::Utc;
use mizan_core::{Record, RecordPatch, RecordQuery, RecordStore, StoreError};
use serde_json::Value;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::{debug, warn};
use uuid::Uuid;

const REQUIRED_COLUMNS: [&str; 5] = ["id", "company_id", "payload", "created_at", "updated_at"];

pub struct PgRecordStore<T> {
    pool: PgPool,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> PgRecordStore<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _record: PhantomData,
        }
    }

    /// Creates the entity table if it is missing.
    pub async fn ensure_table(&self) -> Result<(), StoreError> {
        sqlx::query(&create_table_sql(T::TABLE))
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS {table}_company_idx ON {table} (company_id)",
            table = T::TABLE
        ))
        .execute(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(())
    }
}

#[async_trait]
impl<T: Record> RecordStore<T> for PgRecordStore<T> {
    async fn test_connection(&self) -> Result<bool, StoreError> {
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => Ok(true),
            Err(err) => {
                warn!(table = T::TABLE, "postgres connection check failed: {err}");
                Ok(false)
            }
        }
    }

    async fn check_table_structure(&self) -> Result<bool, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT column_name::TEXT AS column_name
            FROM information_schema.columns
            WHERE table_schema = current_schema() AND table_name = $1
            "#,
        )
        .bind(T::TABLE)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        let mut found = Vec::with_capacity(rows.len());
        for row in rows {
            found.push(
                row.try_get::<String, _>("column_name")
                    .map_err(store_error)?,
            );
        }

        let missing = missing_columns(&found);
        if !missing.is_empty() {
            warn!(table = T::TABLE, ?missing, "table is missing columns");
        }
        Ok(missing.is_empty())
    }

    async fn get_all(&self, company_id: &str) -> Result<Vec<T>, StoreError> {
        self.query(&RecordQuery::scoped(company_id)).await
    }

    async fn query(&self, query: &RecordQuery) -> Result<Vec<T>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT payload
            FROM {table}
            WHERE ($1::TEXT IS NULL OR company_id = $1)
              AND ($2::BOOLEAN IS NULL OR (payload->>'is_active')::BOOLEAN = $2)
            ORDER BY created_at, id
            "#,
            table = T::TABLE
        ))
        .bind(query.company_id.as_deref())
        .bind(query.active)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        debug!(table = T::TABLE, count = rows.len(), scoped = query.is_scoped(), "rows fetched");
        rows.iter().map(decode_payload).collect()
    }

    async fn add(&self, record: T) -> Result<T, StoreError> {
        let payload = serde_json::to_value(&record)?;
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO {table} (id, company_id, payload, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            RETURNING payload
            "#,
            table = T::TABLE
        ))
        .bind(record.id())
        .bind(record.company_id())
        .bind(payload)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        decode_payload(&row)
    }

    async fn update(&self, id: Uuid, patch: RecordPatch) -> Result<T, StoreError> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        let row = sqlx::query(&format!(
            "SELECT payload FROM {table} WHERE id = $1 FOR UPDATE",
            table = T::TABLE
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(store_error)?
        .ok_or(StoreError::NotFound {
            table: T::TABLE,
            id,
        })?;

        let current: T = decode_payload(&row)?;
        let updated = patch.touched(Utc::now()).apply_to(&current)?;

        sqlx::query(&format!(
            "UPDATE {table} SET payload = $2, updated_at = NOW() WHERE id = $1",
            table = T::TABLE
        ))
        .bind(id)
        .bind(serde_json::to_value(&updated)?)
        .execute(&mut *tx)
        .await
        .map_err(store_error)?;

        tx.commit().await.map_err(store_error)?;
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query(&format!("DELETE FROM {table} WHERE id = $1", table = T::TABLE))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                table: T::TABLE,
                id,
            });
        }
        Ok(())
    }
}

fn create_table_sql(table: &str) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id UUID PRIMARY KEY,
            company_id TEXT NOT NULL,
            payload JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#
    )
}

fn missing_columns(found: &[String]) -> Vec<&'static str> {
    REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !found.iter().any(|name| name == column))
        .collect()
}

fn decode_payload<T: Record>(row: &PgRow) -> Result<T, StoreError> {
    let payload = row.try_get::<Value, _>("payload").map_err(store_error)?;
    Ok(serde_json::from_value(payload)?)
}

fn store_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed => StoreError::Unavailable(err.to_string()),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::Encoding(err.to_string())
        }
        other => StoreError::Query(other.to_string()),
    }
}
