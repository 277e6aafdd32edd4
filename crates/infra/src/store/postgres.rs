//! Postgres-backed item store implementation.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError` as follows:
//!
//! | SQLx Error | StoreError |
//! |------------|------------|
//! | PoolClosed / PoolTimedOut / Io | `Unavailable` |
//! | ColumnDecode / ColumnNotFound / Decode | `Decode` |
//! | Database / other | `Query` |
//!
//! ## Thread Safety
//!
//! `PostgresItemStore` is `Send + Sync` and can be shared across worker tasks.
//! Each call checks a connection out of the SQLx pool, so concurrent `save`s for
//! different ids run on separate connections.

use std::sync::Arc;

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use itemproc_core::ItemId;
use itemproc_items::{Item, NewItem, PROCESSED};

use super::r#trait::{ItemStore, StoreError, StoreResult};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS items (
    id          BIGSERIAL PRIMARY KEY,
    name        VARCHAR(20)  NOT NULL,
    description VARCHAR(150),
    status      VARCHAR(20)  NOT NULL,
    email       VARCHAR(50)  NOT NULL
)
"#;

/// Postgres-backed item store.
#[derive(Debug, Clone)]
pub struct PostgresItemStore {
    pool: Arc<PgPool>,
}

impl PostgresItemStore {
    /// Create a new PostgresItemStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect to `database_url` and make sure the `items` table exists.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Create the `items` table if it is missing.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;

        // BIGSERIAL does not advance when rows are written with explicit ids.
        sqlx::query(
            "SELECT setval(pg_get_serial_sequence('items', 'id'), COALESCE(MAX(id), 0) + 1, false) FROM items",
        )
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ItemStore for PostgresItemStore {
    #[instrument(skip(self), err)]
    async fn find_all(&self) -> StoreResult<Vec<Item>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, status, email
            FROM items
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_all", e))?;

        rows.iter().map(row_to_item).collect()
    }

    #[instrument(skip(self), fields(item_id = %id), err)]
    async fn find_by_id(&self, id: ItemId) -> StoreResult<Option<Item>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, status, email
            FROM items
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_id", e))?;

        row.as_ref().map(row_to_item).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_unprocessed(&self) -> StoreResult<Vec<Item>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, status, email
            FROM items
            WHERE status <> $1
            ORDER BY id ASC
            "#,
        )
        .bind(PROCESSED)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_unprocessed", e))?;

        rows.iter().map(row_to_item).collect()
    }

    #[instrument(skip(self, item), err)]
    async fn create(&self, item: NewItem) -> StoreResult<Item> {
        let row = sqlx::query(
            r#"
            INSERT INTO items (name, description, status, email)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&item.name)
        .bind(item.description.as_deref())
        .bind(&item.status)
        .bind(&item.email)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create", e))?;

        let id: i64 = row
            .try_get("id")
            .map_err(|e| StoreError::Decode(format!("id: {e}")))?;
        Ok(item.into_item(ItemId::from_raw(id)))
    }

    #[instrument(skip(self, item), fields(item_id = %item.id), err)]
    async fn save(&self, item: Item) -> StoreResult<Item> {
        sqlx::query(
            r#"
            INSERT INTO items (id, name, description, status, email)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id)
            DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                status = EXCLUDED.status,
                email = EXCLUDED.email
            "#,
        )
        .bind(item.id.get())
        .bind(&item.name)
        .bind(item.description.as_deref())
        .bind(&item.status)
        .bind(&item.email)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("save", e))?;

        Ok(item)
    }

    #[instrument(skip(self), fields(item_id = %id), err)]
    async fn delete(&self, id: ItemId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(item_id = %id), err)]
    async fn mark_processed(&self, id: ItemId) -> StoreResult<Option<Item>> {
        let row = sqlx::query(
            r#"
            UPDATE items
            SET status = $1
            WHERE id = $2
            RETURNING id, name, description, status, email
            "#,
        )
        .bind(PROCESSED)
        .bind(id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("mark_processed", e))?;

        row.as_ref().map(row_to_item).transpose()
    }
}

fn row_to_item(row: &PgRow) -> StoreResult<Item> {
    let decode = |col: &str, e: sqlx::Error| StoreError::Decode(format!("{col}: {e}"));

    Ok(Item {
        id: ItemId::from_raw(row.try_get::<i64, _>("id").map_err(|e| decode("id", e))?),
        name: row.try_get("name").map_err(|e| decode("name", e))?,
        description: row
            .try_get::<Option<String>, _>("description")
            .map_err(|e| decode("description", e))?,
        status: row.try_get("status").map_err(|e| decode("status", e))?,
        email: row.try_get("email").map_err(|e| decode("email", e))?,
    })
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Unavailable(format!("connection pool timed out in {operation}"))
        }
        sqlx::Error::Io(e) => StoreError::Unavailable(format!("io error in {operation}: {e}")),
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::Decode(_) => StoreError::Decode(format!("{operation}: {err}")),
        sqlx::Error::Database(db_err) => {
            let code = db_err.code().map(|c| c.into_owned()).unwrap_or_default();
            StoreError::query(operation, format!("database error [{code}]: {}", db_err.message()))
        }
        other => StoreError::query(operation, other.to_string()),
    }
}
