/// PostgreSQL storage backends
///
/// Updates run in a transaction that locks the row with `SELECT ... FOR
/// UPDATE`, applies the patch in Rust (recomputing the due date from the
/// stored `created_at`) and writes the result back, so concurrent updates to
/// the same item serialize on the row lock.
///
/// Owner filters use `IS NOT DISTINCT FROM` so a `NULL` owner (single-user
/// mode) matches only unowned rows.
///
/// # Example
///
/// ```no_run
/// use todoboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use todoboard_shared::store::{postgres::PgTodoStore, TodoStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// })
/// .await?;
///
/// let store = PgTodoStore::new(pool);
/// let items = store.list(None).await?;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{StoreError, StoreResult, TodoStore, UserStore};
use crate::models::{
    todo::{NewTodo, TodoItem, TodoPatch},
    user::{NewUser, User},
};

/// PostgreSQL-backed to-do store
#[derive(Debug, Clone)]
pub struct PgTodoStore {
    pool: PgPool,
}

impl PgTodoStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoStore for PgTodoStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn create(&self, owner: Option<Uuid>, new: NewTodo) -> StoreResult<TodoItem> {
        let item = TodoItem::new(owner, new, Utc::now());

        let item = sqlx::query_as::<_, TodoItem>(
            r#"
            INSERT INTO todos (id, owner_id, task, priority, description, completed, created_at, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, owner_id, task, priority, description, completed, created_at, due_date
            "#,
        )
        .bind(item.id)
        .bind(item.owner_id)
        .bind(&item.task)
        .bind(item.priority)
        .bind(&item.description)
        .bind(item.completed)
        .bind(item.created_at)
        .bind(item.due_date)
        .fetch_one(&self.pool)
        .await?;

        debug!(todo_id = %item.id, priority = %item.priority, "Created todo");
        Ok(item)
    }

    async fn update(
        &self,
        id: Uuid,
        owner: Option<Uuid>,
        patch: TodoPatch,
    ) -> StoreResult<TodoItem> {
        let mut tx = self.pool.begin().await?;

        let mut item = sqlx::query_as::<_, TodoItem>(
            r#"
            SELECT id, owner_id, task, priority, description, completed, created_at, due_date
            FROM todos
            WHERE id = $1 AND owner_id IS NOT DISTINCT FROM $2
            FOR UPDATE
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound(id))?;

        if patch.is_empty() {
            tx.commit().await?;
            return Ok(item);
        }

        item.apply(patch);

        let item = sqlx::query_as::<_, TodoItem>(
            r#"
            UPDATE todos
            SET task = $2, priority = $3, description = $4, completed = $5, due_date = $6
            WHERE id = $1
            RETURNING id, owner_id, task, priority, description, completed, created_at, due_date
            "#,
        )
        .bind(item.id)
        .bind(&item.task)
        .bind(item.priority)
        .bind(&item.description)
        .bind(item.completed)
        .bind(item.due_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(todo_id = %id, "Updated todo");
        Ok(item)
    }

    async fn delete(&self, id: Uuid, owner: Option<Uuid>) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND owner_id IS NOT DISTINCT FROM $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        debug!(todo_id = %id, removed = result.rows_affected(), "Deleted todo");
        Ok(())
    }

    async fn list(&self, owner: Option<Uuid>) -> StoreResult<Vec<TodoItem>> {
        let items = sqlx::query_as::<_, TodoItem>(
            r#"
            SELECT id, owner_id, task, priority, description, completed, created_at, due_date
            FROM todos
            WHERE owner_id IS NOT DISTINCT FROM $1
            ORDER BY created_at DESC, seq DESC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn ping(&self) -> StoreResult<()> {
        crate::db::pool::health_check(&self.pool).await?;
        Ok(())
    }
}

/// PostgreSQL-backed user store
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create(&self, data: NewUser) -> StoreResult<User> {
        let user = User::new(data, Utc::now());

        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::UsernameTaken(user.username))
            }
            Err(e) => Err(e.into()),
        }
    }
}
