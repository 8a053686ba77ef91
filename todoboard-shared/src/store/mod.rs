/// Storage for to-do items and users
///
/// The API server holds one [`TodoStore`] and one [`UserStore`] behind `Arc`s
/// in its application state. Two backends exist:
///
/// - [`memory`]: process-local, guarded by a `tokio::sync::RwLock`
/// - [`postgres`]: PostgreSQL via sqlx, row-locking transactions for updates
///
/// # Ownership
///
/// Every todo operation takes an `owner` (`Option<Uuid>`). Items are only
/// visible to, and mutable by, the owner they were created under. `None` is
/// the single-user owner and sees only unowned items.
///
/// # Example
///
/// ```
/// use todoboard_shared::models::todo::{NewTodo, Priority};
/// use todoboard_shared::store::{memory::MemoryTodoStore, TodoStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryTodoStore::new();
/// let item = store.create(None, NewTodo::new("Buy milk", Priority::High)?).await?;
///
/// store.delete(item.id, None).await?;
/// assert!(store.list(None).await?.is_empty());
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    todo::{NewTodo, TodoItem, TodoPatch},
    user::{NewUser, User},
};

pub mod memory;
pub mod postgres;

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No item with this ID belongs to the requesting owner
    #[error("Todo not found: {0}")]
    NotFound(Uuid),

    /// Username is already registered
    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Owner-scoped collection of to-do items
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Short backend name for diagnostics
    fn backend(&self) -> &'static str;

    /// Inserts a new item created now
    async fn create(&self, owner: Option<Uuid>, new: NewTodo) -> StoreResult<TodoItem>;

    /// Applies `patch` to the owner's item atomically
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` if the owner has no item with this ID.
    async fn update(&self, id: Uuid, owner: Option<Uuid>, patch: TodoPatch)
        -> StoreResult<TodoItem>;

    /// Removes the owner's item; unknown IDs are not an error
    async fn delete(&self, id: Uuid, owner: Option<Uuid>) -> StoreResult<()>;

    /// Lists the owner's items, most recently created first
    async fn list(&self, owner: Option<Uuid>) -> StoreResult<Vec<TodoItem>>;

    /// Checks that the backend is reachable
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// User accounts keyed by username
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Inserts a new user
    ///
    /// # Errors
    ///
    /// `StoreError::UsernameTaken` if the username exists.
    async fn create(&self, data: NewUser) -> StoreResult<User>;
}
