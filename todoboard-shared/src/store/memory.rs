/// In-memory storage backends
///
/// Items live in a `Vec` kept in creation order behind a single
/// `tokio::sync::RwLock`. Each mutation, including the lookup, patch and
/// due-date recomputation of an update, runs under the write lock, so two
/// concurrent updates to the same item are applied one after the other.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{StoreError, StoreResult, TodoStore, UserStore};
use crate::models::{
    todo::{NewTodo, TodoItem, TodoPatch},
    user::{NewUser, User},
};

/// Process-local to-do store
#[derive(Debug, Default)]
pub struct MemoryTodoStore {
    items: RwLock<Vec<TodoItem>>,
}

impl MemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, owner: Option<Uuid>, new: NewTodo) -> StoreResult<TodoItem> {
        let mut items = self.items.write().await;
        // Timestamp taken under the lock so creation order matches Vec order
        let item = TodoItem::new(owner, new, Utc::now());
        items.push(item.clone());

        debug!(todo_id = %item.id, priority = %item.priority, "Created todo");
        Ok(item)
    }

    async fn update(
        &self,
        id: Uuid,
        owner: Option<Uuid>,
        patch: TodoPatch,
    ) -> StoreResult<TodoItem> {
        let mut items = self.items.write().await;
        let item = items
            .iter_mut()
            .find(|item| item.id == id && item.is_owned_by(owner))
            .ok_or(StoreError::NotFound(id))?;

        item.apply(patch);

        debug!(todo_id = %id, "Updated todo");
        Ok(item.clone())
    }

    async fn delete(&self, id: Uuid, owner: Option<Uuid>) -> StoreResult<()> {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|item| !(item.id == id && item.is_owned_by(owner)));

        debug!(todo_id = %id, removed = before - items.len(), "Deleted todo");
        Ok(())
    }

    async fn list(&self, owner: Option<Uuid>) -> StoreResult<Vec<TodoItem>> {
        let items = self.items.read().await;
        Ok(items
            .iter()
            .rev()
            .filter(|item| item.is_owned_by(owner))
            .cloned()
            .collect())
    }
}

/// Process-local user store
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn create(&self, data: NewUser) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.contains_key(&data.username) {
            return Err(StoreError::UsernameTaken(data.username));
        }

        let user = User::new(data, Utc::now());
        users.insert(user.username.clone(), user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::todo::Priority;
    use chrono::Duration;
    use std::sync::Arc;

    fn new_todo(task: &str, priority: Priority) -> NewTodo {
        NewTodo::new(task, priority).unwrap()
    }

    #[tokio::test]
    async fn test_create_derives_due_date_for_every_priority() {
        let store = MemoryTodoStore::new();

        for priority in Priority::ALL {
            let item = store.create(None, new_todo("task", priority)).await.unwrap();
            assert_eq!(item.due_date - item.created_at, priority.due_offset());
        }
    }

    #[tokio::test]
    async fn test_list_is_most_recent_first() {
        let store = MemoryTodoStore::new();
        let first = store.create(None, new_todo("first", Priority::Low)).await.unwrap();
        let second = store.create(None, new_todo("second", Priority::Low)).await.unwrap();
        let third = store.create(None, new_todo("third", Priority::Low)).await.unwrap();

        let ids: Vec<Uuid> = store.list(None).await.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[tokio::test]
    async fn test_list_after_creates_and_deletes() {
        let store = MemoryTodoStore::new();
        let mut ids = Vec::new();
        for i in 0..5 {
            let item = store
                .create(None, new_todo(&format!("task {}", i), Priority::Medium))
                .await
                .unwrap();
            ids.push(item.id);
        }

        store.delete(ids[1], None).await.unwrap();
        store.delete(ids[3], None).await.unwrap();

        let remaining: Vec<Uuid> = store.list(None).await.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(remaining, vec![ids[4], ids[2], ids[0]]);
    }

    #[tokio::test]
    async fn test_update_priority_recomputes_from_created_at() {
        let store = MemoryTodoStore::new();
        let item = store.create(None, new_todo("Buy milk", Priority::High)).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let updated = store
            .update(item.id, None, TodoPatch::default().with_priority(Priority::Low))
            .await
            .unwrap();

        assert_eq!(updated.created_at, item.created_at);
        assert_eq!(updated.due_date, item.created_at + Duration::days(7));
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let store = MemoryTodoStore::new();
        let id = Uuid::new_v4();

        let result = store
            .update(id, None, TodoPatch::default().with_completed(true))
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(missing)) if missing == id));
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_noop() {
        let store = MemoryTodoStore::new();
        let item = store.create(None, new_todo("keep", Priority::Low)).await.unwrap();

        store.delete(Uuid::new_v4(), None).await.unwrap();

        assert_eq!(store.list(None).await.unwrap(), vec![item]);
    }

    #[tokio::test]
    async fn test_owner_isolation() {
        let store = MemoryTodoStore::new();
        let alice = Some(Uuid::new_v4());
        let bob = Some(Uuid::new_v4());
        let item = store.create(alice, new_todo("alice's", Priority::Low)).await.unwrap();

        assert!(store.list(bob).await.unwrap().is_empty());
        assert!(store.list(None).await.unwrap().is_empty());

        let result = store
            .update(item.id, bob, TodoPatch::default().with_completed(true))
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));

        store.delete(item.id, bob).await.unwrap();
        let alice_items = store.list(alice).await.unwrap();
        assert_eq!(alice_items.len(), 1);
        assert!(!alice_items[0].completed);
    }

    #[tokio::test]
    async fn test_concurrent_updates_keep_invariant() {
        let store = Arc::new(MemoryTodoStore::new());
        let item = store.create(None, new_todo("race", Priority::Medium)).await.unwrap();
        let id = item.id;

        let mut handles = Vec::new();
        for i in 0..32 {
            let store = Arc::clone(&store);
            let priority = Priority::ALL[i % 3];
            handles.push(tokio::spawn(async move {
                store
                    .update(id, None, TodoPatch::default().with_priority(priority))
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let items = store.list(None).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].created_at, item.created_at);
        assert_eq!(items[0].due_date, items[0].created_at + items[0].priority.due_offset());
    }

    #[tokio::test]
    async fn test_user_store_rejects_duplicate_username() {
        let users = MemoryUserStore::new();
        let data = NewUser {
            username: "alice".to_string(),
            password_hash: "hash".to_string(),
        };

        let created = users.create(data.clone()).await.unwrap();
        assert_eq!(
            users.find_by_username("alice").await.unwrap().map(|u| u.id),
            Some(created.id)
        );
        assert!(users.find_by_username("bob").await.unwrap().is_none());

        let result = users.create(data).await;
        assert!(matches!(result, Err(StoreError::UsernameTaken(name)) if name == "alice"));
    }
}
