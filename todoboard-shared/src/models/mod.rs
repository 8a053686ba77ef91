/// Domain models for Todoboard
///
/// # Models
///
/// - `todo`: To-do items, priorities, and the due-date calculator
/// - `user`: User accounts
///
/// # Example
///
/// ```
/// use todoboard_shared::models::todo::{NewTodo, Priority, TodoItem};
/// use chrono::Utc;
///
/// let new = NewTodo::new("Buy milk", Priority::High).unwrap();
/// let item = TodoItem::new(None, new, Utc::now());
/// assert_eq!(item.due_date - item.created_at, chrono::Duration::days(1));
/// ```

pub mod todo;
pub mod user;
