/// To-do item model and due-date calculator
///
/// Every item carries a derived `due_date` computed from its immutable
/// `created_at` and its current `priority`:
///
/// | Priority | Due after |
/// |----------|-----------|
/// | high     | 1 day     |
/// | medium   | 3 days    |
/// | low      | 7 days    |
///
/// `due_date == created_at + offset(priority)` holds after every create and
/// every update. Updates recompute the due date from the original creation
/// time, never from the time of the update.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE todo_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE todos (
///     id UUID PRIMARY KEY,
///     seq BIGINT GENERATED ALWAYS AS IDENTITY,
///     owner_id UUID REFERENCES users(id) ON DELETE CASCADE,
///     task TEXT NOT NULL,
///     priority todo_priority NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL,
///     due_date TIMESTAMPTZ NOT NULL
/// );
/// ```
///
/// # Example
///
/// ```
/// use chrono::{Duration, Utc};
/// use todoboard_shared::models::todo::{NewTodo, Priority, TodoItem, TodoPatch};
///
/// let mut item = TodoItem::new(None, NewTodo::new("Buy milk", Priority::High).unwrap(), Utc::now());
/// assert_eq!(item.due_date, item.created_at + Duration::days(1));
///
/// item.apply(TodoPatch::default().with_priority(Priority::Low));
/// assert_eq!(item.due_date, item.created_at + Duration::days(7));
/// ```

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Validation failures for to-do input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TodoError {
    /// Task text is empty after trimming
    #[error("Task must not be empty")]
    EmptyTask,

    /// Priority is not one of low, medium, high
    #[error("Invalid priority: {0:?}")]
    InvalidPriority(String),
}

/// Priority tier controlling the due-date offset
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "todo_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    /// All tiers, lowest first
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Number of days between creation and due date
    pub fn due_offset_days(&self) -> i64 {
        match self {
            Priority::High => 1,
            Priority::Medium => 3,
            Priority::Low => 7,
        }
    }

    pub fn due_offset(&self) -> Duration {
        Duration::days(self.due_offset_days())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a priority case-insensitively, ignoring surrounding whitespace
impl FromStr for Priority {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(TodoError::InvalidPriority(s.to_string())),
        }
    }
}

/// Computes the due date for an item created at `created_at`
///
/// Pure and deterministic. Callers must pass the item's original creation
/// time, including on updates.
pub fn due_date(created_at: DateTime<Utc>, priority: Priority) -> DateTime<Utc> {
    created_at + priority.due_offset()
}

/// A to-do item
///
/// `due_date` is derived; mutate items only through [`TodoItem::apply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    /// Unique item ID (UUID v4), never reused
    pub id: Uuid,

    /// Owning user, absent in single-user mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Uuid>,

    /// Task text, trimmed and non-empty
    pub task: String,

    pub priority: Priority,

    pub description: String,

    pub completed: bool,

    /// Creation time, immutable
    pub created_at: DateTime<Utc>,

    /// `created_at + priority.due_offset()`
    pub due_date: DateTime<Utc>,
}

impl TodoItem {
    /// Builds a fresh item created at `now`
    ///
    /// The creation time is truncated to microseconds so it survives a
    /// round trip through a `TIMESTAMPTZ` column unchanged.
    pub fn new(owner_id: Option<Uuid>, new: NewTodo, now: DateTime<Utc>) -> Self {
        let created_at = now.trunc_subsecs(6);

        Self {
            id: Uuid::new_v4(),
            owner_id,
            task: new.task,
            priority: new.priority,
            description: new.description,
            completed: new.completed,
            created_at,
            due_date: due_date(created_at, new.priority),
        }
    }

    /// Applies a partial update in place
    ///
    /// Only supplied fields change. A supplied priority recomputes the due
    /// date from the original creation time.
    pub fn apply(&mut self, patch: TodoPatch) {
        if let Some(task) = patch.task {
            self.task = task;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
            self.due_date = due_date(self.created_at, priority);
        }
    }

    pub fn is_owned_by(&self, owner_id: Option<Uuid>) -> bool {
        self.owner_id == owner_id
    }
}

/// Validated input for creating an item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    task: String,
    priority: Priority,
    description: String,
    completed: bool,
}

impl NewTodo {
    /// Creates input with an empty description, not completed
    ///
    /// # Errors
    ///
    /// `TodoError::EmptyTask` if `task` is blank.
    pub fn new(task: &str, priority: Priority) -> Result<Self, TodoError> {
        Ok(Self {
            task: normalize_task(task)?,
            priority,
            description: String::new(),
            completed: false,
        })
    }

    /// Creates input from raw request strings
    ///
    /// A missing priority defaults to `low`.
    pub fn parse(task: &str, priority: Option<&str>) -> Result<Self, TodoError> {
        let priority = priority
            .map(|p| p.parse::<Priority>())
            .transpose()?
            .unwrap_or_default();
        Self::new(task, priority)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }
}

/// Validated partial update
///
/// Fields left as `None` are not touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    task: Option<String>,
    priority: Option<Priority>,
    description: Option<String>,
    completed: Option<bool>,
}

impl TodoPatch {
    /// Sets the task text
    ///
    /// # Errors
    ///
    /// `TodoError::EmptyTask` if `task` is blank.
    pub fn with_task(mut self, task: &str) -> Result<Self, TodoError> {
        self.task = Some(normalize_task(task)?);
        Ok(self)
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.task.is_none()
            && self.priority.is_none()
            && self.description.is_none()
            && self.completed.is_none()
    }
}

fn normalize_task(task: &str) -> Result<String, TodoError> {
    let task = task.trim();
    if task.is_empty() {
        return Err(TodoError::EmptyTask);
    }
    Ok(task.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 7, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_due_offsets_per_priority() {
        let created = t0();
        assert_eq!(due_date(created, Priority::High) - created, Duration::days(1));
        assert_eq!(due_date(created, Priority::Medium) - created, Duration::days(3));
        assert_eq!(due_date(created, Priority::Low) - created, Duration::days(7));
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!("high".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(" Medium ".parse::<Priority>().unwrap(), Priority::Medium);
        assert_eq!("LOW".parse::<Priority>().unwrap(), Priority::Low);
        assert_eq!(
            "urgent".parse::<Priority>(),
            Err(TodoError::InvalidPriority("urgent".to_string()))
        );
        assert!("".parse::<Priority>().is_err());
    }

    #[test]
    fn test_priority_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Priority::Medium).unwrap(), "\"medium\"");
        let parsed: Priority = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(parsed, Priority::High);
    }

    #[test]
    fn test_new_item_derives_due_date() {
        let item = TodoItem::new(None, NewTodo::new("Buy milk", Priority::High).unwrap(), t0());

        assert_eq!(item.created_at, t0());
        assert_eq!(item.due_date, Utc.with_ymd_and_hms(2025, 9, 8, 12, 0, 0).unwrap());
        assert!(!item.completed);
        assert_eq!(item.description, "");
    }

    #[test]
    fn test_new_item_truncates_to_microseconds() {
        let now = t0() + Duration::nanoseconds(1_234_567);
        let item = TodoItem::new(None, NewTodo::new("x", Priority::Low).unwrap(), now);

        assert_eq!(item.created_at, t0() + Duration::microseconds(1_234));
        assert_eq!(item.due_date, item.created_at + Duration::days(7));
    }

    #[test]
    fn test_new_todo_trims_and_rejects_blank() {
        let new = NewTodo::new("  Set up meetings  ", Priority::Medium).unwrap();
        assert_eq!(new.task, "Set up meetings");

        assert_eq!(NewTodo::new("   ", Priority::Low), Err(TodoError::EmptyTask));
        assert_eq!(NewTodo::new("", Priority::Low), Err(TodoError::EmptyTask));
    }

    #[test]
    fn test_new_todo_parse_defaults_to_low() {
        let new = NewTodo::parse("task", None).unwrap();
        assert_eq!(new.priority, Priority::Low);

        let new = NewTodo::parse("task", Some("HIGH")).unwrap();
        assert_eq!(new.priority, Priority::High);

        assert!(matches!(
            NewTodo::parse("task", Some("soon")),
            Err(TodoError::InvalidPriority(_))
        ));
    }

    #[test]
    fn test_priority_update_uses_original_created_at() {
        let mut item = TodoItem::new(None, NewTodo::new("Buy milk", Priority::High).unwrap(), t0());

        item.apply(TodoPatch::default().with_priority(Priority::Low));

        assert_eq!(item.created_at, t0());
        assert_eq!(item.priority, Priority::Low);
        assert_eq!(item.due_date, Utc.with_ymd_and_hms(2025, 9, 14, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_non_priority_update_keeps_dates() {
        let mut item = TodoItem::new(None, NewTodo::new("Buy milk", Priority::Medium).unwrap(), t0());
        let (created, due) = (item.created_at, item.due_date);

        item.apply(
            TodoPatch::default()
                .with_completed(true)
                .with_description("2 litres"),
        );

        assert!(item.completed);
        assert_eq!(item.description, "2 litres");
        assert_eq!(item.created_at, created);
        assert_eq!(item.due_date, due);
    }

    #[test]
    fn test_patch_rejects_blank_task() {
        assert_eq!(TodoPatch::default().with_task("  "), Err(TodoError::EmptyTask));
        assert!(TodoPatch::default().is_empty());
        assert!(!TodoPatch::default().with_completed(false).is_empty());
    }

    #[test]
    fn test_item_json_shape() {
        let item = TodoItem::new(None, NewTodo::new("Buy milk", Priority::High).unwrap(), t0());
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["task"], "Buy milk");
        assert_eq!(json["priority"], "high");
        assert_eq!(json["createdAt"], "2025-09-07T12:00:00Z");
        assert_eq!(json["dueDate"], "2025-09-08T12:00:00Z");
        assert!(json.get("ownerId").is_none());

        let owner = Uuid::new_v4();
        let owned = TodoItem::new(Some(owner), NewTodo::new("x", Priority::Low).unwrap(), t0());
        let json = serde_json::to_value(&owned).unwrap();
        assert_eq!(json["ownerId"], owner.to_string());
    }
}
