use crate::schema::{CreateTodoSchema, UpdateTodoSchema};

pub const DEFAULT_STATUS: &str = "pending";

// Data model representing a Todo item
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, serde::Serialize, serde::Deserialize)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: String,
}

impl Todo {
    /// Overwrites every field present in `changes`, leaving the rest as stored.
    /// The identifier is never touched.
    pub fn apply(&mut self, changes: UpdateTodoSchema) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
    }
}

// Values for a row that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
    pub status: String,
}

impl From<CreateTodoSchema> for NewTodo {
    fn from(body: CreateTodoSchema) -> Self {
        let status = body
            .status
            .filter(|status| !status.is_empty())
            .unwrap_or_else(|| DEFAULT_STATUS.to_string());

        Self {
            title: body.title,
            description: body.description.unwrap_or_default(),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> Todo {
        Todo {
            id: 7,
            title: "Buy milk".to_string(),
            description: "two litres".to_string(),
            status: "pending".to_string(),
        }
    }

    #[test]
    fn new_todo_fills_defaults() {
        let todo = NewTodo::from(CreateTodoSchema {
            title: "Buy milk".to_string(),
            description: None,
            status: None,
        });
        assert_eq!(todo.description, "");
        assert_eq!(todo.status, DEFAULT_STATUS);
    }

    #[test]
    fn empty_status_falls_back_to_default() {
        let todo = NewTodo::from(CreateTodoSchema {
            title: "Buy milk".to_string(),
            description: Some("skimmed".to_string()),
            status: Some(String::new()),
        });
        assert_eq!(todo.description, "skimmed");
        assert_eq!(todo.status, DEFAULT_STATUS);
    }

    #[test]
    fn custom_status_is_kept() {
        let todo = NewTodo::from(CreateTodoSchema {
            title: "Buy milk".to_string(),
            description: None,
            status: Some("blocked".to_string()),
        });
        assert_eq!(todo.status, "blocked");
    }

    #[test]
    fn apply_only_touches_present_fields() {
        let mut todo = stored();
        todo.apply(UpdateTodoSchema {
            title: None,
            description: None,
            status: Some("done".to_string()),
        });
        assert_eq!(todo.id, 7);
        assert_eq!(todo.title, "Buy milk");
        assert_eq!(todo.description, "two litres");
        assert_eq!(todo.status, "done");
    }

    #[test]
    fn apply_is_idempotent() {
        let changes = || UpdateTodoSchema {
            title: Some("Buy oat milk".to_string()),
            description: Some(String::new()),
            status: None,
        };
        let mut once = stored();
        once.apply(changes());
        let mut twice = once.clone();
        twice.apply(changes());
        assert_eq!(once, twice);
    }
}
