use sqlx::{
    migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Pool, QueryBuilder, Sqlite,
};

use crate::{
    config::Config,
    model::{NewTodo, Todo},
};

const CREATE_TODOS_TABLE: &str = r#"CREATE TABLE IF NOT EXISTS todos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT 'pending'
);"#;

/// Row window and optional status equality filter for [`TodoStore::list`].
#[derive(Debug, Clone)]
pub struct TodoFilter {
    pub status: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// Handle to the `todos` table. Cloning shares the underlying pool.
#[derive(Debug, Clone)]
pub struct TodoStore {
    pool: Pool<Sqlite>,
}

impl TodoStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Creates the database if needed, opens the pool and ensures the schema.
    pub async fn connect(config: &Config) -> Result<Self, sqlx::Error> {
        let url = config.database_url.as_str();

        // Check if the database exists, if not, create it
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            tracing::info!(url, "creating database");
            Sqlite::create_database(url).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect(url)
            .await?;
        tracing::info!(url, "connected to database");

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::query(CREATE_TODOS_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn insert(&self, todo: &NewTodo) -> Result<Todo, sqlx::Error> {
        sqlx::query_as::<_, Todo>(
            "INSERT INTO todos (title, description, status) VALUES (?, ?, ?) \
             RETURNING id, title, description, status",
        )
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(&todo.status)
        .fetch_one(&self.pool)
        .await
    }

    /// Rows in ascending id order.
    pub async fn list(&self, filter: &TodoFilter) -> Result<Vec<Todo>, sqlx::Error> {
        let mut query =
            QueryBuilder::<Sqlite>::new("SELECT id, title, description, status FROM todos");
        if let Some(status) = &filter.status {
            query.push(" WHERE status = ").push_bind(status.clone());
        }
        query
            .push(" ORDER BY id LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.offset);

        query.build_query_as::<Todo>().fetch_all(&self.pool).await
    }

    pub async fn find(&self, id: i64) -> Result<Option<Todo>, sqlx::Error> {
        sqlx::query_as::<_, Todo>("SELECT id, title, description, status FROM todos WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Writes every mutable field of `todo` back to its row. `None` when the
    /// row no longer exists.
    pub async fn save(&self, todo: &Todo) -> Result<Option<Todo>, sqlx::Error> {
        sqlx::query_as::<_, Todo>(
            "UPDATE todos SET title = ?, description = ?, status = ? WHERE id = ? \
             RETURNING id, title, description, status",
        )
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(&todo.status)
        .bind(todo.id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Returns whether a row was removed.
    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let rows_affected = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(rows_affected > 0)
    }
}

/// Single-connection in-memory store for tests; every connection to
/// `sqlite::memory:` is its own database, so the pool must never rotate it.
#[cfg(test)]
pub async fn memory_store() -> TodoStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let store = TodoStore::new(pool);
    store.migrate().await.unwrap();
    store
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_todo(title: &str, status: &str) -> NewTodo {
        NewTodo {
            title: title.to_string(),
            description: String::new(),
            status: status.to_string(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let store = memory_store().await;
        let first = store.insert(&new_todo("a", "pending")).await.unwrap();
        let second = store.insert(&new_todo("b", "pending")).await.unwrap();
        assert!(second.id > first.id);
        assert_eq!(store.find(first.id).await.unwrap(), Some(first));
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = memory_store().await;
        let first = store.insert(&new_todo("a", "pending")).await.unwrap();
        assert!(store.delete(first.id).await.unwrap());
        let second = store.insert(&new_todo("b", "pending")).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn list_filters_and_windows() {
        let store = memory_store().await;
        for (i, status) in ["pending", "done", "pending", "pending"].iter().enumerate() {
            store
                .insert(&new_todo(&format!("todo {i}"), status))
                .await
                .unwrap();
        }

        let pending = store
            .list(&TodoFilter {
                status: Some("pending".to_string()),
                limit: 10,
                offset: 0,
            })
            .await
            .unwrap();
        assert_eq!(pending.len(), 3);
        assert!(pending.iter().all(|todo| todo.status == "pending"));

        let window = store
            .list(&TodoFilter {
                status: None,
                limit: 2,
                offset: 1,
            })
            .await
            .unwrap();
        let titles: Vec<_> = window.iter().map(|todo| todo.title.as_str()).collect();
        assert_eq!(titles, ["todo 1", "todo 2"]);
    }

    #[tokio::test]
    async fn save_and_delete_missing_rows() {
        let store = memory_store().await;
        let ghost = Todo {
            id: 42,
            title: "ghost".to_string(),
            description: String::new(),
            status: "pending".to_string(),
        };
        assert_eq!(store.save(&ghost).await.unwrap(), None);
        assert!(!store.delete(42).await.unwrap());
        assert_eq!(store.find(42).await.unwrap(), None);
    }

    #[tokio::test]
    async fn title_is_not_null() {
        let store = memory_store().await;
        let result = sqlx::query("INSERT INTO todos (title) VALUES (NULL)")
            .execute(&store.pool)
            .await;
        assert!(result.is_err());
    }
}
