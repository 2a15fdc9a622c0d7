use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    config::Pagination,
    db::TodoFilter,
    error::{ApiError, NO_TODO_WITH_ID, TODO_NOT_FOUND},
    model::NewTodo,
    schema::{CreateTodoSchema, ListQueryParams, UpdateTodoSchema},
    AppState,
};

// Identifiers that are not integers can never match a row
fn parse_id(raw: &str, not_found: &'static str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| ApiError::NotFound(not_found))
}

// Decodes a request body that must be a JSON object
fn json_object<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    match serde_json::from_slice::<Value>(body)? {
        value @ Value::Object(_) => Ok(serde_json::from_value(value)?),
        _ => Err(ApiError::Validation(
            "request body must be a JSON object".to_string(),
        )),
    }
}

// Handler for getting all Todo items
pub async fn get_todos(
    State(data): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse, ApiError> {
    let params = ListQueryParams::from_pairs(pairs);
    let status = params.status().map(str::to_string);

    let todos = match data.pagination {
        Pagination::Limit => {
            let filter = TodoFilter {
                status,
                limit: params.limit(),
                offset: 0,
            };
            data.store.list(&filter).await?
        }
        Pagination::Page => {
            // Fetch the page first, then filter it; matches on other pages are not pulled in
            let filter = TodoFilter {
                status: None,
                limit: params.per_page(),
                offset: params.offset(),
            };
            let mut page = data.store.list(&filter).await?;
            if let Some(status) = status {
                page.retain(|todo| todo.status == status);
            }
            page
        }
    };

    tracing::debug!(count = todos.len(), "listed todos");
    Ok((StatusCode::OK, Json(todos)))
}

// Handler for creating a new Todo
pub async fn create_todo(
    State(data): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let body: CreateTodoSchema = json_object(&body)?;
    if body.title.is_empty() {
        return Err(ApiError::Validation("title must not be empty".to_string()));
    }

    let todo = data.store.insert(&NewTodo::from(body)).await?;
    tracing::info!(id = todo.id, "created todo");

    Ok((StatusCode::CREATED, Json(todo)))
}

// Handler for getting a specific Todo by ID
pub async fn get_todo(
    Path(id): Path<String>,
    State(data): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, TODO_NOT_FOUND)?;

    match data.store.find(id).await? {
        Some(todo) => Ok((StatusCode::OK, Json(todo))),
        None => Err(ApiError::NotFound(TODO_NOT_FOUND)),
    }
}

// Handler for updating a Todo by ID
pub async fn update_todo(
    Path(id): Path<String>,
    State(data): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, TODO_NOT_FOUND)?;

    // The body is only looked at once the record is known to exist
    let mut todo = data
        .store
        .find(id)
        .await?
        .ok_or(ApiError::NotFound(TODO_NOT_FOUND))?;

    let changes: UpdateTodoSchema = json_object(&body)?;
    todo.apply(changes);

    let todo = data
        .store
        .save(&todo)
        .await?
        .ok_or(ApiError::NotFound(TODO_NOT_FOUND))?;
    tracing::info!(id = todo.id, "updated todo");

    Ok((StatusCode::OK, Json(todo)))
}

// Handler for deleting a Todo by ID
pub async fn delete_todo(
    Path(id): Path<String>,
    State(data): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, NO_TODO_WITH_ID)?;

    if !data.store.delete(id).await? {
        return Err(ApiError::NotFound(NO_TODO_WITH_ID));
    }
    tracing::info!(id, "deleted todo");

    Ok(StatusCode::NO_CONTENT)
}
