use serde::Deserialize;

const DEFAULT_LIMIT: i64 = 10;
const DEFAULT_PAGE: i64 = 1;

// Struct representing the request body for creating a new Todo.
// Unknown fields, `id` included, are ignored.
#[derive(Debug, Deserialize)]
pub struct CreateTodoSchema {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
}

// Struct representing the request body for updating a Todo.
// Absent and null fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoSchema {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

/// Query string of `GET /todos`.
///
/// Values are kept as raw strings: a number that does not parse, or that is
/// below 1, falls back to its default instead of rejecting the request.
#[derive(Debug, Default)]
pub struct ListQueryParams {
    pub limit: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub status: Option<String>,
}

impl ListQueryParams {
    /// Builds the params from decoded query pairs. The first value of a
    /// repeated key wins and unknown keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "limit" => &mut params.limit,
                "page" => &mut params.page,
                "per_page" => &mut params.per_page,
                "status" => &mut params.status,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        params
    }

    pub fn limit(&self) -> i64 {
        positive_or(self.limit.as_deref(), DEFAULT_LIMIT)
    }

    pub fn page(&self) -> i64 {
        positive_or(self.page.as_deref(), DEFAULT_PAGE)
    }

    pub fn per_page(&self) -> i64 {
        positive_or(self.per_page.as_deref(), DEFAULT_LIMIT)
    }

    /// Zero-based row offset of the requested page.
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.per_page())
    }

    /// The status to filter on; an empty value means no filter.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref().filter(|status| !status.is_empty())
    }
}

fn positive_or(raw: Option<&str>, default: i64) -> i64 {
    match raw.and_then(|value| value.trim().parse::<i64>().ok()) {
        Some(value) if value >= 1 => value,
        _ => default,
    }
}
