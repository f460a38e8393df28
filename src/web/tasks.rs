//! Task page handlers.
//!
//! Each handler is a pure function of (request, store): it parses input,
//! performs at most one store operation, and either renders a view context
//! or redirects to the list after a successful write.

use std::sync::Arc;

use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use super::routes::AppState;
use super::views;
use crate::store::{StoreError, TaskStore};
use crate::task::{FieldErrors, Task, TaskFields, FORM_FIELDS};
use chrono::NaiveDate;

// ─────────────────────────────────────────────────────────────────────────────
// Request Types
// ─────────────────────────────────────────────────────────────────────────────

/// Raw create/update submission, exactly as posted by the browser.
///
/// All fields default to empty so an omitted input deserializes instead of
/// rejecting the request; the schema check reports it as a field error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub tags: String,
}

impl TaskForm {
    /// Raw value for a schema field, used when (re-)rendering the form.
    pub fn value(&self, name: &str) -> &str {
        match name {
            "title" => &self.title,
            "description" => &self.description,
            "due_date" => &self.due_date,
            "tags" => &self.tags,
            _ => "",
        }
    }

    /// Validate against the shared schema and convert to typed fields.
    ///
    /// Values are whitespace-trimmed before storage, so "never empty at
    /// rest" holds for the required fields.
    pub fn parse(&self) -> Result<TaskFields, FieldErrors> {
        let mut errors = FieldErrors::default();
        for spec in FORM_FIELDS {
            spec.check(self.value(spec.name), &mut errors);
        }

        let due_date = match self.due_date.trim() {
            "" => None,
            raw => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.insert("due_date", "Enter a valid date (YYYY-MM-DD).");
                    None
                }
            },
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(TaskFields {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            due_date,
            tags: self.tags.trim().to_string(),
        })
    }

    /// Pre-fill the form with a stored task, for the edit page.
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date.map(|d| d.to_string()).unwrap_or_default(),
            tags: task.tags.clone(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Terminal page failures. Validation problems never end up here; they
/// re-render the form instead.
#[derive(Debug, PartialEq, Eq)]
pub enum PageError {
    NotFound,
    Internal,
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            PageError::NotFound => (StatusCode::NOT_FOUND, views::not_found()).into_response(),
            PageError::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, views::internal_error()).into_response()
            }
        }
    }
}

impl From<StoreError> for PageError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => PageError::NotFound,
            StoreError::Invalid(errors) => {
                // Handlers re-render invalid forms before calling the store
                // with `?`, so this arm only fires on a handler bug.
                tracing::error!("validation error escaped form handling: {}", errors);
                PageError::Internal
            }
            StoreError::Persistence(e) => {
                tracing::error!("storage failure: {}", e);
                PageError::Internal
            }
        }
    }
}

/// Parse the `{id}` path segment. A non-integer or negative segment is a
/// routing failure, answered with 404 rather than 400.
fn parse_id(raw: &str) -> Result<i64, PageError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id >= 0)
        .ok_or(PageError::NotFound)
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET / - List all tasks.
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Html<String>, PageError> {
    let tasks = state.store.list_all().await?;
    Ok(views::task_list(&tasks))
}

/// GET /task/:id/ - Task detail.
pub async fn detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Html<String>, PageError> {
    let task = state.store.get(parse_id(&id)?).await?;
    Ok(views::task_detail(&task))
}

/// GET /task/new/ - Empty create form.
pub async fn new_form() -> Html<String> {
    views::task_form(&TaskForm::default(), &FieldErrors::default(), false)
}

/// POST /task/new/ - Create a task, or re-render the form with errors.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Form(form): Form<TaskForm>,
) -> Result<Response, PageError> {
    let fields = match form.parse() {
        Ok(fields) => fields,
        Err(errors) => return Ok(views::task_form(&form, &errors, false).into_response()),
    };

    match state.store.create(fields).await {
        Ok(task) => {
            tracing::info!(id = task.id, "task created");
            Ok(Redirect::to("/").into_response())
        }
        Err(StoreError::Invalid(errors)) => {
            Ok(views::task_form(&form, &errors, false).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// GET /task/:id/edit/ - Form pre-filled with the current values.
pub async fn edit_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Html<String>, PageError> {
    let task = state.store.get(parse_id(&id)?).await?;
    Ok(views::task_form(
        &TaskForm::from_task(&task),
        &FieldErrors::default(),
        true,
    ))
}

/// POST /task/:id/edit/ - Update a task, or re-render the form with errors.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Form(form): Form<TaskForm>,
) -> Result<Response, PageError> {
    let id = parse_id(&id)?;
    // Missing id answers 404 even when the submission is also invalid,
    // matching the GET side of this route.
    state.store.get(id).await?;

    let fields = match form.parse() {
        Ok(fields) => fields,
        Err(errors) => return Ok(views::task_form(&form, &errors, true).into_response()),
    };

    match state.store.update(id, fields).await {
        Ok(task) => {
            tracing::info!(id = task.id, "task updated");
            Ok(Redirect::to("/").into_response())
        }
        Err(StoreError::Invalid(errors)) => {
            Ok(views::task_form(&form, &errors, true).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// GET /task/:id/delete/ - Delete confirmation page.
pub async fn confirm_delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Html<String>, PageError> {
    let task = state.store.get(parse_id(&id)?).await?;
    Ok(views::confirm_delete(&task))
}

/// POST /task/:id/delete/ - Delete the task and redirect to the list.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, PageError> {
    let id = parse_id(&id)?;
    state.store.delete(id).await?;
    tracing::info!(id, "task deleted");
    Ok(Redirect::to("/").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryTaskStore;
    use axum::http::header::LOCATION;

    fn state() -> Arc<AppState> {
        Arc::new(AppState {
            store: Arc::new(InMemoryTaskStore::new()),
        })
    }

    fn milk_form() -> TaskForm {
        TaskForm {
            title: "Buy milk".to_string(),
            description: "2% milk, 1 gallon".to_string(),
            due_date: "2024-01-15".to_string(),
            tags: "errand".to_string(),
        }
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn detail_of_unknown_id_is_404() {
        let result = detail(State(state()), Path("999".to_string())).await;
        assert_eq!(result.unwrap_err(), PageError::NotFound);
    }

    #[tokio::test]
    async fn non_integer_id_is_404_not_400() {
        for raw in ["abc", "-1", "1.5", ""] {
            let result = detail(State(state()), Path(raw.to_string())).await;
            assert_eq!(result.unwrap_err(), PageError::NotFound, "segment {:?}", raw);
        }
        let response = PageError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_without_description_rerenders_with_error() {
        let state = state();
        let mut form = milk_form();
        form.description = String::new();

        let response = create(State(state.clone()), Form(form)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_text(response).await;
        assert!(body.contains("This field is required."));
        // The submitted title is kept on the re-rendered form
        assert!(body.contains("Buy milk"));

        // No task was created
        assert!(state.store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_valid_redirects_to_list() {
        let state = state();
        let response = create(State(state.clone()), Form(milk_form()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/");

        let tasks = state.store.list_all().await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Buy milk");
        assert_eq!(tasks[0].due_date.unwrap().to_string(), "2024-01-15");
    }

    #[tokio::test]
    async fn create_with_invalid_date_rerenders() {
        let state = state();
        let mut form = milk_form();
        form.due_date = "not-a-date".to_string();

        let response = create(State(state.clone()), Form(form)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("valid date"));
        assert!(state.store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_missing_id_is_404_even_with_invalid_form() {
        let result = update(
            State(state()),
            Path("42".to_string()),
            Form(TaskForm::default()),
        )
        .await;
        assert_eq!(result.unwrap_err(), PageError::NotFound);
    }

    #[tokio::test]
    async fn update_changes_fields_and_redirects() {
        let state = state();
        create(State(state.clone()), Form(milk_form())).await.unwrap();
        let id = state.store.list_all().await.unwrap()[0].id;

        let mut form = milk_form();
        form.title = "Buy oat milk".to_string();
        form.due_date = String::new();

        let response = update(State(state.clone()), Path(id.to_string()), Form(form))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let task = state.store.get(id).await.unwrap();
        assert_eq!(task.title, "Buy oat milk");
        assert_eq!(task.due_date, None);
    }

    #[tokio::test]
    async fn edit_form_is_prefilled() {
        let state = state();
        create(State(state.clone()), Form(milk_form())).await.unwrap();
        let id = state.store.list_all().await.unwrap()[0].id;

        let page = edit_form(State(state), Path(id.to_string())).await.unwrap();
        let body = page.0;
        assert!(body.contains("Edit Task"));
        assert!(body.contains("Buy milk"));
        assert!(body.contains("2024-01-15"));
    }

    #[tokio::test]
    async fn delete_of_unknown_id_is_404() {
        let result = delete(State(state()), Path("7".to_string())).await;
        assert_eq!(result.unwrap_err(), PageError::NotFound);
    }

    // The end-to-end life of one task: create, list, detail, confirm, delete.
    #[tokio::test]
    async fn task_lifecycle_scenario() {
        let state = state();

        let response = create(State(state.clone()), Form(milk_form()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let id = state.store.list_all().await.unwrap()[0].id;

        let listing = list(State(state.clone())).await.unwrap().0;
        assert!(listing.contains("Buy milk"));
        assert!(listing.contains(&format!("/task/{}/", id)));

        let page = detail(State(state.clone()), Path(id.to_string()))
            .await
            .unwrap()
            .0;
        assert!(page.contains("Buy milk"));
        assert!(page.contains("2% milk, 1 gallon"));
        assert!(page.contains("2024-01-15"));
        assert!(page.contains("errand"));

        let confirm = confirm_delete(State(state.clone()), Path(id.to_string()))
            .await
            .unwrap()
            .0;
        assert!(confirm.contains("Are you sure"));

        let response = delete(State(state.clone()), Path(id.to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        assert!(state.store.list_all().await.unwrap().is_empty());
        let listing = list(State(state)).await.unwrap().0;
        assert!(!listing.contains("Buy milk"));
    }
}
