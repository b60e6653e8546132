//! HTTP surface for student records.
//!
//! The router exposes five endpoints under a configurable prefix (default `/students`):
//!
//! - `POST {prefix}/` – Validate and insert a record; responds `201` with the stored record.
//! - `GET {prefix}/` – List up to [`LIST_LIMIT`] records wrapped as `{"students": [...]}`.
//! - `GET {prefix}/{id}` – Fetch one record.
//! - `PUT {prefix}/{id}` – Apply a partial update and return the resulting record.
//! - `DELETE {prefix}/{id}` – Remove a record; responds `204`.
//!
//! The collection routes answer both with and without a trailing slash.

use crate::error::ApiError;
use crate::store::{StoreError, StudentStore};
use crate::students::{Student, StudentId, validate_new_student, validate_student_update};
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Maximum number of records returned by the list endpoint.
pub const LIST_LIMIT: usize = 1000;

/// Build the HTTP router exposing the student CRUD surface.
///
/// `prefix` is expected in normalized form: empty, or a leading slash with no trailing slash.
pub fn create_router<S>(store: Arc<S>, prefix: &str) -> Router
where
    S: StudentStore + 'static,
{
    let collection = get(list_students::<S>).post(create_student::<S>);
    let item = get(show_student::<S>)
        .put(update_student::<S>)
        .delete(delete_student::<S>);

    let router = if prefix.is_empty() {
        Router::new().route("/", collection)
    } else {
        Router::new()
            .route(prefix, collection.clone())
            .route(&format!("{prefix}/"), collection)
    };

    router
        .route(&format!("{prefix}/:id"), item)
        .with_state(store)
}

/// Response body for the list endpoint.
#[derive(Serialize)]
struct StudentCollection {
    students: Vec<Student>,
}

/// Insert a new student record.
async fn create_student<S>(
    State(store): State<Arc<S>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Student>), ApiError>
where
    S: StudentStore,
{
    let Json(body) = payload?;
    let student = validate_new_student(&body)?;
    let id = store.insert(student).await?;
    let created = store.find_by_id(id).await?.ok_or_else(|| {
        StoreError::MalformedDocument(format!("inserted student {id} could not be read back"))
    })?;
    tracing::info!(id = %created.id, "Student created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// List stored student records.
async fn list_students<S>(
    State(store): State<Arc<S>>,
) -> Result<Json<StudentCollection>, ApiError>
where
    S: StudentStore,
{
    let students = store.find_all(LIST_LIMIT).await?;
    tracing::debug!(count = students.len(), "Listed students");
    Ok(Json(StudentCollection { students }))
}

/// Fetch a single student record.
async fn show_student<S>(
    State(store): State<Arc<S>>,
    Path(id): Path<String>,
) -> Result<Json<Student>, ApiError>
where
    S: StudentStore,
{
    let student_id = parse_id(&id)?;
    match store.find_by_id(student_id).await? {
        Some(student) => Ok(Json(student)),
        None => Err(ApiError::not_found(id)),
    }
}

/// Apply a partial update to a student record.
///
/// Absent and `null` fields are ignored. An update carrying no fields returns the current record.
async fn update_student<S>(
    State(store): State<Arc<S>>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Student>, ApiError>
where
    S: StudentStore,
{
    let Json(body) = payload?;
    let update = validate_student_update(&body)?;
    let student_id = parse_id(&id)?;

    let result = if update.is_empty() {
        store.find_by_id(student_id).await?
    } else {
        store.update_by_id(student_id, update).await?
    };

    match result {
        Some(student) => {
            tracing::info!(id = %student.id, "Student updated");
            Ok(Json(student))
        }
        None => Err(ApiError::not_found(id)),
    }
}

/// Delete a student record.
async fn delete_student<S>(
    State(store): State<Arc<S>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    S: StudentStore,
{
    let student_id = parse_id(&id)?;
    if store.delete_by_id(student_id).await? == 0 {
        return Err(ApiError::not_found(id));
    }
    tracing::info!(id = %student_id, "Student deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn parse_id(raw: &str) -> Result<StudentId, ApiError> {
    StudentId::parse(raw).ok_or_else(|| ApiError::not_found(raw))
}
