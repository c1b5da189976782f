//! People routes. Each handler makes exactly one store call.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;

use crate::config::ShowRouteMode;
use crate::dtos::{JsonPayload, PersonPayload, PersonResponse};
use crate::models::PersonId;
use crate::services::{record_store_operation, StoreError};
use crate::startup::AppState;

fn observed<T>(operation: &'static str, result: Result<T, StoreError>) -> Result<T, StoreError> {
    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };
    record_store_operation(operation, outcome);
    result
}

pub async fn hello_world() -> &'static str {
    "hello world"
}

pub async fn list_people(
    State(state): State<AppState>,
) -> Result<Json<Vec<PersonResponse>>, AppError> {
    let people = observed("list", state.store.list_all().await)?;
    Ok(Json(people.into_iter().map(PersonResponse::from).collect()))
}

pub async fn create_person(
    State(state): State<AppState>,
    JsonPayload(payload): JsonPayload<PersonPayload>,
) -> Result<(StatusCode, Json<PersonResponse>), AppError> {
    let person = observed("create", state.store.create(payload).await)?;

    tracing::info!(person_id = %person.person_id(), "Created person");

    Ok((StatusCode::CREATED, Json(PersonResponse::from(person))))
}

/// Answers `null` when nothing matched.
pub async fn delete_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<PersonResponse>>, AppError> {
    let id: PersonId = id.parse()?;
    let deleted = observed("delete", state.store.delete_by_id(id).await)?;

    if deleted.is_some() {
        tracing::info!(person_id = %id, "Deleted person");
    }

    Ok(Json(deleted.map(PersonResponse::from)))
}

/// Answers the post-update record, or `null` when nothing matched.
pub async fn update_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonPayload(payload): JsonPayload<PersonPayload>,
) -> Result<Json<Option<PersonResponse>>, AppError> {
    let id: PersonId = id.parse()?;
    let updated = observed("update", state.store.update_by_id(id, payload).await)?;
    Ok(Json(updated.map(PersonResponse::from)))
}

/// In `Legacy` mode this is an update with the request body (normally empty,
/// so only `updatedAt` moves). In `Read` mode a miss is a 404.
pub async fn show_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonPayload(payload): JsonPayload<PersonPayload>,
) -> Result<Json<Option<PersonResponse>>, AppError> {
    let id: PersonId = id.parse()?;

    let person = match state.show_route {
        ShowRouteMode::Legacy => {
            observed("update", state.store.update_by_id(id, payload).await)?
        }
        ShowRouteMode::Read => {
            let found = observed("find", state.store.find_by_id(id).await)?;
            Some(found.ok_or(StoreError::NotFound)?)
        }
    };

    Ok(Json(person.map(PersonResponse::from)))
}
