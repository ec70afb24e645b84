//! Usuario endpoints

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

use crate::http::error::ApiError;
use crate::http::extractors::{UserId, UserPayload};
use crate::http::server::AppState;
use crate::models::User;

/// Response for a successful registration
#[derive(Serialize)]
pub struct CreatedResponse {
    pub id: i64,
    pub message: &'static str,
}

/// Response for update and delete
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// GET /api/usuarios - every user, most recent first
async fn list_usuarios(State(state): State<Arc<AppState>>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.directory.list().await?))
}

/// GET /api/usuarios/{id}
async fn get_usuario(
    State(state): State<Arc<AppState>>,
    UserId(id): UserId,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.directory.get(id).await?))
}

/// POST /api/usuarios - register a user
async fn create_usuario(
    State(state): State<Arc<AppState>>,
    UserPayload(input): UserPayload,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let id = state.directory.create(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id,
            message: "Usuario registrado exitosamente",
        }),
    ))
}

/// PUT /api/usuarios/{id} - replace a user's fields
async fn update_usuario(
    State(state): State<Arc<AppState>>,
    UserId(id): UserId,
    UserPayload(input): UserPayload,
) -> Result<Json<MessageResponse>, ApiError> {
    state.directory.update(id, input).await?;

    Ok(Json(MessageResponse {
        message: "Usuario actualizado exitosamente",
    }))
}

/// DELETE /api/usuarios/{id}
async fn delete_usuario(
    State(state): State<Arc<AppState>>,
    UserId(id): UserId,
) -> Result<Json<MessageResponse>, ApiError> {
    state.directory.delete(id).await?;

    Ok(Json(MessageResponse {
        message: "Usuario eliminado exitosamente",
    }))
}

/// Usuario routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/usuarios", get(list_usuarios).post(create_usuario))
        .route(
            "/api/usuarios/{id}",
            get(get_usuario).put(update_usuario).delete(delete_usuario),
        )
}
