use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::owner::OwnerUser;
use crate::api::dtos::requests::CreateUserRequest;
use crate::api::dtos::responses::UserResponse;
use crate::domain::models::user::{User, ROLE_OWNER, ROLE_STAFF};
use crate::domain::services::auth_service::AuthService;
use std::sync::Arc;
use crate::error::AppError;
use tracing::{info, error};

const MIN_PASSWORD_LEN: usize = 8;

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    _owner: OwnerUser,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let username = payload.username.trim().to_string();
    if username.is_empty() {
        return Err(AppError::Validation("Username must not be empty".into()));
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!("Password must be at least {} characters", MIN_PASSWORD_LEN)));
    }

    let role = match payload.role.as_deref().map(str::to_ascii_uppercase).as_deref() {
        None | Some(ROLE_STAFF) => ROLE_STAFF,
        Some(ROLE_OWNER) => ROLE_OWNER,
        Some(other) => return Err(AppError::Validation(format!("Unknown role '{}'", other))),
    };

    if state.user_repo.find_by_username(&username).await?.is_some() {
        return Err(AppError::Conflict("Username already exists".into()));
    }

    let password_hash = AuthService::hash_password(&payload.password)?;
    let created = state.user_repo.create(&User::new(username, password_hash, role)).await?;

    info!("Created {} user: {}", created.role, created.id);
    Ok(Json(UserResponse::from(created)))
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _owner: OwnerUser,
) -> Result<impl IntoResponse, AppError> {
    let users: Vec<UserResponse> = state.user_repo.list().await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(users))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    OwnerUser(owner): OwnerUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if owner.id == user_id {
        return Err(AppError::Conflict("Cannot delete yourself".into()));
    }

    match state.user_repo.delete(&user_id).await {
        Ok(_) => {
            info!("Deleted user {}", user_id);
            Ok(Json(serde_json::json!({"status": "deleted"})))
        },
        Err(e) => {
            error!("Failed to delete user {}: {:?}", user_id, e);
            Err(e)
        }
    }
}
