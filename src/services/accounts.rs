use crate::core::security;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::user::{AdminUserUpdate, UserView};
use crate::services::errors::ServiceError;

/// All users, newest first.
pub fn list_users(state: &AppState) -> Result<Vec<UserView>, ServiceError> {
    let mut users = repositories::users::all(state.store())
        .map_err(|e| ServiceError::internal(e, "Failed to list users"))?;
    users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(users.into_iter().map(UserView::from_record).collect())
}

pub fn get_user(state: &AppState, id: &str) -> Result<UserView, ServiceError> {
    let user = repositories::users::find_by_id(state.store(), id)
        .map_err(|e| ServiceError::internal(e, "Failed to fetch user"))?
        .ok_or_else(|| ServiceError::NotFound(String::from("user not found")))?;
    Ok(UserView::from_record(user))
}

/// Partial update; absent fields keep their stored values.
pub fn update_user(
    state: &AppState,
    id: &str,
    payload: AdminUserUpdate,
) -> Result<UserView, ServiceError> {
    let mut user = repositories::users::find_by_id(state.store(), id)
        .map_err(|e| ServiceError::internal(e, "Failed to fetch user"))?
        .ok_or_else(|| ServiceError::NotFound(String::from("user not found")))?;

    if let Some(first_name) = payload.first_name {
        user.first_name = first_name;
    }
    if let Some(last_name) = payload.last_name {
        user.last_name = last_name;
    }
    if let Some(role) = payload.role {
        user.role = role;
    }
    if let Some(password) = payload.password {
        user.hashed_password = security::hash_password(&password)
            .map_err(|e| ServiceError::internal(e, "Failed to hash password"))?;
    }

    let found = repositories::users::update(state.store(), &user)
        .map_err(|e| ServiceError::internal(e, "Failed to update user"))?;
    if !found {
        return Err(ServiceError::NotFound(String::from("user not found")));
    }

    Ok(UserView::from_record(user))
}

pub fn delete_user(state: &AppState, id: &str) -> Result<(), ServiceError> {
    let removed = repositories::users::remove(state.store(), id)
        .map_err(|e| ServiceError::internal(e, "Failed to delete user"))?;
    if !removed {
        return Err(ServiceError::NotFound(String::from("user not found")));
    }
    Ok(())
}
