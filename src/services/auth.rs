use validator::Validate;

use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::now_utc;
use crate::db::ids::generate_id;
use crate::db::keys;
use crate::db::models::{Message, User};
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::user::{SignInRequest, SignUpRequest, UserView};
use crate::services::errors::ServiceError;

const WELCOME_SUBJECT: &str = "ברוכים הבאים לפורטל הבגרות!";

fn welcome_body(first_name: &str) -> String {
    format!(
        "שלום {first_name},\n\
         ברוכים הבאים לפורטל הבגרות. במאגר תמצאו שאלוני בחינות משנים קודמות, \
         פתרונות מלאים ופורום דיונים לכל בחינה. בהצלחה!"
    )
}

/// Registers a user, signs them in, and delivers the welcome message from
/// the first admin on record.
pub fn sign_up(state: &AppState, payload: SignUpRequest) -> Result<UserView, ServiceError> {
    payload.validate()?;

    let existing = repositories::users::find_by_email(state.store(), &payload.email)
        .map_err(|e| ServiceError::internal(e, "Failed to check existing user"))?;
    if existing.is_some() {
        return Err(ServiceError::Conflict(String::from(
            "user with this email already exists",
        )));
    }

    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ServiceError::internal(e, "Failed to hash password"))?;

    let user = User {
        id: generate_id(),
        email: payload.email.trim().to_string(),
        hashed_password,
        first_name: payload.first_name.trim().to_string(),
        last_name: payload.last_name.trim().to_string(),
        birth_date: payload.birth_date,
        role: UserRole::User,
        created_at: now_utc(),
    };

    let user = repositories::users::insert(state.store(), user)
        .map_err(|e| ServiceError::internal(e, "Failed to create user"))?;

    send_welcome_message(state, &user);
    remember_session(state, &user)?;

    Ok(UserView::from_record(user))
}

pub fn sign_in(state: &AppState, payload: SignInRequest) -> Result<UserView, ServiceError> {
    payload.validate()?;

    let user = repositories::users::find_by_email(state.store(), &payload.email)
        .map_err(|e| ServiceError::internal(e, "Failed to look up user"))?;
    let Some(user) = user else {
        return Err(ServiceError::Unauthorized("invalid email or password"));
    };

    let verified = security::verify_password(&payload.password, &user.hashed_password)
        .map_err(|e| ServiceError::internal(e, "Failed to verify password"))?;
    if !verified {
        return Err(ServiceError::Unauthorized("invalid email or password"));
    }

    remember_session(state, &user)?;
    Ok(UserView::from_record(user))
}

pub fn sign_out(state: &AppState) -> Result<(), ServiceError> {
    state
        .store()
        .remove_raw(keys::CURRENT_USER)
        .map_err(|e| ServiceError::internal(e, "Failed to clear session"))?;
    Ok(())
}

pub fn current_user(state: &AppState) -> Result<Option<UserView>, ServiceError> {
    Ok(session_user(state)?.map(UserView::from_record))
}

/// The cached signed-in user record, for services that denormalize from it.
pub(crate) fn session_user(state: &AppState) -> Result<Option<User>, ServiceError> {
    let Some(raw) = state
        .store()
        .get_raw(keys::CURRENT_USER)
        .map_err(|e| ServiceError::internal(e, "Failed to read session"))?
    else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| ServiceError::internal(e, "Session holds a malformed user record"))
}

fn remember_session(state: &AppState, user: &User) -> Result<(), ServiceError> {
    let encoded = serde_json::to_string(user)
        .map_err(|e| ServiceError::internal(e, "Failed to encode session user"))?;
    state
        .store()
        .set_raw(keys::CURRENT_USER, &encoded)
        .map_err(|e| ServiceError::internal(e, "Failed to cache session user"))
}

/// A failed welcome message never fails the signup; the account exists.
fn send_welcome_message(state: &AppState, user: &User) {
    let admin = match repositories::users::first_admin(state.store()) {
        Ok(Some(admin)) => admin,
        Ok(None) => return,
        Err(err) => {
            tracing::warn!(error = %err, "Failed to look up welcome sender");
            return;
        }
    };

    let message = Message {
        id: generate_id(),
        sender_id: admin.id.clone(),
        sender_name: admin.full_name(),
        recipient_id: user.id.clone(),
        recipient_name: user.full_name(),
        subject: WELCOME_SUBJECT.to_string(),
        content: welcome_body(&user.first_name),
        attachment_url: None,
        attachment_name: None,
        is_read: false,
        created_at: now_utc(),
    };

    if let Err(err) = repositories::messages::insert(state.store(), message) {
        tracing::warn!(error = %err, user_id = %user.id, "Failed to deliver welcome message");
    }
}
