use validator::Validate;

use crate::core::state::AppState;
use crate::core::time::now_utc;
use crate::db::ids::generate_id;
use crate::db::models::Comment;
use crate::repositories;
use crate::schemas::comment::NewComment;
use crate::services::auth;
use crate::services::errors::ServiceError;

/// Posts a comment as the signed-in user; the author's name and role are
/// denormalized onto the record.
pub fn add_comment(state: &AppState, payload: NewComment) -> Result<Comment, ServiceError> {
    payload.validate()?;

    let user = auth::session_user(state)?
        .ok_or(ServiceError::Unauthorized("sign in to post a comment"))?;

    let comment = Comment {
        id: generate_id(),
        exam_id: payload.exam_id,
        user_id: user.id.clone(),
        user_name: user.full_name(),
        user_role: user.role,
        content: payload.content,
        image_url: payload.image_url,
        created_at: now_utc(),
    };
    repositories::comments::insert(state.store(), comment)
        .map_err(|e| ServiceError::internal(e, "Failed to create comment"))
}

pub fn comments_for_exam(state: &AppState, exam_id: &str) -> Result<Vec<Comment>, ServiceError> {
    repositories::comments::for_exam(state.store(), exam_id)
        .map_err(|e| ServiceError::internal(e, "Failed to list comments"))
}

pub fn delete_comment(state: &AppState, id: &str) -> Result<(), ServiceError> {
    let comment = repositories::comments::find_by_id(state.store(), id)
        .map_err(|e| ServiceError::internal(e, "Failed to fetch comment"))?
        .ok_or_else(|| ServiceError::NotFound(String::from("comment not found")))?;

    repositories::comments::remove(state.store(), id)
        .map_err(|e| ServiceError::internal(e, "Failed to delete comment"))?;

    if let Some(image_url) = &comment.image_url {
        if let Err(err) = state.files().delete_url(image_url) {
            tracing::warn!(error = %err, comment_id = %id, "Failed to delete comment image");
        }
    }
    Ok(())
}
