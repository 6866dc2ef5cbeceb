use crate::db::keys;
use crate::db::models::Comment;
use crate::db::{LocalStore, StoreError};

pub fn all(store: &LocalStore) -> Result<Vec<Comment>, StoreError> {
    store.read_collection(keys::COMMENTS)
}

pub fn save_all(store: &LocalStore, comments: &[Comment]) -> Result<(), StoreError> {
    store.write_collection(keys::COMMENTS, comments)
}

pub fn find_by_id(store: &LocalStore, id: &str) -> Result<Option<Comment>, StoreError> {
    Ok(all(store)?.into_iter().find(|comment| comment.id == id))
}

/// Thread for an exam page, oldest first.
pub fn for_exam(store: &LocalStore, exam_id: &str) -> Result<Vec<Comment>, StoreError> {
    let mut comments: Vec<Comment> =
        all(store)?.into_iter().filter(|comment| comment.exam_id == exam_id).collect();
    comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Ok(comments)
}

pub fn insert(store: &LocalStore, comment: Comment) -> Result<Comment, StoreError> {
    let mut comments = all(store)?;
    comments.push(comment.clone());
    save_all(store, &comments)?;
    Ok(comment)
}

pub fn remove(store: &LocalStore, id: &str) -> Result<bool, StoreError> {
    let mut comments = all(store)?;
    let before = comments.len();
    comments.retain(|comment| comment.id != id);
    if comments.len() == before {
        return Ok(false);
    }
    save_all(store, &comments)?;
    Ok(true)
}

pub fn remove_for_exam(store: &LocalStore, exam_id: &str) -> Result<usize, StoreError> {
    let mut comments = all(store)?;
    let before = comments.len();
    comments.retain(|comment| comment.exam_id != exam_id);
    let removed = before - comments.len();
    if removed > 0 {
        save_all(store, &comments)?;
    }
    Ok(removed)
}
