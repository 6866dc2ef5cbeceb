use crate::db::keys;
use crate::db::models::User;
use crate::db::types::UserRole;
use crate::db::{LocalStore, StoreError};

pub fn all(store: &LocalStore) -> Result<Vec<User>, StoreError> {
    store.read_collection(keys::USERS)
}

pub fn save_all(store: &LocalStore, users: &[User]) -> Result<(), StoreError> {
    store.write_collection(keys::USERS, users)
}

pub fn find_by_id(store: &LocalStore, id: &str) -> Result<Option<User>, StoreError> {
    Ok(all(store)?.into_iter().find(|user| user.id == id))
}

pub fn find_by_email(store: &LocalStore, email: &str) -> Result<Option<User>, StoreError> {
    Ok(all(store)?.into_iter().find(|user| user.email.eq_ignore_ascii_case(email)))
}

/// First admin in collection order; the sender of automated portal messages.
pub fn first_admin(store: &LocalStore) -> Result<Option<User>, StoreError> {
    Ok(all(store)?.into_iter().find(|user| user.role == UserRole::Admin))
}

pub fn insert(store: &LocalStore, user: User) -> Result<User, StoreError> {
    let mut users = all(store)?;
    users.push(user.clone());
    save_all(store, &users)?;
    Ok(user)
}

/// Replaces the record with a matching id; returns whether one was found.
pub fn update(store: &LocalStore, user: &User) -> Result<bool, StoreError> {
    let mut users = all(store)?;
    let Some(slot) = users.iter_mut().find(|candidate| candidate.id == user.id) else {
        return Ok(false);
    };
    *slot = user.clone();
    save_all(store, &users)?;
    Ok(true)
}

pub fn remove(store: &LocalStore, id: &str) -> Result<bool, StoreError> {
    let mut users = all(store)?;
    let before = users.len();
    users.retain(|user| user.id != id);
    if users.len() == before {
        return Ok(false);
    }
    save_all(store, &users)?;
    Ok(true)
}
