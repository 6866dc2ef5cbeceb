use crate::db::keys;
use crate::db::models::Message;
use crate::db::{LocalStore, StoreError};

pub fn all(store: &LocalStore) -> Result<Vec<Message>, StoreError> {
    store.read_collection(keys::MESSAGES)
}

pub fn save_all(store: &LocalStore, messages: &[Message]) -> Result<(), StoreError> {
    store.write_collection(keys::MESSAGES, messages)
}

pub fn find_by_id(store: &LocalStore, id: &str) -> Result<Option<Message>, StoreError> {
    Ok(all(store)?.into_iter().find(|message| message.id == id))
}

/// Received messages, newest first.
pub fn inbox_for(store: &LocalStore, user_id: &str) -> Result<Vec<Message>, StoreError> {
    let mut messages: Vec<Message> =
        all(store)?.into_iter().filter(|message| message.recipient_id == user_id).collect();
    messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(messages)
}

/// Sent messages, newest first.
pub fn sent_by(store: &LocalStore, user_id: &str) -> Result<Vec<Message>, StoreError> {
    let mut messages: Vec<Message> =
        all(store)?.into_iter().filter(|message| message.sender_id == user_id).collect();
    messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(messages)
}

pub fn unread_count_for(store: &LocalStore, user_id: &str) -> Result<usize, StoreError> {
    Ok(all(store)?
        .iter()
        .filter(|message| message.recipient_id == user_id && !message.is_read)
        .count())
}

pub fn insert(store: &LocalStore, message: Message) -> Result<Message, StoreError> {
    let mut messages = all(store)?;
    messages.push(message.clone());
    save_all(store, &messages)?;
    Ok(message)
}

pub fn mark_read(store: &LocalStore, id: &str) -> Result<bool, StoreError> {
    let mut messages = all(store)?;
    let Some(message) = messages.iter_mut().find(|message| message.id == id) else {
        return Ok(false);
    };
    message.is_read = true;
    save_all(store, &messages)?;
    Ok(true)
}

pub fn remove(store: &LocalStore, id: &str) -> Result<bool, StoreError> {
    let mut messages = all(store)?;
    let before = messages.len();
    messages.retain(|message| message.id != id);
    if messages.len() == before {
        return Ok(false);
    }
    save_all(store, &messages)?;
    Ok(true)
}
