use crate::db::keys;
use crate::db::models::Subject;
use crate::db::{LocalStore, StoreError};

pub fn all(store: &LocalStore) -> Result<Vec<Subject>, StoreError> {
    store.read_collection(keys::SUBJECTS)
}

pub fn save_all(store: &LocalStore, subjects: &[Subject]) -> Result<(), StoreError> {
    store.write_collection(keys::SUBJECTS, subjects)
}

pub fn find_by_id(store: &LocalStore, id: &str) -> Result<Option<Subject>, StoreError> {
    Ok(all(store)?.into_iter().find(|subject| subject.id == id))
}

pub fn find_by_name(store: &LocalStore, name: &str) -> Result<Option<Subject>, StoreError> {
    let needle = name.trim();
    Ok(all(store)?.into_iter().find(|subject| subject.name.eq_ignore_ascii_case(needle)))
}

pub fn insert(store: &LocalStore, subject: Subject) -> Result<Subject, StoreError> {
    let mut subjects = all(store)?;
    subjects.push(subject.clone());
    save_all(store, &subjects)?;
    Ok(subject)
}

pub fn update(store: &LocalStore, subject: &Subject) -> Result<bool, StoreError> {
    let mut subjects = all(store)?;
    let Some(slot) = subjects.iter_mut().find(|candidate| candidate.id == subject.id) else {
        return Ok(false);
    };
    *slot = subject.clone();
    save_all(store, &subjects)?;
    Ok(true)
}

pub fn remove(store: &LocalStore, id: &str) -> Result<bool, StoreError> {
    let mut subjects = all(store)?;
    let before = subjects.len();
    subjects.retain(|subject| subject.id != id);
    if subjects.len() == before {
        return Ok(false);
    }
    save_all(store, &subjects)?;
    Ok(true)
}
