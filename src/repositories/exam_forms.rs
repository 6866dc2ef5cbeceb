use crate::db::keys;
use crate::db::models::ExamForm;
use crate::db::{LocalStore, StoreError};

pub fn all(store: &LocalStore) -> Result<Vec<ExamForm>, StoreError> {
    store.read_collection(keys::EXAM_FORMS)
}

pub fn save_all(store: &LocalStore, forms: &[ExamForm]) -> Result<(), StoreError> {
    store.write_collection(keys::EXAM_FORMS, forms)
}

pub fn find_by_id(store: &LocalStore, id: &str) -> Result<Option<ExamForm>, StoreError> {
    Ok(all(store)?.into_iter().find(|form| form.id == id))
}

pub fn for_subject(store: &LocalStore, subject_id: &str) -> Result<Vec<ExamForm>, StoreError> {
    Ok(all(store)?.into_iter().filter(|form| form.subject_id == subject_id).collect())
}

pub fn find_by_name_in_subject(
    store: &LocalStore,
    subject_id: &str,
    name: &str,
) -> Result<Option<ExamForm>, StoreError> {
    let needle = name.trim();
    Ok(all(store)?
        .into_iter()
        .find(|form| form.subject_id == subject_id && form.name.eq_ignore_ascii_case(needle)))
}

pub fn insert(store: &LocalStore, form: ExamForm) -> Result<ExamForm, StoreError> {
    let mut forms = all(store)?;
    forms.push(form.clone());
    save_all(store, &forms)?;
    Ok(form)
}

pub fn update(store: &LocalStore, form: &ExamForm) -> Result<bool, StoreError> {
    let mut forms = all(store)?;
    let Some(slot) = forms.iter_mut().find(|candidate| candidate.id == form.id) else {
        return Ok(false);
    };
    *slot = form.clone();
    save_all(store, &forms)?;
    Ok(true)
}

pub fn remove(store: &LocalStore, id: &str) -> Result<bool, StoreError> {
    let mut forms = all(store)?;
    let before = forms.len();
    forms.retain(|form| form.id != id);
    if forms.len() == before {
        return Ok(false);
    }
    save_all(store, &forms)?;
    Ok(true)
}

/// Cascade step for subject deletion; returns how many forms went.
pub fn remove_for_subject(store: &LocalStore, subject_id: &str) -> Result<usize, StoreError> {
    let mut forms = all(store)?;
    let before = forms.len();
    forms.retain(|form| form.subject_id != subject_id);
    let removed = before - forms.len();
    if removed > 0 {
        save_all(store, &forms)?;
    }
    Ok(removed)
}
