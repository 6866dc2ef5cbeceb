use crate::db::keys;
use crate::db::models::Exam;
use crate::db::types::Season;
use crate::db::{LocalStore, StoreError};

#[derive(Debug, Clone, Default)]
pub struct ExamFilter {
    pub subject: Option<String>,
    pub form: Option<String>,
    pub year: Option<i32>,
    pub season: Option<Season>,
}

pub fn all(store: &LocalStore) -> Result<Vec<Exam>, StoreError> {
    store.read_collection(keys::EXAMS)
}

pub fn save_all(store: &LocalStore, exams: &[Exam]) -> Result<(), StoreError> {
    store.write_collection(keys::EXAMS, exams)
}

pub fn find_by_id(store: &LocalStore, id: &str) -> Result<Option<Exam>, StoreError> {
    Ok(all(store)?.into_iter().find(|exam| exam.id == id))
}

/// Linear-scan filter; newest exams first.
pub fn filter(store: &LocalStore, filter: &ExamFilter) -> Result<Vec<Exam>, StoreError> {
    let mut exams: Vec<Exam> = all(store)?
        .into_iter()
        .filter(|exam| filter.subject.as_deref().map_or(true, |subject| exam.subject == subject))
        .filter(|exam| filter.form.as_deref().map_or(true, |form| exam.form.as_deref() == Some(form)))
        .filter(|exam| filter.year.map_or(true, |year| exam.year == year))
        .filter(|exam| filter.season.map_or(true, |season| exam.season == Some(season)))
        .collect();
    exams.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(exams)
}

pub fn insert(store: &LocalStore, exam: Exam) -> Result<Exam, StoreError> {
    let mut exams = all(store)?;
    exams.push(exam.clone());
    save_all(store, &exams)?;
    Ok(exam)
}

pub fn update(store: &LocalStore, exam: &Exam) -> Result<bool, StoreError> {
    let mut exams = all(store)?;
    let Some(slot) = exams.iter_mut().find(|candidate| candidate.id == exam.id) else {
        return Ok(false);
    };
    *slot = exam.clone();
    save_all(store, &exams)?;
    Ok(true)
}

pub fn remove(store: &LocalStore, id: &str) -> Result<bool, StoreError> {
    let mut exams = all(store)?;
    let before = exams.len();
    exams.retain(|exam| exam.id != id);
    if exams.len() == before {
        return Ok(false);
    }
    save_all(store, &exams)?;
    Ok(true)
}

/// Cascade step for subject deletion; returns the removed exams so the
/// caller can clean up their dependents too.
pub fn remove_for_subject(store: &LocalStore, subject_id: &str) -> Result<Vec<Exam>, StoreError> {
    let exams = all(store)?;
    let (removed, kept): (Vec<Exam>, Vec<Exam>) =
        exams.into_iter().partition(|exam| exam.subject == subject_id);
    if !removed.is_empty() {
        save_all(store, &kept)?;
    }
    Ok(removed)
}
