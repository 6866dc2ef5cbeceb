use validator::Validate;

use crate::core::state::AppState;
use crate::core::time::now_utc;
use crate::db::ids::generate_id;
use crate::db::models::{Exam, ExamForm, Subject};
use crate::repositories;
use crate::repositories::exams::ExamFilter;
use crate::schemas::exam::{ExamUpdate, NewExam};
use crate::services::errors::ServiceError;

pub fn list_subjects(state: &AppState) -> Result<Vec<Subject>, ServiceError> {
    repositories::subjects::all(state.store())
        .map_err(|e| ServiceError::internal(e, "Failed to list subjects"))
}

pub fn add_subject(state: &AppState, name: &str) -> Result<Subject, ServiceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::Validation(String::from("subject name must not be empty")));
    }

    let existing = repositories::subjects::find_by_name(state.store(), name)
        .map_err(|e| ServiceError::internal(e, "Failed to check existing subject"))?;
    if existing.is_some() {
        return Err(ServiceError::Conflict(String::from("subject already exists")));
    }

    let subject = Subject { id: generate_id(), name: name.to_string() };
    repositories::subjects::insert(state.store(), subject)
        .map_err(|e| ServiceError::internal(e, "Failed to create subject"))
}

pub fn update_subject(state: &AppState, id: &str, name: &str) -> Result<Subject, ServiceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::Validation(String::from("subject name must not be empty")));
    }

    let duplicate = repositories::subjects::find_by_name(state.store(), name)
        .map_err(|e| ServiceError::internal(e, "Failed to check existing subject"))?;
    if duplicate.as_ref().is_some_and(|subject| subject.id != id) {
        return Err(ServiceError::Conflict(String::from("subject already exists")));
    }

    let mut subject = repositories::subjects::find_by_id(state.store(), id)
        .map_err(|e| ServiceError::internal(e, "Failed to fetch subject"))?
        .ok_or_else(|| ServiceError::NotFound(String::from("subject not found")))?;
    subject.name = name.to_string();

    repositories::subjects::update(state.store(), &subject)
        .map_err(|e| ServiceError::internal(e, "Failed to update subject"))?;
    Ok(subject)
}

/// Removes the subject, then its exams (with their dependents), then its
/// forms. The steps are separate store writes; there is no atomicity across
/// them.
pub fn delete_subject(state: &AppState, id: &str) -> Result<(), ServiceError> {
    let removed = repositories::subjects::remove(state.store(), id)
        .map_err(|e| ServiceError::internal(e, "Failed to delete subject"))?;
    if !removed {
        return Err(ServiceError::NotFound(String::from("subject not found")));
    }

    let removed_exams = repositories::exams::remove_for_subject(state.store(), id)
        .map_err(|e| ServiceError::internal(e, "Failed to cascade exams"))?;
    for exam in &removed_exams {
        cleanup_exam_dependents(state, exam);
    }

    let removed_forms = repositories::exam_forms::remove_for_subject(state.store(), id)
        .map_err(|e| ServiceError::internal(e, "Failed to cascade exam forms"))?;

    tracing::info!(
        subject_id = %id,
        exams = removed_exams.len(),
        forms = removed_forms,
        "Deleted subject and its dependents"
    );
    Ok(())
}

pub fn forms_for_subject(state: &AppState, subject_id: &str) -> Result<Vec<ExamForm>, ServiceError> {
    repositories::exam_forms::for_subject(state.store(), subject_id)
        .map_err(|e| ServiceError::internal(e, "Failed to list exam forms"))
}

pub fn add_exam_form(
    state: &AppState,
    subject_id: &str,
    name: &str,
) -> Result<ExamForm, ServiceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::Validation(String::from("exam form name must not be empty")));
    }

    let existing =
        repositories::exam_forms::find_by_name_in_subject(state.store(), subject_id, name)
            .map_err(|e| ServiceError::internal(e, "Failed to check existing exam form"))?;
    if existing.is_some() {
        return Err(ServiceError::Conflict(String::from(
            "exam form already exists for this subject",
        )));
    }

    let form =
        ExamForm { id: generate_id(), subject_id: subject_id.to_string(), name: name.to_string() };
    repositories::exam_forms::insert(state.store(), form)
        .map_err(|e| ServiceError::internal(e, "Failed to create exam form"))
}

pub fn update_exam_form(state: &AppState, id: &str, name: &str) -> Result<ExamForm, ServiceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::Validation(String::from("exam form name must not be empty")));
    }

    let mut form = repositories::exam_forms::find_by_id(state.store(), id)
        .map_err(|e| ServiceError::internal(e, "Failed to fetch exam form"))?
        .ok_or_else(|| ServiceError::NotFound(String::from("exam form not found")))?;

    let duplicate =
        repositories::exam_forms::find_by_name_in_subject(state.store(), &form.subject_id, name)
            .map_err(|e| ServiceError::internal(e, "Failed to check existing exam form"))?;
    if duplicate.as_ref().is_some_and(|candidate| candidate.id != id) {
        return Err(ServiceError::Conflict(String::from(
            "exam form already exists for this subject",
        )));
    }

    form.name = name.to_string();
    repositories::exam_forms::update(state.store(), &form)
        .map_err(|e| ServiceError::internal(e, "Failed to update exam form"))?;
    Ok(form)
}

/// Exams referencing the form keep their soft reference; only subject
/// deletion cascades.
pub fn delete_exam_form(state: &AppState, id: &str) -> Result<(), ServiceError> {
    let removed = repositories::exam_forms::remove(state.store(), id)
        .map_err(|e| ServiceError::internal(e, "Failed to delete exam form"))?;
    if !removed {
        return Err(ServiceError::NotFound(String::from("exam form not found")));
    }
    Ok(())
}

pub fn list_exams(state: &AppState, filter: &ExamFilter) -> Result<Vec<Exam>, ServiceError> {
    repositories::exams::filter(state.store(), filter)
        .map_err(|e| ServiceError::internal(e, "Failed to list exams"))
}

pub fn get_exam(state: &AppState, id: &str) -> Result<Exam, ServiceError> {
    repositories::exams::find_by_id(state.store(), id)
        .map_err(|e| ServiceError::internal(e, "Failed to fetch exam"))?
        .ok_or_else(|| ServiceError::NotFound(String::from("exam not found")))
}

pub fn add_exam(state: &AppState, payload: NewExam) -> Result<Exam, ServiceError> {
    payload.validate()?;

    let exam = Exam {
        id: generate_id(),
        subject: payload.subject,
        form: payload.form,
        year: payload.year,
        season: payload.season,
        exam_file_url: payload.exam_file_url,
        solution_file_url: payload.solution_file_url,
        solution_video_url: payload.solution_video_url,
        created_at: now_utc(),
    };
    repositories::exams::insert(state.store(), exam)
        .map_err(|e| ServiceError::internal(e, "Failed to create exam"))
}

/// Partial update; absent fields keep their stored values.
pub fn update_exam(state: &AppState, id: &str, payload: ExamUpdate) -> Result<Exam, ServiceError> {
    let mut exam = repositories::exams::find_by_id(state.store(), id)
        .map_err(|e| ServiceError::internal(e, "Failed to fetch exam"))?
        .ok_or_else(|| ServiceError::NotFound(String::from("exam not found")))?;

    if let Some(subject) = payload.subject {
        exam.subject = subject;
    }
    if let Some(form) = payload.form {
        exam.form = Some(form);
    }
    if let Some(year) = payload.year {
        exam.year = year;
    }
    if let Some(season) = payload.season {
        exam.season = Some(season);
    }
    if let Some(exam_file_url) = payload.exam_file_url {
        exam.exam_file_url = exam_file_url;
    }
    if let Some(solution_file_url) = payload.solution_file_url {
        exam.solution_file_url = Some(solution_file_url);
    }
    if let Some(solution_video_url) = payload.solution_video_url {
        exam.solution_video_url = Some(solution_video_url);
    }

    repositories::exams::update(state.store(), &exam)
        .map_err(|e| ServiceError::internal(e, "Failed to update exam"))?;
    Ok(exam)
}

pub fn delete_exam(state: &AppState, id: &str) -> Result<(), ServiceError> {
    let exam = repositories::exams::find_by_id(state.store(), id)
        .map_err(|e| ServiceError::internal(e, "Failed to fetch exam"))?
        .ok_or_else(|| ServiceError::NotFound(String::from("exam not found")))?;

    repositories::exams::remove(state.store(), id)
        .map_err(|e| ServiceError::internal(e, "Failed to delete exam"))?;
    cleanup_exam_dependents(state, &exam);
    Ok(())
}

/// Cascade steps after an exam is gone: its comments, its question
/// solutions, and any locally stored files. Failures are logged and the
/// remaining steps still run; partially applied cascades are an accepted
/// property of the store.
fn cleanup_exam_dependents(state: &AppState, exam: &Exam) {
    if let Err(err) = repositories::comments::remove_for_exam(state.store(), &exam.id) {
        tracing::warn!(error = %err, exam_id = %exam.id, "Failed to cascade comments");
    }
    if let Err(err) = repositories::question_solutions::remove_for_exam(state.store(), &exam.id) {
        tracing::warn!(error = %err, exam_id = %exam.id, "Failed to cascade question solutions");
    }

    let urls = [
        Some(exam.exam_file_url.as_str()),
        exam.solution_file_url.as_deref(),
        exam.solution_video_url.as_deref(),
    ];
    for url in urls.into_iter().flatten() {
        if let Err(err) = state.files().delete_url(url) {
            tracing::warn!(error = %err, exam_id = %exam.id, "Failed to delete stored exam file");
        }
    }
}
