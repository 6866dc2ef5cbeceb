use crate::db::keys;
use crate::db::models::QuestionSolution;
use crate::db::{LocalStore, StoreError};

pub fn all(store: &LocalStore) -> Result<Vec<QuestionSolution>, StoreError> {
    store.read_collection(keys::QUESTION_SOLUTIONS)
}

pub fn save_all(store: &LocalStore, solutions: &[QuestionSolution]) -> Result<(), StoreError> {
    store.write_collection(keys::QUESTION_SOLUTIONS, solutions)
}

pub fn find_by_id(store: &LocalStore, id: &str) -> Result<Option<QuestionSolution>, StoreError> {
    Ok(all(store)?.into_iter().find(|solution| solution.id == id))
}

/// Solutions for an exam ordered by question number.
pub fn for_exam(store: &LocalStore, exam_id: &str) -> Result<Vec<QuestionSolution>, StoreError> {
    let mut solutions: Vec<QuestionSolution> =
        all(store)?.into_iter().filter(|solution| solution.exam_id == exam_id).collect();
    solutions.sort_by_key(|solution| solution.question_number);
    Ok(solutions)
}

pub fn insert(store: &LocalStore, solution: QuestionSolution) -> Result<QuestionSolution, StoreError> {
    let mut solutions = all(store)?;
    solutions.push(solution.clone());
    save_all(store, &solutions)?;
    Ok(solution)
}

pub fn remove(store: &LocalStore, id: &str) -> Result<bool, StoreError> {
    let mut solutions = all(store)?;
    let before = solutions.len();
    solutions.retain(|solution| solution.id != id);
    if solutions.len() == before {
        return Ok(false);
    }
    save_all(store, &solutions)?;
    Ok(true)
}

pub fn remove_for_exam(store: &LocalStore, exam_id: &str) -> Result<usize, StoreError> {
    let mut solutions = all(store)?;
    let before = solutions.len();
    solutions.retain(|solution| solution.exam_id != exam_id);
    let removed = before - solutions.len();
    if removed > 0 {
        save_all(store, &solutions)?;
    }
    Ok(removed)
}
