use validator::Validate;

use crate::core::state::AppState;
use crate::core::time::now_utc;
use crate::db::ids::generate_id;
use crate::db::models::QuestionSolution;
use crate::repositories;
use crate::schemas::solution::NewQuestionSolution;
use crate::services::errors::ServiceError;

pub fn add_question_solution(
    state: &AppState,
    payload: NewQuestionSolution,
) -> Result<QuestionSolution, ServiceError> {
    payload.validate()?;

    let solution = QuestionSolution {
        id: generate_id(),
        exam_id: payload.exam_id,
        question_number: payload.question_number,
        solution_video_url: payload.solution_video_url,
        solution_text: payload.solution_text,
        created_at: now_utc(),
    };
    repositories::question_solutions::insert(state.store(), solution)
        .map_err(|e| ServiceError::internal(e, "Failed to create question solution"))
}

pub fn solutions_for_exam(
    state: &AppState,
    exam_id: &str,
) -> Result<Vec<QuestionSolution>, ServiceError> {
    repositories::question_solutions::for_exam(state.store(), exam_id)
        .map_err(|e| ServiceError::internal(e, "Failed to list question solutions"))
}

pub fn delete_question_solution(state: &AppState, id: &str) -> Result<(), ServiceError> {
    let removed = repositories::question_solutions::remove(state.store(), id)
        .map_err(|e| ServiceError::internal(e, "Failed to delete question solution"))?;
    if !removed {
        return Err(ServiceError::NotFound(String::from("question solution not found")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    fn solution_for(exam_id: &str, question_number: i32) -> NewQuestionSolution {
        NewQuestionSolution {
            exam_id: exam_id.to_string(),
            question_number,
            solution_video_url: None,
            solution_text: Some(format!("פתרון לשאלה {question_number}")),
        }
    }

    #[test]
    fn solutions_list_by_question_number() {
        let ctx = test_support::setup_test_context();
        let exam_id = "1700000000000";

        add_question_solution(&ctx.state, solution_for(exam_id, 5)).expect("solution");
        add_question_solution(&ctx.state, solution_for(exam_id, 2)).expect("solution");
        add_question_solution(&ctx.state, solution_for("1700000000001", 1)).expect("solution");

        let listed = solutions_for_exam(&ctx.state, exam_id).expect("list");
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].question_number, 2);
        assert_eq!(listed[1].question_number, 5);
    }

    #[test]
    fn question_number_must_be_positive() {
        let ctx = test_support::setup_test_context();
        let err =
            add_question_solution(&ctx.state, solution_for("1700000000000", 0)).expect_err("range");
        assert!(matches!(err, ServiceError::Validation(_)), "got {err:?}");
    }

    #[test]
    fn delete_is_not_found_twice() {
        let ctx = test_support::setup_test_context();
        let solution =
            add_question_solution(&ctx.state, solution_for("1700000000000", 1)).expect("solution");

        delete_question_solution(&ctx.state, &solution.id).expect("delete");
        let err = delete_question_solution(&ctx.state, &solution.id).expect_err("gone");
        assert!(matches!(err, ServiceError::NotFound(_)), "got {err:?}");
    }
}
