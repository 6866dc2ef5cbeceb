pub mod comments;
pub mod exam_forms;
pub mod exams;
pub mod messages;
pub mod question_solutions;
pub mod subjects;
pub mod users;
