use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::db::types::{Season, UserRole};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub hashed_password: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<Date>,
    pub role: UserRole,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
}

/// A bagrut questionnaire ("shelon") under a subject, e.g. 035581.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamForm {
    pub id: String,
    pub subject_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exam {
    pub id: String,
    /// Soft reference to a `Subject` id.
    pub subject: String,
    /// Soft reference to an `ExamForm` id.
    pub form: Option<String>,
    pub year: i32,
    pub season: Option<Season>,
    pub exam_file_url: String,
    pub solution_file_url: Option<String>,
    pub solution_video_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub exam_id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_role: UserRole,
    pub content: String,
    pub image_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub recipient_id: String,
    pub recipient_name: String,
    pub subject: String,
    pub content: String,
    pub attachment_url: Option<String>,
    pub attachment_name: Option<String>,
    pub is_read: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSolution {
    pub id: String,
    pub exam_id: String,
    pub question_number: i32,
    pub solution_video_url: Option<String>,
    pub solution_text: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
