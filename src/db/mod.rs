pub mod ids;
pub mod models;
pub mod store;
pub mod types;

pub use store::{LocalStore, StoreError};

use crate::core::config::Settings;

/// Fixed keys for the entity collections, each holding a JSON array.
pub mod keys {
    pub const USERS: &str = "bagrut_users";
    pub const SUBJECTS: &str = "bagrut_subjects";
    pub const EXAM_FORMS: &str = "bagrut_exam_forms";
    pub const EXAMS: &str = "bagrut_exams";
    pub const COMMENTS: &str = "bagrut_comments";
    pub const MESSAGES: &str = "bagrut_messages";
    pub const QUESTION_SOLUTIONS: &str = "bagrut_question_solutions";
    /// Cached last signed-in user.
    pub const CURRENT_USER: &str = "bagrut_current_user";
    /// Prefix for file blob envelopes, `blob_<fileId>`.
    pub const BLOB_PREFIX: &str = "blob_";
}

pub fn open_store(settings: &Settings) -> Result<LocalStore, StoreError> {
    LocalStore::open(settings.store().data_dir.clone())
}
