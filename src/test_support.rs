use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use tempfile::TempDir;

use crate::core::{config::Settings, security, state::AppState, time::now_utc};
use crate::db;
use crate::db::ids::generate_id;
use crate::db::models::{Exam, Subject, User};
use crate::db::types::{Season, UserRole};
use crate::repositories;
use crate::schemas::user::SignInRequest;
use crate::services::auth;

pub(crate) struct TestContext {
    pub(crate) state: AppState,
    _tmp: TempDir,
    _guard: MutexGuard<'static, ()>,
}

/// Settings are loaded from process env, so tests touching it serialize.
pub(crate) fn env_lock() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(())).lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn set_test_env(data_dir: &std::path::Path) {
    std::env::set_var("BAGRUT_ENV", "test");
    std::env::set_var("BAGRUT_STRICT_CONFIG", "0");
    std::env::set_var("BAGRUT_DATA_DIR", data_dir.display().to_string());
    std::env::set_var("BLOB_QUOTA_MB", "5");
    std::env::set_var("MAX_UPLOAD_SIZE_MB", "10");
    std::env::remove_var("ALLOWED_ATTACHMENT_EXTENSIONS");
    std::env::remove_var("FIRST_ADMIN_EMAIL");
    std::env::remove_var("FIRST_ADMIN_PASSWORD");
    std::env::set_var("PROMETHEUS_ENABLED", "0");
}

pub(crate) fn setup_test_context() -> TestContext {
    setup_test_context_with(|| {})
}

/// Variant for tests that need extra env (quota overrides, admin secrets);
/// the closure runs after the defaults and before settings load.
pub(crate) fn setup_test_context_with(env_overrides: impl FnOnce()) -> TestContext {
    let guard = env_lock();
    let tmp = tempfile::tempdir().expect("tempdir");
    set_test_env(tmp.path());
    env_overrides();

    let settings = Settings::load().expect("settings");
    let store = Arc::new(db::open_store(&settings).expect("open store"));
    let state = AppState::new(settings, store);

    TestContext { state, _tmp: tmp, _guard: guard }
}

pub(crate) fn insert_user(state: &AppState, email: &str, first_name: &str, password: &str) -> User {
    insert_user_with_role(state, email, first_name, password, UserRole::User)
}

pub(crate) fn insert_admin(state: &AppState, email: &str, first_name: &str, password: &str) -> User {
    insert_user_with_role(state, email, first_name, password, UserRole::Admin)
}

pub(crate) fn insert_user_with_role(
    state: &AppState,
    email: &str,
    first_name: &str,
    password: &str,
    role: UserRole,
) -> User {
    let user = User {
        id: generate_id(),
        email: email.to_string(),
        hashed_password: security::hash_password(password).expect("hash password"),
        first_name: first_name.to_string(),
        last_name: "כהן".to_string(),
        birth_date: None,
        role,
        created_at: now_utc(),
    };
    repositories::users::insert(state.store(), user).expect("insert user")
}

pub(crate) fn sign_in(state: &AppState, email: &str, password: &str) {
    auth::sign_in(state, SignInRequest { email: email.to_string(), password: password.to_string() })
        .expect("sign in");
}

pub(crate) fn insert_subject(state: &AppState, name: &str) -> Subject {
    repositories::subjects::insert(
        state.store(),
        Subject { id: generate_id(), name: name.to_string() },
    )
    .expect("insert subject")
}

pub(crate) fn insert_exam(
    state: &AppState,
    subject_id: &str,
    form_id: Option<&str>,
    year: i32,
    season: Option<Season>,
) -> Exam {
    repositories::exams::insert(
        state.store(),
        Exam {
            id: generate_id(),
            subject: subject_id.to_string(),
            form: form_id.map(str::to_string),
            year,
            season,
            exam_file_url: format!("https://meyda.education.gov.il/exams/{subject_id}_{year}.pdf"),
            solution_file_url: None,
            solution_video_url: None,
            created_at: now_utc(),
        },
    )
    .expect("insert exam")
}
