use std::sync::Arc;

use bagrut_portal_rust::core::config::Settings;
use bagrut_portal_rust::core::state::AppState;
use bagrut_portal_rust::db;
use bagrut_portal_rust::repositories::exams::ExamFilter;
use bagrut_portal_rust::schemas::comment::NewComment;
use bagrut_portal_rust::schemas::exam::NewExam;
use bagrut_portal_rust::schemas::user::SignUpRequest;
use bagrut_portal_rust::services::{auth, catalog, discussions, ServiceError};

fn fresh_state(data_dir: &std::path::Path) -> AppState {
    std::env::set_var("BAGRUT_ENV", "test");
    std::env::set_var("BAGRUT_DATA_DIR", data_dir.display().to_string());
    std::env::set_var("BLOB_QUOTA_MB", "5");
    std::env::remove_var("FIRST_ADMIN_PASSWORD");

    let settings = Settings::load().expect("settings");
    let store = Arc::new(db::open_store(&settings).expect("open store"));
    AppState::new(settings, store)
}

#[test]
fn catalog_lifecycle_against_a_fresh_store() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let state = fresh_state(tmp.path());

    auth::sign_up(
        &state,
        SignUpRequest {
            email: "dana@example.com".to_string(),
            password: "sisma-aroka".to_string(),
            first_name: "דנה".to_string(),
            last_name: "לוי".to_string(),
            birth_date: None,
        },
    )
    .expect("sign up");

    let math = catalog::add_subject(&state, "מתמטיקה").expect("subject");
    let form = catalog::add_exam_form(&state, &math.id, "שאלון 035581").expect("form");

    let solution_locator = state
        .files()
        .store_file("solution_2023.pdf", "application/pdf", b"full solution")
        .expect("store solution");

    let exam = catalog::add_exam(
        &state,
        NewExam {
            subject: math.id.clone(),
            form: Some(form.id.clone()),
            year: 2023,
            season: None,
            exam_file_url: "https://meyda.education.gov.il/exams/math_2023_winter.pdf".to_string(),
            solution_file_url: Some(solution_locator.clone()),
            solution_video_url: None,
        },
    )
    .expect("exam");

    discussions::add_comment(
        &state,
        NewComment {
            exam_id: exam.id.clone(),
            content: "תודה על ההעלאה!".to_string(),
            image_url: None,
        },
    )
    .expect("comment");

    // The state survives a reopen of the same data directory.
    let reopened = fresh_state(tmp.path());
    let listed = catalog::list_exams(
        &reopened,
        &ExamFilter { subject: Some(math.id.clone()), ..ExamFilter::default() },
    )
    .expect("exams");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, exam.id);

    catalog::delete_subject(&reopened, &math.id).expect("delete subject");

    let listed = catalog::list_exams(&reopened, &ExamFilter::default()).expect("exams");
    assert!(listed.iter().all(|candidate| candidate.subject != math.id));
    assert!(catalog::forms_for_subject(&reopened, &math.id).expect("forms").is_empty());
    assert!(discussions::comments_for_exam(&reopened, &exam.id).expect("comments").is_empty());

    let err = reopened.files().resolve_url(&solution_locator).expect_err("solution blob gone");
    assert!(matches!(err, ServiceError::NotFound(_)), "got {err:?}");
}
