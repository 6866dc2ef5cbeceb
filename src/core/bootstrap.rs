use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::now_utc;
use crate::db::ids::generate_id;
use crate::db::models::{Exam, ExamForm, Subject, User};
use crate::db::types::{Season, UserRole};
use crate::repositories;

/// Creates or repairs the default admin from settings. Without a configured
/// password this logs a warning and does nothing.
pub fn ensure_admin(state: &AppState) -> anyhow::Result<()> {
    let admin = state.settings().admin();
    if admin.first_admin_password.is_empty() {
        tracing::warn!("FIRST_ADMIN_PASSWORD not configured; skipping admin creation");
        return Ok(());
    }

    let email = &admin.first_admin_email;
    let user = repositories::users::find_by_email(state.store(), email)?;

    if let Some(mut user) = user {
        let mut needs_update = false;

        let verified = security::verify_password(&admin.first_admin_password, &user.hashed_password)
            .unwrap_or(false);
        if !verified {
            user.hashed_password = security::hash_password(&admin.first_admin_password)?;
            needs_update = true;
        }

        if user.role != UserRole::Admin {
            user.role = UserRole::Admin;
            needs_update = true;
        }

        if needs_update {
            repositories::users::update(state.store(), &user)?;
            tracing::info!("Updated default admin {email}");
        } else {
            tracing::info!("Default admin already up to date");
        }

        return Ok(());
    }

    let user = User {
        id: generate_id(),
        email: email.clone(),
        hashed_password: security::hash_password(&admin.first_admin_password)?,
        first_name: "צוות".to_string(),
        last_name: "הפורטל".to_string(),
        birth_date: None,
        role: UserRole::Admin,
        created_at: now_utc(),
    };
    repositories::users::insert(state.store(), user)?;

    tracing::info!("Created default admin {email}");
    Ok(())
}

/// First-run catalog fixtures: a non-empty subject list short-circuits.
pub fn seed_catalog(state: &AppState) -> anyhow::Result<()> {
    let subjects = repositories::subjects::all(state.store())?;
    if !subjects.is_empty() {
        return Ok(());
    }

    let store = state.store();
    let now = now_utc();

    let mut seeded_subjects = 0usize;
    let mut seeded_forms = 0usize;
    let mut seeded_exams = 0usize;

    for subject_name in ["מתמטיקה", "פיזיקה", "אנגלית", "לשון והבעה", "תנ\"ך", "אזרחות"] {
        let subject = repositories::subjects::insert(
            store,
            Subject { id: generate_id(), name: subject_name.to_string() },
        )?;
        seeded_subjects += 1;

        let form_names: &[&str] = match subject_name {
            "מתמטיקה" => &["שאלון 035481", "שאלון 035581", "שאלון 035582"],
            "פיזיקה" => &["מכניקה", "חשמל ומגנטיות"],
            "אנגלית" => &["Module E", "Module G"],
            _ => &[],
        };

        let mut first_form_id = None;
        for form_name in form_names {
            let form = repositories::exam_forms::insert(
                store,
                ExamForm {
                    id: generate_id(),
                    subject_id: subject.id.clone(),
                    name: (*form_name).to_string(),
                },
            )?;
            seeded_forms += 1;
            first_form_id.get_or_insert(form.id);
        }

        // Past papers only for subjects with questionnaires on file.
        let Some(form_id) = first_form_id else { continue };
        for (year, season) in [(2023, Season::Winter), (2022, Season::Summer)] {
            repositories::exams::insert(
                store,
                Exam {
                    id: generate_id(),
                    subject: subject.id.clone(),
                    form: Some(form_id.clone()),
                    year,
                    season: Some(season),
                    exam_file_url: archive_url(subject_name, year, season),
                    solution_file_url: None,
                    solution_video_url: None,
                    created_at: now,
                },
            )?;
            seeded_exams += 1;
        }
    }

    tracing::info!(
        subjects = seeded_subjects,
        forms = seeded_forms,
        exams = seeded_exams,
        "Seeded catalog fixtures"
    );
    Ok(())
}

fn archive_url(subject: &str, year: i32, season: Season) -> String {
    let slug = match subject {
        "מתמטיקה" => "math",
        "פיזיקה" => "physics",
        "אנגלית" => "english",
        _ => "general",
    };
    format!("https://meyda.education.gov.il/exams/{slug}_{year}_{}.pdf", season.as_str())
}
