use serde::Deserialize;
use validator::Validate;

use crate::db::types::Season;

#[derive(Debug, Deserialize, Validate)]
pub struct NewExam {
    #[validate(length(min = 1))]
    pub subject: String,
    #[serde(default)]
    pub form: Option<String>,
    #[validate(range(min = 1948, max = 2100))]
    pub year: i32,
    #[serde(default)]
    pub season: Option<Season>,
    #[validate(length(min = 1))]
    #[serde(alias = "examFileUrl")]
    pub exam_file_url: String,
    #[serde(default)]
    #[serde(alias = "solutionFileUrl")]
    pub solution_file_url: Option<String>,
    #[serde(default)]
    #[serde(alias = "solutionVideoUrl")]
    pub solution_video_url: Option<String>,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Default, Deserialize)]
pub struct ExamUpdate {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub form: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub season: Option<Season>,
    #[serde(default)]
    #[serde(alias = "examFileUrl")]
    pub exam_file_url: Option<String>,
    #[serde(default)]
    #[serde(alias = "solutionFileUrl")]
    pub solution_file_url: Option<String>,
    #[serde(default)]
    #[serde(alias = "solutionVideoUrl")]
    pub solution_video_url: Option<String>,
}
