use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct NewQuestionSolution {
    #[validate(length(min = 1))]
    #[serde(alias = "examId")]
    pub exam_id: String,
    #[validate(range(min = 1))]
    #[serde(alias = "questionNumber")]
    pub question_number: i32,
    #[serde(default)]
    #[serde(alias = "solutionVideoUrl")]
    pub solution_video_url: Option<String>,
    #[serde(default)]
    #[serde(alias = "solutionText")]
    pub solution_text: Option<String>,
}
