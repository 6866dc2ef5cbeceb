use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct NewComment {
    #[validate(length(min = 1))]
    #[serde(alias = "examId")]
    pub exam_id: String,
    #[validate(length(min = 1))]
    pub content: String,
    #[serde(default)]
    #[serde(alias = "imageUrl")]
    pub image_url: Option<String>,
}
