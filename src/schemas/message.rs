use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct NewMessage {
    #[validate(length(min = 1))]
    #[serde(alias = "recipientId")]
    pub recipient_id: String,
    #[validate(length(min = 1))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub content: String,
    #[serde(default)]
    #[serde(alias = "attachmentUrl")]
    pub attachment_url: Option<String>,
    #[serde(default)]
    #[serde(alias = "attachmentName")]
    pub attachment_name: Option<String>,
}
