use validator::Validate;

use crate::core::state::AppState;
use crate::core::time::now_utc;
use crate::db::ids::generate_id;
use crate::db::models::Message;
use crate::repositories;
use crate::schemas::message::NewMessage;
use crate::services::auth;
use crate::services::errors::ServiceError;

/// Sends from the signed-in user. The recipient is resolved so their name
/// can be denormalized; a missing recipient is the one soft reference this
/// layer refuses to fabricate.
pub fn send_message(state: &AppState, payload: NewMessage) -> Result<Message, ServiceError> {
    payload.validate()?;

    let sender = auth::session_user(state)?
        .ok_or(ServiceError::Unauthorized("sign in to send a message"))?;

    let recipient = repositories::users::find_by_id(state.store(), &payload.recipient_id)
        .map_err(|e| ServiceError::internal(e, "Failed to look up recipient"))?
        .ok_or_else(|| ServiceError::NotFound(String::from("recipient not found")))?;

    let message = Message {
        id: generate_id(),
        sender_id: sender.id.clone(),
        sender_name: sender.full_name(),
        recipient_id: recipient.id.clone(),
        recipient_name: recipient.full_name(),
        subject: payload.subject,
        content: payload.content,
        attachment_url: payload.attachment_url,
        attachment_name: payload.attachment_name,
        is_read: false,
        created_at: now_utc(),
    };
    repositories::messages::insert(state.store(), message)
        .map_err(|e| ServiceError::internal(e, "Failed to send message"))
}

pub fn inbox(state: &AppState, user_id: &str) -> Result<Vec<Message>, ServiceError> {
    repositories::messages::inbox_for(state.store(), user_id)
        .map_err(|e| ServiceError::internal(e, "Failed to list inbox"))
}

pub fn sent(state: &AppState, user_id: &str) -> Result<Vec<Message>, ServiceError> {
    repositories::messages::sent_by(state.store(), user_id)
        .map_err(|e| ServiceError::internal(e, "Failed to list sent messages"))
}

pub fn unread_count(state: &AppState, user_id: &str) -> Result<usize, ServiceError> {
    repositories::messages::unread_count_for(state.store(), user_id)
        .map_err(|e| ServiceError::internal(e, "Failed to count unread messages"))
}

pub fn mark_read(state: &AppState, id: &str) -> Result<(), ServiceError> {
    let found = repositories::messages::mark_read(state.store(), id)
        .map_err(|e| ServiceError::internal(e, "Failed to mark message read"))?;
    if !found {
        return Err(ServiceError::NotFound(String::from("message not found")));
    }
    Ok(())
}

pub fn delete_message(state: &AppState, id: &str) -> Result<(), ServiceError> {
    let message = repositories::messages::find_by_id(state.store(), id)
        .map_err(|e| ServiceError::internal(e, "Failed to fetch message"))?
        .ok_or_else(|| ServiceError::NotFound(String::from("message not found")))?;

    repositories::messages::remove(state.store(), id)
        .map_err(|e| ServiceError::internal(e, "Failed to delete message"))?;

    if let Some(attachment_url) = &message.attachment_url {
        if let Err(err) = state.files().delete_url(attachment_url) {
            tracing::warn!(error = %err, message_id = %id, "Failed to delete message attachment");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    fn message_to(recipient_id: &str) -> NewMessage {
        NewMessage {
            recipient_id: recipient_id.to_string(),
            subject: "שאלה על שאלון 035581".to_string(),
            content: "אפשר הסבר לשאלה 4?".to_string(),
            attachment_url: None,
            attachment_name: None,
        }
    }

    #[test]
    fn send_inbox_and_mark_read_flow() {
        let ctx = test_support::setup_test_context();
        test_support::insert_user(&ctx.state, "dana@example.com", "דנה", "sisma-aroka");
        let teacher = test_support::insert_admin(&ctx.state, "mor@bagrut.local", "מור", "admin-pass");
        test_support::sign_in(&ctx.state, "dana@example.com", "sisma-aroka");

        let sent_message = send_message(&ctx.state, message_to(&teacher.id)).expect("send");
        assert_eq!(sent_message.sender_name, "דנה כהן");
        assert_eq!(sent_message.recipient_name, teacher.full_name());
        assert!(!sent_message.is_read);

        let inbox_messages = inbox(&ctx.state, &teacher.id).expect("inbox");
        assert_eq!(inbox_messages.len(), 1);
        assert_eq!(unread_count(&ctx.state, &teacher.id).expect("unread"), 1);

        mark_read(&ctx.state, &sent_message.id).expect("mark read");
        assert_eq!(unread_count(&ctx.state, &teacher.id).expect("unread"), 0);

        let sender_id = sent_message.sender_id.clone();
        let outbox = sent(&ctx.state, &sender_id).expect("sent");
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox[0].id, sent_message.id);
    }

    #[test]
    fn missing_recipient_is_not_found() {
        let ctx = test_support::setup_test_context();
        test_support::insert_user(&ctx.state, "dana@example.com", "דנה", "sisma-aroka");
        test_support::sign_in(&ctx.state, "dana@example.com", "sisma-aroka");

        let err = send_message(&ctx.state, message_to("1700000000000")).expect_err("recipient");
        assert!(matches!(err, ServiceError::NotFound(_)), "got {err:?}");
    }

    #[test]
    fn signed_out_sender_is_unauthorized() {
        let ctx = test_support::setup_test_context();
        let teacher = test_support::insert_admin(&ctx.state, "mor@bagrut.local", "מור", "admin-pass");

        let err = send_message(&ctx.state, message_to(&teacher.id)).expect_err("no session");
        assert!(matches!(err, ServiceError::Unauthorized(_)), "got {err:?}");
    }

    #[test]
    fn deleting_message_removes_local_attachment() {
        let ctx = test_support::setup_test_context();
        test_support::insert_user(&ctx.state, "dana@example.com", "דנה", "sisma-aroka");
        let teacher = test_support::insert_admin(&ctx.state, "mor@bagrut.local", "מור", "admin-pass");
        test_support::sign_in(&ctx.state, "dana@example.com", "sisma-aroka");

        let locator = ctx
            .state
            .files()
            .store_file("scan.jpg", "image/jpeg", b"scanned page")
            .expect("store file");
        let mut payload = message_to(&teacher.id);
        payload.attachment_url = Some(locator.clone());
        payload.attachment_name = Some("scan.jpg".to_string());

        let message = send_message(&ctx.state, payload).expect("send");
        delete_message(&ctx.state, &message.id).expect("delete");

        assert!(inbox(&ctx.state, &teacher.id).expect("inbox").is_empty());
        let err = ctx.state.files().resolve_url(&locator).expect_err("attachment gone");
        assert!(matches!(err, ServiceError::NotFound(_)), "got {err:?}");
    }
}
