//! Direct messages between members of a business.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::message::{
    contact_roles, Contact, MarkMessagesReadRequest, SendMessageRequest, SendMessageResponse,
    UnreadCountResponse,
};
use domain::models::notification::MarkReadResponse;
use domain::models::role::sets;
use domain::models::{Message, Role};
use persistence::repositories::{MessageRepository, ProfileRepository};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiJson, Caller};

#[derive(Debug, Serialize)]
pub struct ContactsResponse {
    pub data: Vec<Contact>,
}

#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub data: Vec<Message>,
}

/// POST /api/v1/messages
///
/// 201 for a new message, 200 when `clientId` matched a message this
/// sender already stored.
pub async fn send_message(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(request): ApiJson<SendMessageRequest>,
) -> Result<(StatusCode, Json<SendMessageResponse>), ApiError> {
    let auth = caller.authorize(sets::ANY_MEMBER)?;
    request.validate()?;
    if !request.has_body() {
        return Err(ApiError::Validation(
            "Message must have text or an image".into(),
        ));
    }
    let max_length = state.config.limits.max_message_length;
    if request.exceeds_length(max_length) {
        return Err(ApiError::Validation(format!(
            "Message must be at most {} characters",
            max_length
        )));
    }
    if request.receiver_id == auth.user_id {
        return Err(ApiError::Validation("You cannot message yourself".into()));
    }

    let receiver = ProfileRepository::new(state.pool.clone())
        .find_in_business(request.receiver_id, auth.business_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Recipient not found".into()))?;
    let receiver_role = receiver.role.map(Role::from);
    if !receiver_role.is_some_and(|r| contact_roles(auth.role).contains(&r)) {
        return Err(ApiError::Forbidden(
            "You cannot message this user".into(),
        ));
    }

    let text = request.text();
    let (message, created) = MessageRepository::new(state.pool.clone())
        .insert_or_get(
            auth.user_id,
            request.receiver_id,
            text.as_deref(),
            request.image_url.as_deref(),
            request.client_id.as_deref(),
        )
        .await?;

    if created {
        info!(message_id = %message.id, sender_id = %auth.user_id, "Message sent");
    } else {
        debug!(message_id = %message.id, "Duplicate message send ignored");
    }

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(SendMessageResponse {
            success: true,
            message: message.into(),
            created,
        }),
    ))
}

/// People the caller may message, with unread counts.
///
/// GET /api/v1/messages/contacts
pub async fn list_contacts(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<ContactsResponse>, ApiError> {
    let auth = caller.authorize(sets::ANY_MEMBER)?;

    let data = ProfileRepository::new(state.pool.clone())
        .list_contacts(auth.business_id, auth.user_id, contact_roles(auth.role))
        .await?
        .into_iter()
        .map(Contact::from)
        .collect();

    Ok(Json(ContactsResponse { data }))
}

/// Both directions of a conversation, oldest first.
///
/// GET /api/v1/messages/with/:user_id
pub async fn conversation(
    State(state): State<AppState>,
    caller: Caller,
    Path(other_id): Path<Uuid>,
) -> Result<Json<ConversationResponse>, ApiError> {
    let auth = caller.authorize(sets::ANY_MEMBER)?;

    ProfileRepository::new(state.pool.clone())
        .find_in_business(other_id, auth.business_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let data = MessageRepository::new(state.pool.clone())
        .conversation(auth.user_id, other_id, state.config.limits.max_message_rows)
        .await?
        .into_iter()
        .map(Message::from)
        .collect();

    Ok(Json(ConversationResponse { data }))
}

/// POST /api/v1/messages/read
pub async fn mark_read(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(request): ApiJson<MarkMessagesReadRequest>,
) -> Result<Json<MarkReadResponse>, ApiError> {
    let auth = caller.authorize(sets::ANY_MEMBER)?;
    request.validate()?;

    let updated = MessageRepository::new(state.pool.clone())
        .mark_read(auth.user_id, &request.message_ids)
        .await?;

    Ok(Json(MarkReadResponse {
        success: true,
        updated,
    }))
}

/// GET /api/v1/messages/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<UnreadCountResponse>, ApiError> {
    let auth = caller.authorize(sets::ANY_MEMBER)?;

    let unread_count = MessageRepository::new(state.pool.clone())
        .unread_count(auth.user_id)
        .await?;

    Ok(Json(UnreadCountResponse { unread_count }))
}
