//! Chat with the health assistant

use axum::{Extension, Json, extract::State};
use tracing::debug;

use crate::{
    error::{ApiError, ApiResult},
    extract::{Params, Payload},
    middleware::AuthUser,
    models::chat::{
        ChatHistory, ChatMessage, ChatResponse, HistoryQuery, SendMessageRequest, SessionList,
        group_sessions,
    },
    state::AppState,
};

/// Store the user's message, generate a reply and store it too
///
/// The two writes are independent; a failed reply write leaves the user
/// message in place.
pub async fn send_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Payload(request): Payload<SendMessageRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let session_id = request.session();
    let user_message = ChatMessage::from_user(&auth.id, request.message, session_id);
    state.chat_repository.save(&user_message).await?;

    let reply = state.responder.respond(&user_message.text).await;
    let ai_message = user_message.reply(reply);
    state.chat_repository.save(&ai_message).await?;
    debug!("Stored chat exchange for user {}", auth.id);

    Ok(Json(ChatResponse {
        user_message,
        ai_message,
    }))
}

pub async fn chat_history(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Params(query): Params<HistoryQuery>,
) -> ApiResult<Json<ChatHistory>> {
    let limit = query.limit().map_err(ApiError::Validation)?;
    let messages = state
        .chat_repository
        .history(&auth.id, query.session(), limit)
        .await?;

    Ok(Json(ChatHistory {
        count: messages.len(),
        messages,
        user_id: auth.id,
    }))
}

pub async fn chat_sessions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<SessionList>> {
    let messages = state.chat_repository.all_for_user(&auth.id).await?;
    Ok(Json(SessionList {
        sessions: group_sessions(messages),
        user_id: auth.id,
    }))
}
