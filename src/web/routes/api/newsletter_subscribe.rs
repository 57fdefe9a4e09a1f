use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
};
use serde_json::Value;

use crate::{
    subscription::{self, SubscriptionError, SubscriptionOutcome},
    web::{
        types::{DataParsingError, SubscriptionRequest, SubscriptionResult, ValidEmail},
        ClientError, WebResult,
    },
    AppState,
};

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
pub enum SubscribeError {
    #[error("request body could not be read: {0}")]
    UnreadableBody(#[from] BytesRejection),
    #[error("request body is not valid json: {0}")]
    MalformedBody(#[from] serde_json::Error),
    #[error("data parsing error: {0}")]
    DataParsing(#[from] DataParsingError),
    #[error("mailing list provider is not configured")]
    MissingConfig,
    #[error("subscription error: {0}")]
    Subscription(#[from] SubscriptionError),
}

impl SubscribeError {
    pub fn status_code_and_client_error(&self) -> (StatusCode, ClientError) {
        use ClientError::*;

        match self {
            SubscribeError::DataParsing(DataParsingError::EmailMissing) => {
                (StatusCode::BAD_REQUEST, EmailRequired)
            }
            SubscribeError::DataParsing(DataParsingError::EmailInvalid) => {
                (StatusCode::BAD_REQUEST, InvalidEmail)
            }
            SubscribeError::MissingConfig => (StatusCode::INTERNAL_SERVER_ERROR, Configuration),
            // Transport faults never got a verdict from the provider.
            SubscribeError::Subscription(er) if !er.provider_error().is_rejection() => {
                (StatusCode::INTERNAL_SERVER_ERROR, ServiceError)
            }
            SubscribeError::Subscription(SubscriptionError::Contact(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ContactRejected)
            }
            SubscribeError::Subscription(SubscriptionError::ListMembership(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ListRejected)
            }
            SubscribeError::UnreadableBody(_) | SubscribeError::MalformedBody(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ServiceError)
            }
        }
    }
}

// ###################################
// ->   API
// ###################################
/// `POST /api/newsletter-subscribe` with `{ "email": string }`.
///
/// The body is taken as raw bytes, and its rejection as a value, so an unreadable or
/// malformed body ends up in our own error handling instead of axum's plain text rejection.
#[tracing::instrument(name = "Subscribing to the newsletter", skip_all)]
pub async fn newsletter_subscribe(
    State(app_state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> WebResult<SubscriptionResult> {
    let body = body.map_err(SubscribeError::UnreadableBody)?;
    let body: Value = serde_json::from_slice(&body).map_err(SubscribeError::MalformedBody)?;
    let request = SubscriptionRequest::try_from(body).map_err(SubscribeError::DataParsing)?;
    let email = ValidEmail::parse(&request.email).map_err(SubscribeError::DataParsing)?;

    let provider = app_state
        .list_provider
        .as_deref()
        .ok_or(SubscribeError::MissingConfig)?;

    let outcome = subscription::subscribe_email(provider, &email)
        .await
        .map_err(SubscribeError::Subscription)?;

    let result = match outcome {
        SubscriptionOutcome::Subscribed => SubscriptionResult::subscribed(),
        SubscriptionOutcome::AlreadySubscribed => SubscriptionResult::already_subscribed(),
    };

    Ok(result)
}
