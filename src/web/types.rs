//! Most of the structs in `web` module and their implementations live here.
//! Includes structs that need to be validated, their parsing implementations and tests for those

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lazy_regex::regex_is_match;
use serde::Serialize;
use serde_json::Value;

// ###################################
// ->   STRUCTS
// ###################################
/// The body of a subscription request, `{ "email": string }`.
/// Only checks that `email` is present, is a string and is not empty.
#[derive(Debug)]
pub struct SubscriptionRequest {
    pub email: String,
}

impl TryFrom<Value> for SubscriptionRequest {
    type Error = DataParsingError;

    fn try_from(body: Value) -> Result<Self, Self::Error> {
        match body.get("email") {
            Some(Value::String(email)) if !email.is_empty() => Ok(SubscriptionRequest {
                email: email.to_owned(),
            }),
            _ => Err(DataParsingError::EmailMissing),
        }
    }
}

/// Validated Subscriber Email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidEmail(String);

impl AsRef<str> for ValidEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ValidEmail {
    /// A syntactic sanity check: `local@domain.tld` where no part contains whitespace or `@`.
    /// Deliberately permissive, the provider does the real validation.
    ///
    /// Whitespace is the ECMAScript `\s` set (includes U+FEFF, excludes U+0085),
    /// not Unicode `White_Space`.
    pub fn parse<S>(value: S) -> Result<Self, DataParsingError>
    where
        S: AsRef<str>,
    {
        let value = value.as_ref();

        if regex_is_match!(
            r"^[^\t\n\x0B\f\r \x{A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}@]+@[^\t\n\x0B\f\r \x{A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}@]+\.[^\t\n\x0B\f\r \x{A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}@]+$",
            value
        ) {
            Ok(ValidEmail(value.to_owned()))
        } else {
            Err(DataParsingError::EmailInvalid)
        }
    }
}

/// The single outcome reported to the caller for every subscription request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionResult {
    Success(String),
    AlreadySubscribed(String),
    Failure { error: String, status: StatusCode },
}

#[derive(Serialize)]
struct SubscriptionBody<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl SubscriptionResult {
    pub const SUBSCRIBED_MSG: &'static str = "Successfully subscribed to newsletter!";
    pub const ALREADY_SUBSCRIBED_MSG: &'static str =
        "You are already subscribed to our newsletter!";

    pub fn subscribed() -> Self {
        Self::Success(Self::SUBSCRIBED_MSG.to_string())
    }

    pub fn already_subscribed() -> Self {
        Self::AlreadySubscribed(Self::ALREADY_SUBSCRIBED_MSG.to_string())
    }

    pub fn failure(error: impl ToString, status: StatusCode) -> Self {
        Self::Failure {
            error: error.to_string(),
            status,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Success(_) | Self::AlreadySubscribed(_) => StatusCode::OK,
            Self::Failure { status, .. } => *status,
        }
    }

    fn body(&self) -> SubscriptionBody<'_> {
        match self {
            Self::Success(message) | Self::AlreadySubscribed(message) => SubscriptionBody {
                success: true,
                message: Some(message),
                error: None,
            },
            Self::Failure { error, .. } => SubscriptionBody {
                success: false,
                message: None,
                error: Some(error),
            },
        }
    }
}

impl IntoResponse for SubscriptionResult {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
pub enum DataParsingError {
    #[error("email missing or not a string")]
    EmailMissing,
    #[error("email invalid")]
    EmailInvalid,
}
