use std::{any::Any, sync::Arc};

use axum::{
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::web::{log, types::SubscriptionResult, ClientError, Error, REQUEST_ID_HEADER};

/// Turns a `web::Error` stored in the response extensions into the public
/// `{ "success": false, "error": ... }` body and logs the request.
pub async fn response_mapper(
    req_method: Method,
    uri: Uri,
    req_headers: HeaderMap,
    resp: Response,
) -> Response {
    let uuid = req_headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok())
        .unwrap_or_else(Uuid::new_v4);

    let web_error = resp.extensions().get::<Arc<Error>>().map(|er| er.as_ref());
    let client_status_and_error = web_error.map(Error::status_code_and_client_error);

    if let (Some(er), Some((status, _))) = (web_error, &client_status_and_error) {
        if status.is_server_error() {
            tracing::error!(req_id = %uuid, "SERVER ERROR: {er:?}");
        }
    }

    let err_resp = client_status_and_error
        .map(|(status, cl_err)| SubscriptionResult::failure(cl_err, status).into_response());

    log::log_request(
        uuid,
        req_method,
        uri,
        resp.status(),
        web_error,
        client_status_and_error,
    );

    err_resp.unwrap_or(resp)
}

/// Used by `CatchPanicLayer`: a panic still answers with the generic failure body.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!("PANIC while serving a request: {details}");

    SubscriptionResult::failure(ClientError::ServiceError, StatusCode::INTERNAL_SERVER_ERROR)
        .into_response()
}
