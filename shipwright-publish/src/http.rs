//! Shared HTTP helpers for the publish clients.

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};

use crate::error::{PublishError, PublishStep};

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("shipwright/", env!("CARGO_PKG_VERSION"));

/// Blocking client with the default request timeout disabled.
///
/// Uploads run for as long as the host keeps the connection open.
pub(crate) fn blocking_client(step: PublishStep) -> Result<Client, PublishError> {
    Client::builder()
        .timeout(None)
        .build()
        .map_err(|err| PublishError::request(step, err))
}

/// Return the response if it carries the expected status, otherwise a status error.
pub(crate) fn expect_status(
    step: PublishStep,
    response: Response,
    expected: StatusCode,
) -> Result<Response, PublishError> {
    let status = response.status();
    if status == expected {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(PublishError::Status {
        step,
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        body,
    })
}

/// Decode a JSON response body and pull out a string field.
pub(crate) fn json_string_field(
    step: PublishStep,
    response: Response,
    field: &str,
) -> Result<String, PublishError> {
    let value: serde_json::Value = response
        .json()
        .map_err(|err| PublishError::decode(step, format!("response decode failed: {err}")))?;
    value
        .get(field)
        .and_then(|val| val.as_str())
        .map(str::to_string)
        .ok_or_else(|| PublishError::decode(step, format!("missing {field}")))
}

/// Join a base URL and a path without doubling slashes.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
