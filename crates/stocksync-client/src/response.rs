//! Shared response decoding and status-to-error mapping.

use crate::error::{ClientError, ClientResult};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Decode a JSON body on success, map the status to a [`ClientError`] otherwise.
pub(crate) async fn decode_json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    if response.status().is_success() {
        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| ClientError::ParseError(format!("Failed to parse response: {e}")))
    } else {
        Err(error_from_response(response).await)
    }
}

/// Decode a body that is usually JSON but may come back as plain text.
pub(crate) async fn decode_json_or_text(response: Response) -> ClientResult<Value> {
    if response.status().is_success() {
        let body = response.text().await?;
        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    } else {
        Err(error_from_response(response).await)
    }
}

/// Turn a non-success response into the matching error variant.
pub(crate) async fn error_from_response(response: Response) -> ClientError {
    let status = response.status();

    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<no body>".to_string());

    match status {
        StatusCode::NOT_FOUND => ClientError::NotFound(body),
        StatusCode::TOO_MANY_REQUESTS => {
            warn!("Remote rate limited us, retry after {:?}s", retry_after);
            ClientError::RateLimited {
                retry_after_secs: retry_after,
            }
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ClientError::AuthError(format!("Authentication failed ({}): {body}", status.as_u16()))
        }
        _ => {
            let body = if body.is_empty() {
                format!("HTTP {status}")
            } else {
                body
            };
            ClientError::Http {
                status: status.as_u16(),
                body,
            }
        }
    }
}
