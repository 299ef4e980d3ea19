use futures_util::StreamExt;

use crate::{ApiSettings, FailureKind, FetchError};

pub(crate) fn build_client(settings: &ApiSettings) -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout())
        .timeout(settings.request_timeout())
        .user_agent(settings.user_agent.clone())
        .build()
        .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
}

pub(crate) fn parse_url(raw: &str) -> Result<reqwest::Url, FetchError> {
    reqwest::Url::parse(raw).map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))
}

/// Reject non-success statuses, then read the body up to `max_bytes`.
pub(crate) async fn read_body(
    response: reqwest::Response,
    max_bytes: u64,
) -> Result<Vec<u8>, FetchError> {
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ));
    }

    if let Some(content_len) = response.content_length() {
        if content_len > max_bytes {
            return Err(too_large(max_bytes, content_len));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(map_reqwest_error)?;
        let next_len = bytes.len() as u64 + chunk.len() as u64;
        if next_len > max_bytes {
            return Err(too_large(max_bytes, next_len));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}

fn too_large(max_bytes: u64, actual: u64) -> FetchError {
    FetchError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}
