//! HTTP retry for source downloads.
//!
//! [`send_bytes`] wraps `reqwest::RequestBuilder::send()` with exponential
//! backoff on transient failures (timeouts, connection resets, HTTP 429,
//! HTTP 5xx). Client errors other than 429 are permanent and fail fast.

use std::time::Duration;

use crate::RecordsError;

/// Maximum number of retry attempts for transient errors.
///
/// With backoff of 1s, 2s, 4s the total wait before giving up is 7 seconds.
const MAX_RETRIES: u32 = 3;

/// Sends the request built by `build_request` and returns the raw body.
///
/// The closure is called once per attempt since builders are consumed by
/// `.send()`.
///
/// # Errors
///
/// Returns [`RecordsError`] if the request fails after all retries, the
/// server answers with a non-retryable status, or the body cannot be read.
#[allow(clippy::future_not_send)]
pub async fn send_bytes<F>(build_request: F) -> Result<Vec<u8>, RecordsError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let response = send_inner(&build_request, MAX_RETRIES).await?;
    let bytes = response.bytes().await?;
    Ok(bytes.to_vec())
}

/// Core retry loop behind [`send_bytes`].
#[allow(clippy::future_not_send)]
async fn send_inner<F>(build_request: &F, max_retries: u32) -> Result<reqwest::Response, RecordsError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut last_error: Option<RecordsError> = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            let delay = Duration::from_secs(1u64 << (attempt - 1)); // 1s, 2s, 4s
            log::warn!("  retry {attempt}/{max_retries} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        match build_request().send().await {
            Err(e) => {
                if is_transient(&e) && attempt < max_retries {
                    log::warn!("  transient error: {e}");
                    last_error = Some(RecordsError::Http(e));
                    continue;
                }
                return Err(RecordsError::Http(e));
            }
            Ok(response) => {
                let status = response.status();
                let uri = response.url().to_string();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                    if attempt < max_retries {
                        log::warn!("  HTTP {status} from {uri}");
                        last_error = Some(RecordsError::Source {
                            uri,
                            message: format!("HTTP {status}"),
                        });
                        continue;
                    }
                    return Err(RecordsError::Source {
                        uri,
                        message: format!("HTTP {status} after {max_retries} retries"),
                    });
                }

                if status.is_client_error() {
                    return Err(RecordsError::Source {
                        uri,
                        message: format!("HTTP {status}"),
                    });
                }

                return Ok(response);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| RecordsError::Source {
        uri: String::new(),
        message: "request failed after all retries".to_string(),
    }))
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_request()
}
