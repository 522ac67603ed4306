//! HTTP status and transport failures mapped onto [`ErrorCategory`].
//!
//! | Condition                        | Category        |
//! |----------------------------------|-----------------|
//! | connect / timeout / body read    | Transient       |
//! | 429                              | RateLimited     |
//! | 5xx, undecodable body            | ServerError     |
//! | 401, 403                         | Auth            |
//! | 404                              | NotFound        |
//! | 400 context length, other 4xx    | ContentRejected |
//!
//! [`ErrorCategory`]: fanout_domain::ErrorCategory

use fanout_domain::CategorizedError;
use std::time::Duration;

/// Longest error body excerpt kept in a message
const MAX_BODY_EXCERPT: usize = 300;

pub(crate) fn classify_status(
    status: u16,
    body: &str,
    retry_after: Option<Duration>,
) -> CategorizedError {
    let detail = excerpt(body);
    match status {
        401 | 403 => CategorizedError::auth(format!("HTTP {}: {}", status, detail)),
        404 => CategorizedError::not_found(format!("HTTP 404: {}", detail)),
        429 => {
            let error = CategorizedError::rate_limited(format!("HTTP 429: {}", detail));
            match retry_after {
                Some(delay) => error.with_retry_after(delay),
                None => error,
            }
        }
        500..=599 => CategorizedError::server_error(format!("HTTP {}: {}", status, detail)),
        400 if is_context_length(body) => {
            CategorizedError::content_rejected("context length exceeded")
        }
        _ => CategorizedError::content_rejected(format!("HTTP {}: {}", status, detail)),
    }
}

pub(crate) fn classify_transport(error: &reqwest::Error) -> CategorizedError {
    if error.is_decode() {
        CategorizedError::server_error(format!("malformed response: {}", error))
    } else {
        CategorizedError::transient(format!("network error: {}", error))
    }
}

/// `Retry-After` as delta-seconds. HTTP-date values are ignored.
pub(crate) fn parse_retry_after(value: &str) -> Option<Duration> {
    let seconds: f64 = value.trim().parse().ok()?;
    Duration::try_from_secs_f64(seconds).ok()
}

fn is_context_length(body: &str) -> bool {
    let lower = body.to_lowercase();
    lower.contains("context_length_exceeded") || lower.contains("maximum context length")
}

fn excerpt(body: &str) -> &str {
    let body = body.trim();
    match body.char_indices().nth(MAX_BODY_EXCERPT) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
