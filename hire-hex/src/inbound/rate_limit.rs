//! Rate limiting middleware using Governor.
//!
//! Token bucket per caller, keyed by the `X-Account-Id` header. Values that
//! are not account ids share the anonymous bucket, so callers cannot mint
//! buckets at will.

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde_json::json;
use hire_types::AccountId;
use std::{num::NonZeroU32, sync::Arc};

use super::requester::ACCOUNT_HEADER;

const ANONYMOUS: &str = "anonymous";

/// Rate limiter state shared across requests.
pub struct RateLimiterState {
    limiters: DashMap<String, Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>>,
    quota: Quota,
}

impl Default for RateLimiterState {
    fn default() -> Self {
        Self::per_minute(100)
    }
}

impl RateLimiterState {
    /// `requests` per minute with a burst of the same size. Zero is treated
    /// as one.
    pub fn per_minute(requests: u32) -> Self {
        let burst = NonZeroU32::new(requests).unwrap_or(NonZeroU32::MIN);
        Self {
            limiters: DashMap::new(),
            quota: Quota::per_minute(burst),
        }
    }

    /// Returns true if the request is allowed, false if rate limited.
    pub fn check(&self, key: &str) -> bool {
        let limiter = self
            .limiters
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(RateLimiter::direct(self.quota)))
            .clone();

        limiter.check().is_ok()
    }
}

fn bucket_key(headers: &HeaderMap) -> String {
    headers
        .get(ACCOUNT_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.trim().parse::<AccountId>().ok())
        .map(|id| id.to_string())
        .unwrap_or_else(|| ANONYMOUS.to_string())
}

pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let key = bucket_key(request.headers());

    if !limiter.check(&key) {
        tracing::warn!(client = %key, "rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": "Rate limit exceeded. Please try again later.",
                "code": "RATE_LIMITED",
                "retry_after_seconds": 60
            })),
        )
            .into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderName;

    #[test]
    fn test_keys_have_separate_buckets() {
        let limiter = RateLimiterState::per_minute(2);
        assert!(limiter.check("a"));
        assert!(limiter.check("a"));
        assert!(!limiter.check("a"));
        assert!(limiter.check("b"));
    }

    #[test]
    fn test_only_account_ids_get_their_own_bucket() {
        let name = HeaderName::from_bytes(ACCOUNT_HEADER.as_bytes()).unwrap();
        let mut headers = HeaderMap::new();
        assert_eq!(bucket_key(&headers), ANONYMOUS);

        headers.insert(name.clone(), "not-an-account".parse().unwrap());
        assert_eq!(bucket_key(&headers), ANONYMOUS);

        let id = AccountId::new();
        headers.insert(name, format!(" {id} ").parse().unwrap());
        assert_eq!(bucket_key(&headers), id.to_string());
    }

    #[test]
    fn test_zero_quota_allows_one() {
        let limiter = RateLimiterState::per_minute(0);
        assert!(limiter.check("a"));
        assert!(!limiter.check("a"));
    }
}
