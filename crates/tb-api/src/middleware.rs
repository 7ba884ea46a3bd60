//! tinyboard/crates/tb-api/src/middleware.rs
//!
//! Traffic control and security middleware: request logging, the
//! per-client rate limiter, and the single-pass CORS origin policy.

use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::{Logger, Next};
use actix_web::{web, Error, HttpResponse};
use tb_core::error::AppError;
use tb_core::origin::OriginPolicy;
use tb_core::rate::{RateDecision, RateLimiter};

/// Requests to this path bypass the rate limiter and its log line.
const UNCOUNTED_PATH: &str = "/favicon.ico";

/// Returns a standard set of middleware for the Tinyboard API.
pub fn standard_middleware() -> Logger {
    // The 'default' logger outputs:
    // remote-ip "request-line" status-code response-size "referrer" "user-agent"
    Logger::default()
}

/// Shared rate-limit state, one limiter for the whole server.
pub struct RateLimitState {
    limiter: Mutex<RateLimiter>,
}

impl RateLimitState {
    pub fn new(capacity: usize) -> Self {
        Self {
            limiter: Mutex::new(RateLimiter::new(capacity)),
        }
    }

    /// Records one request for `key` and returns the decision.
    pub fn check(&self, key: &str, now_ms: u64) -> RateDecision {
        self.limiter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .check(key, now_ms)
    }
}

impl Default for RateLimitState {
    fn default() -> Self {
        Self::new(tb_core::rate::DEFAULT_CAPACITY)
    }
}

pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Per-client sliding-window rate limiting, keyed on the peer address.
///
/// Every counted request logs its observed count. Once a client
/// crosses the threshold the request is terminated here with a 429 and
/// the `X-RateLimit-Exceeded` marker header; it never reaches the
/// handler.
pub async fn rate_limit(
    state: web::Data<RateLimitState>,
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    if req.path() == UNCOUNTED_PATH {
        return next.call(req).await.map(|res| res.map_into_left_body());
    }

    let key = req
        .peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let decision = state.check(&key, now_ms());
    log::info!("[{}] request count: {}", key, decision.count());

    if let RateDecision::Exceeded { count } = decision {
        let err = AppError::RateLimited(count);
        log::warn!("[{}] {}", key, err);
        let response = HttpResponse::TooManyRequests()
            .insert_header(("X-RateLimit-Exceeded", "true"))
            .json(serde_json::json!({
                "error": "Too many requests. Please try again later.",
                "requestCount": count,
            }));
        return Ok(req.into_response(response).map_into_right_body());
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}

/// Configures CORS from the one canonical origin policy. Requests
/// without an `Origin` header are same-origin and pass untouched.
pub fn cors_policy(policy: OriginPolicy) -> Cors {
    Cors::default()
        .allowed_origin_fn(move |origin, _req_head| policy.allows(origin.to_str().ok()))
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allowed_headers(vec!["X-Requested-With", "Content-Type"])
        .supports_credentials()
        .max_age(3600)
}
