use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{ConnectInfo, Extension, Request},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Fixed-window request counter keyed by client IP.
#[derive(Clone)]
pub struct RateLimiter {
    // IP -> (request_count, window_start)
    clients: Arc<Mutex<HashMap<String, (u32, Instant)>>>,
    max_requests: u32,
    window_duration: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            clients: Arc::new(Mutex::new(HashMap::new())),
            max_requests,
            window_duration: window,
        }
    }

    pub fn check_rate_limit(&self, client_ip: &str) -> bool {
        self.check_at(client_ip, Instant::now())
    }

    fn check_at(&self, client_ip: &str, now: Instant) -> bool {
        let mut clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());

        match clients.get_mut(client_ip) {
            Some((count, window_start)) => {
                if now.duration_since(*window_start) > self.window_duration {
                    *count = 1;
                    *window_start = now;
                    true
                } else if *count >= self.max_requests {
                    false
                } else {
                    *count += 1;
                    true
                }
            }
            None => {
                clients.insert(client_ip.to_string(), (1, now));
                true
            }
        }
    }

    pub fn cleanup_expired(&self) {
        let mut clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();

        clients.retain(|_, (_, window_start)| now.duration_since(*window_start) <= self.window_duration);
    }
}

/// Guards the OTP endpoints. Requests without a peer address (in-process
/// tests) share the "unknown" bucket.
pub async fn otp_rate_limit_middleware(
    Extension(state): Extension<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    enforce(&state.otp_limiter, connect_info, "OTP")?;
    Ok(next.run(request).await)
}

/// Guards the endpoints that add to server memory: session creation and
/// lead capture.
pub async fn write_rate_limit_middleware(
    Extension(state): Extension<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    enforce(&state.write_limiter, connect_info, "write")?;
    Ok(next.run(request).await)
}

fn enforce(
    limiter: &RateLimiter,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    scope: &'static str,
) -> Result<(), ApiError> {
    let client_ip = connect_info
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    if !limiter.check_rate_limit(&client_ip) {
        tracing::warn!(client_ip = %client_ip, scope, "rate limit exceeded");
        return Err(ApiError::TooManyRequests);
    }

    if rand::random::<u8>() < 10 {
        limiter.cleanup_expired();
    }

    Ok(())
}
