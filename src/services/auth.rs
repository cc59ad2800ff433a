// src/services/auth.rs
//! Phone + one-time-code sign-in. Codes are never stored in the clear; only a
//! SHA-256 digest of `phone:code` is kept until it expires or is used.

use crate::models::auth::{Claims, User};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

pub const CODE_LENGTH: usize = 4;
pub const MIN_PHONE_DIGITS: usize = 5;
pub const MAX_PHONE_DIGITS: usize = 15;
pub const MAX_VERIFY_ATTEMPTS: u32 = 5;
pub const TOKEN_LIFETIME_HOURS: i64 = 24;
pub const DEFAULT_DISPLAY_NAME: &str = "Homeward Member";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Enter a valid phone number")]
    InvalidPhone,
    #[error("The code must be 4 digits")]
    MalformedCode,
    #[error("No code was requested for this number")]
    NoChallenge,
    #[error("The code has expired, request a new one")]
    Expired,
    #[error("Incorrect code")]
    WrongCode,
    #[error("Too many attempts, request a new code")]
    TooManyAttempts,
    #[error("Could not deliver the code: {0}")]
    Delivery(String),
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

/// Delivers a freshly issued code to the phone owner.
#[async_trait]
pub trait OtpSender: Send + Sync {
    async fn send(&self, phone: &str, code: &str) -> Result<(), AuthError>;
}

/// Writes the code to the log instead of sending an SMS.
pub struct LogOtpSender;

#[async_trait]
impl OtpSender for LogOtpSender {
    async fn send(&self, phone: &str, code: &str) -> Result<(), AuthError> {
        tracing::info!(destination = %mask_phone(phone), code = %code, "OTP issued (log delivery)");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct OtpChallenge {
    pub destination: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct PendingCode {
    digest: String,
    expires_at: DateTime<Utc>,
    attempts: u32,
}

pub struct OtpService {
    pending: Mutex<HashMap<String, PendingCode>>,
    sender: Arc<dyn OtpSender>,
    jwt_secret: String,
    ttl: Duration,
}

impl OtpService {
    pub fn new(sender: Arc<dyn OtpSender>, jwt_secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            sender,
            jwt_secret: jwt_secret.into(),
            ttl,
        }
    }

    /// Issues a new code for `phone`, replacing any outstanding one. Expired
    /// challenges for other numbers are swept at the same time.
    pub async fn request_otp(&self, phone: &str) -> Result<OtpChallenge, AuthError> {
        let phone = normalize_phone(phone)?;
        let code = format!("{:04}", rand::thread_rng().gen_range(0..10_000u32));
        let expires_at = Utc::now() + self.ttl;

        self.sender.send(&phone, &code).await?;

        let mut pending = self.pending.lock().await;
        let now = Utc::now();
        pending.retain(|_, entry| entry.expires_at > now);
        pending.insert(
            phone.clone(),
            PendingCode {
                digest: code_digest(&phone, &code),
                expires_at,
                attempts: 0,
            },
        );

        Ok(OtpChallenge {
            destination: mask_phone(&phone),
            expires_at,
        })
    }

    /// Checks `code` against the outstanding challenge and, on success,
    /// consumes it and returns the signed-in user with a bearer token.
    pub async fn verify_otp(
        &self,
        phone: &str,
        code: &str,
        name: Option<&str>,
    ) -> Result<(User, String), AuthError> {
        let phone = normalize_phone(phone)?;
        let code = code.trim();
        if code.len() != CODE_LENGTH || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(AuthError::MalformedCode);
        }

        {
            let mut pending = self.pending.lock().await;
            let entry = pending.get_mut(&phone).ok_or(AuthError::NoChallenge)?;

            if entry.expires_at <= Utc::now() {
                pending.remove(&phone);
                return Err(AuthError::Expired);
            }
            if entry.digest != code_digest(&phone, code) {
                entry.attempts += 1;
                if entry.attempts >= MAX_VERIFY_ATTEMPTS {
                    pending.remove(&phone);
                    tracing::warn!(destination = %mask_phone(&phone), "OTP challenge discarded after repeated failures");
                    return Err(AuthError::TooManyAttempts);
                }
                return Err(AuthError::WrongCode);
            }
            pending.remove(&phone);
        }

        let user = User {
            name: name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .unwrap_or(DEFAULT_DISPLAY_NAME)
                .to_string(),
            phone,
        };
        let token = self.issue_token(&user)?;
        tracing::info!(destination = %mask_phone(&user.phone), "phone verified");
        Ok((user, token))
    }

    pub fn issue_token(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.phone.clone(),
            name: user.name.clone(),
            exp: (now + Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp() as usize,
            iat: now.timestamp() as usize,
        };
        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?)
    }

    pub fn verify_token(&self, token: &str) -> Result<User, AuthError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| {
            tracing::debug!(error = %e, "rejected bearer token");
            AuthError::InvalidToken
        })?;
        Ok(User {
            name: data.claims.name,
            phone: data.claims.sub,
        })
    }
}

/// Strips formatting, keeping a leading `+`. Rejects numbers with too few or
/// too many digits.
pub fn normalize_phone(raw: &str) -> Result<String, AuthError> {
    let trimmed = raw.trim();
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')' | '.');
    if !trimmed.chars().all(allowed)
        || digits.len() < MIN_PHONE_DIGITS
        || digits.len() > MAX_PHONE_DIGITS
    {
        return Err(AuthError::InvalidPhone);
    }
    if trimmed.starts_with('+') {
        Ok(format!("+{}", digits))
    } else {
        Ok(digits)
    }
}

/// `+15550001111` -> `********1111`
pub fn mask_phone(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    let keep = chars.len().min(4);
    let hidden = chars.len() - keep;
    let mut masked = "*".repeat(hidden);
    masked.extend(&chars[hidden..]);
    masked
}

fn code_digest(phone: &str, code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(phone.as_bytes());
    hasher.update(b":");
    hasher.update(code.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct CapturingSender {
        sent: StdMutex<Vec<(String, String)>>,
    }

    impl CapturingSender {
        fn last_code(&self) -> String {
            self.sent.lock().unwrap().last().unwrap().1.clone()
        }
    }

    #[async_trait]
    impl OtpSender for CapturingSender {
        async fn send(&self, phone: &str, code: &str) -> Result<(), AuthError> {
            self.sent.lock().unwrap().push((phone.to_string(), code.to_string()));
            Ok(())
        }
    }

    fn service(ttl: Duration) -> (OtpService, Arc<CapturingSender>) {
        let sender = Arc::new(CapturingSender::default());
        (OtpService::new(sender.clone(), "test-secret", ttl), sender)
    }

    fn wrong_code(code: &str) -> String {
        let n: u32 = code.parse().unwrap();
        format!("{:04}", (n + 1) % 10_000)
    }

    #[test]
    fn test_phone_normalization() {
        assert_eq!(normalize_phone("+1 (555) 000-1111").unwrap(), "+15550001111");
        assert_eq!(normalize_phone("98450 12345").unwrap(), "9845012345");
        assert!(matches!(normalize_phone("1234"), Err(AuthError::InvalidPhone)));
        assert!(matches!(normalize_phone("call me"), Err(AuthError::InvalidPhone)));
        assert!(matches!(normalize_phone(""), Err(AuthError::InvalidPhone)));
    }

    #[test]
    fn test_mask_phone_keeps_last_four() {
        assert_eq!(mask_phone("+15550001111"), "********1111");
        assert_eq!(mask_phone("123"), "123");
    }

    #[tokio::test]
    async fn test_request_and_verify_round() {
        let (service, sender) = service(Duration::minutes(5));
        let challenge = service.request_otp("+1 555 000 1111").await.unwrap();
        assert!(challenge.destination.ends_with("1111"));

        let code = sender.last_code();
        assert_eq!(code.len(), CODE_LENGTH);

        let (user, token) = service
            .verify_otp("+15550001111", &code, Some("Priya"))
            .await
            .unwrap();
        assert_eq!(user.name, "Priya");
        assert_eq!(user.phone, "+15550001111");
        assert_eq!(service.verify_token(&token).unwrap(), user);

        // Codes are single use.
        let reused = service.verify_otp("+15550001111", &code, None).await;
        assert!(matches!(reused, Err(AuthError::NoChallenge)));
    }

    #[tokio::test]
    async fn test_code_is_not_stored_in_clear() {
        let (service, sender) = service(Duration::minutes(5));
        service.request_otp("9845012345").await.unwrap();
        let code = sender.last_code();

        let pending = service.pending.lock().await;
        let entry = pending.get("9845012345").unwrap();
        assert_ne!(entry.digest, code);
        assert_eq!(entry.digest.len(), 64);
    }

    #[tokio::test]
    async fn test_malformed_and_wrong_codes() {
        let (service, sender) = service(Duration::minutes(5));
        service.request_otp("9845012345").await.unwrap();
        let code = sender.last_code();

        for bad in ["123", "12345", "abcd"] {
            let result = service.verify_otp("9845012345", bad, None).await;
            assert!(matches!(result, Err(AuthError::MalformedCode)), "{}", bad);
        }

        let result = service.verify_otp("9845012345", &wrong_code(&code), None).await;
        assert!(matches!(result, Err(AuthError::WrongCode)));

        let (user, _) = service.verify_otp("9845012345", &code, None).await.unwrap();
        assert_eq!(user.name, DEFAULT_DISPLAY_NAME);
    }

    #[tokio::test]
    async fn test_repeated_failures_discard_challenge() {
        let (service, sender) = service(Duration::minutes(5));
        service.request_otp("9845012345").await.unwrap();
        let code = sender.last_code();
        let wrong = wrong_code(&code);

        for _ in 0..MAX_VERIFY_ATTEMPTS - 1 {
            let result = service.verify_otp("9845012345", &wrong, None).await;
            assert!(matches!(result, Err(AuthError::WrongCode)));
        }
        let last = service.verify_otp("9845012345", &wrong, None).await;
        assert!(matches!(last, Err(AuthError::TooManyAttempts)));

        let after = service.verify_otp("9845012345", &code, None).await;
        assert!(matches!(after, Err(AuthError::NoChallenge)));
    }

    #[tokio::test]
    async fn test_expired_code_is_rejected() {
        let (service, sender) = service(Duration::seconds(-1));
        service.request_otp("9845012345").await.unwrap();
        let code = sender.last_code();

        let result = service.verify_otp("9845012345", &code, None).await;
        assert!(matches!(result, Err(AuthError::Expired)));
    }

    #[tokio::test]
    async fn test_new_request_sweeps_expired_challenges() {
        let (expiring, _) = service(Duration::seconds(-1));
        for phone in ["9845012345", "9845012346", "9845012347"] {
            expiring.request_otp(phone).await.unwrap();
        }
        // Each request clears the already expired entries before inserting its own.
        assert_eq!(expiring.pending.lock().await.len(), 1);

        let (live, _) = service(Duration::minutes(5));
        for phone in ["9845012345", "9845012346"] {
            live.request_otp(phone).await.unwrap();
        }
        assert_eq!(live.pending.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn test_token_signed_with_other_secret_is_rejected() {
        let (service, _) = service(Duration::minutes(5));
        let other = OtpService::new(Arc::new(LogOtpSender), "other-secret", Duration::minutes(5));
        let user = User {
            name: "Rahul J.".to_string(),
            phone: "+15550001111".to_string(),
        };
        let token = other.issue_token(&user).unwrap();

        assert!(matches!(service.verify_token(&token), Err(AuthError::InvalidToken)));
        assert!(matches!(service.verify_token("not-a-jwt"), Err(AuthError::InvalidToken)));
    }
}
