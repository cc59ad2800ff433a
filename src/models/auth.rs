use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct OtpRequest {
    pub phone: String,
}

#[derive(Debug, Serialize)]
pub struct OtpChallengeResponse {
    pub success: bool,
    pub message: String,
    /// Phone number with all but the last four digits masked
    pub destination: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub phone: String,
    pub code: String,
    pub name: Option<String>,
    /// Browsing session to sign in, if the login was started from the dashboard
    pub session_id: Option<uuid::Uuid>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub user: User,
    pub token: String,
    /// Browsing session that was signed in along with this verification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<uuid::Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // phone number
    pub name: String,
    pub exp: usize,
    pub iat: usize,
}
