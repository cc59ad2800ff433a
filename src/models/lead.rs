use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Contact form submission: a service package request, a site visit, a partner inquiry.
#[derive(Debug, Clone, Deserialize)]
pub struct LeadRequest {
    pub title: String,
    pub subtitle: Option<String>,
    pub name: String,
    pub email: String,
    /// Required; kept optional here so a missing value is reported as a 400.
    pub phone: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Lead {
    pub id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: Option<String>,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeadReceipt {
    pub success: bool,
    pub lead_id: Uuid,
    pub received_at: DateTime<Utc>,
    pub message: String,
}
