// src/services/leads.rs
use crate::models::lead::{Lead, LeadReceipt, LeadRequest};
use crate::services::auth::normalize_phone;
use chrono::Utc;
use regex::Regex;
use std::collections::VecDeque;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

const MAX_MESSAGE_LEN: usize = 2000;

#[derive(Error, Debug, PartialEq)]
pub enum LeadError {
    #[error("Name is required")]
    MissingName,
    #[error("A valid email address is required")]
    InvalidEmail,
    #[error("A valid phone number is required")]
    InvalidPhone,
    #[error("Inquiry title is required")]
    MissingTitle,
    #[error("Message must be at most {max} characters")]
    MessageTooLong { max: usize },
}

/// Captures contact-form inquiries (service packages, site visits, partner
/// questions). Kept in memory in arrival order; once `capacity` leads are
/// held the oldest is dropped.
pub struct LeadService {
    leads: RwLock<VecDeque<Lead>>,
    capacity: usize,
    email_pattern: Regex,
}

impl LeadService {
    pub fn new(capacity: usize) -> Self {
        Self {
            leads: RwLock::new(VecDeque::new()),
            capacity: capacity.max(1),
            email_pattern: Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles"),
        }
    }

    pub async fn submit(&self, request: LeadRequest) -> Result<LeadReceipt, LeadError> {
        let lead = self.validate(request)?;
        let receipt = LeadReceipt {
            success: true,
            lead_id: lead.id,
            received_at: lead.received_at,
            message: format!(
                "Thanks {}, a Homeward advisor will contact you about \"{}\" shortly.",
                lead.name, lead.title
            ),
        };

        tracing::info!(lead_id = %lead.id, title = %lead.title, "lead captured");
        let mut leads = self.leads.write().await;
        if leads.len() >= self.capacity {
            if let Some(dropped) = leads.pop_front() {
                tracing::warn!(lead_id = %dropped.id, "lead store full, oldest lead dropped");
            }
        }
        leads.push_back(lead);
        Ok(receipt)
    }

    #[cfg(test)]
    async fn all(&self) -> Vec<Lead> {
        self.leads.read().await.iter().cloned().collect()
    }

    fn validate(&self, request: LeadRequest) -> Result<Lead, LeadError> {
        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(LeadError::MissingTitle);
        }
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(LeadError::MissingName);
        }
        let email = request.email.trim().to_string();
        if !self.email_pattern.is_match(&email) {
            return Err(LeadError::InvalidEmail);
        }
        let phone = request
            .phone
            .as_deref()
            .ok_or(LeadError::InvalidPhone)
            .and_then(|raw| normalize_phone(raw).map_err(|_| LeadError::InvalidPhone))?;
        let message = optional(request.message);
        if message.as_ref().map_or(false, |m| m.chars().count() > MAX_MESSAGE_LEN) {
            return Err(LeadError::MessageTooLong { max: MAX_MESSAGE_LEN });
        }

        Ok(Lead {
            id: Uuid::new_v4(),
            title,
            subtitle: optional(request.subtitle),
            name,
            email,
            phone,
            message,
            received_at: Utc::now(),
        })
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
