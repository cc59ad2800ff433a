// src/services/mod.rs
pub mod auth;
pub mod leads;

pub use auth::{LogOtpSender, OtpSender, OtpService};
pub use leads::LeadService;
