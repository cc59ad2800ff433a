pub mod auth;
pub mod chat;
pub mod dashboard;
pub mod lead;
pub mod property;
