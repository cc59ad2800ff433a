// src/handlers/mod.rs
pub mod assistant;
pub mod auth;
pub mod catalog;
pub mod leads;
pub mod sessions;
pub mod status;
