// src/error.rs
use crate::filter::FilterError;
use crate::services::auth::AuthError;
use crate::services::leads::LeadError;
use crate::view::ViewError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Rate limit exceeded. Please try again later.")]
    TooManyRequests,
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(ref detail) = self {
            tracing::error!(detail = %detail, "internal error while handling request");
        }
        let body = ErrorResponse {
            success: false,
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<FilterError> for ApiError {
    fn from(e: FilterError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<ViewError> for ApiError {
    fn from(e: ViewError) -> Self {
        match e {
            ViewError::UnknownProperty(_) => ApiError::NotFound(e.to_string()),
            ViewError::TrackBusy(_) => ApiError::Conflict(e.to_string()),
            ViewError::NotSignedIn => ApiError::Unauthorized(e.to_string()),
            ViewError::UnknownState(_)
            | ViewError::SelectionOutsideHome(_)
            | ViewError::NoPropertySelected
            | ViewError::LoginNotExpected
            | ViewError::EmptyMessage => ApiError::BadRequest(e.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidPhone | AuthError::MalformedCode => ApiError::BadRequest(e.to_string()),
            AuthError::NoChallenge
            | AuthError::Expired
            | AuthError::WrongCode
            | AuthError::TooManyAttempts
            | AuthError::InvalidToken => ApiError::Unauthorized(e.to_string()),
            AuthError::Delivery(_) | AuthError::Token(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<LeadError> for ApiError {
    fn from(e: LeadError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}
