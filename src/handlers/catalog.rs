// src/handlers/catalog.rs
//! Read-only listing endpoints: search, detail, state picker, service packages.

use crate::catalog::{ServicePackage, StateSummary};
use crate::error::ApiError;
use crate::filter::{FilterQuery, PropertyFilter};
use crate::models::property::PropertyRecord;
use crate::AppState;
use axum::{
    extract::{Extension, Path, Query},
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
pub struct PropertyListResponse {
    pub success: bool,
    pub filter: PropertyFilter,
    pub count: usize,
    pub properties: Vec<PropertyRecord>,
}

#[derive(Serialize)]
pub struct PropertyResponse {
    pub success: bool,
    pub property: PropertyRecord,
}

#[derive(Serialize)]
pub struct StatesResponse {
    pub success: bool,
    pub states: Vec<StateSummary>,
}

#[derive(Serialize)]
pub struct ServicesResponse {
    pub success: bool,
    pub packages: Vec<ServicePackage>,
}

pub fn catalog_routes() -> Router {
    Router::new()
        .route("/api/properties", get(list_properties))
        .route("/api/properties/:id", get(get_property))
        .route("/api/states", get(list_states))
        .route("/api/services", get(list_services))
}

/// GET /api/properties?state=&max_price=&min_area=
async fn list_properties(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<PropertyListResponse>, ApiError> {
    let filter = PropertyFilter::try_from(query)?;
    let properties: Vec<PropertyRecord> = filter
        .apply(state.catalog.all())
        .into_iter()
        .cloned()
        .collect();

    tracing::debug!(?filter, matches = properties.len(), "property search");

    Ok(Json(PropertyListResponse {
        success: true,
        filter,
        count: properties.len(),
        properties,
    }))
}

/// GET /api/properties/:id
async fn get_property(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PropertyResponse>, ApiError> {
    let property = state
        .catalog
        .get(&id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("Property not found: {}", id)))?;

    Ok(Json(PropertyResponse {
        success: true,
        property,
    }))
}

async fn list_states(Extension(state): Extension<Arc<AppState>>) -> Json<StatesResponse> {
    Json(StatesResponse {
        success: true,
        states: state.catalog.states_with_counts(),
    })
}

async fn list_services(Extension(state): Extension<Arc<AppState>>) -> Json<ServicesResponse> {
    Json(ServicesResponse {
        success: true,
        packages: state.catalog.service_packages(),
    })
}
