use axum::Json;
use axum::extract::Query;
use axum::response::IntoResponse;
use serde::Deserialize;

use crate::domain::{ServiceCategory, service_options};
use crate::presentation::error::ApiError;

use super::dto::ServiceOptionResponse;

#[derive(Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
}

/// The fixed service menu, optionally narrowed to one category.
pub async fn service_catalog_handler(
    Query(query): Query<CatalogQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let categories = match query.category.as_deref() {
        Some(raw) => vec![raw.parse::<ServiceCategory>().map_err(ApiError::validation)?],
        None => vec![ServiceCategory::Snow, ServiceCategory::Lawn],
    };

    let options: Vec<ServiceOptionResponse> = categories
        .into_iter()
        .flat_map(|c| service_options(c).iter().map(ServiceOptionResponse::from))
        .collect();

    Ok(Json(options))
}
