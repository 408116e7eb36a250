use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use armory_core::DomainError;
use armory_infra::store::CatalogStore;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn list_armor(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::PageQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(rejection) => return errors::rejection_to_response(rejection.body_text()),
    };

    match services.catalog.list(query.pagination()).await {
        Ok(page) => (StatusCode::OK, Json(dto::page_to_json(&page, dto::armor_to_json))).into_response(),
        Err(e) => errors::service_error_to_response(e.into()),
    }
}

pub async fn get_armor(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let item_id = match dto::parse_item_id(&id) {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.catalog.get(item_id).await {
        Ok(Some(item)) => (StatusCode::OK, Json(dto::armor_to_json(&item))).into_response(),
        Ok(None) => errors::domain_error_to_response(DomainError::ItemNotFound(item_id)),
        Err(e) => errors::service_error_to_response(e.into()),
    }
}
