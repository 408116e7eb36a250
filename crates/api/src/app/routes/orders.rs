use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use armory_infra::store::OrderStore;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CallerContext;

/// Check out the caller's cart. The body, if any, is ignored: lines and
/// prices come from the stored cart and the catalog.
pub async fn place_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
) -> axum::response::Response {
    match services.checkout.checkout(caller.user_id()).await {
        Ok(order) => (StatusCode::CREATED, Json(dto::order_to_json(&order))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    query: Result<Query<dto::PageQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(rejection) => return errors::rejection_to_response(rejection.body_text()),
    };

    match services
        .orders
        .list_for_owner(caller.user_id(), query.pagination())
        .await
    {
        Ok(page) => (StatusCode::OK, Json(dto::page_to_json(&page, dto::order_to_json))).into_response(),
        Err(e) => errors::service_error_to_response(e.into()),
    }
}
