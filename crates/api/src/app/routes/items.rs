use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use itemproc_core::{DomainError, ItemId};
use itemproc_items::{CreateItem, UpdateItem};

use crate::app::{
    dto::{CreateItemRequest, UpdateItemRequest},
    errors,
    services::AppServices,
};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/process", get(process_items))
        .route("/:id", get(get_item).put(update_item).delete(delete_item))
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.store.find_all().await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match id.parse::<ItemId>() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store.find_by_id(id).await {
        Ok(Some(item)) => (StatusCode::OK, Json(item)).into_response(),
        Ok(None) => errors::domain_error_to_response(DomainError::not_found()),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<CreateItemRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let new_item = match CreateItem::from(body).validate() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store.create(new_item).await {
        Ok(item) => {
            tracing::info!(item_id = %item.id, "item created");
            (StatusCode::CREATED, Json(item)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<UpdateItemRequest>, JsonRejection>,
) -> axum::response::Response {
    let id = match id.parse::<ItemId>() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    // Validation runs before the lookup: a bad body on a missing id is a 400.
    let patch = match UpdateItem::from(body).validate() {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let mut item = match services.store.find_by_id(id).await {
        Ok(Some(item)) => item,
        Ok(None) => return errors::domain_error_to_response(DomainError::not_found()),
        Err(e) => return errors::store_error_to_response(e),
    };
    item.apply_patch(&patch);

    match services.store.save(item).await {
        Ok(saved) => {
            tracing::info!(item_id = %saved.id, "item updated");
            (StatusCode::OK, Json(saved)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match id.parse::<ItemId>() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store.delete(id).await {
        Ok(true) => {
            tracing::info!(item_id = %id, "item deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(false) => errors::domain_error_to_response(DomainError::not_found()),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Run one batch pass and return the items it processed.
pub async fn process_items(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.batch.process_unprocessed_items().await {
        Ok(outcome) => (StatusCode::OK, Json(outcome.processed)).into_response(),
        Err(e) => errors::batch_error_to_response(e),
    }
}
