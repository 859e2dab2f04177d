// handlers/content.rs - generic handlers shared by every translatable resource

use axum::extract::{Path, Query, State};
use serde_json::Value;
use std::collections::HashMap;

use crate::database::Lookup;
use crate::error::ApiError;
use crate::middleware::{parse_id, ApiResponse, ApiResult, PageResult, Paginated, ValidatedJson};
use crate::resources::{parse_language, ListQuery, Resource};
use crate::services::AuthUser;
use crate::state::AppState;

/// GET /api/v1/{resource} - paged list with filters, search and sorting
pub async fn list<R: Resource>(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> PageResult<Value> {
    let schema = R::schema();
    let query = ListQuery::parse(schema, &params).map_err(ApiError::validation)?;
    let listing = state.content::<R>().list(&query).await?;
    Ok(Paginated::from_listing(
        listing,
        format!("{} retrieved successfully", schema.collection_label()),
    ))
}

/// GET /api/v1/{resource}/:id - one record with the requested language
pub async fn get_one<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    let language = parse_language(&params).map_err(|e| ApiError::validation(vec![e]))?;
    let record = state.content::<R>().find(Lookup::Id(id), language).await?;
    Ok(ApiResponse::success(record))
}

/// GET /api/v1/{resource}/slug/:slug
pub async fn get_by_slug<R: Resource>(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Value> {
    let language = parse_language(&params).map_err(|e| ApiError::validation(vec![e]))?;
    let record = state.content::<R>().find(Lookup::Slug(&slug), language).await?;
    Ok(ApiResponse::success(record))
}

/// POST /api/v1/{resource} - the caller, when authenticated, is recorded as author
pub async fn create<R: Resource>(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    ValidatedJson(input): ValidatedJson<R::Create>,
) -> ApiResult<Value> {
    let service = state.content::<R>();
    let created = service.create(R::draft(input), user.map(|u| u.id)).await?;
    Ok(ApiResponse::created(created).message(format!("{} created successfully", R::schema().label)))
}

/// PUT /api/v1/{resource}/:id - partial update with per-language upserts
pub async fn update<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<R::Update>,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    let updated = state.content::<R>().update(id, R::patch(input)).await?;
    Ok(ApiResponse::success(updated).message(format!("{} updated successfully", R::schema().label)))
}

/// DELETE /api/v1/{resource}/:id
pub async fn delete<R: Resource>(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    state.content::<R>().delete(id).await?;
    Ok(ApiResponse::success(Value::Null).message(format!("{} deleted successfully", R::schema().label)))
}
