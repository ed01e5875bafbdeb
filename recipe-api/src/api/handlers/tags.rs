use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use super::labels;
use crate::{
    AppState,
    api::{
        AppJson,
        models::{
            labels::{LabelCreate, LabelResponse, LabelUpdate},
            users::CurrentUser,
        },
    },
    db::models::labels::LabelKind,
    errors::Result,
    types::TagId,
};

/// List the caller's tags, newest first
#[utoipa::path(
    get,
    path = "/tags",
    tag = "tags",
    summary = "List tags",
    responses(
        (status = 200, description = "The caller's tags", body = Vec<LabelResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_tags(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<Vec<LabelResponse>>> {
    labels::list(&state, &current_user, LabelKind::Tag).await
}

#[utoipa::path(
    post,
    path = "/tags",
    tag = "tags",
    summary = "Create tag",
    request_body = LabelCreate,
    responses(
        (status = 201, description = "Tag created", body = LabelResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_tag(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppJson(create): AppJson<LabelCreate>,
) -> Result<(StatusCode, Json<LabelResponse>)> {
    labels::create(&state, &current_user, LabelKind::Tag, create).await
}

#[utoipa::path(
    get,
    path = "/tags/{id}",
    tag = "tags",
    summary = "Get tag",
    params(("id" = i64, Path, description = "Tag ID")),
    responses(
        (status = 200, description = "Tag", body = LabelResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Tag belongs to another user"),
        (status = 404, description = "Tag not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_tag(State(state): State<AppState>, Path(id): Path<TagId>, current_user: CurrentUser) -> Result<Json<LabelResponse>> {
    labels::get(&state, &current_user, LabelKind::Tag, id).await
}

#[utoipa::path(
    patch,
    path = "/tags/{id}",
    tag = "tags",
    summary = "Rename tag",
    request_body = LabelUpdate,
    params(("id" = i64, Path, description = "Tag ID")),
    responses(
        (status = 200, description = "Tag updated", body = LabelResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Tag belongs to another user"),
        (status = 404, description = "Tag not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_tag(
    State(state): State<AppState>,
    Path(id): Path<TagId>,
    current_user: CurrentUser,
    AppJson(update): AppJson<LabelUpdate>,
) -> Result<Json<LabelResponse>> {
    labels::update(&state, &current_user, LabelKind::Tag, id, update).await
}

/// Delete a tag, detaching it from every recipe
#[utoipa::path(
    delete,
    path = "/tags/{id}",
    tag = "tags",
    summary = "Delete tag",
    params(("id" = i64, Path, description = "Tag ID")),
    responses(
        (status = 204, description = "Tag deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Tag belongs to another user"),
        (status = 404, description = "Tag not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_tag(State(state): State<AppState>, Path(id): Path<TagId>, current_user: CurrentUser) -> Result<StatusCode> {
    labels::delete(&state, &current_user, LabelKind::Tag, id).await
}
