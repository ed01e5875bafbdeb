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
    types::IngredientId,
};

/// List the caller's ingredients, newest first
#[utoipa::path(
    get,
    path = "/ingredients",
    tag = "ingredients",
    summary = "List ingredients",
    responses(
        (status = 200, description = "The caller's ingredients", body = Vec<LabelResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_ingredients(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<Vec<LabelResponse>>> {
    labels::list(&state, &current_user, LabelKind::Ingredient).await
}

#[utoipa::path(
    post,
    path = "/ingredients",
    tag = "ingredients",
    summary = "Create ingredient",
    request_body = LabelCreate,
    responses(
        (status = 201, description = "Ingredient created", body = LabelResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_ingredient(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppJson(create): AppJson<LabelCreate>,
) -> Result<(StatusCode, Json<LabelResponse>)> {
    labels::create(&state, &current_user, LabelKind::Ingredient, create).await
}

#[utoipa::path(
    get,
    path = "/ingredients/{id}",
    tag = "ingredients",
    summary = "Get ingredient",
    params(("id" = i64, Path, description = "Ingredient ID")),
    responses(
        (status = 200, description = "Ingredient", body = LabelResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Ingredient belongs to another user"),
        (status = 404, description = "Ingredient not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_ingredient(State(state): State<AppState>, Path(id): Path<IngredientId>, current_user: CurrentUser) -> Result<Json<LabelResponse>> {
    labels::get(&state, &current_user, LabelKind::Ingredient, id).await
}

#[utoipa::path(
    patch,
    path = "/ingredients/{id}",
    tag = "ingredients",
    summary = "Rename ingredient",
    request_body = LabelUpdate,
    params(("id" = i64, Path, description = "Ingredient ID")),
    responses(
        (status = 200, description = "Ingredient updated", body = LabelResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Ingredient belongs to another user"),
        (status = 404, description = "Ingredient not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_ingredient(
    State(state): State<AppState>,
    Path(id): Path<IngredientId>,
    current_user: CurrentUser,
    AppJson(update): AppJson<LabelUpdate>,
) -> Result<Json<LabelResponse>> {
    labels::update(&state, &current_user, LabelKind::Ingredient, id, update).await
}

/// Delete an ingredient, detaching it from every recipe
#[utoipa::path(
    delete,
    path = "/ingredients/{id}",
    tag = "ingredients",
    summary = "Delete ingredient",
    params(("id" = i64, Path, description = "Ingredient ID")),
    responses(
        (status = 204, description = "Ingredient deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Ingredient belongs to another user"),
        (status = 404, description = "Ingredient not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_ingredient(State(state): State<AppState>, Path(id): Path<IngredientId>, current_user: CurrentUser) -> Result<StatusCode> {
    labels::delete(&state, &current_user, LabelKind::Ingredient, id).await
}
