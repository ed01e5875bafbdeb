//! Shared handler bodies for tags and ingredients. The routed, documented handlers live in
//! [`super::tags`] and [`super::ingredients`].

use axum::{Json, http::StatusCode};
use sqlx::SqliteConnection;

use crate::{
    AppState,
    api::models::{
        labels::{LabelCreate, LabelResponse, LabelUpdate},
        users::CurrentUser,
    },
    auth::permissions::authorize,
    db::{
        errors::DbError,
        handlers::{Labels, Repository, labels::LabelFilter},
        models::labels::{LabelCreateDBRequest, LabelDBResponse, LabelKind, LabelUpdateDBRequest},
    },
    errors::{Error, Result},
    types::Operation,
};

async fn owned_label(
    conn: &mut SqliteConnection,
    kind: LabelKind,
    current_user: &CurrentUser,
    id: i64,
    action: Operation,
) -> Result<LabelDBResponse> {
    let label = Labels::new(conn, kind).get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: kind.display_name().to_string(),
        id: id.to_string(),
    })?;

    authorize(current_user, label.user_id, kind.resource(), action, id)?;
    Ok(label)
}

pub(super) async fn list(state: &AppState, current_user: &CurrentUser, kind: LabelKind) -> Result<Json<Vec<LabelResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let labels = Labels::new(&mut conn, kind).list(&LabelFilter::new(current_user.id)).await?;

    Ok(Json(labels.into_iter().map(LabelResponse::from).collect()))
}

pub(super) async fn create(
    state: &AppState,
    current_user: &CurrentUser,
    kind: LabelKind,
    create: LabelCreate,
) -> Result<(StatusCode, Json<LabelResponse>)> {
    create.validate()?;

    let mut tx = state.db.begin_write().await.map_err(DbError::from)?;
    let label = Labels::new(&mut tx, kind)
        .create(&LabelCreateDBRequest {
            user_id: current_user.id,
            name: create.name,
        })
        .await?;
    tx.commit().await.map_err(DbError::from)?;

    Ok((StatusCode::CREATED, Json(LabelResponse::from(label))))
}

pub(super) async fn get(state: &AppState, current_user: &CurrentUser, kind: LabelKind, id: i64) -> Result<Json<LabelResponse>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let label = owned_label(&mut conn, kind, current_user, id, Operation::Read).await?;

    Ok(Json(LabelResponse::from(label)))
}

pub(super) async fn update(
    state: &AppState,
    current_user: &CurrentUser,
    kind: LabelKind,
    id: i64,
    update: LabelUpdate,
) -> Result<Json<LabelResponse>> {
    update.validate()?;

    let mut tx = state.db.begin_write().await.map_err(DbError::from)?;
    owned_label(&mut tx, kind, current_user, id, Operation::Update).await?;
    let label = Labels::new(&mut tx, kind)
        .update(id, &LabelUpdateDBRequest { name: update.name })
        .await?;
    tx.commit().await.map_err(DbError::from)?;

    Ok(Json(LabelResponse::from(label)))
}

/// Deleting a label detaches it from every recipe; the recipes stay.
pub(super) async fn delete(state: &AppState, current_user: &CurrentUser, kind: LabelKind, id: i64) -> Result<StatusCode> {
    let mut tx = state.db.begin_write().await.map_err(DbError::from)?;
    owned_label(&mut tx, kind, current_user, id, Operation::Delete).await?;
    Labels::new(&mut tx, kind).delete(id).await?;
    tx.commit().await.map_err(DbError::from)?;

    Ok(StatusCode::NO_CONTENT)
}
