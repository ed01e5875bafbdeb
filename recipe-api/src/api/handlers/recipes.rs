use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use sqlx::SqliteConnection;

use crate::{
    AppState,
    api::{
        AppJson,
        models::{
            recipes::{RecipeCreate, RecipeDetailResponse, RecipeResponse, RecipeUpdate},
            users::CurrentUser,
        },
    },
    auth::permissions::authorize,
    db::{
        errors::DbError,
        handlers::{Recipes, Repository, recipes::RecipeFilter},
        models::{labels::LabelKind, recipes::RecipeDBResponse},
    },
    errors::{Error, Result},
    types::{IngredientId, Operation, RecipeId, Resource, TagId},
};

/// Load a recipe and check the caller may perform `action` on it.
async fn owned_recipe(
    conn: &mut SqliteConnection,
    current_user: &CurrentUser,
    id: RecipeId,
    action: Operation,
) -> Result<RecipeDBResponse> {
    let recipe = Recipes::new(conn).get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Recipe".to_string(),
        id: id.to_string(),
    })?;

    authorize(current_user, recipe.user_id, Resource::Recipes, action, id)?;
    Ok(recipe)
}

/// List the caller's recipes, newest first
#[utoipa::path(
    get,
    path = "/recipes",
    tag = "recipes",
    summary = "List recipes",
    responses(
        (status = 200, description = "The caller's recipes (list view, no description)", body = Vec<RecipeResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_recipes(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<Vec<RecipeResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let recipes = Recipes::new(&mut conn).list(&RecipeFilter::new(current_user.id)).await?;

    Ok(Json(recipes.into_iter().map(RecipeResponse::from).collect()))
}

/// Create a recipe, resolving tag and ingredient names to the caller's labels
#[utoipa::path(
    post,
    path = "/recipes",
    tag = "recipes",
    summary = "Create recipe",
    request_body = RecipeCreate,
    responses(
        (status = 201, description = "Recipe created", body = RecipeDetailResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_recipe(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppJson(create): AppJson<RecipeCreate>,
) -> Result<(StatusCode, Json<RecipeDetailResponse>)> {
    let request = create.into_db_request(current_user.id)?;

    let mut tx = state.db.begin_write().await.map_err(DbError::from)?;
    let recipe = Recipes::new(&mut tx).create(&request).await?;
    tx.commit().await.map_err(DbError::from)?;

    Ok((StatusCode::CREATED, Json(RecipeDetailResponse::from(recipe))))
}

/// Get one recipe with its description
#[utoipa::path(
    get,
    path = "/recipes/{id}",
    tag = "recipes",
    summary = "Get recipe",
    params(("id" = i64, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Recipe detail", body = RecipeDetailResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Recipe belongs to another user"),
        (status = 404, description = "Recipe not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<RecipeId>,
    current_user: CurrentUser,
) -> Result<Json<RecipeDetailResponse>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let recipe = owned_recipe(&mut conn, &current_user, id, Operation::Read).await?;

    Ok(Json(RecipeDetailResponse::from(recipe)))
}

/// Partially update a recipe. Tags and ingredients in the body are added to the existing ones.
#[utoipa::path(
    patch,
    path = "/recipes/{id}",
    tag = "recipes",
    summary = "Update recipe",
    request_body = RecipeUpdate,
    params(("id" = i64, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Recipe updated", body = RecipeDetailResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Recipe belongs to another user"),
        (status = 404, description = "Recipe not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_recipe(
    State(state): State<AppState>,
    Path(id): Path<RecipeId>,
    current_user: CurrentUser,
    AppJson(update): AppJson<RecipeUpdate>,
) -> Result<Json<RecipeDetailResponse>> {
    let request = update.into_db_request()?;

    let mut tx = state.db.begin_write().await.map_err(DbError::from)?;
    owned_recipe(&mut tx, &current_user, id, Operation::Update).await?;
    let recipe = Recipes::new(&mut tx).update(id, &request).await?;
    tx.commit().await.map_err(DbError::from)?;

    Ok(Json(RecipeDetailResponse::from(recipe)))
}

/// Delete a recipe. Its tags and ingredients are kept.
#[utoipa::path(
    delete,
    path = "/recipes/{id}",
    tag = "recipes",
    summary = "Delete recipe",
    params(("id" = i64, Path, description = "Recipe ID")),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Recipe belongs to another user"),
        (status = 404, description = "Recipe not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_recipe(
    State(state): State<AppState>,
    Path(id): Path<RecipeId>,
    current_user: CurrentUser,
) -> Result<StatusCode> {
    let mut tx = state.db.begin_write().await.map_err(DbError::from)?;
    owned_recipe(&mut tx, &current_user, id, Operation::Delete).await?;
    Recipes::new(&mut tx).delete(id).await?;
    tx.commit().await.map_err(DbError::from)?;

    Ok(StatusCode::NO_CONTENT)
}

async fn detach(state: &AppState, current_user: &CurrentUser, recipe_id: RecipeId, kind: LabelKind, label_id: i64) -> Result<StatusCode> {
    let mut tx = state.db.begin_write().await.map_err(DbError::from)?;
    owned_recipe(&mut tx, current_user, recipe_id, Operation::Update).await?;

    if !Recipes::new(&mut tx).detach_label(recipe_id, kind, label_id).await? {
        return Err(Error::NotFound {
            resource: format!("{} on recipe {recipe_id}", kind.display_name()),
            id: label_id.to_string(),
        });
    }
    tx.commit().await.map_err(DbError::from)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Detach a tag from a recipe. The tag itself is kept.
#[utoipa::path(
    delete,
    path = "/recipes/{id}/tags/{tag_id}",
    tag = "recipes",
    summary = "Detach tag",
    params(
        ("id" = i64, Path, description = "Recipe ID"),
        ("tag_id" = i64, Path, description = "Tag ID"),
    ),
    responses(
        (status = 204, description = "Tag detached"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Recipe belongs to another user"),
        (status = 404, description = "Recipe not found or tag not attached"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn detach_tag(
    State(state): State<AppState>,
    Path((id, tag_id)): Path<(RecipeId, TagId)>,
    current_user: CurrentUser,
) -> Result<StatusCode> {
    detach(&state, &current_user, id, LabelKind::Tag, tag_id).await
}

/// Detach an ingredient from a recipe. The ingredient itself is kept.
#[utoipa::path(
    delete,
    path = "/recipes/{id}/ingredients/{ingredient_id}",
    tag = "recipes",
    summary = "Detach ingredient",
    params(
        ("id" = i64, Path, description = "Recipe ID"),
        ("ingredient_id" = i64, Path, description = "Ingredient ID"),
    ),
    responses(
        (status = 204, description = "Ingredient detached"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Recipe belongs to another user"),
        (status = 404, description = "Recipe not found or ingredient not attached"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn detach_ingredient(
    State(state): State<AppState>,
    Path((id, ingredient_id)): Path<(RecipeId, IngredientId)>,
    current_user: CurrentUser,
) -> Result<StatusCode> {
    detach(&state, &current_user, id, LabelKind::Ingredient, ingredient_id).await
}

#[cfg(test)]
mod tests {
    use crate::{
        api::models::{
            labels::LabelResponse,
            recipes::{RecipeDetailResponse, RecipeResponse},
        },
        test_utils::*,
    };
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    fn cake() -> Value {
        json!({"title": "chocolate cake", "time_minutes": 30, "price": 500})
    }

    #[test_log::test(tokio::test)]
    async fn test_list_omits_description_detail_includes_it() {
        let (app, _state) = create_test_app().await;
        let token = register_and_login(&app, "a@example.com").await;

        let created = app.post("/recipes").add_header("authorization", bearer(&token)).json(&cake()).await;
        created.assert_status(StatusCode::CREATED);
        let created: RecipeDetailResponse = created.json();

        let list = app.get("/recipes").add_header("authorization", bearer(&token)).await;
        list.assert_status_ok();
        let list: Vec<Value> = list.json();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["title"], "chocolate cake");
        assert!(list[0].get("description").is_none());

        let detail = app
            .get(&format!("/recipes/{}", created.recipe.id))
            .add_header("authorization", bearer(&token))
            .await;
        detail.assert_status_ok();
        let detail: Value = detail.json();
        assert_eq!(detail["title"], "chocolate cake");
        assert_eq!(detail["description"], "");
        assert_eq!(detail["price"], "500");
        assert_eq!(detail["time_minutes"], 30);
    }

    #[test_log::test(tokio::test)]
    async fn test_recipes_require_authentication() {
        let (app, _state) = create_test_app().await;

        app.get("/recipes").await.assert_status(StatusCode::UNAUTHORIZED);
        app.post("/recipes").json(&cake()).await.assert_status(StatusCode::UNAUTHORIZED);
        app.get("/recipes/1").await.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[test_log::test(tokio::test)]
    async fn test_list_only_returns_own_recipes_newest_first() {
        let (app, _state) = create_test_app().await;
        let alice = register_and_login(&app, "alice@example.com").await;
        let bob = register_and_login(&app, "bob@example.com").await;

        for (token, title) in [(&alice, "first"), (&bob, "bob's"), (&alice, "second"), (&bob, "bob's again")] {
            app.post("/recipes")
                .add_header("authorization", bearer(token))
                .json(&json!({"title": title, "time_minutes": 5, "price": "1.00"}))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let list: Vec<RecipeResponse> = app.get("/recipes").add_header("authorization", bearer(&alice)).await.json();
        let titles: Vec<_> = list.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["second", "first"]);
    }

    #[test_log::test(tokio::test)]
    async fn test_duplicate_tag_names_resolve_to_one_tag() {
        let (app, state) = create_test_app().await;
        let token = register_and_login(&app, "a@example.com").await;

        let body = json!({
            "title": "cake", "time_minutes": 30, "price": 5,
            "tags": [{"name": "A"}, {"name": "A"}],
        });
        for _ in 0..2 {
            let recipe: RecipeDetailResponse = app
                .post("/recipes")
                .add_header("authorization", bearer(&token))
                .json(&body)
                .await
                .json();
            assert_eq!(recipe.recipe.tags.len(), 1);
        }

        assert_eq!(count_rows(&state.db, "tags").await, 1);
        let tags: Vec<LabelResponse> = app.get("/tags").add_header("authorization", bearer(&token)).await.json();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "A");
    }

    #[test_log::test(tokio::test)]
    async fn test_create_with_ingredients() {
        let (app, _state) = create_test_app().await;
        let token = register_and_login(&app, "a@example.com").await;

        let response = app
            .post("/recipes")
            .add_header("authorization", bearer(&token))
            .json(&json!({
                "title": "pancakes", "time_minutes": 15, "price": "2.50",
                "link": "https://example.com/pancakes",
                "description": "Fluffy",
                "ingredients": [{"name": "Flour"}, {"name": "Milk"}],
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let recipe: RecipeDetailResponse = response.json();
        let names: Vec<_> = recipe.recipe.ingredients.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Flour", "Milk"]);
        assert_eq!(recipe.description, "Fluffy");
        assert_eq!(recipe.recipe.link, "https://example.com/pancakes");
    }

    #[test_log::test(tokio::test)]
    async fn test_create_validation_errors() {
        let (app, state) = create_test_app().await;
        let token = register_and_login(&app, "a@example.com").await;

        for body in [
            json!({"time_minutes": 30, "price": 5}),
            json!({"title": "", "time_minutes": 30, "price": 5}),
            json!({"title": "x", "time_minutes": -1, "price": 5}),
            json!({"title": "x", "time_minutes": 30, "price": "-2"}),
            json!({"title": "x", "time_minutes": 30, "price": "1.234"}),
            json!({"title": "x", "time_minutes": "soon", "price": 5}),
            json!({"title": "x", "time_minutes": 30, "price": 5, "tags": [{"name": "ok"}, {"name": " "}]}),
        ] {
            app.post("/recipes")
                .add_header("authorization", bearer(&token))
                .json(&body)
                .await
                .assert_status(StatusCode::BAD_REQUEST);
        }

        // nothing half-written, including labels from the rejected tag list
        assert_eq!(count_rows(&state.db, "recipes").await, 0);
        assert_eq!(count_rows(&state.db, "tags").await, 0);
    }

    #[test_log::test(tokio::test)]
    async fn test_partial_update_changes_only_title() {
        let (app, _state) = create_test_app().await;
        let token = register_and_login(&app, "a@example.com").await;

        let before: RecipeDetailResponse = app
            .post("/recipes")
            .add_header("authorization", bearer(&token))
            .json(&json!({
                "title": "cake", "time_minutes": 30, "price": "5.00",
                "link": "https://example.com", "description": "desc",
                "tags": [{"name": "Dessert"}], "ingredients": [{"name": "Sugar"}],
            }))
            .await
            .json();

        let response = app
            .patch(&format!("/recipes/{}", before.recipe.id))
            .add_header("authorization", bearer(&token))
            .json(&json!({"title": "X"}))
            .await;
        response.assert_status_ok();
        let after: RecipeDetailResponse = response.json();

        assert_eq!(after.recipe.title, "X");
        assert_eq!(after.recipe.time_minutes, before.recipe.time_minutes);
        assert_eq!(after.recipe.price, before.recipe.price);
        assert_eq!(after.recipe.link, before.recipe.link);
        assert_eq!(after.description, before.description);
        assert_eq!(after.recipe.tags, before.recipe.tags);
        assert_eq!(after.recipe.ingredients, before.recipe.ingredients);
    }

    #[test_log::test(tokio::test)]
    async fn test_update_with_null_field_is_rejected() {
        let (app, _state) = create_test_app().await;
        let token = register_and_login(&app, "a@example.com").await;

        let created: RecipeDetailResponse = app
            .post("/recipes")
            .add_header("authorization", bearer(&token))
            .json(&json!({"title": "cake", "time_minutes": 30, "price": "5.00"}))
            .await
            .json();
        let path = format!("/recipes/{}", created.recipe.id);

        app.patch(&path)
            .add_header("authorization", bearer(&token))
            .json(&json!({"title": null}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let current: RecipeDetailResponse = app
            .get(&path)
            .add_header("authorization", bearer(&token))
            .await
            .json();
        assert_eq!(current.recipe.title, "cake");
    }

    #[test_log::test(tokio::test)]
    async fn test_update_adds_tags_without_removing() {
        let (app, _state) = create_test_app().await;
        let token = register_and_login(&app, "a@example.com").await;

        let recipe: RecipeDetailResponse = app
            .post("/recipes")
            .add_header("authorization", bearer(&token))
            .json(&json!({"title": "cake", "time_minutes": 30, "price": 5, "tags": [{"name": "Dessert"}]}))
            .await
            .json();

        let updated: RecipeDetailResponse = app
            .patch(&format!("/recipes/{}", recipe.recipe.id))
            .add_header("authorization", bearer(&token))
            .json(&json!({"tags": [{"name": "Party"}]}))
            .await
            .json();

        let names: Vec<_> = updated.recipe.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Dessert", "Party"]);
    }

    #[test_log::test(tokio::test)]
    async fn test_non_owner_cannot_touch_recipe() {
        let (app, _state) = create_test_app().await;
        let alice = register_and_login(&app, "alice@example.com").await;
        let bob = register_and_login(&app, "bob@example.com").await;

        let recipe: RecipeDetailResponse = app
            .post("/recipes")
            .add_header("authorization", bearer(&alice))
            .json(&cake())
            .await
            .json();
        let path = format!("/recipes/{}", recipe.recipe.id);

        app.get(&path).add_header("authorization", bearer(&bob)).await.assert_status(StatusCode::FORBIDDEN);
        app.patch(&path)
            .add_header("authorization", bearer(&bob))
            .json(&json!({"title": "stolen", "tags": [{"name": "bob"}]}))
            .await
            .assert_status(StatusCode::FORBIDDEN);
        app.delete(&path).add_header("authorization", bearer(&bob)).await.assert_status(StatusCode::FORBIDDEN);

        let unchanged: RecipeDetailResponse = app.get(&path).add_header("authorization", bearer(&alice)).await.json();
        assert_eq!(unchanged.recipe.title, "chocolate cake");
        assert!(unchanged.recipe.tags.is_empty());

        // The rejected update created no label for bob either
        let bobs_tags: Vec<LabelResponse> = app.get("/tags").add_header("authorization", bearer(&bob)).await.json();
        assert!(bobs_tags.is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_unknown_recipe_is_404() {
        let (app, _state) = create_test_app().await;
        let token = register_and_login(&app, "a@example.com").await;

        app.get("/recipes/999").add_header("authorization", bearer(&token)).await.assert_status(StatusCode::NOT_FOUND);
        app.patch("/recipes/999")
            .add_header("authorization", bearer(&token))
            .json(&json!({"title": "x"}))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        app.delete("/recipes/999")
            .add_header("authorization", bearer(&token))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[test_log::test(tokio::test)]
    async fn test_delete_recipe_keeps_labels() {
        let (app, state) = create_test_app().await;
        let token = register_and_login(&app, "a@example.com").await;

        let recipe: RecipeDetailResponse = app
            .post("/recipes")
            .add_header("authorization", bearer(&token))
            .json(&json!({"title": "cake", "time_minutes": 30, "price": 5, "tags": [{"name": "Dessert"}]}))
            .await
            .json();

        app.delete(&format!("/recipes/{}", recipe.recipe.id))
            .add_header("authorization", bearer(&token))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        assert_eq!(count_rows(&state.db, "recipes").await, 0);
        assert_eq!(count_rows(&state.db, "recipe_tags").await, 0);
        assert_eq!(count_rows(&state.db, "tags").await, 1);
    }

    #[test_log::test(tokio::test)]
    async fn test_detach_tag_and_ingredient() {
        let (app, state) = create_test_app().await;
        let alice = register_and_login(&app, "alice@example.com").await;
        let bob = register_and_login(&app, "bob@example.com").await;

        let recipe: RecipeDetailResponse = app
            .post("/recipes")
            .add_header("authorization", bearer(&alice))
            .json(&json!({
                "title": "cake", "time_minutes": 30, "price": 5,
                "tags": [{"name": "Dessert"}], "ingredients": [{"name": "Egg"}],
            }))
            .await
            .json();
        let id = recipe.recipe.id;
        let tag_path = format!("/recipes/{id}/tags/{}", recipe.recipe.tags[0].id);
        let ingredient_path = format!("/recipes/{id}/ingredients/{}", recipe.recipe.ingredients[0].id);

        app.delete(&tag_path).add_header("authorization", bearer(&bob)).await.assert_status(StatusCode::FORBIDDEN);

        app.delete(&tag_path).add_header("authorization", bearer(&alice)).await.assert_status(StatusCode::NO_CONTENT);
        app.delete(&tag_path).add_header("authorization", bearer(&alice)).await.assert_status(StatusCode::NOT_FOUND);
        app.delete(&ingredient_path)
            .add_header("authorization", bearer(&alice))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let detail: RecipeDetailResponse = app
            .get(&format!("/recipes/{id}"))
            .add_header("authorization", bearer(&alice))
            .await
            .json();
        assert!(detail.recipe.tags.is_empty());
        assert!(detail.recipe.ingredients.is_empty());

        // the labels survive
        assert_eq!(count_rows(&state.db, "tags").await, 1);
        assert_eq!(count_rows(&state.db, "ingredients").await, 1);
    }
}
