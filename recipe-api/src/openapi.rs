//! OpenAPI document for the HTTP API, served as JSON at `/openapi.json` and rendered with Scalar
//! at `/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "BearerAuth".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Session token from `POST /user/login`, sent in the `Authorization` header:\n\n\
                            ```\nAuthorization: Bearer YOUR_TOKEN\n```",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Recipe API", description = "Per-user recipes, tags and ingredients"),
    modifiers(&SecurityAddon),
    paths(
        api::handlers::users::register,
        api::handlers::users::login,
        api::handlers::users::get_me,
        api::handlers::users::update_me,
        api::handlers::recipes::list_recipes,
        api::handlers::recipes::create_recipe,
        api::handlers::recipes::get_recipe,
        api::handlers::recipes::update_recipe,
        api::handlers::recipes::delete_recipe,
        api::handlers::recipes::detach_tag,
        api::handlers::recipes::detach_ingredient,
        api::handlers::tags::list_tags,
        api::handlers::tags::create_tag,
        api::handlers::tags::get_tag,
        api::handlers::tags::update_tag,
        api::handlers::tags::delete_tag,
        api::handlers::ingredients::list_ingredients,
        api::handlers::ingredients::create_ingredient,
        api::handlers::ingredients::get_ingredient,
        api::handlers::ingredients::update_ingredient,
        api::handlers::ingredients::delete_ingredient,
    ),
    components(
        schemas(
            api::models::users::RegisterRequest,
            api::models::users::LoginRequest,
            api::models::users::TokenResponse,
            api::models::users::ProfileUpdate,
            api::models::users::UserResponse,
            api::models::labels::LabelCreate,
            api::models::labels::LabelDescriptor,
            api::models::labels::LabelResponse,
            api::models::recipes::RecipeCreate,
            api::models::recipes::RecipeUpdate,
            api::models::recipes::RecipeResponse,
            api::models::recipes::RecipeDetailResponse,
        )
    ),
    tags(
        (name = "user", description = "Registration, login and the signed-in user's profile"),
        (name = "recipes", description = "Recipes. Tags and ingredients are given by name and resolved to the caller's own labels."),
        (name = "tags", description = "The caller's tags"),
        (name = "ingredients", description = "The caller's ingredients"),
    )
)]
pub struct ApiDoc;
