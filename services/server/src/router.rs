use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use tower_http::trace::TraceLayer;

use tavola_core::health::{healthz, readyz};
use tavola_core::middleware::request_id_layer;

use crate::handlers::{
    account::{get_account, login, logout, register, update_account},
    image::upload_image,
    recipe::{
        create_recipe, delete_recipe, discover, get_recipe, list_mine, set_visibility,
        update_recipe,
    },
    recovery::{request_recovery, verify_and_reset},
    search::{ingredient_autocomplete, search_by_ingredients},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Auth
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/session", delete(logout))
        // Password recovery
        .route("/auth/recovery", post(request_recovery))
        .route("/auth/recovery/verify", post(verify_and_reset))
        // Account
        .route("/account", get(get_account))
        .route("/account", patch(update_account))
        // Recipes
        .route("/recipes", post(create_recipe))
        .route("/recipes", get(discover))
        .route("/recipes/mine", get(list_mine))
        .route("/recipes/search-by-ingredients", get(search_by_ingredients))
        .route("/recipes/{recipe_id}", get(get_recipe))
        .route("/recipes/{recipe_id}", patch(update_recipe))
        .route("/recipes/{recipe_id}", delete(delete_recipe))
        .route("/recipes/{recipe_id}/visibility", patch(set_visibility))
        .route("/recipes/{recipe_id}/image", post(upload_image))
        // Ingredients
        .route("/ingredients/search", get(ingredient_autocomplete))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
