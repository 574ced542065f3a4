use axum::{Json, extract::State};
use serde::Deserialize;

use tavola_domain::pagination::PageRequest;

use crate::error::ApiError;
use crate::handlers::recipe::RecipeResponse;
use crate::state::AppState;
use crate::usecase::search::{IngredientAutocompleteUseCase, SearchByIngredientsUseCase};

// ── GET /ingredients/search ──────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct AutocompleteQuery {
    #[serde(default)]
    pub q: String,
}

pub async fn ingredient_autocomplete(
    State(state): State<AppState>,
    axum::extract::RawQuery(raw_query): axum::extract::RawQuery,
) -> Result<Json<Vec<String>>, ApiError> {
    let query: AutocompleteQuery = raw_query
        .as_deref()
        .map(serde_qs::from_str)
        .transpose()
        .map_err(|_| ApiError::Validation {
            field: "q",
            message: "malformed query string".to_owned(),
        })?
        .unwrap_or_default();

    let usecase = IngredientAutocompleteUseCase {
        search: state.search_index(),
    };
    let names = usecase.execute(&query.q).await?;
    Ok(Json(names))
}

// ── GET /recipes/search-by-ingredients ───────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct SearchByIngredientsQuery {
    #[serde(default)]
    pub ingredients: Vec<String>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

pub async fn search_by_ingredients(
    State(state): State<AppState>,
    axum::extract::RawQuery(raw_query): axum::extract::RawQuery,
) -> Result<Json<Vec<RecipeResponse>>, ApiError> {
    let query: SearchByIngredientsQuery = raw_query
        .as_deref()
        .map(serde_qs::from_str)
        .transpose()
        .map_err(|_| ApiError::Validation {
            field: "ingredients",
            message: "malformed query string".to_owned(),
        })?
        .unwrap_or_default();

    let page = PageRequest {
        per_page: query.per_page.unwrap_or(25),
        page: query.page.unwrap_or(1),
    };

    let usecase = SearchByIngredientsUseCase {
        recipes: state.recipe_repo(),
    };
    let recipes = usecase.execute(query.ingredients, page).await?;
    Ok(Json(recipes.into_iter().map(RecipeResponse::from).collect()))
}
