use tavola_domain::pagination::PageRequest;

use crate::domain::repository::{RecipeRepository, SearchIndex};
use crate::domain::types::Recipe;
use crate::error::ApiError;

/// How many autocomplete suggestions to return.
const AUTOCOMPLETE_LIMIT: usize = 10;

// ── IngredientAutocomplete ───────────────────────────────────────────────────

pub struct IngredientAutocompleteUseCase<S: SearchIndex> {
    pub search: S,
}

impl<S: SearchIndex> IngredientAutocompleteUseCase<S> {
    /// Free-text lookup against the hosted index. UI affordance only; the
    /// relational store stays authoritative for everything else.
    pub async fn execute(&self, query: &str) -> Result<Vec<String>, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.search
            .search_ingredients(query, AUTOCOMPLETE_LIMIT)
            .await
    }
}

// ── SearchByIngredients ──────────────────────────────────────────────────────

pub struct SearchByIngredientsUseCase<R: RecipeRepository> {
    pub recipes: R,
}

impl<R: RecipeRepository> SearchByIngredientsUseCase<R> {
    /// PUBLIC recipes that can be made entirely from `available` ingredients,
    /// biggest first. Names are lowercased before the query.
    pub async fn execute(
        &self,
        available: Vec<String>,
        page: PageRequest,
    ) -> Result<Vec<Recipe>, ApiError> {
        let mut normalized: Vec<String> = available
            .into_iter()
            .map(|n| n.trim().to_lowercase())
            .filter(|n| !n.is_empty())
            .collect();
        normalized.sort();
        normalized.dedup();
        if normalized.is_empty() {
            return Err(ApiError::Validation {
                field: "ingredients",
                message: "list at least one ingredient".to_owned(),
            });
        }
        self.recipes.search_by_ingredients(&normalized, page).await
    }
}
