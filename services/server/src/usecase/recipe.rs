use chrono::Utc;
use uuid::Uuid;

use tavola_domain::pagination::PageRequest;
use tavola_domain::visibility::Visibility;

use crate::domain::authz::{can_mutate, can_read};
use crate::domain::repository::{ObjectStore, RecipeRepository, SearchIndex};
use crate::domain::types::{IngredientInput, Recipe, RecipeDetail, RecipeDoc, RecipeSortBy};
use crate::error::ApiError;

const MAX_TITLE_LEN: usize = 200;

fn validate_title(title: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::Validation {
            field: "title",
            message: "title must not be empty".to_owned(),
        });
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ApiError::Validation {
            field: "title",
            message: format!("title must be at most {MAX_TITLE_LEN} characters"),
        });
    }
    Ok(())
}

fn validate_prep_minutes(prep_minutes: i32) -> Result<(), ApiError> {
    if prep_minutes < 0 {
        return Err(ApiError::Validation {
            field: "prep_minutes",
            message: "prep time cannot be negative".to_owned(),
        });
    }
    Ok(())
}

/// Lowercase and trim ingredient names, drop duplicates (first occurrence
/// wins). Empty names are a field error.
fn normalize_ingredients(lines: Vec<IngredientInput>) -> Result<Vec<IngredientInput>, ApiError> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::with_capacity(lines.len());
    for line in lines {
        let name = line.name.trim().to_lowercase();
        if name.is_empty() {
            return Err(ApiError::Validation {
                field: "ingredients",
                message: "ingredient names must not be empty".to_owned(),
            });
        }
        if seen.insert(name.clone()) {
            out.push(IngredientInput {
                name,
                quantity: line.quantity.trim().to_owned(),
            });
        }
    }
    Ok(out)
}

fn validate_steps(steps: &[String]) -> Result<(), ApiError> {
    if steps.iter().any(|s| s.trim().is_empty()) {
        return Err(ApiError::Validation {
            field: "steps",
            message: "steps must not be empty".to_owned(),
        });
    }
    Ok(())
}

/// Mirror a recipe into (or out of) the search index. The index is not
/// authoritative: failures are logged and swallowed.
async fn sync_index<S: SearchIndex>(search: &S, recipe: &Recipe, ingredients: &[String]) {
    let outcome = if recipe.visibility.is_listed() {
        let doc = RecipeDoc {
            id: recipe.id,
            title: recipe.title.clone(),
            ingredients: ingredients.to_vec(),
        };
        match search.upsert_recipe(&doc).await {
            Ok(()) => search.upsert_ingredients(ingredients).await,
            Err(e) => Err(e),
        }
    } else {
        search.remove_recipe(recipe.id).await
    };
    if let Err(e) = outcome {
        tracing::warn!(recipe_id = %recipe.id, error = %e, "search index sync failed");
    }
}

// ── CreateRecipe ─────────────────────────────────────────────────────────────

pub struct CreateRecipeInput {
    pub title: String,
    pub description: String,
    pub prep_minutes: i32,
    pub visibility: Visibility,
    pub ingredients: Vec<IngredientInput>,
    pub steps: Vec<String>,
}

pub struct CreateRecipeUseCase<R: RecipeRepository, S: SearchIndex> {
    pub recipes: R,
    pub search: S,
}

impl<R: RecipeRepository, S: SearchIndex> CreateRecipeUseCase<R, S> {
    pub async fn execute(
        &self,
        author_id: Uuid,
        input: CreateRecipeInput,
    ) -> Result<Recipe, ApiError> {
        validate_title(&input.title)?;
        validate_prep_minutes(input.prep_minutes)?;
        validate_steps(&input.steps)?;
        let ingredients = normalize_ingredients(input.ingredients)?;

        let now = Utc::now();
        let recipe = Recipe {
            id: Uuid::new_v4(),
            author_id,
            title: input.title.trim().to_owned(),
            description: input.description,
            prep_minutes: input.prep_minutes,
            visibility: input.visibility,
            image_url: None,
            image_key: None,
            created_at: now,
            updated_at: now,
        };

        self.recipes
            .create(&recipe, &ingredients, &input.steps)
            .await?;

        let names: Vec<String> = ingredients.iter().map(|i| i.name.clone()).collect();
        sync_index(&self.search, &recipe, &names).await;

        Ok(recipe)
    }
}

// ── GetRecipe ────────────────────────────────────────────────────────────────

pub struct GetRecipeUseCase<R: RecipeRepository> {
    pub recipes: R,
}

impl<R: RecipeRepository> GetRecipeUseCase<R> {
    /// `viewer` is None for anonymous readers.
    pub async fn execute(
        &self,
        viewer: Option<Uuid>,
        recipe_id: Uuid,
    ) -> Result<RecipeDetail, ApiError> {
        let detail = self
            .recipes
            .find_detail(recipe_id)
            .await?
            .ok_or(ApiError::NotFound)?;
        if !can_read(viewer, &detail.recipe) {
            return Err(ApiError::Forbidden);
        }
        Ok(detail)
    }
}

// ── UpdateRecipe ─────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct UpdateRecipeInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub prep_minutes: Option<i32>,
    pub visibility: Option<Visibility>,
    pub ingredients: Option<Vec<IngredientInput>>,
    pub steps: Option<Vec<String>>,
}

pub struct UpdateRecipeUseCase<R: RecipeRepository, S: SearchIndex> {
    pub recipes: R,
    pub search: S,
}

impl<R: RecipeRepository, S: SearchIndex> UpdateRecipeUseCase<R, S> {
    pub async fn execute(
        &self,
        editor: Uuid,
        recipe_id: Uuid,
        input: UpdateRecipeInput,
    ) -> Result<Recipe, ApiError> {
        let mut recipe = self
            .recipes
            .find(recipe_id)
            .await?
            .ok_or(ApiError::NotFound)?;
        if !can_mutate(editor, &recipe) {
            return Err(ApiError::Forbidden);
        }

        if let Some(title) = input.title {
            validate_title(&title)?;
            recipe.title = title.trim().to_owned();
        }
        if let Some(description) = input.description {
            recipe.description = description;
        }
        if let Some(prep_minutes) = input.prep_minutes {
            validate_prep_minutes(prep_minutes)?;
            recipe.prep_minutes = prep_minutes;
        }
        if let Some(visibility) = input.visibility {
            recipe.visibility = visibility;
        }
        if let Some(ref steps) = input.steps {
            validate_steps(steps)?;
        }
        let ingredients = input.ingredients.map(normalize_ingredients).transpose()?;
        recipe.updated_at = Utc::now();

        self.recipes
            .update(&recipe, ingredients.as_deref(), input.steps.as_deref())
            .await?;

        // Re-read the child rows so the index mirror matches the store.
        let names = match self.recipes.find_detail(recipe_id).await {
            Ok(Some(detail)) => detail.ingredients.into_iter().map(|i| i.name).collect(),
            _ => Vec::new(),
        };
        sync_index(&self.search, &recipe, &names).await;

        Ok(recipe)
    }
}

// ── SetVisibility ────────────────────────────────────────────────────────────

pub struct SetVisibilityUseCase<R: RecipeRepository, S: SearchIndex> {
    pub recipes: R,
    pub search: S,
}

impl<R: RecipeRepository, S: SearchIndex> SetVisibilityUseCase<R, S> {
    pub async fn execute(
        &self,
        editor: Uuid,
        recipe_id: Uuid,
        visibility: Visibility,
    ) -> Result<(), ApiError> {
        let mut recipe = self
            .recipes
            .find(recipe_id)
            .await?
            .ok_or(ApiError::NotFound)?;
        if !can_mutate(editor, &recipe) {
            return Err(ApiError::Forbidden);
        }

        self.recipes.set_visibility(recipe_id, visibility).await?;

        recipe.visibility = visibility;
        let names = match self.recipes.find_detail(recipe_id).await {
            Ok(Some(detail)) => detail.ingredients.into_iter().map(|i| i.name).collect(),
            _ => Vec::new(),
        };
        sync_index(&self.search, &recipe, &names).await;
        Ok(())
    }
}

// ── DeleteRecipe ─────────────────────────────────────────────────────────────

pub struct DeleteRecipeUseCase<R: RecipeRepository, S: SearchIndex, O: ObjectStore> {
    pub recipes: R,
    pub search: S,
    pub storage: O,
}

impl<R: RecipeRepository, S: SearchIndex, O: ObjectStore> DeleteRecipeUseCase<R, S, O> {
    pub async fn execute(&self, editor: Uuid, recipe_id: Uuid) -> Result<(), ApiError> {
        let recipe = self
            .recipes
            .find(recipe_id)
            .await?
            .ok_or(ApiError::NotFound)?;
        if !can_mutate(editor, &recipe) {
            return Err(ApiError::Forbidden);
        }

        // Child rows and the recipe go in one transaction; the image object
        // and index document are external cleanup, best-effort afterwards.
        self.recipes.delete(recipe_id).await?;

        if let Some(ref key) = recipe.image_key {
            if let Err(e) = self.storage.delete(key).await {
                tracing::warn!(recipe_id = %recipe_id, error = %e, "orphaned image object");
            }
        }
        if let Err(e) = self.search.remove_recipe(recipe_id).await {
            tracing::warn!(recipe_id = %recipe_id, error = %e, "search index sync failed");
        }
        Ok(())
    }
}

// ── ListMine / Discover ──────────────────────────────────────────────────────

pub struct ListMineUseCase<R: RecipeRepository> {
    pub recipes: R,
}

impl<R: RecipeRepository> ListMineUseCase<R> {
    pub async fn execute(
        &self,
        author_id: Uuid,
        sort_by: RecipeSortBy,
        page: PageRequest,
    ) -> Result<Vec<Recipe>, ApiError> {
        self.recipes.list_by_author(author_id, sort_by, page).await
    }
}

pub struct DiscoverUseCase<R: RecipeRepository> {
    pub recipes: R,
}

impl<R: RecipeRepository> DiscoverUseCase<R> {
    pub async fn execute(
        &self,
        sort_by: RecipeSortBy,
        page: PageRequest,
    ) -> Result<Vec<Recipe>, ApiError> {
        self.recipes.list_public(sort_by, page).await
    }
}
