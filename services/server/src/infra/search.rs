//! Meilisearch mirror for recipe and ingredient lookup.
//!
//! The index backs UI autocomplete and discovery search only; the relational
//! store stays authoritative. Documents are mirrored on recipe writes and the
//! mirror is allowed to lag or fail without failing the write.

use std::sync::Arc;

use anyhow::anyhow;
use meilisearch_sdk::client::Client;
use meilisearch_sdk::settings::Settings;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::repository::SearchIndex;
use crate::domain::types::RecipeDoc;
use crate::error::ApiError;

pub const RECIPE_INDEX: &str = "recipes";
pub const INGREDIENT_INDEX: &str = "ingredients";

#[derive(Serialize, Deserialize)]
struct MeiliRecipe {
    id: String,
    title: String,
    ingredients: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct MeiliIngredient {
    id: String,
    name: String,
}

/// Meilisearch document ids only allow `[a-zA-Z0-9_-]`; ingredient names are
/// free text, so derive the id by squashing everything else to '-'.
fn ingredient_doc_id(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

/// Configure index settings at startup: search recipes by title and
/// ingredient names, ingredients by name (typo-tolerant defaults).
pub async fn init_indexes(client: &Client) -> Result<(), ApiError> {
    client
        .index(RECIPE_INDEX)
        .set_settings(&Settings::new().with_searchable_attributes(["title", "ingredients"]))
        .await
        .map_err(|e| ApiError::Service(anyhow!("init recipe index: {e}")))?;
    client
        .index(INGREDIENT_INDEX)
        .set_settings(&Settings::new().with_searchable_attributes(["name"]))
        .await
        .map_err(|e| ApiError::Service(anyhow!("init ingredient index: {e}")))?;
    Ok(())
}

#[derive(Clone)]
pub struct MeiliSearchIndex {
    pub client: Arc<Client>,
}

impl SearchIndex for MeiliSearchIndex {
    async fn upsert_recipe(&self, doc: &RecipeDoc) -> Result<(), ApiError> {
        let docs = [MeiliRecipe {
            id: doc.id.to_string(),
            title: doc.title.clone(),
            ingredients: doc.ingredients.clone(),
        }];
        self.client
            .index(RECIPE_INDEX)
            .add_or_update(&docs, Some("id"))
            .await
            .map_err(|e| ApiError::Service(anyhow!("upsert recipe doc: {e}")))?;
        Ok(())
    }

    async fn remove_recipe(&self, id: Uuid) -> Result<(), ApiError> {
        self.client
            .index(RECIPE_INDEX)
            .delete_document(id.to_string())
            .await
            .map_err(|e| ApiError::Service(anyhow!("remove recipe doc: {e}")))?;
        Ok(())
    }

    async fn upsert_ingredients(&self, names: &[String]) -> Result<(), ApiError> {
        if names.is_empty() {
            return Ok(());
        }
        let docs: Vec<MeiliIngredient> = names
            .iter()
            .map(|name| MeiliIngredient {
                id: ingredient_doc_id(name),
                name: name.clone(),
            })
            .collect();
        self.client
            .index(INGREDIENT_INDEX)
            .add_or_update(&docs, Some("id"))
            .await
            .map_err(|e| ApiError::Service(anyhow!("upsert ingredient docs: {e}")))?;
        Ok(())
    }

    async fn search_ingredients(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<String>, ApiError> {
        let results = self
            .client
            .index(INGREDIENT_INDEX)
            .search()
            .with_query(query)
            .with_limit(limit)
            .execute::<MeiliIngredient>()
            .await
            .map_err(|e| ApiError::Service(anyhow!("ingredient search: {e}")))?;
        Ok(results.hits.into_iter().map(|h| h.result.name).collect())
    }
}
