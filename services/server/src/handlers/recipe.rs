use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tavola_domain::pagination::PageRequest;
use tavola_domain::visibility::Visibility;
use tavola_session::extract::{MaybeSessionUser, SessionUser};

use crate::domain::types::{IngredientInput, Recipe, RecipeDetail, RecipeSortBy};
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::recipe::{
    CreateRecipeInput, CreateRecipeUseCase, DeleteRecipeUseCase, DiscoverUseCase,
    GetRecipeUseCase, ListMineUseCase, SetVisibilityUseCase, UpdateRecipeInput,
    UpdateRecipeUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct RecipeResponse {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub description: String,
    pub prep_minutes: i32,
    pub visibility: Visibility,
    pub image_url: Option<String>,
    #[serde(serialize_with = "tavola_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "tavola_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Recipe> for RecipeResponse {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id.to_string(),
            author_id: recipe.author_id.to_string(),
            title: recipe.title,
            description: recipe.description,
            prep_minutes: recipe.prep_minutes,
            visibility: recipe.visibility,
            image_url: recipe.image_url,
            created_at: recipe.created_at,
            updated_at: recipe.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct IngredientLineResponse {
    pub name: String,
    pub quantity: String,
    pub position: i32,
}

#[derive(Serialize)]
pub struct StepResponse {
    pub position: i32,
    pub body: String,
}

#[derive(Serialize)]
pub struct RecipeDetailResponse {
    #[serde(flatten)]
    pub recipe: RecipeResponse,
    pub ingredients: Vec<IngredientLineResponse>,
    pub steps: Vec<StepResponse>,
}

impl From<RecipeDetail> for RecipeDetailResponse {
    fn from(detail: RecipeDetail) -> Self {
        Self {
            recipe: RecipeResponse::from(detail.recipe),
            ingredients: detail
                .ingredients
                .into_iter()
                .map(|i| IngredientLineResponse {
                    name: i.name,
                    quantity: i.quantity,
                    position: i.position,
                })
                .collect(),
            steps: detail
                .steps
                .into_iter()
                .map(|s| StepResponse {
                    position: s.position,
                    body: s.body,
                })
                .collect(),
        }
    }
}

// ── Query params ─────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ListQuery {
    pub per_page: Option<u32>,
    pub page: Option<u32>,
    pub sort_by: Option<String>,
}

fn parse_list_query(raw_query: Option<&str>) -> Result<(RecipeSortBy, PageRequest), ApiError> {
    let query: ListQuery = raw_query
        .map(serde_qs::from_str)
        .transpose()
        .map_err(|_| ApiError::Validation {
            field: "page",
            message: "malformed query string".to_owned(),
        })?
        .unwrap_or_default();
    let sort_by = query
        .sort_by
        .as_deref()
        .and_then(RecipeSortBy::from_kebab_case)
        .unwrap_or_default();
    let page = PageRequest {
        per_page: query.per_page.unwrap_or(25),
        page: query.page.unwrap_or(1),
    };
    Ok((sort_by, page))
}

// ── Request bodies ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct IngredientLineRequest {
    pub name: String,
    #[serde(default)]
    pub quantity: String,
}

impl From<IngredientLineRequest> for IngredientInput {
    fn from(line: IngredientLineRequest) -> Self {
        Self {
            name: line.name,
            quantity: line.quantity,
        }
    }
}

#[derive(Deserialize)]
pub struct CreateRecipeRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub prep_minutes: i32,
    pub visibility: Visibility,
    #[serde(default)]
    pub ingredients: Vec<IngredientLineRequest>,
    #[serde(default)]
    pub steps: Vec<String>,
}

// ── POST /recipes ────────────────────────────────────────────────────────────

pub async fn create_recipe(
    session: SessionUser,
    State(state): State<AppState>,
    Json(body): Json<CreateRecipeRequest>,
) -> Result<(StatusCode, Json<RecipeResponse>), ApiError> {
    let usecase = CreateRecipeUseCase {
        recipes: state.recipe_repo(),
        search: state.search_index(),
    };
    let recipe = usecase
        .execute(
            session.user_id,
            CreateRecipeInput {
                title: body.title,
                description: body.description,
                prep_minutes: body.prep_minutes,
                visibility: body.visibility,
                ingredients: body.ingredients.into_iter().map(Into::into).collect(),
                steps: body.steps,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(RecipeResponse::from(recipe))))
}

// ── GET /recipes/{id} ────────────────────────────────────────────────────────

pub async fn get_recipe(
    MaybeSessionUser(session): MaybeSessionUser,
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
) -> Result<Json<RecipeDetailResponse>, ApiError> {
    let usecase = GetRecipeUseCase {
        recipes: state.recipe_repo(),
    };
    let detail = usecase
        .execute(session.map(|s| s.user_id), recipe_id)
        .await?;
    Ok(Json(RecipeDetailResponse::from(detail)))
}

// ── PATCH /recipes/{id} ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateRecipeRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub prep_minutes: Option<i32>,
    pub visibility: Option<Visibility>,
    pub ingredients: Option<Vec<IngredientLineRequest>>,
    pub steps: Option<Vec<String>>,
}

pub async fn update_recipe(
    session: SessionUser,
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
    Json(body): Json<UpdateRecipeRequest>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let usecase = UpdateRecipeUseCase {
        recipes: state.recipe_repo(),
        search: state.search_index(),
    };
    let recipe = usecase
        .execute(
            session.user_id,
            recipe_id,
            UpdateRecipeInput {
                title: body.title,
                description: body.description,
                prep_minutes: body.prep_minutes,
                visibility: body.visibility,
                ingredients: body
                    .ingredients
                    .map(|lines| lines.into_iter().map(Into::into).collect()),
                steps: body.steps,
            },
        )
        .await?;
    Ok(Json(RecipeResponse::from(recipe)))
}

// ── PATCH /recipes/{id}/visibility ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct SetVisibilityRequest {
    pub visibility: Visibility,
}

pub async fn set_visibility(
    session: SessionUser,
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
    Json(body): Json<SetVisibilityRequest>,
) -> Result<StatusCode, ApiError> {
    let usecase = SetVisibilityUseCase {
        recipes: state.recipe_repo(),
        search: state.search_index(),
    };
    usecase
        .execute(session.user_id, recipe_id, body.visibility)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── DELETE /recipes/{id} ─────────────────────────────────────────────────────

pub async fn delete_recipe(
    session: SessionUser,
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let usecase = DeleteRecipeUseCase {
        recipes: state.recipe_repo(),
        search: state.search_index(),
        storage: state.storage(),
    };
    usecase.execute(session.user_id, recipe_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /recipes/mine ────────────────────────────────────────────────────────

pub async fn list_mine(
    session: SessionUser,
    State(state): State<AppState>,
    axum::extract::RawQuery(raw_query): axum::extract::RawQuery,
) -> Result<Json<Vec<RecipeResponse>>, ApiError> {
    let (sort_by, page) = parse_list_query(raw_query.as_deref())?;
    let usecase = ListMineUseCase {
        recipes: state.recipe_repo(),
    };
    let recipes = usecase.execute(session.user_id, sort_by, page).await?;
    Ok(Json(recipes.into_iter().map(RecipeResponse::from).collect()))
}

// ── GET /recipes (discovery) ─────────────────────────────────────────────────

pub async fn discover(
    State(state): State<AppState>,
    axum::extract::RawQuery(raw_query): axum::extract::RawQuery,
) -> Result<Json<Vec<RecipeResponse>>, ApiError> {
    let (sort_by, page) = parse_list_query(raw_query.as_deref())?;
    let usecase = DiscoverUseCase {
        recipes: state.recipe_repo(),
    };
    let recipes = usecase.execute(sort_by, page).await?;
    Ok(Json(recipes.into_iter().map(RecipeResponse::from).collect()))
}
