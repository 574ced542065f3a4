#![allow(async_fn_in_trait)]

use bytes::Bytes;
use uuid::Uuid;

use tavola_domain::pagination::PageRequest;
use tavola_domain::visibility::Visibility;

use crate::domain::types::{
    Credential, IngredientInput, Recipe, RecipeDetail, RecipeDoc, RecipeSortBy, Recovery, User,
};
use crate::error::ApiError;

/// Repository for user profiles and their paired credentials.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;

    /// Insert the user and its credential row atomically (same transaction).
    /// Duplicate username or email fails with `Conflict`.
    async fn create_with_credential(
        &self,
        user: &User,
        password_hash: &str,
    ) -> Result<(), ApiError>;

    async fn update_profile(
        &self,
        id: Uuid,
        display_name: Option<&str>,
        email: Option<&str>,
    ) -> Result<(), ApiError>;
}

/// Repository for login credentials.
pub trait CredentialRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, ApiError>;
    async fn set_password_hash(&self, username: &str, password_hash: &str)
    -> Result<(), ApiError>;
}

/// Repository for password-recovery records. One row per username.
pub trait RecoveryRepository: Send + Sync {
    /// Insert or replace the row for `recovery.username` as a single-row
    /// atomic upsert — a prior un-consumed code is thereby invalidated.
    async fn upsert(&self, recovery: &Recovery) -> Result<(), ApiError>;

    async fn find(&self, username: &str) -> Result<Option<Recovery>, ApiError>;

    /// Delete the row. Returns `true` if one was removed.
    async fn delete(&self, username: &str) -> Result<bool, ApiError>;
}

/// Repository for recipes and their child rows.
pub trait RecipeRepository: Send + Sync {
    /// Insert the recipe, its ingredient lines (get-or-create canonical
    /// ingredients, lowercased) and steps in one transaction.
    async fn create(
        &self,
        recipe: &Recipe,
        ingredients: &[IngredientInput],
        steps: &[String],
    ) -> Result<(), ApiError>;

    async fn find(&self, id: Uuid) -> Result<Option<Recipe>, ApiError>;
    async fn find_detail(&self, id: Uuid) -> Result<Option<RecipeDetail>, ApiError>;

    /// Update scalar fields and, when supplied, replace the full ingredient
    /// and step sets — all in one transaction.
    async fn update(
        &self,
        recipe: &Recipe,
        ingredients: Option<&[IngredientInput]>,
        steps: Option<&[String]>,
    ) -> Result<(), ApiError>;

    async fn set_visibility(&self, id: Uuid, visibility: Visibility) -> Result<(), ApiError>;

    async fn set_image(&self, id: Uuid, image_url: &str, image_key: &str)
    -> Result<(), ApiError>;

    /// Delete ingredient lines, steps and the recipe row in one transaction
    /// (all-or-nothing).
    async fn delete(&self, id: Uuid) -> Result<(), ApiError>;

    async fn list_by_author(
        &self,
        author_id: Uuid,
        sort_by: RecipeSortBy,
        page: PageRequest,
    ) -> Result<Vec<Recipe>, ApiError>;

    /// PUBLIC recipes only.
    async fn list_public(
        &self,
        sort_by: RecipeSortBy,
        page: PageRequest,
    ) -> Result<Vec<Recipe>, ApiError>;

    /// PUBLIC recipes whose every ingredient appears in `available`
    /// (lowercased names), largest ingredient count first.
    async fn search_by_ingredients(
        &self,
        available: &[String],
        page: PageRequest,
    ) -> Result<Vec<Recipe>, ApiError>;
}

/// Transactional mail delivery. Failure is fatal to the calling operation.
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), ApiError>;
}

/// Managed object storage for image blobs.
pub trait ObjectStore: Send + Sync {
    /// Upload and return the public URL of the object.
    async fn upload(
        &self,
        key: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<String, ApiError>;

    async fn delete(&self, key: &str) -> Result<(), ApiError>;
}

/// Image resize/re-encode service. The call carries a fixed timeout;
/// timeout or failure is fatal to the upload.
pub trait ImageTranscoder: Send + Sync {
    async fn transcode(&self, bytes: Bytes) -> Result<Bytes, ApiError>;
}

/// Hosted search index. Not authoritative state — used for autocomplete and
/// discovery ranking only; callers treat write failures as best-effort.
pub trait SearchIndex: Send + Sync {
    async fn upsert_recipe(&self, doc: &RecipeDoc) -> Result<(), ApiError>;
    async fn remove_recipe(&self, id: Uuid) -> Result<(), ApiError>;
    async fn upsert_ingredients(&self, names: &[String]) -> Result<(), ApiError>;
    async fn search_ingredients(&self, query: &str, limit: usize)
    -> Result<Vec<String>, ApiError>;
}
