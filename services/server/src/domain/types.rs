use chrono::{DateTime, Utc};
use uuid::Uuid;

use tavola_domain::pagination::Sort;
use tavola_domain::visibility::Visibility;

/// User profile. The password hash lives in [`Credential`]; the two rows are
/// created together at registration.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Login credential, keyed by username.
#[derive(Debug, Clone)]
pub struct Credential {
    pub username: String,
    pub password_hash: String,
    pub updated_at: DateTime<Utc>,
}

/// Active password-recovery record for a user. At most one exists per
/// username; a new request overwrites it. Holds only the hash of the
/// one-time code, never the plaintext.
#[derive(Debug, Clone)]
pub struct Recovery {
    pub username: String,
    pub code_hash: String,
    pub updated_at: DateTime<Utc>,
}

impl Recovery {
    /// Whether the code's validity window has elapsed.
    pub fn is_expired(&self) -> bool {
        Utc::now() - self.updated_at > chrono::Duration::seconds(RECOVERY_TTL_SECS)
    }
}

/// What RequestRecovery hands back for the verify page: never the code or the
/// full email, only the username and a masked echo of the address.
#[derive(Debug, Clone)]
pub struct RecoveryReceipt {
    pub username: String,
    pub masked_email: String,
}

/// Recovery code length in characters.
pub const RECOVERY_CODE_LEN: usize = 6;

/// Recovery code time-to-live in seconds (15 minutes).
pub const RECOVERY_TTL_SECS: i64 = 900;

/// Recipe header row. Ingredient lines and steps are loaded separately into a
/// [`RecipeDetail`].
#[derive(Debug, Clone)]
pub struct Recipe {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub description: String,
    pub prep_minutes: i32,
    pub visibility: Visibility,
    pub image_url: Option<String>,
    pub image_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One ingredient line of a recipe, joined with its canonical name.
#[derive(Debug, Clone)]
pub struct RecipeIngredient {
    pub name: String,
    pub quantity: String,
    pub position: i32,
}

/// One ordered preparation step.
#[derive(Debug, Clone)]
pub struct RecipeStep {
    pub position: i32,
    pub body: String,
}

/// A recipe with its child rows.
#[derive(Debug, Clone)]
pub struct RecipeDetail {
    pub recipe: Recipe,
    pub ingredients: Vec<RecipeIngredient>,
    pub steps: Vec<RecipeStep>,
}

/// Ingredient line as submitted by a client. Names are lowercased before
/// they reach the store; positions follow submission order.
#[derive(Debug, Clone)]
pub struct IngredientInput {
    pub name: String,
    pub quantity: String,
}

/// Search-index document mirrored for PUBLIC recipes.
#[derive(Debug, Clone)]
pub struct RecipeDoc {
    pub id: Uuid,
    pub title: String,
    pub ingredients: Vec<String>,
}

/// Sort options for recipe list queries.
#[derive(Debug, Clone, Copy)]
pub enum RecipeSortBy {
    CreatedAt(Sort),
}

impl Default for RecipeSortBy {
    fn default() -> Self {
        Self::CreatedAt(Sort::Desc)
    }
}

impl RecipeSortBy {
    pub fn from_kebab_case(s: &str) -> Option<Self> {
        match s {
            "created-at-desc" => Some(Self::CreatedAt(Sort::Desc)),
            "created-at-asc" => Some(Self::CreatedAt(Sort::Asc)),
            _ => None,
        }
    }
}
