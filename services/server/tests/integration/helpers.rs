use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;

use tavola_domain::pagination::PageRequest;
use tavola_domain::visibility::Visibility;

use tavola_server::domain::repository::{
    CredentialRepository, ImageTranscoder, Mailer, ObjectStore, RecipeRepository,
    RecoveryRepository, SearchIndex, UserRepository,
};
use tavola_domain::pagination::Sort;
use tavola_server::domain::types::{
    Credential, IngredientInput, Recipe, RecipeDetail, RecipeDoc, RecipeIngredient, RecipeSortBy,
    RecipeStep, Recovery, User,
};
use tavola_server::error::ApiError;

// ── MockUserRepo ─────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockUserRepo {
    pub users: Arc<Mutex<Vec<User>>>,
    pub credentials: Arc<Mutex<HashMap<String, Credential>>>,
}

impl MockUserRepo {
    pub fn empty() -> Self {
        Self {
            users: Arc::new(Mutex::new(vec![])),
            credentials: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
            credentials: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl UserRepository for MockUserRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create_with_credential(
        &self,
        user: &User,
        password_hash: &str,
    ) -> Result<(), ApiError> {
        self.users.lock().unwrap().push(user.clone());
        self.credentials.lock().unwrap().insert(
            user.username.clone(),
            Credential {
                username: user.username.clone(),
                password_hash: password_hash.to_owned(),
                updated_at: user.created_at,
            },
        );
        Ok(())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        display_name: Option<&str>,
        email: Option<&str>,
    ) -> Result<(), ApiError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            if let Some(new_display_name) = display_name {
                user.display_name = new_display_name.to_owned();
            }
            if let Some(new_email) = email {
                user.email = new_email.to_owned();
            }
            user.updated_at = Utc::now();
        }
        Ok(())
    }
}

// ── MockCredentialRepo ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockCredentialRepo {
    pub credentials: Arc<Mutex<HashMap<String, Credential>>>,
}

impl CredentialRepository for MockCredentialRepo {
    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, ApiError> {
        Ok(self.credentials.lock().unwrap().get(username).cloned())
    }

    async fn set_password_hash(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<(), ApiError> {
        self.credentials.lock().unwrap().insert(
            username.to_owned(),
            Credential {
                username: username.to_owned(),
                password_hash: password_hash.to_owned(),
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }
}

// ── MockRecoveryRepo ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockRecoveryRepo {
    pub rows: Arc<Mutex<HashMap<String, Recovery>>>,
}

impl MockRecoveryRepo {
    pub fn empty() -> Self {
        Self {
            rows: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl RecoveryRepository for MockRecoveryRepo {
    async fn upsert(&self, recovery: &Recovery) -> Result<(), ApiError> {
        self.rows
            .lock()
            .unwrap()
            .insert(recovery.username.clone(), recovery.clone());
        Ok(())
    }

    async fn find(&self, username: &str) -> Result<Option<Recovery>, ApiError> {
        Ok(self.rows.lock().unwrap().get(username).cloned())
    }

    async fn delete(&self, username: &str) -> Result<bool, ApiError> {
        Ok(self.rows.lock().unwrap().remove(username).is_some())
    }
}

// ── MockMailer ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Clone)]
pub struct MockMailer {
    pub sent: Arc<Mutex<Vec<SentMail>>>,
    pub fail: bool,
}

impl MockMailer {
    pub fn working() -> Self {
        Self {
            sent: Arc::new(Mutex::new(vec![])),
            fail: false,
        }
    }

    pub fn broken() -> Self {
        Self {
            sent: Arc::new(Mutex::new(vec![])),
            fail: true,
        }
    }

    /// Pull the recovery code out of the most recent mail body.
    pub fn last_code(&self) -> String {
        let sent = self.sent.lock().unwrap();
        let body = &sent.last().expect("no mail sent").body;
        let start = body.find("code is ").expect("no code in body") + "code is ".len();
        body[start..start + 6].to_owned()
    }
}

impl Mailer for MockMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), ApiError> {
        if self.fail {
            return Err(ApiError::Service(anyhow::anyhow!("mail provider down")));
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_owned(),
            subject: subject.to_owned(),
            body: body.to_owned(),
        });
        Ok(())
    }
}

// ── MockRecipeRepo ───────────────────────────────────────────────────────────

type Children = (Vec<IngredientInput>, Vec<String>);

#[derive(Clone)]
pub struct MockRecipeRepo {
    pub recipes: Arc<Mutex<Vec<Recipe>>>,
    pub children: Arc<Mutex<HashMap<Uuid, Children>>>,
    /// Simulates a transaction abort: `delete` fails and removes nothing.
    pub fail_delete: bool,
}

impl MockRecipeRepo {
    pub fn empty() -> Self {
        Self {
            recipes: Arc::new(Mutex::new(vec![])),
            children: Arc::new(Mutex::new(HashMap::new())),
            fail_delete: false,
        }
    }

    pub fn failing_delete(other: &Self) -> Self {
        Self {
            recipes: Arc::clone(&other.recipes),
            children: Arc::clone(&other.children),
            fail_delete: true,
        }
    }
}

impl RecipeRepository for MockRecipeRepo {
    async fn create(
        &self,
        recipe: &Recipe,
        ingredients: &[IngredientInput],
        steps: &[String],
    ) -> Result<(), ApiError> {
        self.recipes.lock().unwrap().push(recipe.clone());
        self.children
            .lock()
            .unwrap()
            .insert(recipe.id, (ingredients.to_vec(), steps.to_vec()));
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Recipe>, ApiError> {
        Ok(self
            .recipes
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<RecipeDetail>, ApiError> {
        let Some(recipe) = self.find(id).await? else {
            return Ok(None);
        };
        let children = self.children.lock().unwrap();
        let (lines, steps) = children.get(&id).cloned().unwrap_or_default();
        Ok(Some(RecipeDetail {
            recipe,
            ingredients: lines
                .into_iter()
                .enumerate()
                .map(|(i, line)| RecipeIngredient {
                    name: line.name,
                    quantity: line.quantity,
                    position: i as i32,
                })
                .collect(),
            steps: steps
                .into_iter()
                .enumerate()
                .map(|(i, body)| RecipeStep {
                    position: i as i32,
                    body,
                })
                .collect(),
        }))
    }

    async fn update(
        &self,
        recipe: &Recipe,
        ingredients: Option<&[IngredientInput]>,
        steps: Option<&[String]>,
    ) -> Result<(), ApiError> {
        let mut recipes = self.recipes.lock().unwrap();
        if let Some(existing) = recipes.iter_mut().find(|r| r.id == recipe.id) {
            *existing = recipe.clone();
        }
        let mut children = self.children.lock().unwrap();
        let entry = children.entry(recipe.id).or_default();
        if let Some(lines) = ingredients {
            entry.0 = lines.to_vec();
        }
        if let Some(steps) = steps {
            entry.1 = steps.to_vec();
        }
        Ok(())
    }

    async fn set_visibility(&self, id: Uuid, visibility: Visibility) -> Result<(), ApiError> {
        let mut recipes = self.recipes.lock().unwrap();
        if let Some(recipe) = recipes.iter_mut().find(|r| r.id == id) {
            recipe.visibility = visibility;
            recipe.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn set_image(&self, id: Uuid, image_url: &str, image_key: &str) -> Result<(), ApiError> {
        let mut recipes = self.recipes.lock().unwrap();
        if let Some(recipe) = recipes.iter_mut().find(|r| r.id == id) {
            recipe.image_url = Some(image_url.to_owned());
            recipe.image_key = Some(image_key.to_owned());
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        if self.fail_delete {
            // All-or-nothing: the aborted transaction leaves every row in place.
            return Err(ApiError::Internal(anyhow::anyhow!(
                "transaction aborted mid-delete"
            )));
        }
        self.recipes.lock().unwrap().retain(|r| r.id != id);
        self.children.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn list_by_author(
        &self,
        author_id: Uuid,
        sort_by: RecipeSortBy,
        page: PageRequest,
    ) -> Result<Vec<Recipe>, ApiError> {
        let PageRequest { per_page, page } = page.clamped();
        let mut recipes: Vec<Recipe> = self
            .recipes
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.author_id == author_id)
            .cloned()
            .collect();
        sort_recipes(&mut recipes, sort_by);
        Ok(paged(recipes, per_page, page))
    }

    async fn list_public(
        &self,
        sort_by: RecipeSortBy,
        page: PageRequest,
    ) -> Result<Vec<Recipe>, ApiError> {
        let PageRequest { per_page, page } = page.clamped();
        let mut recipes: Vec<Recipe> = self
            .recipes
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.visibility == Visibility::Public)
            .cloned()
            .collect();
        sort_recipes(&mut recipes, sort_by);
        Ok(paged(recipes, per_page, page))
    }

    async fn search_by_ingredients(
        &self,
        available: &[String],
        page: PageRequest,
    ) -> Result<Vec<Recipe>, ApiError> {
        let PageRequest { per_page, page } = page.clamped();
        let children = self.children.lock().unwrap();
        let mut matches: Vec<(usize, Recipe)> = self
            .recipes
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.visibility == Visibility::Public)
            .filter_map(|r| {
                let (lines, _) = children.get(&r.id)?;
                if lines.is_empty() {
                    return None;
                }
                lines
                    .iter()
                    .all(|line| available.contains(&line.name))
                    .then(|| (lines.len(), r.clone()))
            })
            .collect();
        matches.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.created_at.cmp(&a.1.created_at)));
        Ok(paged(
            matches.into_iter().map(|(_, r)| r).collect(),
            per_page,
            page,
        ))
    }
}

fn sort_recipes(recipes: &mut [Recipe], sort_by: RecipeSortBy) {
    match sort_by {
        RecipeSortBy::CreatedAt(Sort::Desc) => {
            recipes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
        RecipeSortBy::CreatedAt(Sort::Asc) => {
            recipes.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        }
    }
}

fn paged(items: Vec<Recipe>, per_page: u32, page: u32) -> Vec<Recipe> {
    items
        .into_iter()
        .skip(((page - 1) * per_page) as usize)
        .take(per_page as usize)
        .collect()
}

// ── MockSearchIndex ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockSearchIndex {
    pub docs: Arc<Mutex<HashMap<Uuid, RecipeDoc>>>,
    pub ingredients: Arc<Mutex<Vec<String>>>,
}

impl MockSearchIndex {
    pub fn empty() -> Self {
        Self {
            docs: Arc::new(Mutex::new(HashMap::new())),
            ingredients: Arc::new(Mutex::new(vec![])),
        }
    }
}

impl SearchIndex for MockSearchIndex {
    async fn upsert_recipe(&self, doc: &RecipeDoc) -> Result<(), ApiError> {
        self.docs.lock().unwrap().insert(doc.id, doc.clone());
        Ok(())
    }

    async fn remove_recipe(&self, id: Uuid) -> Result<(), ApiError> {
        self.docs.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn upsert_ingredients(&self, names: &[String]) -> Result<(), ApiError> {
        let mut ingredients = self.ingredients.lock().unwrap();
        for name in names {
            if !ingredients.contains(name) {
                ingredients.push(name.clone());
            }
        }
        Ok(())
    }

    async fn search_ingredients(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<String>, ApiError> {
        Ok(self
            .ingredients
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.contains(query))
            .take(limit)
            .cloned()
            .collect())
    }
}

// ── MockStore / MockTranscoder ───────────────────────────────────────────────

#[derive(Clone)]
pub struct MockStore {
    pub objects: Arc<Mutex<HashMap<String, Bytes>>>,
}

impl MockStore {
    pub fn empty() -> Self {
        Self {
            objects: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl ObjectStore for MockStore {
    async fn upload(
        &self,
        key: &str,
        _content_type: &str,
        bytes: Bytes,
    ) -> Result<String, ApiError> {
        self.objects.lock().unwrap().insert(key.to_owned(), bytes);
        Ok(format!("https://cdn.test/{key}"))
    }

    async fn delete(&self, key: &str) -> Result<(), ApiError> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}

#[derive(Clone)]
pub struct MockTranscoder;

impl ImageTranscoder for MockTranscoder {
    async fn transcode(&self, bytes: Bytes) -> Result<Bytes, ApiError> {
        Ok(bytes)
    }
}

// ── Test fixture helpers ─────────────────────────────────────────────────────

pub fn test_user(username: &str, email: &str) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        username: username.to_owned(),
        email: email.to_owned(),
        display_name: username.to_owned(),
        created_at: now,
        updated_at: now,
    }
}
