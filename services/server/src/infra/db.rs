use anyhow::{Context as _, anyhow};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait as _, DatabaseConnection,
    DatabaseTransaction, EntityTrait, FromQueryResult as _, QueryFilter, QueryOrder, QuerySelect,
    Statement, TransactionTrait, sea_query::OnConflict,
};
use uuid::Uuid;

use tavola_domain::pagination::{PageRequest, Sort};
use tavola_domain::visibility::Visibility;
use tavola_schema::{
    credentials, ingredients, recipe_ingredients, recipe_steps, recipes, recoveries, users,
};

use crate::domain::repository::{
    CredentialRepository, RecipeRepository, RecoveryRepository, UserRepository,
};
use crate::domain::types::{
    Credential, IngredientInput, Recipe, RecipeDetail, RecipeIngredient, RecipeSortBy, RecipeStep,
    Recovery, User,
};
use crate::error::ApiError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
            .context("find user by username")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn create_with_credential(
        &self,
        user: &User,
        password_hash: &str,
    ) -> Result<(), ApiError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let user = user.clone();
                let password_hash = password_hash.to_owned();
                Box::pin(async move {
                    users::ActiveModel {
                        id: Set(user.id),
                        username: Set(user.username.clone()),
                        email: Set(user.email.clone()),
                        display_name: Set(user.display_name.clone()),
                        created_at: Set(user.created_at),
                        updated_at: Set(user.updated_at),
                    }
                    .insert(txn)
                    .await?;

                    credentials::ActiveModel {
                        username: Set(user.username),
                        password_hash: Set(password_hash),
                        updated_at: Set(user.created_at),
                    }
                    .insert(txn)
                    .await?;
                    Ok(())
                })
            })
            .await
            .context("create user with credential")?;
        Ok(())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        display_name: Option<&str>,
        email: Option<&str>,
    ) -> Result<(), ApiError> {
        let mut am = users::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(new_display_name) = display_name {
            am.display_name = Set(new_display_name.to_owned());
        }
        if let Some(new_email) = email {
            am.email = Set(new_email.to_owned());
        }
        am.updated_at = Set(Utc::now());
        am.update(&self.db).await.context("update user profile")?;
        Ok(())
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        username: model.username,
        email: model.email,
        display_name: model.display_name,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Credential repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCredentialRepository {
    pub db: DatabaseConnection,
}

impl CredentialRepository for DbCredentialRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, ApiError> {
        let model = credentials::Entity::find_by_id(username.to_owned())
            .one(&self.db)
            .await
            .context("find credential")?;
        Ok(model.map(|m| Credential {
            username: m.username,
            password_hash: m.password_hash,
            updated_at: m.updated_at,
        }))
    }

    async fn set_password_hash(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<(), ApiError> {
        credentials::ActiveModel {
            username: Set(username.to_owned()),
            password_hash: Set(password_hash.to_owned()),
            updated_at: Set(Utc::now()),
        }
        .update(&self.db)
        .await
        .context("set password hash")?;
        Ok(())
    }
}

// ── Recovery repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRecoveryRepository {
    pub db: DatabaseConnection,
}

impl RecoveryRepository for DbRecoveryRepository {
    async fn upsert(&self, recovery: &Recovery) -> Result<(), ApiError> {
        // Single-row atomic upsert keyed by username — replaces any prior
        // code without a read-modify-write window.
        let row = recoveries::ActiveModel {
            username: Set(recovery.username.clone()),
            code_hash: Set(recovery.code_hash.clone()),
            updated_at: Set(recovery.updated_at),
        };
        recoveries::Entity::insert(row)
            .on_conflict(
                OnConflict::column(recoveries::Column::Username)
                    .update_columns([
                        recoveries::Column::CodeHash,
                        recoveries::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("upsert recovery")?;
        Ok(())
    }

    async fn find(&self, username: &str) -> Result<Option<Recovery>, ApiError> {
        let model = recoveries::Entity::find_by_id(username.to_owned())
            .one(&self.db)
            .await
            .context("find recovery")?;
        Ok(model.map(|m| Recovery {
            username: m.username,
            code_hash: m.code_hash,
            updated_at: m.updated_at,
        }))
    }

    async fn delete(&self, username: &str) -> Result<bool, ApiError> {
        let result = recoveries::Entity::delete_many()
            .filter(recoveries::Column::Username.eq(username))
            .exec(&self.db)
            .await
            .context("delete recovery")?;
        Ok(result.rows_affected > 0)
    }
}

// ── Recipe repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRecipeRepository {
    pub db: DatabaseConnection,
}

impl RecipeRepository for DbRecipeRepository {
    async fn create(
        &self,
        recipe: &Recipe,
        ingredient_lines: &[IngredientInput],
        steps: &[String],
    ) -> Result<(), ApiError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let recipe = recipe.clone();
                let ingredient_lines = ingredient_lines.to_vec();
                let steps = steps.to_vec();
                Box::pin(async move {
                    insert_recipe_row(txn, &recipe).await?;
                    insert_children(txn, recipe.id, &ingredient_lines, &steps).await?;
                    Ok(())
                })
            })
            .await
            .context("create recipe")?;
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Recipe>, ApiError> {
        let model = recipes::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find recipe")?;
        model.map(recipe_from_model).transpose()
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<RecipeDetail>, ApiError> {
        let Some(model) = recipes::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find recipe")?
        else {
            return Ok(None);
        };
        let recipe = recipe_from_model(model)?;

        let lines = recipe_ingredients::Entity::find()
            .filter(recipe_ingredients::Column::RecipeId.eq(id))
            .order_by_asc(recipe_ingredients::Column::Position)
            .all(&self.db)
            .await
            .context("list recipe ingredient lines")?;
        let ingredient_ids: Vec<Uuid> = lines.iter().map(|l| l.ingredient_id).collect();
        let names: std::collections::HashMap<Uuid, String> = ingredients::Entity::find()
            .filter(ingredients::Column::Id.is_in(ingredient_ids))
            .all(&self.db)
            .await
            .context("list ingredients by ids")?
            .into_iter()
            .map(|m| (m.id, m.name))
            .collect();
        let ingredients = lines
            .into_iter()
            .map(|line| RecipeIngredient {
                name: names.get(&line.ingredient_id).cloned().unwrap_or_default(),
                quantity: line.quantity,
                position: line.position,
            })
            .collect();

        let steps = recipe_steps::Entity::find()
            .filter(recipe_steps::Column::RecipeId.eq(id))
            .order_by_asc(recipe_steps::Column::Position)
            .all(&self.db)
            .await
            .context("list recipe steps")?
            .into_iter()
            .map(|m| RecipeStep {
                position: m.position,
                body: m.body,
            })
            .collect();

        Ok(Some(RecipeDetail {
            recipe,
            ingredients,
            steps,
        }))
    }

    async fn update(
        &self,
        recipe: &Recipe,
        ingredient_lines: Option<&[IngredientInput]>,
        steps: Option<&[String]>,
    ) -> Result<(), ApiError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let recipe = recipe.clone();
                let ingredient_lines = ingredient_lines.map(<[IngredientInput]>::to_vec);
                let steps = steps.map(<[String]>::to_vec);
                Box::pin(async move {
                    recipes::ActiveModel {
                        id: Set(recipe.id),
                        author_id: Set(recipe.author_id),
                        title: Set(recipe.title.clone()),
                        description: Set(recipe.description.clone()),
                        prep_minutes: Set(recipe.prep_minutes),
                        visibility: Set(recipe.visibility.as_str().to_owned()),
                        image_url: Set(recipe.image_url.clone()),
                        image_key: Set(recipe.image_key.clone()),
                        created_at: Set(recipe.created_at),
                        updated_at: Set(recipe.updated_at),
                    }
                    .update(txn)
                    .await?;

                    // Replacing a child set means delete + re-insert inside
                    // the same transaction.
                    if let Some(ref lines) = ingredient_lines {
                        recipe_ingredients::Entity::delete_many()
                            .filter(recipe_ingredients::Column::RecipeId.eq(recipe.id))
                            .exec(txn)
                            .await?;
                        insert_ingredient_lines(txn, recipe.id, lines).await?;
                    }
                    if let Some(ref steps) = steps {
                        recipe_steps::Entity::delete_many()
                            .filter(recipe_steps::Column::RecipeId.eq(recipe.id))
                            .exec(txn)
                            .await?;
                        insert_steps(txn, recipe.id, steps).await?;
                    }
                    Ok(())
                })
            })
            .await
            .context("update recipe")?;
        Ok(())
    }

    async fn set_visibility(&self, id: Uuid, visibility: Visibility) -> Result<(), ApiError> {
        recipes::ActiveModel {
            id: Set(id),
            visibility: Set(visibility.as_str().to_owned()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("set recipe visibility")?;
        Ok(())
    }

    async fn set_image(&self, id: Uuid, image_url: &str, image_key: &str) -> Result<(), ApiError> {
        recipes::ActiveModel {
            id: Set(id),
            image_url: Set(Some(image_url.to_owned())),
            image_key: Set(Some(image_key.to_owned())),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("set recipe image")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        // Child rows and the recipe row go together or not at all.
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                Box::pin(async move {
                    recipe_ingredients::Entity::delete_many()
                        .filter(recipe_ingredients::Column::RecipeId.eq(id))
                        .exec(txn)
                        .await?;
                    recipe_steps::Entity::delete_many()
                        .filter(recipe_steps::Column::RecipeId.eq(id))
                        .exec(txn)
                        .await?;
                    recipes::Entity::delete_by_id(id).exec(txn).await?;
                    Ok(())
                })
            })
            .await
            .context("delete recipe")?;
        Ok(())
    }

    async fn list_by_author(
        &self,
        author_id: Uuid,
        sort_by: RecipeSortBy,
        page: PageRequest,
    ) -> Result<Vec<Recipe>, ApiError> {
        let PageRequest { per_page, page } = page.clamped();
        let query = recipes::Entity::find().filter(recipes::Column::AuthorId.eq(author_id));
        let models = apply_sort(query, sort_by)
            .offset(((page - 1) * per_page) as u64)
            .limit(per_page as u64)
            .all(&self.db)
            .await
            .context("list recipes by author")?;
        models.into_iter().map(recipe_from_model).collect()
    }

    async fn list_public(
        &self,
        sort_by: RecipeSortBy,
        page: PageRequest,
    ) -> Result<Vec<Recipe>, ApiError> {
        let PageRequest { per_page, page } = page.clamped();
        let query = recipes::Entity::find()
            .filter(recipes::Column::Visibility.eq(Visibility::Public.as_str()));
        let models = apply_sort(query, sort_by)
            .offset(((page - 1) * per_page) as u64)
            .limit(per_page as u64)
            .all(&self.db)
            .await
            .context("list public recipes")?;
        models.into_iter().map(recipe_from_model).collect()
    }

    async fn search_by_ingredients(
        &self,
        available: &[String],
        page: PageRequest,
    ) -> Result<Vec<Recipe>, ApiError> {
        let PageRequest { per_page, page } = page.clamped();
        let offset = ((page - 1) * per_page) as i64;
        let limit = per_page as i64;

        // A recipe qualifies when it has at least one ingredient and none of
        // its ingredients falls outside the available set. Bigger recipes
        // rank first.
        let in_clause = (1..=available.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let limit_param = available.len() + 1;
        let offset_param = available.len() + 2;
        let sql = format!(
            r#"
            SELECT r.* FROM recipes r
            WHERE r.visibility = 'PUBLIC'
              AND EXISTS (
                  SELECT 1 FROM recipe_ingredients ri WHERE ri.recipe_id = r.id
              )
              AND NOT EXISTS (
                  SELECT 1 FROM recipe_ingredients ri
                  JOIN ingredients i ON i.id = ri.ingredient_id
                  WHERE ri.recipe_id = r.id AND i.name NOT IN ({in_clause})
              )
            ORDER BY (
                SELECT COUNT(*) FROM recipe_ingredients ri WHERE ri.recipe_id = r.id
            ) DESC, r.created_at DESC
            LIMIT ${limit_param} OFFSET ${offset_param}
            "#,
        );

        let mut values: Vec<sea_orm::Value> =
            available.iter().map(|name| name.clone().into()).collect();
        values.push(limit.into());
        values.push(offset.into());

        let models = recipes::Model::find_by_statement(Statement::from_sql_and_values(
            self.db.get_database_backend(),
            &sql,
            values,
        ))
        .all(&self.db)
        .await
        .context("search recipes by ingredients")?;
        models.into_iter().map(recipe_from_model).collect()
    }
}

async fn insert_recipe_row(
    txn: &DatabaseTransaction,
    recipe: &Recipe,
) -> Result<(), sea_orm::DbErr> {
    recipes::ActiveModel {
        id: Set(recipe.id),
        author_id: Set(recipe.author_id),
        title: Set(recipe.title.clone()),
        description: Set(recipe.description.clone()),
        prep_minutes: Set(recipe.prep_minutes),
        visibility: Set(recipe.visibility.as_str().to_owned()),
        image_url: Set(recipe.image_url.clone()),
        image_key: Set(recipe.image_key.clone()),
        created_at: Set(recipe.created_at),
        updated_at: Set(recipe.updated_at),
    }
    .insert(txn)
    .await?;
    Ok(())
}

async fn insert_children(
    txn: &DatabaseTransaction,
    recipe_id: Uuid,
    ingredient_lines: &[IngredientInput],
    steps: &[String],
) -> Result<(), sea_orm::DbErr> {
    insert_ingredient_lines(txn, recipe_id, ingredient_lines).await?;
    insert_steps(txn, recipe_id, steps).await?;
    Ok(())
}

/// Insert ingredient lines, creating canonical ingredient rows for names not
/// seen before. Names arrive already lowercased from the usecase layer.
async fn insert_ingredient_lines(
    txn: &DatabaseTransaction,
    recipe_id: Uuid,
    lines: &[IngredientInput],
) -> Result<(), sea_orm::DbErr> {
    for (position, line) in lines.iter().enumerate() {
        let ingredient_id = match ingredients::Entity::find()
            .filter(ingredients::Column::Name.eq(line.name.as_str()))
            .one(txn)
            .await?
        {
            Some(existing) => existing.id,
            None => {
                let id = Uuid::new_v4();
                ingredients::ActiveModel {
                    id: Set(id),
                    name: Set(line.name.clone()),
                }
                .insert(txn)
                .await?;
                id
            }
        };
        recipe_ingredients::ActiveModel {
            recipe_id: Set(recipe_id),
            ingredient_id: Set(ingredient_id),
            quantity: Set(line.quantity.clone()),
            position: Set(position as i32),
        }
        .insert(txn)
        .await?;
    }
    Ok(())
}

async fn insert_steps(
    txn: &DatabaseTransaction,
    recipe_id: Uuid,
    steps: &[String],
) -> Result<(), sea_orm::DbErr> {
    for (position, body) in steps.iter().enumerate() {
        recipe_steps::ActiveModel {
            recipe_id: Set(recipe_id),
            position: Set(position as i32),
            body: Set(body.clone()),
        }
        .insert(txn)
        .await?;
    }
    Ok(())
}

fn apply_sort(
    query: sea_orm::Select<recipes::Entity>,
    sort_by: RecipeSortBy,
) -> sea_orm::Select<recipes::Entity> {
    match sort_by {
        RecipeSortBy::CreatedAt(Sort::Desc) => query.order_by_desc(recipes::Column::CreatedAt),
        RecipeSortBy::CreatedAt(Sort::Asc) => query.order_by_asc(recipes::Column::CreatedAt),
    }
}

fn recipe_from_model(model: recipes::Model) -> Result<Recipe, ApiError> {
    let visibility = Visibility::from_str_value(&model.visibility)
        .ok_or_else(|| anyhow!("unknown visibility value: {}", model.visibility))?;
    Ok(Recipe {
        id: model.id,
        author_id: model.author_id,
        title: model.title,
        description: model.description,
        prep_minutes: model.prep_minutes,
        visibility,
        image_url: model.image_url,
        image_key: model.image_key,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
