use chrono::Utc;
use uuid::Uuid;

use tavola_domain::email::looks_like_email;
use tavola_domain::username::validate_username;

use crate::domain::password::{hash_secret, verify_secret};
use crate::domain::repository::{CredentialRepository, UserRepository};
use crate::domain::types::User;
use crate::error::ApiError;

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub password: String,
}

pub struct RegisterUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> RegisterUseCase<U> {
    /// Creates the user and its credential together; returns the user so the
    /// handler can establish a session.
    pub async fn execute(&self, input: RegisterInput) -> Result<User, ApiError> {
        if !validate_username(&input.username) {
            return Err(ApiError::Validation {
                field: "username",
                message: "username must be 3-32 characters: letters, digits, '-' or '_'"
                    .to_owned(),
            });
        }
        if !looks_like_email(&input.email) {
            return Err(ApiError::Validation {
                field: "email",
                message: "not a valid email address".to_owned(),
            });
        }
        if input.password.len() < 8 {
            return Err(ApiError::Validation {
                field: "password",
                message: "password must be at least 8 characters".to_owned(),
            });
        }

        if self
            .users
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(ApiError::Conflict);
        }
        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(ApiError::Conflict);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            display_name: input
                .display_name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| input.username.clone()),
            username: input.username,
            email: input.email,
            created_at: now,
            updated_at: now,
        };

        let password_hash = hash_secret(&input.password)?;
        self.users
            .create_with_credential(&user, &password_hash)
            .await?;
        Ok(user)
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub username: String,
    pub password: String,
}

pub struct LoginUseCase<U: UserRepository, C: CredentialRepository> {
    pub users: U,
    pub credentials: C,
}

impl<U: UserRepository, C: CredentialRepository> LoginUseCase<U, C> {
    pub async fn execute(&self, input: LoginInput) -> Result<User, ApiError> {
        let user = self
            .users
            .find_by_username(&input.username)
            .await?
            .ok_or(ApiError::InvalidCredentials)?;

        let credential = self
            .credentials
            .find_by_username(&user.username)
            .await?
            .ok_or(ApiError::InvalidCredentials)?;

        if !verify_secret(&input.password, &credential.password_hash) {
            return Err(ApiError::InvalidCredentials);
        }

        Ok(user)
    }
}

// ── GetAccount ───────────────────────────────────────────────────────────────

pub struct GetAccountUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetAccountUseCase<U> {
    pub async fn execute(&self, user_id: Uuid) -> Result<User, ApiError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(ApiError::NotFound)
    }
}

// ── UpdateAccount ────────────────────────────────────────────────────────────

pub struct UpdateAccountInput {
    pub display_name: Option<String>,
    pub email: Option<String>,
}

pub struct UpdateAccountUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> UpdateAccountUseCase<U> {
    pub async fn execute(&self, user_id: Uuid, input: UpdateAccountInput) -> Result<(), ApiError> {
        if input.display_name.is_none() && input.email.is_none() {
            return Err(ApiError::Validation {
                field: "form",
                message: "nothing to update".to_owned(),
            });
        }
        if let Some(ref email) = input.email {
            if !looks_like_email(email) {
                return Err(ApiError::Validation {
                    field: "email",
                    message: "not a valid email address".to_owned(),
                });
            }
            if let Some(other) = self.users.find_by_email(email).await? {
                if other.id != user_id {
                    return Err(ApiError::Conflict);
                }
            }
        }
        self.users
            .update_profile(user_id, input.display_name.as_deref(), input.email.as_deref())
            .await
    }
}
