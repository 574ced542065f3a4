//! Password-recovery flow: request a one-time code by mail, then trade the
//! code for a new password and a fresh session.

use chrono::Utc;
use rand::RngExt;

use tavola_domain::email::mask_email;

use crate::domain::password::{hash_secret, verify_secret};
use crate::domain::repository::{CredentialRepository, Mailer, RecoveryRepository, UserRepository};
use crate::domain::types::{RECOVERY_CODE_LEN, Recovery, RecoveryReceipt, User};
use crate::error::ApiError;

/// Charset for generating recovery codes (uppercase alphanumeric).
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..RECOVERY_CODE_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

// ── RequestRecovery ──────────────────────────────────────────────────────────

pub struct RequestRecoveryInput {
    pub username_or_email: String,
}

pub struct RequestRecoveryUseCase<U, R, M>
where
    U: UserRepository,
    R: RecoveryRepository,
    M: Mailer,
{
    pub users: U,
    pub recoveries: R,
    pub mailer: M,
}

impl<U, R, M> RequestRecoveryUseCase<U, R, M>
where
    U: UserRepository,
    R: RecoveryRepository,
    M: Mailer,
{
    pub async fn execute(
        &self,
        input: RequestRecoveryInput,
    ) -> Result<RecoveryReceipt, ApiError> {
        // 1. Find the user by username, then by email. The error does not say
        //    which lookup key failed.
        let query = input.username_or_email.trim();
        let user = match self.users.find_by_username(query).await? {
            Some(user) => user,
            None => self
                .users
                .find_by_email(query)
                .await?
                .ok_or(ApiError::UserNotFound)?,
        };

        // 2. Generate and hash a fresh code; the upsert replaces any prior
        //    code for this username, so only the newest is ever valid.
        let code = generate_code();
        let recovery = Recovery {
            username: user.username.clone(),
            code_hash: hash_secret(&code)?,
            updated_at: Utc::now(),
        };
        self.recoveries.upsert(&recovery).await?;

        // 3. Mail the plaintext code. Delivery failure is fatal.
        self.mailer
            .send(
                &user.email,
                "Your Tavola recovery code",
                &format!(
                    "Your recovery code is {code}. It expires in 15 minutes.\n\n\
                     If you did not request a password reset, you can ignore this email."
                ),
            )
            .await?;

        Ok(RecoveryReceipt {
            username: user.username,
            masked_email: mask_email(&user.email),
        })
    }
}

// ── VerifyAndReset ───────────────────────────────────────────────────────────

pub struct VerifyAndResetInput {
    pub username: String,
    pub code: String,
    pub new_password: String,
}

pub struct VerifyAndResetUseCase<U, R, C>
where
    U: UserRepository,
    R: RecoveryRepository,
    C: CredentialRepository,
{
    pub users: U,
    pub recoveries: R,
    pub credentials: C,
}

impl<U, R, C> VerifyAndResetUseCase<U, R, C>
where
    U: UserRepository,
    R: RecoveryRepository,
    C: CredentialRepository,
{
    /// Returns the recovered user so the handler can establish a session.
    pub async fn execute(&self, input: VerifyAndResetInput) -> Result<User, ApiError> {
        if input.new_password.len() < 8 {
            return Err(ApiError::Validation {
                field: "new_password",
                message: "password must be at least 8 characters".to_owned(),
            });
        }

        let recovery = self
            .recoveries
            .find(&input.username)
            .await?
            .ok_or(ApiError::RecoveryNotFound)?;

        // Expired codes are never left active: delete before failing.
        if recovery.is_expired() {
            self.recoveries.delete(&input.username).await?;
            return Err(ApiError::RecoveryExpired);
        }

        // Generation only emits uppercase; normalize user-typed lowercase
        // before comparing against the stored hash.
        let normalized = input.code.to_uppercase();
        if !verify_secret(&normalized, &recovery.code_hash) {
            // Record left intact — retry is allowed within the TTL.
            return Err(ApiError::CodeMismatch);
        }

        // Single-use: consume the record before touching the credential so a
        // matched code can never be replayed.
        self.recoveries.delete(&input.username).await?;

        let user = self
            .users
            .find_by_username(&input.username)
            .await?
            .ok_or(ApiError::NotFound)?;

        let password_hash = hash_secret(&input.new_password)?;
        self.credentials
            .set_password_hash(&user.username, &password_hash)
            .await?;

        Ok(user)
    }
}
