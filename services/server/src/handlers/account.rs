use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use tavola_session::cookie::{clear_session_cookie, set_session_cookie};
use tavola_session::extract::SessionUser;
use tavola_session::token::issue_session_token;

use crate::domain::types::User;
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::account::{
    GetAccountUseCase, LoginInput, LoginUseCase, RegisterInput, RegisterUseCase,
    UpdateAccountInput, UpdateAccountUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub display_name: String,
    #[serde(serialize_with = "tavola_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "tavola_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            email: user.email,
            display_name: user.display_name,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Issue a session token for `user` and set the cookie on the jar.
pub(crate) fn establish_session(
    state: &AppState,
    jar: CookieJar,
    user: &User,
) -> Result<CookieJar, ApiError> {
    let (token, _exp) = issue_session_token(user.id, &state.config.session_secret)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("issue session token: {e}")))?;
    Ok(set_session_cookie(
        jar,
        token,
        state.config.cookie_domain.clone(),
    ))
}

// ── POST /auth/register ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let usecase = RegisterUseCase {
        users: state.user_repo(),
    };
    let user = usecase
        .execute(RegisterInput {
            username: body.username,
            email: body.email,
            display_name: body.display_name,
            password: body.password,
        })
        .await?;

    let jar = establish_session(&state, jar, &user)?;
    Ok((StatusCode::CREATED, jar, Json(UserResponse::from(user))))
}

// ── POST /auth/login ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        credentials: state.credential_repo(),
    };
    let user = usecase
        .execute(LoginInput {
            username: body.username,
            password: body.password,
        })
        .await?;

    let jar = establish_session(&state, jar, &user)?;
    Ok((StatusCode::OK, jar, Json(UserResponse::from(user))))
}

// ── DELETE /auth/session ─────────────────────────────────────────────────────

pub async fn logout(
    State(state): State<AppState>,
    _session: SessionUser,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let jar = clear_session_cookie(jar, state.config.cookie_domain.clone());
    Ok((StatusCode::NO_CONTENT, jar))
}

// ── GET /account ─────────────────────────────────────────────────────────────

pub async fn get_account(
    session: SessionUser,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    let usecase = GetAccountUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(session.user_id).await?;
    Ok(Json(UserResponse::from(user)))
}

// ── PATCH /account ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateAccountRequest {
    pub display_name: Option<String>,
    pub email: Option<String>,
}

pub async fn update_account(
    session: SessionUser,
    State(state): State<AppState>,
    Json(body): Json<UpdateAccountRequest>,
) -> Result<StatusCode, ApiError> {
    let usecase = UpdateAccountUseCase {
        users: state.user_repo(),
    };
    usecase
        .execute(
            session.user_id,
            UpdateAccountInput {
                display_name: body.display_name,
                email: body.email,
            },
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
