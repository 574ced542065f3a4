use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::handlers::account::{UserResponse, establish_session};
use crate::state::AppState;
use crate::usecase::recovery::{
    RequestRecoveryInput, RequestRecoveryUseCase, VerifyAndResetInput, VerifyAndResetUseCase,
};

// ── POST /auth/recovery ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RequestRecoveryRequest {
    pub username_or_email: String,
}

/// What the verify page gets to render: the username to verify against and a
/// masked echo of the address the code went to. Never the code itself.
#[derive(Serialize)]
pub struct RecoveryReceiptResponse {
    pub username: String,
    pub masked_email: String,
}

pub async fn request_recovery(
    State(state): State<AppState>,
    Json(body): Json<RequestRecoveryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let usecase = RequestRecoveryUseCase {
        users: state.user_repo(),
        recoveries: state.recovery_repo(),
        mailer: state.mailer(),
    };
    let receipt = usecase
        .execute(RequestRecoveryInput {
            username_or_email: body.username_or_email,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RecoveryReceiptResponse {
            username: receipt.username,
            masked_email: receipt.masked_email,
        }),
    ))
}

// ── POST /auth/recovery/verify ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyResetRequest {
    pub username: String,
    pub code: String,
    pub new_password: String,
}

pub async fn verify_and_reset(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<VerifyResetRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let usecase = VerifyAndResetUseCase {
        users: state.user_repo(),
        recoveries: state.recovery_repo(),
        credentials: state.credential_repo(),
    };
    let user = usecase
        .execute(VerifyAndResetInput {
            username: body.username,
            code: body.code,
            new_password: body.new_password,
        })
        .await?;

    // The consumed code doubles as proof of account ownership; sign the user
    // in on the spot.
    let jar = establish_session(&state, jar, &user)?;
    Ok((StatusCode::OK, jar, Json(UserResponse::from(user))))
}
