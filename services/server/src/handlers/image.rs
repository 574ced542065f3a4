use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use serde::Serialize;
use uuid::Uuid;

use tavola_session::extract::SessionUser;

use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::image::UploadRecipeImageUseCase;

// ── POST /recipes/{id}/image ─────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ImageResponse {
    pub image_url: String,
}

pub async fn upload_image(
    session: SessionUser,
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ImageResponse>, ApiError> {
    // Take the first part named "image"; everything else is ignored.
    let mut bytes = None;
    while let Some(field) = multipart.next_field().await.map_err(|_| {
        ApiError::Validation {
            field: "image",
            message: "malformed multipart body".to_owned(),
        }
    })? {
        if field.name() == Some("image") {
            bytes = Some(field.bytes().await.map_err(|_| ApiError::Validation {
                field: "image",
                message: "could not read image part".to_owned(),
            })?);
            break;
        }
    }
    let bytes = bytes.ok_or(ApiError::Validation {
        field: "image",
        message: "missing \"image\" part".to_owned(),
    })?;

    let usecase = UploadRecipeImageUseCase {
        recipes: state.recipe_repo(),
        transcoder: state.transcoder(),
        storage: state.storage(),
    };
    let image_url = usecase.execute(session.user_id, recipe_id, bytes).await?;
    Ok(Json(ImageResponse { image_url }))
}
