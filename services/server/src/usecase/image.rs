use bytes::Bytes;
use uuid::Uuid;

use crate::domain::authz::can_mutate;
use crate::domain::repository::{ImageTranscoder, ObjectStore, RecipeRepository};
use crate::error::ApiError;

// ── UploadRecipeImage ────────────────────────────────────────────────────────

pub struct UploadRecipeImageUseCase<R, T, O>
where
    R: RecipeRepository,
    T: ImageTranscoder,
    O: ObjectStore,
{
    pub recipes: R,
    pub transcoder: T,
    pub storage: O,
}

impl<R, T, O> UploadRecipeImageUseCase<R, T, O>
where
    R: RecipeRepository,
    T: ImageTranscoder,
    O: ObjectStore,
{
    /// Transcode the uploaded bytes, push them to object storage and persist
    /// the public URL on the recipe. Returns the URL.
    ///
    /// Transcode and upload failures are fatal (`Service`); deleting a
    /// replaced image's old object is best-effort.
    pub async fn execute(
        &self,
        editor: Uuid,
        recipe_id: Uuid,
        bytes: Bytes,
    ) -> Result<String, ApiError> {
        if bytes.is_empty() {
            return Err(ApiError::Validation {
                field: "image",
                message: "image file must not be empty".to_owned(),
            });
        }

        let recipe = self
            .recipes
            .find(recipe_id)
            .await?
            .ok_or(ApiError::NotFound)?;
        if !can_mutate(editor, &recipe) {
            return Err(ApiError::Forbidden);
        }

        let processed = self.transcoder.transcode(bytes).await?;

        let key = format!("recipes/{recipe_id}/{}.jpg", Uuid::new_v4());
        let url = self.storage.upload(&key, "image/jpeg", processed).await?;

        self.recipes.set_image(recipe_id, &url, &key).await?;

        if let Some(ref old_key) = recipe.image_key {
            if let Err(e) = self.storage.delete(old_key).await {
                tracing::warn!(recipe_id = %recipe_id, error = %e, "orphaned image object");
            }
        }

        Ok(url)
    }
}
