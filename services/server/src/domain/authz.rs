//! Recipe access predicates. Every handler routes ownership and visibility
//! decisions through these two functions; none re-derives the rules inline.

use uuid::Uuid;

use tavola_domain::visibility::Visibility;

use crate::domain::types::Recipe;

/// Whether `viewer` (None = anonymous) may read the recipe.
///
/// PRIVATE is author-only; UNLISTED and PUBLIC are readable by anyone
/// holding the link.
pub fn can_read(viewer: Option<Uuid>, recipe: &Recipe) -> bool {
    match recipe.visibility {
        Visibility::Public | Visibility::Unlisted => true,
        Visibility::Private => viewer == Some(recipe.author_id),
    }
}

/// Whether `viewer` may edit, delete, or change visibility of the recipe.
/// Only the author may; there is no role hierarchy or delegation.
pub fn can_mutate(viewer: Uuid, recipe: &Recipe) -> bool {
    viewer == recipe.author_id
}
