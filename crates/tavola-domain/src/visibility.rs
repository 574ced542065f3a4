//! Recipe visibility levels.

use serde::{Deserialize, Serialize};

/// Who may read a recipe.
///
/// Wire and database format: SCREAMING_SNAKE string (`"PUBLIC"` etc.).
/// Only `Public` recipes appear in the discovery listing; `Unlisted` is
/// reachable by direct link; `Private` is author-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    Public,
    Unlisted,
    Private,
}

impl Visibility {
    /// Convert from the stored string value. Returns `None` for unknown values.
    pub fn from_str_value(v: &str) -> Option<Self> {
        match v {
            "PUBLIC" => Some(Self::Public),
            "UNLISTED" => Some(Self::Unlisted),
            "PRIVATE" => Some(Self::Private),
            _ => None,
        }
    }

    /// Convert to the stored string value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "PUBLIC",
            Self::Unlisted => "UNLISTED",
            Self::Private => "PRIVATE",
        }
    }

    /// Whether the recipe shows up in the public discovery listing.
    pub fn is_listed(self) -> bool {
        matches!(self, Self::Public)
    }
}
