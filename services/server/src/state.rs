use std::sync::Arc;

use axum::extract::FromRef;
use meilisearch_sdk::client::Client as MeiliClient;
use sea_orm::DatabaseConnection;

use tavola_session::extract::SessionKey;

use crate::config::ServerConfig;
use crate::infra::db::{
    DbCredentialRepository, DbRecipeRepository, DbRecoveryRepository, DbUserRepository,
};
use crate::infra::mail::HttpMailer;
use crate::infra::search::MeiliSearchIndex;
use crate::infra::storage::HttpObjectStore;
use crate::infra::transcode::HttpTranscoder;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    /// General-purpose HTTP client for mail and storage calls.
    pub http: reqwest::Client,
    /// Separate client for transcode calls; carries the fixed request timeout.
    pub transcode_http: reqwest::Client,
    pub meili: Arc<MeiliClient>,
    pub config: ServerConfig,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn credential_repo(&self) -> DbCredentialRepository {
        DbCredentialRepository {
            db: self.db.clone(),
        }
    }

    pub fn recovery_repo(&self) -> DbRecoveryRepository {
        DbRecoveryRepository {
            db: self.db.clone(),
        }
    }

    pub fn recipe_repo(&self) -> DbRecipeRepository {
        DbRecipeRepository {
            db: self.db.clone(),
        }
    }

    pub fn mailer(&self) -> HttpMailer {
        HttpMailer {
            http: self.http.clone(),
            api_url: self.config.mail_api_url.clone(),
            api_key: self.config.mail_api_key.clone(),
            from: self.config.mail_from.clone(),
        }
    }

    pub fn storage(&self) -> HttpObjectStore {
        HttpObjectStore {
            http: self.http.clone(),
            base_url: self.config.storage_api_url.clone(),
            api_key: self.config.storage_api_key.clone(),
            bucket: self.config.storage_bucket.clone(),
        }
    }

    pub fn transcoder(&self) -> HttpTranscoder {
        HttpTranscoder {
            http: self.transcode_http.clone(),
            api_url: self.config.transcode_api_url.clone(),
        }
    }

    pub fn search_index(&self) -> MeiliSearchIndex {
        MeiliSearchIndex {
            client: self.meili.clone(),
        }
    }
}

impl FromRef<AppState> for SessionKey {
    fn from_ref(state: &AppState) -> Self {
        SessionKey(state.config.session_secret.clone())
    }
}
