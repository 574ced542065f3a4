/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing session tokens.
    pub session_secret: String,
    /// Cookie domain attribute (root domain, e.g. "example.com").
    pub cookie_domain: String,
    /// TCP port to listen on (default 3200). Env var: `SERVER_PORT`.
    pub server_port: u16,
    /// Transactional mail API endpoint (e.g. "https://mail.example.com/v1/send").
    pub mail_api_url: String,
    /// Bearer token for the mail API.
    pub mail_api_key: String,
    /// Sender address for outgoing mail (default "no-reply@tavola.app").
    pub mail_from: String,
    /// Object-storage API base URL (e.g. "https://storage.example.com").
    pub storage_api_url: String,
    /// Bearer token for the storage API.
    pub storage_api_key: String,
    /// Storage bucket for recipe images (default "recipe-images").
    pub storage_bucket: String,
    /// Image-transcode service URL (e.g. "https://transcode.example.com/resize").
    pub transcode_api_url: String,
    /// Transcode call timeout in seconds (default 15). Env var: `TRANSCODE_TIMEOUT_SECS`.
    pub transcode_timeout_secs: u64,
    /// Meilisearch URL (e.g. "http://meilisearch:7700").
    pub meili_url: String,
    /// Meilisearch API key.
    pub meili_key: String,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            session_secret: std::env::var("SESSION_SECRET").expect("SESSION_SECRET"),
            cookie_domain: std::env::var("COOKIE_DOMAIN").expect("COOKIE_DOMAIN"),
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3200),
            mail_api_url: std::env::var("MAIL_API_URL").expect("MAIL_API_URL"),
            mail_api_key: std::env::var("MAIL_API_KEY").expect("MAIL_API_KEY"),
            mail_from: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "no-reply@tavola.app".to_owned()),
            storage_api_url: std::env::var("STORAGE_API_URL").expect("STORAGE_API_URL"),
            storage_api_key: std::env::var("STORAGE_API_KEY").expect("STORAGE_API_KEY"),
            storage_bucket: std::env::var("STORAGE_BUCKET")
                .unwrap_or_else(|_| "recipe-images".to_owned()),
            transcode_api_url: std::env::var("TRANSCODE_API_URL").expect("TRANSCODE_API_URL"),
            transcode_timeout_secs: std::env::var("TRANSCODE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(15),
            meili_url: std::env::var("MEILI_URL").expect("MEILI_URL"),
            meili_key: std::env::var("MEILI_KEY").expect("MEILI_KEY"),
        }
    }
}
