use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRef;
use axum::routing::get;
use axum::Router;
use axum_extra::extract::cookie::Key;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::cache::PageCache;
use crate::content::client::{ContentApi, PrismicClient};
use crate::error::AppError;
use crate::preview::links::LinkResolver;
use crate::settings::{Settings, MIN_SECRET_LEN};

/// Shared state for every request handler.
#[derive(Clone)]
pub struct AppState {
    pub content: Arc<dyn ContentApi>,
    pub settings: Arc<Settings>,
    pub cookie_key: Key,
    pub pages: Arc<PageCache>,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

impl AppState {
    /// Assemble state around an existing content API.
    pub fn new(content: Arc<dyn ContentApi>, settings: Settings) -> Self {
        let cookie_key = match &settings.preview.secret {
            Some(secret) if secret.len() >= MIN_SECRET_LEN => Key::derive_from(secret.as_bytes()),
            _ => {
                tracing::warn!(
                    "No usable preview.secret configured, generating a random signing key; preview cookies will not survive a restart"
                );
                Key::generate()
            }
        };
        let pages = Arc::new(PageCache::new(Duration::from_secs(settings.site.revalidate_secs)));

        Self {
            content,
            settings: Arc::new(settings),
            cookie_key,
            pages,
        }
    }

    /// Build state with a Prismic client for the configured endpoint.
    pub fn from_settings(settings: Settings) -> Result<Self, AppError> {
        let client = PrismicClient::from_settings(&settings.prismic)?;
        Ok(Self::new(Arc::new(client), settings))
    }

    pub fn link_resolver(&self) -> LinkResolver {
        LinkResolver::new(&self.settings.prismic.document_type)
    }
}

/// The HTTP surface: preview routes, load-more, pages and static assets.
pub fn router(state: AppState) -> Router {
    let assets = ServeDir::new(&state.settings.server.public_dir);

    Router::new()
        .route("/api/preview", get(api::preview::preview_handler))
        .route("/api/exit-preview", get(api::preview::exit_preview_handler))
        .route("/api/posts", get(api::posts::posts_handler))
        .route("/", get(api::pages::home_handler))
        .route("/post/{uid}", get(api::pages::post_handler))
        .fallback_service(assets)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
