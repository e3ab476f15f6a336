use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::app::AppState;
use crate::components::home::render_post_cards;
use crate::content::client::ContentApi;
use crate::error::AppError;
use crate::models::post::ContentSummary;
use crate::pages::listing::{api_chunk_path, page_at};

#[derive(Debug, Deserialize)]
pub struct CursorParams {
    pub cursor: Option<String>,
}

/// One appended page, with its cards pre-rendered for the browser.
#[derive(Debug, Serialize, Deserialize)]
pub struct PostsChunk {
    pub results: Vec<ContentSummary>,
    /// Upstream cursor of the following page.
    pub next_page: Option<String>,
    /// Where the browser fetches the following chunk.
    pub next_chunk: Option<String>,
    pub html: String,
}

/// Accept only cursors pointing at the content API's origin.
pub fn validate_cursor(cursor: &str, endpoint: &str) -> Result<Url, AppError> {
    let url = Url::parse(cursor)
        .map_err(|e| AppError::BadRequest(format!("Invalid cursor: {e}")))?;
    let endpoint = Url::parse(endpoint)
        .map_err(|e| AppError::Config(format!("Invalid content API endpoint: {e}")))?;

    if url.origin() != endpoint.origin() {
        return Err(AppError::BadRequest(
            "Cursor does not point at the content API".into(),
        ));
    }
    Ok(url)
}

/// Core load-more logic: replay the cursor and render the new cards.
pub async fn process_load_more(
    api: &dyn ContentApi,
    endpoint: &str,
    cursor: &str,
) -> Result<PostsChunk, AppError> {
    let url = validate_cursor(cursor, endpoint)?;
    let page = page_at(api, url.as_str()).await?;

    Ok(PostsChunk {
        html: render_post_cards(page.results.clone()),
        next_chunk: page.next_page.as_deref().map(api_chunk_path),
        results: page.results,
        next_page: page.next_page,
    })
}

/// `GET /api/posts?cursor=<url>`
pub async fn posts_handler(
    State(state): State<AppState>,
    Query(params): Query<CursorParams>,
) -> Result<Json<PostsChunk>, AppError> {
    let cursor = params
        .cursor
        .filter(|cursor| !cursor.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing cursor".into()))?;

    let chunk = process_load_more(
        state.content.as_ref(),
        &state.settings.prismic.endpoint,
        &cursor,
    )
    .await?;

    Ok(Json(chunk))
}
