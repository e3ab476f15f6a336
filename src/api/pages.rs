use axum::extract::{Path, State};
use axum::response::Html;

use crate::app::AppState;
use crate::components::home::render_home_page;
use crate::components::post::render_post_page;
use crate::content::client::ContentApi;
use crate::error::AppError;
use crate::pages::listing::{first_page, ChunkLinks};
use crate::pages::post::load_post;
use crate::preview::marker::{PreviewMarker, PreviewRead};
use crate::preview::session::PreviewSession;
use crate::settings::Settings;

pub const HOME_PATH: &str = "/";

pub fn post_path(uid: &str) -> String {
    format!("/post/{uid}")
}

/// Render the listing page. The listing always shows published content.
pub async fn render_home(
    api: &dyn ContentApi,
    settings: &Settings,
    preview: bool,
) -> Result<String, AppError> {
    let page = first_page(api, &settings.prismic).await?;
    Ok(render_home_page(
        &settings.site.title,
        page,
        ChunkLinks::Api,
        preview,
    ))
}

/// Render a post page, reading the draft revision when `marker` is set.
pub async fn render_post(
    api: &dyn ContentApi,
    settings: &Settings,
    slug: &str,
    marker: Option<&PreviewMarker>,
) -> Result<String, AppError> {
    let page = load_post(api, &settings.prismic, slug, marker).await?;
    Ok(render_post_page(
        page,
        marker.is_some(),
        settings.site.comments_repo.clone(),
    ))
}

/// `GET /`
pub async fn home_handler(
    State(state): State<AppState>,
    session: PreviewSession,
) -> Result<Html<String>, AppError> {
    let api = state.content.as_ref();

    if session.is_active() {
        return render_home(api, &state.settings, true).await.map(Html);
    }

    let html = state
        .pages
        .get_or_render(HOME_PATH, || render_home(api, &state.settings, false))
        .await?;
    Ok(Html(html))
}

/// `GET /post/{uid}`
///
/// Slugs not rendered at startup are rendered on first request and cached
/// like any other page.
pub async fn post_handler(
    State(state): State<AppState>,
    session: PreviewSession,
    Path(uid): Path<String>,
) -> Result<Html<String>, AppError> {
    let api = state.content.as_ref();

    if let Some(marker) = session.marker() {
        tracing::debug!(%uid, "Rendering post under preview ref");
        return render_post(api, &state.settings, &uid, Some(&marker))
            .await
            .map(Html);
    }

    let html = state
        .pages
        .get_or_render(&post_path(&uid), || {
            render_post(api, &state.settings, &uid, None)
        })
        .await?;
    Ok(Html(html))
}

/// Render the listing and every enumerated post into the page cache.
///
/// Returns the number of cached pages.
pub async fn warm_cache(state: &AppState) -> Result<usize, AppError> {
    let api = state.content.as_ref();
    let settings = state.settings.as_ref();

    state
        .pages
        .insert(HOME_PATH, render_home(api, settings, false).await?)
        .await;

    let uids = crate::pages::post::static_paths(api, &settings.prismic).await?;
    for uid in &uids {
        let html = render_post(api, settings, uid, None).await?;
        state.pages.insert(post_path(uid), html).await;
    }

    Ok(uids.len() + 1)
}
