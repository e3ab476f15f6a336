use axum::extract::{Query, State};
use axum::response::{Html, Redirect};
use serde::Deserialize;

use crate::app::AppState;
use crate::content::client::ContentApi;
use crate::error::AppError;
use crate::preview::links::{resolve_preview_url, LinkResolver};
use crate::preview::marker::{PreviewMarker, PreviewWrite};
use crate::preview::session::PreviewSession;

/// Query parameters the CMS appends to the preview URL.
#[derive(Debug, Default, Deserialize)]
pub struct PreviewParams {
    /// The preview ref.
    pub token: Option<String>,
    #[serde(rename = "documentId")]
    pub document_id: Option<String>,
}

/// An HTML document that sends the browser to `url`.
pub fn client_redirect(url: &str) -> Html<String> {
    let attr = html_escape::encode_double_quoted_attribute(url);
    let text = html_escape::encode_text(url);
    Html(format!(
        concat!(
            "<!DOCTYPE html><html lang=\"pt-BR\"><head><meta charset=\"utf-8\">",
            "<meta http-equiv=\"refresh\" content=\"0; url={attr}\">",
            "<title>Redirecionando</title></head>",
            "<body><a href=\"{attr}\">{text}</a></body></html>"
        ),
        attr = attr,
        text = text
    ))
}

/// Core preview activation: resolve the pair to a destination and produce
/// the marker to store.
pub async fn process_preview(
    api: &dyn ContentApi,
    resolver: &LinkResolver,
    params: PreviewParams,
) -> Result<(PreviewMarker, String), AppError> {
    let token = params.token.unwrap_or_default();
    let document_id = params.document_id.unwrap_or_default();

    match resolve_preview_url(api, resolver, &token, &document_id).await? {
        Some(url) => Ok((PreviewMarker::new(token), url)),
        None => Err(AppError::InvalidPreviewToken),
    }
}

/// `GET /api/preview?token=<ref>&documentId=<id>`
pub async fn preview_handler(
    State(state): State<AppState>,
    session: PreviewSession,
    Query(params): Query<PreviewParams>,
) -> Result<(PreviewSession, Html<String>), AppError> {
    let (marker, url) =
        process_preview(state.content.as_ref(), &state.link_resolver(), params).await?;

    tracing::info!(%url, "Preview activated");
    Ok((session.activate(&marker), client_redirect(&url)))
}

/// `GET /api/exit-preview`
pub async fn exit_preview_handler(session: PreviewSession) -> (PreviewSession, Redirect) {
    (session.deactivate(), Redirect::temporary("/"))
}
