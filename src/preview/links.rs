use crate::content::client::ContentApi;
use crate::content::models::RawDocument;
use crate::error::AppError;

/// Maps a resolved document to the site path that renders it.
#[derive(Debug, Clone)]
pub struct LinkResolver {
    listing_type: String,
}

impl LinkResolver {
    pub fn new(listing_type: impl Into<String>) -> Self {
        Self {
            listing_type: listing_type.into(),
        }
    }

    fn is_post(&self, doc_type: &str) -> bool {
        doc_type == self.listing_type || doc_type == "post"
    }

    /// Posts map to `/post/{uid}`; everything else to the home page.
    pub fn resolve(&self, doc: &RawDocument) -> String {
        match &doc.uid {
            Some(uid) if self.is_post(&doc.doc_type) && !uid.is_empty() => format!("/post/{uid}"),
            _ => "/".to_string(),
        }
    }
}

/// Resolve a preview `(token, document_id)` pair to the path to open.
///
/// `None` means the pair does not identify a previewable document.
pub async fn resolve_preview_url(
    api: &dyn ContentApi,
    resolver: &LinkResolver,
    token: &str,
    document_id: &str,
) -> Result<Option<String>, AppError> {
    if token.trim().is_empty() || document_id.trim().is_empty() {
        return Ok(None);
    }

    let document = api.preview_document(token, document_id).await?;
    Ok(document.map(|doc| resolver.resolve(&doc)))
}
