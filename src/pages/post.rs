use crate::content::client::ContentApi;
use crate::content::predicate::{Ordering, Predicate, SearchQuery};
use crate::error::AppError;
use crate::models::post::{ContentBlock, ContentDetail, Navigation, Neighbor};
use crate::pages::listing::{first_page, Listing};
use crate::preview::marker::{revision_for, PreviewMarker};
use crate::settings::PrismicSettings;

/// Reading speed the estimate is based on.
pub const WORDS_PER_MINUTE: usize = 200;

const PUBLICATION_DATE: &str = "document.first_publication_date";

/// Everything the post page renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostView {
    pub post: ContentDetail,
    pub navigation: Navigation,
    pub reading_time_minutes: usize,
}

/// Count whitespace-separated words.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Total words across headings and body segments.
pub fn total_words(blocks: &[ContentBlock]) -> usize {
    blocks
        .iter()
        .map(|block| {
            let heading = block.heading.as_deref().map_or(0, count_words);
            let body: usize = block.body.iter().map(|segment| count_words(&segment.text)).sum();
            heading + body
        })
        .sum()
}

/// Estimated reading time in whole minutes, rounded up.
pub fn reading_time_minutes(blocks: &[ContentBlock]) -> usize {
    total_words(blocks).div_ceil(WORDS_PER_MINUTE)
}

/// UIDs of every listed post, one static path each.
pub async fn static_paths(
    api: &dyn ContentApi,
    settings: &PrismicSettings,
) -> Result<Vec<String>, AppError> {
    let mut listing = Listing::new(first_page(api, settings).await?);
    listing.load_all(api).await?;

    Ok(listing
        .into_items()
        .into_iter()
        .map(|summary| summary.uid)
        .collect())
}

async fn neighbor(
    api: &dyn ContentApi,
    doc_type: &str,
    document_id: &str,
    ordering: Ordering,
) -> Result<Option<Neighbor>, AppError> {
    let query = SearchQuery::new(vec![Predicate::document_type(doc_type)])
        .fetch([format!("{doc_type}.title")])
        .page_size(1)
        .after(document_id)
        .order_by(ordering);

    let response = api.query(query).await?;
    response
        .results
        .first()
        .map(Neighbor::try_from)
        .transpose()
}

/// Find the chronologically previous and next posts around `document_id`.
pub async fn resolve_navigation(
    api: &dyn ContentApi,
    doc_type: &str,
    document_id: &str,
) -> Result<Navigation, AppError> {
    let (next, previous) = futures::try_join!(
        neighbor(api, doc_type, document_id, Ordering::asc(PUBLICATION_DATE)),
        neighbor(api, doc_type, document_id, Ordering::desc(PUBLICATION_DATE)),
    )?;

    Ok(Navigation { previous, next })
}

/// Load a post by slug, reading the draft revision when a marker is active.
pub async fn load_post(
    api: &dyn ContentApi,
    settings: &PrismicSettings,
    slug: &str,
    marker: Option<&PreviewMarker>,
) -> Result<PostView, AppError> {
    let raw = api
        .get_by_uid(&settings.document_type, slug, revision_for(marker))
        .await?;
    let post = ContentDetail::try_from(&raw)?;

    // Neighbor queries are anchored on the document id, so they run after the lookup.
    let navigation = resolve_navigation(api, &settings.document_type, &raw.id).await?;

    Ok(PostView {
        reading_time_minutes: reading_time_minutes(&post.content),
        post,
        navigation,
    })
}
