use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::content::client::ContentApi;
use crate::content::models::SearchResponse;
use crate::content::predicate::{Predicate, SearchQuery};
use crate::error::AppError;
use crate::models::post::{project_summaries, ContentSummary};
use crate::settings::PrismicSettings;

/// One page of summaries plus the cursor to the following page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostsPage {
    pub results: Vec<ContentSummary>,
    /// `None` once the last page has been reached.
    pub next_page: Option<String>,
}

impl From<SearchResponse> for PostsPage {
    fn from(response: SearchResponse) -> Self {
        Self {
            results: project_summaries(&response.results),
            next_page: response.next_page.filter(|cursor| !cursor.is_empty()),
        }
    }
}

/// Fields requested for listed documents.
fn summary_fields(doc_type: &str) -> Vec<String> {
    ["title", "subtitle", "author"]
        .iter()
        .map(|field| format!("{doc_type}.{field}"))
        .collect()
}

/// Fetch the first listing page, in upstream order.
pub async fn first_page(
    api: &dyn ContentApi,
    settings: &PrismicSettings,
) -> Result<PostsPage, AppError> {
    let query = SearchQuery::new(vec![Predicate::document_type(&settings.document_type)])
        .fetch(summary_fields(&settings.document_type))
        .page_size(settings.page_size);

    Ok(api.query(query).await?.into())
}

/// Fetch the page a cursor points to.
pub async fn page_at(api: &dyn ContentApi, cursor: &str) -> Result<PostsPage, AppError> {
    Ok(api.fetch_page(cursor).await?.into())
}

/// Where the browser fetches the listing page that follows the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkLinks {
    /// The load-more endpoint of a running server, fed with the upstream cursor.
    Api,
    /// Chunk files written by a static export, numbered from 2.
    Static,
}

impl ChunkLinks {
    /// Link to listing page `number`, reached through `cursor`.
    pub fn link(self, number: usize, cursor: &str) -> String {
        match self {
            ChunkLinks::Api => api_chunk_path(cursor),
            ChunkLinks::Static => static_chunk_path(number),
        }
    }
}

/// Load-more endpoint path for an upstream cursor.
pub fn api_chunk_path(cursor: &str) -> String {
    format!("/api/posts?cursor={}", urlencoding::encode(cursor))
}

/// Site path of an exported listing chunk.
pub fn static_chunk_path(number: usize) -> String {
    format!("/posts/{number}.json")
}

/// Whether a "load more" request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
}

/// A growing list of summaries fed by cursor pagination.
///
/// Pages are only ever appended, in fetch order, without de-duplication.
/// At most one page load is in flight: `begin_load` moves Idle → Loading and
/// hands out the cursor, `finish_load`/`abort_load` move back to Idle.
/// A page whose cursor points back at an already fetched page ends in an
/// error instead of looping.
#[derive(Debug, Clone)]
pub struct Listing {
    items: Vec<ContentSummary>,
    cursor: Option<String>,
    state: LoadState,
    visited: HashSet<String>,
}

impl Listing {
    pub fn new(first: PostsPage) -> Self {
        Self {
            items: first.results,
            cursor: first.next_page,
            state: LoadState::Idle,
            visited: HashSet::new(),
        }
    }

    pub fn items(&self) -> &[ContentSummary] {
        &self.items
    }

    pub fn into_items(self) -> Vec<ContentSummary> {
        self.items
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Whether the "load more" control is shown and enabled.
    pub fn can_load_more(&self) -> bool {
        self.cursor.is_some() && self.state == LoadState::Idle
    }

    /// Start a load, returning the cursor to fetch.
    ///
    /// Returns `None` while a load is in flight or when no pages are left.
    pub fn begin_load(&mut self) -> Option<String> {
        if !self.can_load_more() {
            return None;
        }
        self.state = LoadState::Loading;
        let cursor = self.cursor.clone()?;
        self.visited.insert(cursor.clone());
        Some(cursor)
    }

    /// Append a fetched page and take over its cursor.
    pub fn finish_load(&mut self, page: PostsPage) {
        self.items.extend(page.results);
        self.cursor = page.next_page;
        self.state = LoadState::Idle;
    }

    /// Return to Idle after a failed fetch, keeping the current cursor.
    pub fn abort_load(&mut self) {
        self.state = LoadState::Idle;
    }

    /// Fetch and append the next page. Returns the number of items added.
    pub async fn load_more(&mut self, api: &dyn ContentApi) -> Result<usize, AppError> {
        let Some(cursor) = self.begin_load() else {
            return Ok(0);
        };

        match page_at(api, &cursor).await {
            Ok(page) if page.next_page.as_ref().is_some_and(|next| self.visited.contains(next)) => {
                self.abort_load();
                Err(AppError::Upstream(format!(
                    "Pagination loops back after cursor {cursor}"
                )))
            }
            Ok(page) => {
                let added = page.results.len();
                self.finish_load(page);
                Ok(added)
            }
            Err(e) => {
                self.abort_load();
                Err(e)
            }
        }
    }

    /// Follow cursors until the listing is exhausted.
    pub async fn load_all(&mut self, api: &dyn ContentApi) -> Result<(), AppError> {
        while self.can_load_more() {
            self.load_more(api).await?;
        }
        Ok(())
    }
}
