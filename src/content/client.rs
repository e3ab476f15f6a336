use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tokio::time::Instant;
use url::Url;

use crate::content::models::{ApiRoot, RawDocument, SearchResponse};
use crate::content::predicate::{Predicate, Revision, SearchQuery};
use crate::error::AppError;
use crate::settings::PrismicSettings;

/// How long the master ref from the API root is reused.
const MASTER_REF_TTL: Duration = Duration::from_secs(5);

/// Trait for reads against the headless content API.
///
/// Abstracted as a trait so tests can use a mock without a real repository.
/// Errors are surfaced unchanged; nothing here retries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// Run a document search.
    async fn query(&self, query: SearchQuery) -> Result<SearchResponse, AppError>;

    /// Replay a pagination cursor (the `next_page` URL of a previous response).
    async fn fetch_page(&self, cursor: &str) -> Result<SearchResponse, AppError>;

    /// Fetch a single document of `doc_type` by UID.
    ///
    /// Returns `AppError::NotFound` if no document matches.
    async fn get_by_uid(
        &self,
        doc_type: &str,
        uid: &str,
        revision: Revision,
    ) -> Result<RawDocument, AppError>;

    /// Look up `document_id` as seen through the preview ref `token`.
    ///
    /// Returns `None` if the document is absent under that ref or the ref is
    /// rejected upstream.
    async fn preview_document(
        &self,
        token: &str,
        document_id: &str,
    ) -> Result<Option<RawDocument>, AppError>;
}

/// Prismic REST API v2 implementation of ContentApi.
pub struct PrismicClient {
    http: reqwest::Client,
    endpoint: Url,
    access_token: Option<String>,
    master_ref: RwLock<Option<(String, Instant)>>,
}

impl PrismicClient {
    /// Create a client for the API root at `endpoint`.
    pub fn new(endpoint: &str, access_token: Option<String>) -> Result<Self, AppError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| AppError::Config(format!("Invalid content API endpoint '{endpoint}': {e}")))?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("spacetraveling/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            access_token,
            master_ref: RwLock::new(None),
        })
    }

    pub fn from_settings(settings: &PrismicSettings) -> Result<Self, AppError> {
        Self::new(&settings.endpoint, settings.access_token.clone())
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn root_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        if let Some(token) = &self.access_token {
            url.query_pairs_mut().append_pair("access_token", token);
        }
        url
    }

    fn search_url(&self, query: &SearchQuery, reference: &str) -> Result<Url, AppError> {
        let base = format!(
            "{}/documents/search",
            self.endpoint.as_str().trim_end_matches('/')
        );
        let mut url = Url::parse(&base)
            .map_err(|e| AppError::Internal(format!("Failed to build search URL: {e}")))?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("ref", reference);
            for (key, value) in query.to_params() {
                pairs.append_pair(key, &value);
            }
            if let Some(token) = &self.access_token {
                pairs.append_pair("access_token", token);
            }
        }

        Ok(url)
    }

    /// The ref of the currently published content, cached briefly.
    async fn master_ref(&self) -> Result<String, AppError> {
        if let Some((reference, fetched_at)) = self.master_ref.read().await.as_ref() {
            if fetched_at.elapsed() < MASTER_REF_TTL {
                return Ok(reference.clone());
            }
        }

        let root: ApiRoot = self.get_json(self.root_url()).await?;
        let reference = root
            .master_ref()
            .ok_or_else(|| AppError::Upstream("API root has no master ref".into()))?
            .to_string();

        *self.master_ref.write().await = Some((reference.clone(), Instant::now()));
        Ok(reference)
    }

    async fn resolve_ref(&self, revision: &Revision) -> Result<String, AppError> {
        match revision {
            Revision::Master => self.master_ref().await,
            Revision::Ref(reference) => Ok(reference.clone()),
        }
    }

    async fn send(&self, url: &Url) -> Result<reqwest::Response, AppError> {
        tracing::debug!(path = url.path(), "Content API request");
        Ok(self.http.get(url.clone()).send().await?)
    }

    async fn decode<T: DeserializeOwned>(
        url: &Url,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "{status} from {}: {body}",
                url.path()
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::MalformedDocument(format!("{}: {e}", url.path())))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, AppError> {
        let response = self.send(&url).await?;
        Self::decode(&url, response).await
    }
}

#[async_trait]
impl ContentApi for PrismicClient {
    async fn query(&self, query: SearchQuery) -> Result<SearchResponse, AppError> {
        let reference = self.resolve_ref(&query.revision).await?;
        let url = self.search_url(&query, &reference)?;
        self.get_json(url).await
    }

    async fn fetch_page(&self, cursor: &str) -> Result<SearchResponse, AppError> {
        let url = Url::parse(cursor)
            .map_err(|e| AppError::BadRequest(format!("Invalid cursor '{cursor}': {e}")))?;
        self.get_json(url).await
    }

    async fn get_by_uid(
        &self,
        doc_type: &str,
        uid: &str,
        revision: Revision,
    ) -> Result<RawDocument, AppError> {
        let query = SearchQuery::new(vec![Predicate::uid(doc_type, uid)]).revision(revision);

        self.query(query)
            .await?
            .results
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("{doc_type} '{uid}'")))
    }

    async fn preview_document(
        &self,
        token: &str,
        document_id: &str,
    ) -> Result<Option<RawDocument>, AppError> {
        let query = SearchQuery::new(vec![Predicate::document_id(document_id)]);
        let url = self.search_url(&query, token)?;
        let response = self.send(&url).await?;

        let status = response.status();
        if status == reqwest::StatusCode::BAD_REQUEST || status == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!(%status, "Preview ref rejected upstream");
            return Ok(None);
        }

        let page: SearchResponse = Self::decode(&url, response).await?;
        Ok(page.results.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::predicate::Ordering;

    fn client(token: Option<&str>) -> PrismicClient {
        PrismicClient::new(
            "https://blog.cdn.prismic.io/api/v2",
            token.map(str::to_string),
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_endpoint() {
        assert!(matches!(
            PrismicClient::new("::nope::", None),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_search_url() {
        let query = SearchQuery::new(vec![Predicate::document_type("posts")])
            .page_size(5)
            .order_by(Ordering::desc("document.first_publication_date"));

        let url = client(Some("secret")).search_url(&query, "master-ref").unwrap();
        assert_eq!(url.path(), "/api/v2/documents/search");

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("ref".to_string(), "master-ref".to_string()));
        assert!(pairs.contains(&(
            "q".to_string(),
            r#"[[at(document.type, "posts")]]"#.to_string()
        )));
        assert!(pairs.contains(&("pageSize".to_string(), "5".to_string())));
        assert!(pairs.contains(&(
            "orderings".to_string(),
            "[document.first_publication_date desc]".to_string()
        )));
        assert!(pairs.contains(&("access_token".to_string(), "secret".to_string())));
    }

    #[test]
    fn test_search_url_without_token() {
        let query = SearchQuery::new(vec![Predicate::document_id("abc")]);
        let url = client(None).search_url(&query, "preview-ref").unwrap();
        assert!(!url.query_pairs().any(|(k, _)| k == "access_token"));
    }

    #[test]
    fn test_root_url_carries_token() {
        let url = client(Some("secret")).root_url();
        assert_eq!(url.path(), "/api/v2");
        assert_eq!(url.query(), Some("access_token=secret"));
    }

    #[tokio::test]
    async fn test_fetch_page_rejects_garbage_cursor() {
        let result = client(None).fetch_page("not a url").await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
