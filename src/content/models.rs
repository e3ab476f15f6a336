use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::AppError;

/// A document as returned by the content API, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDocument {
    /// Internal, upstream-assigned document id.
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: String,
    /// Kept as sent; parsed per document so one bad value only rejects its own item.
    #[serde(default)]
    pub first_publication_date: Option<String>,
    #[serde(default)]
    pub last_publication_date: Option<String>,
    /// Custom type fields; shape depends on the type and the `fetch` option.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl RawDocument {
    pub fn first_published_at(&self) -> Result<Option<DateTime<Utc>>, AppError> {
        self.publication_date("first_publication_date", self.first_publication_date.as_deref())
    }

    pub fn last_published_at(&self) -> Result<Option<DateTime<Utc>>, AppError> {
        self.publication_date("last_publication_date", self.last_publication_date.as_deref())
    }

    fn publication_date(
        &self,
        field: &str,
        value: Option<&str>,
    ) -> Result<Option<DateTime<Utc>>, AppError> {
        match value {
            None => Ok(None),
            Some(value) => parse_upstream_date(value).map(Some).ok_or_else(|| {
                AppError::MalformedDocument(format!(
                    "document '{}' has an invalid {field} '{value}'",
                    self.id
                ))
            }),
        }
    }
}

/// One page of search results.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub results_per_page: u32,
    #[serde(default)]
    pub total_results_size: u32,
    #[serde(default)]
    pub total_pages: u32,
    /// Ready-made request URL for the following page; `None` on the last page.
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub prev_page: Option<String>,
    #[serde(default)]
    pub results: Vec<RawDocument>,
}

fn first_page() -> u32 {
    1
}

/// The API root document; only the refs are used.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRoot {
    pub refs: Vec<ApiRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiRef {
    pub id: String,
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "isMasterRef", default)]
    pub is_master_ref: bool,
}

impl ApiRoot {
    pub fn master_ref(&self) -> Option<&str> {
        self.refs
            .iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference.as_str())
    }
}

/// Parse an upstream timestamp.
///
/// The API emits `2021-03-25T19:25:28+0000`; RFC 3339 is accepted as well.
pub fn parse_upstream_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_upstream_date_offset_format() {
        let parsed = parse_upstream_date("2021-03-25T19:25:28+0000").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2021, 3, 25, 19, 25, 28).unwrap());
    }

    #[test]
    fn test_parse_upstream_date_converts_to_utc() {
        let parsed = parse_upstream_date("2021-03-25T16:25:28-0300").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2021, 3, 25, 19, 25, 28).unwrap());
    }

    #[test]
    fn test_parse_upstream_date_rfc3339() {
        assert!(parse_upstream_date("2021-03-25T19:25:28Z").is_some());
        assert!(parse_upstream_date("yesterday").is_none());
    }

    #[test]
    fn test_search_response_deserialization() {
        let json = r#"{
            "page": 1,
            "results_per_page": 5,
            "results_size": 1,
            "total_results_size": 6,
            "total_pages": 2,
            "next_page": "https://blog.cdn.prismic.io/api/v2/documents/search?page=2",
            "prev_page": null,
            "results": [{
                "id": "YF0g",
                "uid": "como-utilizar-hooks",
                "type": "posts",
                "first_publication_date": "2021-03-15T19:25:28+0000",
                "last_publication_date": "2021-03-25T19:25:28+0000",
                "data": {"title": "Como utilizar Hooks", "author": "Joseph Oliveira"}
            }]
        }"#;

        let response: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.total_pages, 2);
        assert!(response.next_page.is_some());
        let doc = &response.results[0];
        assert_eq!(doc.uid.as_deref(), Some("como-utilizar-hooks"));
        assert_eq!(doc.doc_type, "posts");
        let first = doc.first_published_at().unwrap().unwrap();
        let last = doc.last_published_at().unwrap().unwrap();
        assert!(first < last);
    }

    #[test]
    fn test_unpublished_draft_has_no_dates() {
        let json = r#"{"id": "X", "type": "posts", "first_publication_date": null, "data": {}}"#;
        let doc: RawDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.first_published_at().unwrap(), None);
        assert_eq!(doc.last_published_at().unwrap(), None);
        assert!(doc.uid.is_none());
    }

    #[test]
    fn test_master_ref() {
        let json = r#"{"refs": [
            {"id": "release", "ref": "R1", "label": "Spring", "isMasterRef": false},
            {"id": "master", "ref": "M1", "label": "Master", "isMasterRef": true}
        ]}"#;
        let root: ApiRoot = serde_json::from_str(json).unwrap();
        assert_eq!(root.master_ref(), Some("M1"));
    }

    #[test]
    fn test_bad_date_only_rejects_its_own_document() {
        let json = r#"{
            "page": 1,
            "results": [
                {"id": "good", "uid": "a", "type": "posts",
                 "first_publication_date": "2021-03-15T19:25:28+0000", "data": {}},
                {"id": "bad", "uid": "b", "type": "posts",
                 "first_publication_date": "not-a-date", "data": {}}
            ]
        }"#;

        let response: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.results.len(), 2);
        assert!(response.results[0].first_published_at().unwrap().is_some());
        match response.results[1].first_published_at() {
            Err(AppError::MalformedDocument(msg)) => assert!(msg.contains("not-a-date")),
            other => panic!("Expected MalformedDocument, got: {:?}", other),
        }
    }
}
