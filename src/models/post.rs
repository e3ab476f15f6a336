use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::models::RawDocument;
use crate::error::AppError;

/// A listed post, as shown on the home page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSummary {
    pub uid: String,
    pub first_published_at: Option<DateTime<Utc>>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
}

/// A single rich-text fragment of a content block.
///
/// Only the fields the block renderer and the reading-time estimate need are
/// kept; inline spans are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichTextSegment {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
    /// Image source, for `image` segments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

/// A heading followed by its body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(default)]
    pub heading: Option<String>,
    #[serde(default)]
    pub body: Vec<RichTextSegment>,
}

/// A full post, as shown on its own page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDetail {
    pub uid: String,
    pub first_published_at: Option<DateTime<Utc>>,
    pub last_published_at: Option<DateTime<Utc>>,
    pub title: String,
    pub author: String,
    pub banner_url: Option<String>,
    pub content: Vec<ContentBlock>,
}

impl ContentDetail {
    /// The revision timestamp to surface, if the post changed after publication.
    pub fn edited_at(&self) -> Option<DateTime<Utc>> {
        if self.last_published_at != self.first_published_at {
            self.last_published_at
        } else {
            None
        }
    }
}

/// A previous/next link target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neighbor {
    pub uid: String,
    pub title: String,
}

/// Chronological neighbors of a post; either end may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Navigation {
    pub previous: Option<Neighbor>,
    pub next: Option<Neighbor>,
}

// -- Upstream `data` shapes --

#[derive(Debug, Deserialize)]
struct SummaryData {
    title: Option<String>,
    #[serde(default)]
    subtitle: Option<String>,
    author: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BannerData {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailData {
    title: Option<String>,
    author: Option<String>,
    #[serde(default)]
    banner: Option<BannerData>,
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct TitleData {
    title: Option<String>,
}

fn require_uid(doc: &RawDocument) -> Result<String, AppError> {
    doc.uid
        .clone()
        .filter(|uid| !uid.is_empty())
        .ok_or_else(|| AppError::MalformedDocument(format!("document '{}' has no uid", doc.id)))
}

fn require_field(doc: &RawDocument, name: &str, value: Option<String>) -> Result<String, AppError> {
    value.ok_or_else(|| {
        AppError::MalformedDocument(format!("document '{}' is missing '{name}'", doc.id))
    })
}

fn parse_data<T: serde::de::DeserializeOwned>(doc: &RawDocument) -> Result<T, AppError> {
    serde_json::from_value(doc.data.clone())
        .map_err(|e| AppError::MalformedDocument(format!("document '{}': {e}", doc.id)))
}

impl TryFrom<&RawDocument> for ContentSummary {
    type Error = AppError;

    fn try_from(doc: &RawDocument) -> Result<Self, Self::Error> {
        let data: SummaryData = parse_data(doc)?;
        Ok(Self {
            uid: require_uid(doc)?,
            first_published_at: doc.first_published_at()?,
            title: require_field(doc, "title", data.title)?,
            subtitle: data.subtitle.unwrap_or_default(),
            author: require_field(doc, "author", data.author)?,
        })
    }
}

impl TryFrom<&RawDocument> for ContentDetail {
    type Error = AppError;

    fn try_from(doc: &RawDocument) -> Result<Self, Self::Error> {
        let data: DetailData = parse_data(doc)?;
        Ok(Self {
            uid: require_uid(doc)?,
            first_published_at: doc.first_published_at()?,
            last_published_at: doc.last_published_at()?,
            title: require_field(doc, "title", data.title)?,
            author: require_field(doc, "author", data.author)?,
            banner_url: data.banner.and_then(|b| b.url),
            content: data.content,
        })
    }
}

impl TryFrom<&RawDocument> for Neighbor {
    type Error = AppError;

    fn try_from(doc: &RawDocument) -> Result<Self, Self::Error> {
        let data: TitleData = parse_data(doc)?;
        Ok(Self {
            uid: require_uid(doc)?,
            title: require_field(doc, "title", data.title)?,
        })
    }
}

/// Project a page of raw documents into summaries, skipping malformed ones.
pub fn project_summaries(docs: &[RawDocument]) -> Vec<ContentSummary> {
    docs.iter()
        .filter_map(|doc| match ContentSummary::try_from(doc) {
            Ok(summary) => Some(summary),
            Err(e) => {
                tracing::warn!("Skipping listed document: {e}");
                None
            }
        })
        .collect()
}
