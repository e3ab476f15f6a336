use serde::{Deserialize, Serialize};

use crate::content::predicate::Revision;

/// Client-held marker meaning "render unpublished content as of `ref`".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewMarker {
    #[serde(rename = "ref")]
    pub reference: String,
}

impl PreviewMarker {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
        }
    }

    /// The content revision this marker selects.
    pub fn revision(&self) -> Revision {
        Revision::Ref(self.reference.clone())
    }

    /// Cookie-safe representation of the marker.
    pub fn encode(&self) -> String {
        urlencoding::encode(&self.reference).into_owned()
    }

    /// Parse a value produced by [`PreviewMarker::encode`].
    pub fn decode(value: &str) -> Option<Self> {
        urlencoding::decode(value)
            .ok()
            .filter(|reference| !reference.is_empty())
            .map(|reference| Self::new(reference.into_owned()))
    }
}

/// Revision to read given the (optional) active marker.
pub fn revision_for(marker: Option<&PreviewMarker>) -> Revision {
    marker.map(PreviewMarker::revision).unwrap_or_default()
}

/// Read access to the preview marker of the current request.
pub trait PreviewRead {
    fn marker(&self) -> Option<PreviewMarker>;

    fn is_active(&self) -> bool {
        self.marker().is_some()
    }
}

/// Write access to the preview marker; changes are carried by the response.
pub trait PreviewWrite: Sized {
    fn activate(self, marker: &PreviewMarker) -> Self;

    /// Clear the marker. A no-op if none is set.
    fn deactivate(self) -> Self;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_preview_url_ref() {
        let marker = PreviewMarker::new(
            "https://blog.prismic.io/previews/YGx2?websitePreviewId=YGx3",
        );
        let encoded = marker.encode();
        assert!(!encoded.contains('?'));
        assert!(!encoded.contains(';'));
        assert_eq!(PreviewMarker::decode(&encoded), Some(marker));
    }

    #[test]
    fn test_decode_empty_is_none() {
        assert_eq!(PreviewMarker::decode(""), None);
    }

    #[test]
    fn test_revision_for() {
        assert_eq!(revision_for(None), Revision::Master);
        let marker = PreviewMarker::new("draft-ref");
        assert_eq!(
            revision_for(Some(&marker)),
            Revision::Ref("draft-ref".to_string())
        );
    }

    #[test]
    fn test_marker_serializes_as_ref() {
        let json = serde_json::to_value(PreviewMarker::new("abc")).unwrap();
        assert_eq!(json, serde_json::json!({"ref": "abc"}));
    }
}
