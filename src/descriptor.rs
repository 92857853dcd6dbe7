//! Document descriptors supplied by the surrounding UI layer
//!
//! The collaborator sends documents in a loosely-shaped JSON form; the
//! direct-URL field in particular appears under several historical names.
//! Serde aliases normalize all of them into one struct.

use serde::Deserialize;

/// Reference to a remotely stored document.
///
/// Immutable once constructed. The locator is either an explicit remote
/// storage path (`s3_path`), a direct URL, or neither, in which case the
/// backend's id-keyed download endpoint is used.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentDescriptor {
    /// Stable document identifier, used as the cache key
    pub id: String,

    /// Original filename, used for classification fallback and uploads
    pub original_filename: String,

    /// Declared content type, if the collaborator knows it
    #[serde(default)]
    pub file_type: Option<String>,

    /// Direct download URL (collaborators disagree on the field name)
    #[serde(
        default,
        alias = "download_url",
        alias = "file_url",
        alias = "s3_url"
    )]
    pub url: Option<String>,

    /// Remote storage path requiring a download-URL-building step
    #[serde(default)]
    pub s3_path: Option<String>,
}

impl DocumentDescriptor {
    /// Descriptor with only an id and filename, no locator hints.
    pub fn new(id: impl Into<String>, original_filename: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            original_filename: original_filename.into(),
            file_type: None,
            url: None,
            s3_path: None,
        }
    }

    pub fn with_file_type(mut self, file_type: impl Into<String>) -> Self {
        self.file_type = Some(file_type.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_s3_path(mut self, s3_path: impl Into<String>) -> Self {
        self.s3_path = Some(s3_path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_minimal_shape() {
        let doc: DocumentDescriptor =
            serde_json::from_str(r#"{"id": "d1", "original_filename": "a.pdf"}"#).unwrap();
        assert_eq!(doc.id, "d1");
        assert!(doc.file_type.is_none());
        assert!(doc.url.is_none());
        assert!(doc.s3_path.is_none());
    }

    #[test]
    fn test_deserializes_url_aliases() {
        for field in ["url", "download_url", "file_url", "s3_url"] {
            let json = format!(
                r#"{{"id": "d1", "original_filename": "a.png", "{}": "https://cdn/a.png"}}"#,
                field
            );
            let doc: DocumentDescriptor = serde_json::from_str(&json).unwrap();
            assert_eq!(doc.url.as_deref(), Some("https://cdn/a.png"), "alias {}", field);
        }
    }
}
