//! Media kind classification
//!
//! Pure, total function from a document descriptor to a media kind.
//! The declared content type is consulted first; when it is absent or
//! inconclusive the filename extension decides. Anything unmatched is
//! `Unknown` and the orchestrators skip it silently.

use crate::descriptor::DocumentDescriptor;

/// Canonical Office MIME types recognized alongside substring matches.
const MIME_DOC: &str = "application/msword";
const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Media kind of a document, as far as preview handling is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Pdf,
    OfficeDocument,
    Unknown,
}

/// Classify a descriptor into a media kind.
///
/// No network access, no side effects. Unmatched input yields
/// [`MediaKind::Unknown`], which is not an error.
pub fn classify(doc: &DocumentDescriptor) -> MediaKind {
    if let Some(declared) = doc.file_type.as_deref() {
        let declared = declared.to_ascii_lowercase();
        if declared.contains("image") {
            return MediaKind::Image;
        }
        if declared.contains("pdf") {
            return MediaKind::Pdf;
        }
        if declared.contains("word")
            || declared.contains("document")
            || declared == MIME_DOC
            || declared == MIME_DOCX
        {
            return MediaKind::OfficeDocument;
        }
    }

    match extension(&doc.original_filename).as_deref() {
        Some("jpg" | "jpeg" | "png" | "gif" | "webp") => MediaKind::Image,
        Some("pdf") => MediaKind::Pdf,
        Some("doc" | "docx") => MediaKind::OfficeDocument,
        _ => MediaKind::Unknown,
    }
}

fn extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(filename: &str, file_type: Option<&str>) -> DocumentDescriptor {
        let mut d = DocumentDescriptor::new("id", filename);
        d.file_type = file_type.map(String::from);
        d
    }

    #[test]
    fn test_declared_type_wins() {
        assert_eq!(classify(&doc("x.bin", Some("image/png"))), MediaKind::Image);
        assert_eq!(classify(&doc("x.bin", Some("application/pdf"))), MediaKind::Pdf);
        assert_eq!(classify(&doc("x.bin", Some(MIME_DOCX))), MediaKind::OfficeDocument);
        assert_eq!(classify(&doc("x.bin", Some(MIME_DOC))), MediaKind::OfficeDocument);
    }

    #[test]
    fn test_agreeing_signals_are_consistent() {
        // Either signal alone must produce the same answer.
        assert_eq!(classify(&doc("readme.PDF", Some("application/pdf"))), MediaKind::Pdf);
        assert_eq!(classify(&doc("readme.PDF", None)), MediaKind::Pdf);
    }

    #[test]
    fn test_extension_fallback_is_case_insensitive() {
        assert_eq!(classify(&doc("photo.JPEG", None)), MediaKind::Image);
        assert_eq!(classify(&doc("scan.WebP", None)), MediaKind::Image);
        assert_eq!(classify(&doc("memo.DocX", None)), MediaKind::OfficeDocument);
    }

    #[test]
    fn test_inconclusive_declared_type_falls_back_to_extension() {
        assert_eq!(
            classify(&doc("report.docx", Some("application/octet-stream"))),
            MediaKind::OfficeDocument
        );
    }

    #[test]
    fn test_unmatched_input_is_unknown_not_error() {
        assert_eq!(classify(&doc("archive.zip", None)), MediaKind::Unknown);
        assert_eq!(classify(&doc("noextension", None)), MediaKind::Unknown);
        assert_eq!(classify(&doc(".hidden", None)), MediaKind::Unknown);
        assert_eq!(classify(&doc("x.mp4", Some("video/mp4"))), MediaKind::Unknown);
    }
}
