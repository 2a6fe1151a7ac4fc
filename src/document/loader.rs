use std::path::Path;

use crate::document::{DocumentSegment, SegmentMetadata};
use crate::error::{RagError, Result};

const PDF_SIGNATURE: &[u8] = b"%PDF-";

/// Turns a stored file into text segments.
pub trait DocumentLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Vec<DocumentSegment>>;
}

/// PDF loader backed by `pdf-extract`, one segment per page.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfLoader;

impl DocumentLoader for PdfLoader {
    fn load(&self, path: &Path) -> Result<Vec<DocumentSegment>> {
        let bytes = std::fs::read(path)?;

        if !bytes.starts_with(PDF_SIGNATURE) {
            return Err(RagError::Parse(format!(
                "{} is not a PDF document",
                path.display()
            )));
        }

        // pdf-extract panics on some malformed inputs instead of returning Err.
        let pages = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(&bytes))
            .map_err(|_| RagError::Parse(format!("Malformed PDF: {}", path.display())))?
            .map_err(|e| RagError::Parse(format!("Failed to extract text from {}: {}", path.display(), e)))?;

        let segments = page_segments(pages, path);
        log::info!(
            "Loaded {} page segment(s) from {}",
            segments.len(),
            path.display()
        );
        Ok(segments)
    }
}

/// One segment per non-blank page, numbered by position in `pages`. Page
/// text is kept as extracted, so chunk offsets index into it directly.
pub fn page_segments<I, S>(pages: I, source: &Path) -> Vec<DocumentSegment>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let pages: Vec<String> = pages.into_iter().map(Into::into).collect();
    let total_pages = pages.len();

    pages
        .into_iter()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(i, text)| DocumentSegment {
            text,
            metadata: SegmentMetadata {
                source: source.to_path_buf(),
                page: i + 1,
                total_pages,
            },
        })
        .collect()
}

/// Form-feed separated text, as plain-text exports write it.
pub fn split_pages(text: &str, source: &Path) -> Vec<DocumentSegment> {
    page_segments(text.split('\x0C'), source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    /// Minimal PDF with one Helvetica text line per page; an empty string
    /// gives a page with an empty content stream.
    fn build_pdf(pages: &[&str]) -> Vec<u8> {
        let mut objects: Vec<String> = Vec::new();
        let page_count = pages.len();
        let font_id = 3 + 2 * page_count;

        let kids: Vec<String> = (0..page_count).map(|i| format!("{} 0 R", 3 + 2 * i)).collect();
        objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
        objects.push(format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids.join(" "), page_count));

        for (i, text) in pages.iter().enumerate() {
            let content_id = 4 + 2 * i;
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 {} 0 R >> >> /Contents {} 0 R >>",
                font_id, content_id
            ));
            let stream = if text.is_empty() {
                String::new()
            } else {
                format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", text)
            };
            objects.push(format!("<< /Length {} >>\nstream\n{}\nendstream", stream.len(), stream));
        }
        objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_string());

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, object) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, object).as_bytes());
        }

        let xref_offset = pdf.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            xref.push_str(&format!("{:010} 00000 n \n", offset));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        ));
        pdf.extend_from_slice(xref.as_bytes());
        pdf
    }

    #[test]
    fn test_pdf_pages_become_separate_segments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("three.pdf");
        std::fs::write(&path, build_pdf(&["Alpha page one", "Bravo page two", "Charlie page three"])).unwrap();

        let segments = PdfLoader.load(&path).unwrap();

        assert_eq!(segments.len(), 3);
        for (segment, (page, text)) in segments
            .iter()
            .zip([(1, "Alpha page one"), (2, "Bravo page two"), (3, "Charlie page three")])
        {
            assert_eq!(segment.metadata.page, page);
            assert_eq!(segment.metadata.total_pages, 3);
            assert_eq!(segment.metadata.source, path);
            assert!(segment.text.contains(text), "page {} was {:?}", page, segment.text);
        }
        assert!(!segments[0].text.contains("Bravo"));
    }

    #[test]
    fn test_blank_pdf_page_is_skipped_but_counted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gap.pdf");
        std::fs::write(&path, build_pdf(&["Opening remarks", "", "Closing remarks"])).unwrap();

        let segments = PdfLoader.load(&path).unwrap();

        let pages: Vec<usize> = segments.iter().map(|s| s.metadata.page).collect();
        assert_eq!(pages, vec![1, 3]);
        assert!(segments.iter().all(|s| s.metadata.total_pages == 3));
    }

    #[test]
    fn test_split_pages_on_form_feed() {
        let source = PathBuf::from("document_store/pdfs/report.pdf");
        let segments = split_pages("First page\x0C\n  \x0CThird page\n", &source);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "First page");
        assert_eq!(segments[0].metadata.page, 1);
        assert_eq!(segments[1].text, "Third page\n");
        assert_eq!(segments[1].metadata.page, 3);
        assert!(segments.iter().all(|s| s.metadata.total_pages == 3));
        assert!(segments.iter().all(|s| s.metadata.source == source));
    }

    #[test]
    fn test_page_text_is_kept_as_extracted() {
        let segments = page_segments(["  just one page  "], Path::new("a.pdf"));
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "  just one page  ");
        assert_eq!(segments[0].metadata.page, 1);
        assert_eq!(segments[0].metadata.total_pages, 1);
    }

    #[test]
    fn test_split_pages_blank_text_yields_nothing() {
        assert!(split_pages(" \n\x0C\t", Path::new("a.pdf")).is_empty());
    }

    #[test]
    fn test_non_pdf_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.pdf");
        std::fs::write(&path, b"plain text pretending to be a pdf").unwrap();

        let result = PdfLoader.load(&path);
        assert!(matches!(result, Err(RagError::Parse(_))));
    }

    #[test]
    fn test_corrupt_pdf_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"%PDF-1.4\nthis is not a valid object graph").unwrap();

        let result = PdfLoader.load(&path);
        assert!(matches!(result, Err(RagError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = PdfLoader.load(&dir.path().join("absent.pdf"));
        assert!(matches!(result, Err(RagError::Io(_))));
    }
}
