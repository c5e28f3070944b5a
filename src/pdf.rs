//! PDF text extraction.
//!
//! Extracts per-page text with lopdf and assembles it into a single string
//! while remembering where each page starts, so chunks can be attributed
//! back to a page.

use crate::error::{Result, TerpError};
use std::path::Path;
use tracing::{debug, instrument};

/// Text content of a single PDF page.
#[derive(Debug, Clone)]
pub struct PageText {
    /// 1-based page number.
    pub number: u32,
    /// Extracted text of the page.
    pub text: String,
}

/// Full text of a document with page boundaries.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    /// All page text joined with single spaces.
    pub full_text: String,
    /// (char offset of page start, page number), ascending by offset.
    page_offsets: Vec<(usize, u32)>,
}

impl ExtractedText {
    /// Assemble page texts into one string, recording page start offsets.
    pub fn from_pages(pages: Vec<PageText>) -> Self {
        let mut full_text = String::new();
        let mut page_offsets = Vec::with_capacity(pages.len());
        let mut offset = 0usize;

        for page in pages {
            if !full_text.is_empty() {
                full_text.push(' ');
                offset += 1;
            }
            page_offsets.push((offset, page.number));
            offset += page.text.chars().count();
            full_text.push_str(&page.text);
        }

        Self {
            full_text,
            page_offsets,
        }
    }

    /// The page containing the given char offset, if any.
    pub fn page_at(&self, char_offset: usize) -> Option<u32> {
        self.page_offsets
            .iter()
            .take_while(|(start, _)| *start <= char_offset)
            .last()
            .map(|(_, number)| *number)
    }
}

/// Extract the text of every page in a PDF file.
///
/// Pages with no readable text are skipped; a document with no readable
/// text at all is an error.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn extract_pages(path: &Path) -> Result<Vec<PageText>> {
    let document =
        lopdf::Document::load(path).map_err(|e| TerpError::Pdf(format!("{}: {}", path.display(), e)))?;

    let mut pages = Vec::new();
    for (page_no, _page_id) in document.get_pages() {
        let text = document
            .extract_text(&[page_no])
            .map_err(|e| TerpError::Pdf(format!("page {}: {}", page_no, e)))?;

        if !text.trim().is_empty() {
            pages.push(PageText {
                number: page_no,
                text,
            });
        }
    }

    if pages.is_empty() {
        return Err(TerpError::Pdf(format!(
            "no readable page text in {}",
            path.display()
        )));
    }

    debug!("Extracted {} pages", pages.len());
    Ok(pages)
}

/// Extract and assemble the full text of a PDF file.
pub fn extract_text(path: &Path) -> Result<ExtractedText> {
    let pages = extract_pages(path)?;
    Ok(ExtractedText::from_pages(pages))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pages_tracks_offsets() {
        let extracted = ExtractedText::from_pages(vec![
            PageText {
                number: 1,
                text: "First page.".to_string(),
            },
            PageText {
                number: 2,
                text: "Second page.".to_string(),
            },
        ]);

        assert_eq!(extracted.full_text, "First page. Second page.");
        assert_eq!(extracted.page_at(0), Some(1));
        assert_eq!(extracted.page_at(10), Some(1));
        // "Second page." starts after "First page." plus the joining space
        assert_eq!(extracted.page_at(12), Some(2));
        assert_eq!(extracted.page_at(999), Some(2));
    }

    #[test]
    fn test_from_pages_empty() {
        let extracted = ExtractedText::from_pages(Vec::new());
        assert!(extracted.full_text.is_empty());
        assert_eq!(extracted.page_at(0), None);
    }
}
