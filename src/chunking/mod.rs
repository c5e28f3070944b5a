//! Text chunking for breaking document text into searchable segments.
//!
//! Splits text into overlapping fixed-size chunks. Break points prefer
//! separators in order: paragraph, sentence, word, then a hard character
//! cut, so chunks never split mid-word where avoidable.

use serde::{Deserialize, Serialize};

/// A chunk of text from a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextChunk {
    /// Text content of this chunk.
    pub content: String,
    /// Char offset of the chunk start in the source text.
    pub start: usize,
    /// Char offset one past the chunk end.
    pub end: usize,
    /// Page the chunk starts on, when known.
    pub page_number: Option<u32>,
    /// Order of this chunk in the document.
    pub order: i32,
}

/// Configuration for chunking.
#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Overlap between adjacent chunks in characters.
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 600,
            chunk_overlap: 50,
        }
    }
}

/// Split text into overlapping chunks.
///
/// Adjacent chunks share `chunk_overlap` characters; consecutive chunk
/// ranges cover the source text with no gaps, so the original text can be
/// reconstructed from the ranges. Every chunk is at most `chunk_size`
/// characters.
pub fn split_text(text: &str, config: &ChunkingConfig) -> Vec<TextChunk> {
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();
    if total == 0 {
        return Vec::new();
    }

    let size = config.chunk_size.max(1);
    // Overlap must be smaller than the chunk size or no forward progress is possible.
    let overlap = config.chunk_overlap.min(size.saturating_sub(1));

    let mut chunks = Vec::new();
    let mut start = 0usize;
    let mut order = 0i32;

    loop {
        if total - start <= size {
            chunks.push(make_chunk(&chars, start, total, order));
            break;
        }

        let hard_end = start + size;
        // The break must land past the overlap region so the next start advances.
        let min_end = start + overlap + 1;
        let end = find_break(&chars, start, min_end, hard_end);

        chunks.push(make_chunk(&chars, start, end, order));
        order += 1;
        start = end - overlap;
    }

    chunks
}

fn make_chunk(chars: &[char], start: usize, end: usize, order: i32) -> TextChunk {
    TextChunk {
        content: chars[start..end].iter().collect(),
        start,
        end,
        page_number: None,
        order,
    }
}

/// Find the best break point in `(min_end..=hard_end)`, trying separators
/// from coarsest to finest. The separator stays attached to the earlier
/// chunk. Falls back to a hard cut at `hard_end`.
fn find_break(chars: &[char], start: usize, min_end: usize, hard_end: usize) -> usize {
    const PARAGRAPH: &[&[char]] = &[&['\n', '\n']];
    const SENTENCE: &[&[char]] = &[&['.', ' '], &['!', ' '], &['?', ' '], &['\n']];
    const WORD: &[&[char]] = &[&[' ']];

    for ladder in [PARAGRAPH, SENTENCE, WORD] {
        let best = ladder
            .iter()
            .filter_map(|sep| break_after_last(chars, sep, start, min_end, hard_end))
            .max();
        if let Some(end) = best {
            return end;
        }
    }

    hard_end
}

/// Position just after the last occurrence of `sep` whose end falls in
/// `[min_end, hard_end]`, scanning within the current window.
fn break_after_last(
    chars: &[char],
    sep: &[char],
    start: usize,
    min_end: usize,
    hard_end: usize,
) -> Option<usize> {
    let len = sep.len();
    if hard_end < len {
        return None;
    }

    let mut i = hard_end - len;
    loop {
        let end = i + len;
        if end < min_end || i < start {
            return None;
        }
        if chars[i..end] == *sep {
            return Some(end);
        }
        if i == 0 {
            return None;
        }
        i -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Rebuild the source text from chunk ranges, dropping overlaps.
    fn reconstruct(chunks: &[TextChunk]) -> String {
        let mut out = String::new();
        let mut covered = 0usize;
        for chunk in chunks {
            assert!(chunk.start <= covered, "gap before chunk {}", chunk.order);
            let skip = covered - chunk.start;
            out.extend(chunk.content.chars().skip(skip));
            covered = chunk.end;
        }
        out
    }

    #[test]
    fn test_short_text_single_chunk() {
        let config = ChunkingConfig::default();
        let chunks = split_text("A short paragraph.", &config);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "A short paragraph.");
        assert_eq!(chunks[0].order, 0);
    }

    #[test]
    fn test_empty_text_no_chunks() {
        let chunks = split_text("", &ChunkingConfig::default());
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_coverage_and_size_bounds() {
        let text = "Photosynthesis converts light into chemical energy. Chlorophyll absorbs light.";
        let config = ChunkingConfig {
            chunk_size: 40,
            chunk_overlap: 5,
        };

        let chunks = split_text(text, &config);

        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert!(chunk.content.chars().count() <= 40);
        }
        assert_eq!(reconstruct(&chunks), text);

        // Adjacent chunks overlap at the boundary
        for pair in chunks.windows(2) {
            assert_eq!(pair[1].start, pair[0].end - 5);
        }
    }

    #[test]
    fn test_breaks_prefer_word_boundaries() {
        let text = "one two three four five six seven eight nine ten eleven twelve";
        let config = ChunkingConfig {
            chunk_size: 20,
            chunk_overlap: 4,
        };

        let chunks = split_text(text, &config);

        assert!(chunks.len() > 1);
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(
                chunk.content.ends_with(' '),
                "chunk {:?} should end at a word boundary",
                chunk.content
            );
        }
        assert_eq!(reconstruct(&chunks), text);
    }

    #[test]
    fn test_paragraph_break_preferred() {
        let text = "First paragraph here.\n\nSecond paragraph continues with more words after.";
        let config = ChunkingConfig {
            chunk_size: 40,
            chunk_overlap: 5,
        };

        let chunks = split_text(text, &config);

        assert!(chunks[0].content.ends_with("\n\n"));
        assert_eq!(reconstruct(&chunks), text);
    }

    #[test]
    fn test_hard_cut_without_separators() {
        let text = "x".repeat(100);
        let config = ChunkingConfig {
            chunk_size: 30,
            chunk_overlap: 5,
        };

        let chunks = split_text(&text, &config);

        for chunk in &chunks {
            assert!(chunk.content.chars().count() <= 30);
        }
        assert_eq!(reconstruct(&chunks), text);
    }

    #[test]
    fn test_overlap_clamped_below_chunk_size() {
        let text = "abcdefghijklmnopqrstuvwxyz";
        let config = ChunkingConfig {
            chunk_size: 10,
            chunk_overlap: 10,
        };

        let chunks = split_text(text, &config);

        // Clamped overlap still makes forward progress
        assert!(chunks.len() >= 2);
        assert_eq!(reconstruct(&chunks), text);
    }

    #[test]
    fn test_unicode_boundaries() {
        let text = "día tras día los árboles crecían más y más altos en el jardín botánico";
        let config = ChunkingConfig {
            chunk_size: 25,
            chunk_overlap: 5,
        };

        let chunks = split_text(text, &config);
        assert_eq!(reconstruct(&chunks), text);
    }
}
