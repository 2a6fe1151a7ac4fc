use crate::document::{Chunk, DocumentSegment};
use crate::error::{RagError, Result};

/// Fixed-window character splitter. Windows overlap their predecessor by
/// `overlap` characters and never cross segment boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextChunker {
    max_size: usize,
    overlap: usize,
}

impl TextChunker {
    pub fn new(max_size: usize, overlap: usize) -> Result<Self> {
        if max_size == 0 {
            return Err(RagError::Config("chunk size must be greater than zero".to_string()));
        }
        if overlap >= max_size {
            return Err(RagError::Config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                overlap, max_size
            )));
        }
        Ok(Self { max_size, overlap })
    }

    pub fn chunk(&self, segments: &[DocumentSegment]) -> Vec<Chunk> {
        segments
            .iter()
            .flat_map(|segment| {
                self.split_text(&segment.text)
                    .into_iter()
                    .map(move |(start_index, text)| Chunk {
                        text,
                        start_index,
                        metadata: segment.metadata.clone(),
                    })
            })
            .collect()
    }

    /// Returns `(start_offset, window)` pairs; offsets count characters.
    pub fn split_text(&self, text: &str) -> Vec<(usize, String)> {
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_count = boundaries.len() - 1;

        let mut windows = Vec::new();
        let mut start = 0;
        while start < char_count {
            let end = (start + self.max_size).min(char_count);
            windows.push((start, text[boundaries[start]..boundaries[end]].to_string()));
            if end == char_count {
                break;
            }
            start = end - self.overlap;
        }
        windows
    }
}

/// Convenience wrapper over [`TextChunker`].
pub fn chunk(segments: &[DocumentSegment], max_size: usize, overlap: usize) -> Result<Vec<Chunk>> {
    Ok(TextChunker::new(max_size, overlap)?.chunk(segments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SegmentMetadata;
    use std::path::PathBuf;

    fn segment(text: &str, page: usize) -> DocumentSegment {
        DocumentSegment {
            text: text.to_string(),
            metadata: SegmentMetadata {
                source: PathBuf::from("document_store/pdfs/paper.pdf"),
                page,
                total_pages: 3,
            },
        }
    }

    fn sample_text(len: usize) -> String {
        "the quick brown fox jumps over the lazy dog. "
            .chars()
            .cycle()
            .take(len)
            .collect()
    }

    /// Rebuilds the source text by dropping each chunk's overlapping head.
    fn reconstruct(chunks: &[Chunk], overlap: usize) -> String {
        let mut text = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            if i == 0 {
                text.push_str(&chunk.text);
            } else {
                text.extend(chunk.text.chars().skip(overlap));
            }
        }
        text
    }

    #[test]
    fn test_2500_chars_yield_offsets_0_800_1600() {
        let chunks = chunk(&[segment(&sample_text(2500), 1)], 1000, 200).unwrap();

        let offsets: Vec<usize> = chunks.iter().map(|c| c.start_index).collect();
        assert_eq!(offsets, vec![0, 800, 1600]);
        assert_eq!(chunks[0].text.chars().count(), 1000);
        assert_eq!(chunks[1].text.chars().count(), 1000);
        assert_eq!(chunks[2].text.chars().count(), 900);
    }

    #[test]
    fn test_chunks_reconstruct_text_and_share_overlap() {
        let chunker = TextChunker::new(120, 30).unwrap();
        for len in [1, 119, 120, 121, 240, 1000, 1337] {
            let text = sample_text(len);
            let chunks = chunker.chunk(&[segment(&text, 1)]);

            assert_eq!(reconstruct(&chunks, 30), text, "len {}", len);
            assert!(chunks.iter().all(|c| !c.text.is_empty()));
            assert!(chunks.iter().all(|c| c.text.chars().count() <= 120));

            for pair in chunks.windows(2) {
                let tail: String = pair[0].text.chars().skip(pair[0].text.chars().count() - 30).collect();
                let head: String = pair[1].text.chars().take(30).collect();
                assert_eq!(tail, head);
            }
        }
    }

    #[test]
    fn test_chunks_do_not_cross_segments() {
        let segments = vec![segment(&sample_text(1500), 1), segment(&sample_text(300), 2)];
        let chunks = chunk(&segments, 1000, 200).unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].metadata.page, 1);
        assert_eq!(chunks[1].metadata.page, 1);
        assert_eq!(chunks[1].start_index, 800);
        assert_eq!(chunks[2].metadata.page, 2);
        assert_eq!(chunks[2].start_index, 0);
        assert_eq!(chunks[2].text, sample_text(300));
    }

    #[test]
    fn test_offsets_count_characters_not_bytes() {
        let text = "é".repeat(15);
        let chunker = TextChunker::new(10, 5).unwrap();
        let windows = chunker.split_text(&text);

        assert_eq!(windows, vec![(0, "é".repeat(10)), (5, "é".repeat(10))]);
    }

    #[test]
    fn test_empty_segment_yields_no_chunks() {
        let chunks = chunk(&[segment("", 1)], 1000, 200).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert!(TextChunker::new(0, 0).is_err());
        assert!(TextChunker::new(100, 100).is_err());
        assert!(TextChunker::new(100, 99).is_ok());
    }
}
