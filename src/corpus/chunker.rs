//! Token-window chunker.
//!
//! Splits document text into overlapping fixed-size token windows. The
//! tokenizer sits behind a small codec trait so tests can substitute a
//! deterministic one; production wraps a HuggingFace `tokenizer.json`.

use std::path::Path;
use std::sync::Arc;

use tokenizers::Tokenizer;

use crate::core::errors::ApiError;

/// Encode/decode seam between the chunker and the tokenizer.
pub trait TokenCodec: Send + Sync {
    fn encode(&self, text: &str) -> Result<Vec<u32>, ApiError>;
    fn decode(&self, ids: &[u32]) -> Result<String, ApiError>;
}

/// Codec backed by a HuggingFace tokenizer file.
pub struct HfTokenCodec {
    inner: Tokenizer,
}

impl HfTokenCodec {
    pub fn from_file(path: &Path) -> Result<Self, ApiError> {
        let inner = Tokenizer::from_file(path).map_err(|e| {
            ApiError::Internal(format!("failed to load tokenizer {}: {}", path.display(), e))
        })?;
        Ok(Self { inner })
    }
}

impl TokenCodec for HfTokenCodec {
    fn encode(&self, text: &str) -> Result<Vec<u32>, ApiError> {
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|e| ApiError::Internal(format!("tokenize failed: {}", e)))?;
        Ok(encoding.get_ids().to_vec())
    }

    fn decode(&self, ids: &[u32]) -> Result<String, ApiError> {
        self.inner
            .decode(ids, true)
            .map_err(|e| ApiError::Internal(format!("detokenize failed: {}", e)))
    }
}

/// Splits text into windows of `max_tokens` tokens, stepping by
/// `max_tokens - overlap`, so consecutive chunks share `overlap` tokens.
#[derive(Clone)]
pub struct Chunker {
    codec: Arc<dyn TokenCodec>,
    max_tokens: usize,
    overlap: usize,
}

impl Chunker {
    /// `overlap` must be smaller than `max_tokens` (validated at config load).
    pub fn new(codec: Arc<dyn TokenCodec>, max_tokens: usize, overlap: usize) -> Self {
        Self {
            codec,
            max_tokens,
            overlap,
        }
    }

    /// Chunk ordering is significant: the ordinal of each window is part of
    /// the chunk id downstream.
    ///
    /// Empty text yields no chunks; text within the window yields exactly one.
    pub fn chunk(&self, text: &str) -> Result<Vec<String>, ApiError> {
        let tokens = self.codec.encode(text)?;
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let step = self.max_tokens.saturating_sub(self.overlap).max(1);
        let mut chunks = Vec::new();
        let mut start = 0;

        loop {
            let end = (start + self.max_tokens).min(tokens.len());
            chunks.push(self.codec.decode(&tokens[start..end])?);
            // Stop once a window has reached the end of the sequence, so no
            // trailing empty or duplicate final window is emitted.
            if start + self.max_tokens >= tokens.len() {
                break;
            }
            start += step;
        }

        Ok(chunks)
    }
}

#[cfg(test)]
pub(crate) mod test_codec {
    use super::*;

    /// Char-level codec: every char is one token, ids round-trip exactly.
    pub struct CharCodec;

    impl TokenCodec for CharCodec {
        fn encode(&self, text: &str) -> Result<Vec<u32>, ApiError> {
            Ok(text.chars().map(|c| c as u32).collect())
        }

        fn decode(&self, ids: &[u32]) -> Result<String, ApiError> {
            ids.iter()
                .map(|&id| {
                    char::from_u32(id)
                        .ok_or_else(|| ApiError::Internal(format!("bad token id: {}", id)))
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_codec::CharCodec;
    use super::*;

    fn chunker(max_tokens: usize, overlap: usize) -> Chunker {
        Chunker::new(Arc::new(CharCodec), max_tokens, overlap)
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(chunker(500, 50).chunk("").unwrap().is_empty());
    }

    #[test]
    fn short_text_yields_one_chunk_equal_to_input() {
        let chunks = chunker(500, 50).chunk("hello world").unwrap();
        assert_eq!(chunks, vec!["hello world".to_string()]);
    }

    #[test]
    fn text_exactly_one_window_yields_one_chunk() {
        let text: String = "abcdefghij".into();
        let chunks = chunker(10, 2).chunk(&text).unwrap();
        assert_eq!(chunks, vec![text]);
    }

    #[test]
    fn windows_overlap_by_configured_amount() {
        // 26 letters, window 10, overlap 3 -> step 7: offsets 0, 7, 14, 21.
        let text: String = ('a'..='z').collect();
        let chunks = chunker(10, 3).chunk(&text).unwrap();

        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0], "abcdefghij");
        assert_eq!(chunks[1], "hijklmnopq");
        assert_eq!(chunks[2], "opqrstuvwx");
        assert_eq!(chunks[3], "vwxyz");
        for window in chunks.windows(2) {
            assert_eq!(&window[0][window[0].len() - 3..], &window[1][..3]);
        }
    }

    #[test]
    fn dropping_overlap_reconstructs_original_text() {
        let text: String = "the quick brown fox jumps over the lazy dog".into();
        let overlap = 4;
        let chunks = chunker(12, overlap).chunk(&text).unwrap();

        let mut rebuilt = chunks[0].clone();
        for chunk in &chunks[1..] {
            rebuilt.push_str(&chunk[overlap..]);
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn no_trailing_duplicate_window_at_exact_boundary() {
        // 14 chars, window 10, step 7: window at 7 reaches the end, so no
        // third window starts at 14.
        let text = "abcdefghijklmn";
        let chunks = chunker(10, 3).chunk(text).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1], "hijklmn");
    }

    #[test]
    fn chunking_is_deterministic() {
        let text: String = ('a'..='z').cycle().take(100).collect();
        let first = chunker(10, 3).chunk(&text).unwrap();
        let second = chunker(10, 3).chunk(&text).unwrap();
        assert_eq!(first, second);
    }
}
