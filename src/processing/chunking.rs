//! Fixed-size sliding-window chunking.
//!
//! Windows are measured in characters rather than tokens: this keeps the
//! chunker agnostic of the embedding model, and the configured overlap keeps
//! text that straddles a window boundary visible to retrieval. Windowing
//! operates on char boundaries, so multibyte input can never split a
//! codepoint.

use super::types::ChunkingError;

/// Split normalized text into overlapping windows of at most `chunk_size`
/// characters.
///
/// The window start advances by `max(1, chunk_size - overlap)`, so adjacent
/// windows share exactly `overlap` characters except possibly at the final
/// window, which may be shorter. An overlap at or above the chunk size is a
/// misconfiguration that config loading rejects; if such a value reaches this
/// function anyway, the clamp degrades to advance-by-one chunking rather than
/// panicking.
///
/// Returns an empty vector iff the input is empty.
pub fn chunk_text(
    text: &str,
    chunk_size: usize,
    overlap: usize,
) -> Result<Vec<String>, ChunkingError> {
    if chunk_size == 0 {
        return Err(ChunkingError::InvalidChunkSize);
    }
    if text.is_empty() {
        return Ok(Vec::new());
    }

    // Byte offsets of every char boundary, plus the end of the string.
    let mut boundaries: Vec<usize> = text.char_indices().map(|(offset, _)| offset).collect();
    boundaries.push(text.len());
    let char_count = boundaries.len() - 1;

    let step = chunk_size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < char_count {
        let end = (start + chunk_size).min(char_count);
        chunks.push(text[boundaries[start]..boundaries[end]].to_string());
        start += step;
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk_text("", 1000, 150).expect("chunks").is_empty());
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        assert!(matches!(
            chunk_text("text", 0, 0),
            Err(ChunkingError::InvalidChunkSize)
        ));
    }

    #[test]
    fn short_text_yields_a_single_unmodified_chunk() {
        let chunks = chunk_text("short page", 1000, 150).expect("chunks");
        assert_eq!(chunks, vec!["short page".to_string()]);
    }

    #[test]
    fn chunk_count_matches_the_window_formula() {
        // L = 2350, C = 1000, O = 150 -> ceil((L - C) / (C - O)) + 1 = 3.
        let text = "x".repeat(2350);
        let chunks = chunk_text(&text, 1000, 150).expect("chunks");
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 1000);
        assert_eq!(chunks[1].len(), 1000);
        // Final window covers offsets 1700..2350.
        assert_eq!(chunks[2].len(), 650);
    }

    #[test]
    fn adjacent_chunks_share_exactly_the_overlap() {
        let text: String = ('a'..='w').collect(); // 23 characters
        let chunks = chunk_text(&text, 10, 4).expect("chunks");
        assert_eq!(chunks.len(), 4);

        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].chars().collect();
            let next: Vec<char> = pair[1].chars().collect();
            if prev.len() == 10 {
                let tail: String = prev[prev.len() - 4..].iter().collect();
                let head: String = next[..4.min(next.len())].iter().collect();
                assert_eq!(tail, head);
            }
        }
    }

    #[test]
    fn every_window_matches_its_offset_slice() {
        let text = "abcdefghijklmnopqrstuvwxyz";
        let chunks = chunk_text(text, 10, 4).expect("chunks");
        // Step is 6, so window i covers text[i*6 .. i*6+10].
        for (i, chunk) in chunks.iter().enumerate() {
            let start = i * 6;
            let end = (start + 10).min(text.len());
            assert_eq!(chunk, &text[start..end]);
        }
        assert_eq!(chunks.last().map(String::as_str), Some("yz"));
    }

    #[test]
    fn multibyte_text_chunks_on_char_boundaries() {
        let text = "áéíóú".repeat(4); // 20 chars, 40 bytes
        let chunks = chunk_text(&text, 8, 2).expect("chunks");
        // Step is 6, offsets 0, 6, 12, 18.
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].chars().count(), 8);
        assert_eq!(chunks.last().expect("last chunk").chars().count(), 2);
    }

    #[test]
    fn pathological_overlap_degrades_to_single_character_advance() {
        let chunks = chunk_text("abcd", 2, 5).expect("chunks");
        // Advance clamps to 1: windows at offsets 0..4.
        assert_eq!(chunks, vec!["ab", "bc", "cd", "d"]);
    }
}
