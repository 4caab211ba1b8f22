//! Sentence-packing text chunker.
//!
//! Splits document text into chunks that respect a configurable `max_chars`
//! limit. Splitting happens on sentence boundaries (`". "`) so that no
//! sentence is ever cut in half.
//!
//! # Algorithm
//!
//! 1. Replace newlines with spaces and split on the literal `". "`.
//! 2. Trim each candidate sentence, drop empty ones, and restore the
//!    terminating `.` the split removed.
//! 3. Pack sentences greedily into the current chunk until the next one
//!    would push the summed sentence length past `max_chars`; then flush
//!    and start a new chunk.
//! 4. Flush whatever remains.
//!
//! The running size is the sum of the sentence lengths in characters; the
//! single spaces that join sentences are not counted, so a packed chunk can
//! run over `max_chars` by at most one character per joined sentence. A
//! sentence longer than `max_chars` on its own is emitted as a chunk by
//! itself.
//!
//! # Example
//!
//! ```rust
//! use docqa::chunk::chunk_text;
//!
//! let chunks = chunk_text("Hello world. This is a test. Short.", 20);
//! assert_eq!(chunks, vec!["Hello world.", "This is a test.", "Short."]);
//! ```

/// Split `text` into the sentences the packer works with.
///
/// Each returned sentence is trimmed, non-empty, and ends with a `.`.
pub fn split_sentences(text: &str) -> Vec<String> {
    text.replace('\n', " ")
        .split(". ")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            if s.ends_with('.') {
                s.to_string()
            } else {
                format!("{}.", s)
            }
        })
        .collect()
}

/// Split text into sentence-aligned chunks whose sentences total at most
/// `max_chars` characters, joining spaces excluded.
///
/// Returns an empty vector for empty or whitespace-only input.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_size = 0usize;

    for sentence in split_sentences(text) {
        let sentence_size = sentence.chars().count();

        if current_size + sentence_size > max_chars && !current.is_empty() {
            chunks.push(current.join(" "));
            current.clear();
            current_size = 0;
        }
        current_size += sentence_size;
        current.push(sentence);
    }

    if !current.is_empty() {
        chunks.push(current.join(" "));
    }

    chunks
}
