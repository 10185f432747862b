//! Helpers for slicing payloads into chunks without breaking UTF-8.
//!
//! Used by the chunk-boundary invariance tests; exported because stream
//! adapters re-chunking input find them handy too.

/// Splits `payload` into at most `parts` chunks of roughly equal byte
/// length, each ending on a char boundary.
///
/// # Panics
///
/// Panics if `parts` is zero.
#[must_use]
pub fn produce_chunks(payload: &str, parts: usize) -> Vec<&str> {
    assert!(parts > 0, "parts must be positive");
    let target = payload.len().div_ceil(parts).max(1);
    let mut chunks = Vec::with_capacity(parts);
    let mut rest = payload;
    while !rest.is_empty() {
        let mut end = target.min(rest.len());
        while !rest.is_char_boundary(end) {
            end += 1;
        }
        let (chunk, tail) = rest.split_at(end);
        chunks.push(chunk);
        rest = tail;
    }
    chunks
}
