//! Line-oriented splitting of long responses into message-sized segments.
//!
//! Lines are packed greedily into segments no longer than the requested
//! bound. A line that cannot fit on its own is cut into bound-sized pieces.
//! Lengths are counted in characters, not bytes.

use thiserror::Error;

/// Errors produced while splitting a message.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ChunkError {
    /// The requested segment bound cannot hold a single character.
    #[error("Invalid segment length {max_length}: must be at least 1")]
    InvalidArgument { max_length: usize },
}

/// Splits `text` into ordered segments of at most `max_length` characters.
///
/// Segments break between lines whenever possible. Lines longer than
/// `max_length` are cut into `max_length`-sized pieces, each of which becomes
/// its own segment. Empty input yields no segments.
///
/// # Errors
///
/// Returns [`ChunkError::InvalidArgument`] when `max_length` is zero.
pub fn split_message(text: &str, max_length: usize) -> Result<Vec<String>, ChunkError> {
    if max_length == 0 {
        return Err(ChunkError::InvalidArgument { max_length });
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split('\n') {
        let line_len = line.chars().count();
        let separator = usize::from(!current.is_empty());

        if current_len + separator + line_len <= max_length {
            if separator == 1 {
                current.push('\n');
            }
            current.push_str(line);
            current_len += separator + line_len;
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }

        // The line starts a fresh segment; anything past the bound is cut off
        // into complete segments first.
        let (rest, rest_len) = cut_oversized(line, line_len, max_length, &mut chunks);
        current.push_str(rest);
        current_len = rest_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    Ok(chunks)
}

/// Pushes `max_length`-character prefixes of `line` onto `chunks` until the
/// remainder fits, then returns the remainder and its length.
fn cut_oversized<'a>(
    mut line: &'a str,
    mut line_len: usize,
    max_length: usize,
    chunks: &mut Vec<String>,
) -> (&'a str, usize) {
    while line_len > max_length {
        let boundary = line
            .char_indices()
            .nth(max_length)
            .map_or(line.len(), |(index, _)| index);
        let (head, tail) = line.split_at(boundary);
        chunks.push(head.to_string());
        line = tail;
        line_len -= max_length;
    }

    (line, line_len)
}
