//! Context packing
//!
//! Assembles a bounded context string from ranked passages. Each passage is
//! rendered as a provenance header plus content; blocks are joined by a
//! delimiter line and accumulation stops at the character budget. All
//! accounting is in characters, never bytes, so a cut can never land inside
//! a UTF-8 code point.

use crate::retrieval::Passage;

/// Delimiter line between context blocks
pub const BLOCK_DELIMITER: &str = "\n---\n";

/// Minimum leftover budget for a truncated final block to be worth adding
const MIN_TRUNCATED_BLOCK_CHARS: usize = 100;

/// Characters of a timestamp kept as the calendar-date prefix
const DATE_PREFIX_CHARS: usize = 10;

/// Packs ranked passages into a budget-bounded context string
pub struct ContextPacker {
    max_length: usize,
}

impl ContextPacker {
    /// Create a packer with the given character budget
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    /// Assemble the context string
    ///
    /// Passages are consumed in the given (already ranked) order. The result
    /// never exceeds the budget by more than the ellipsis on a truncated
    /// final block, which is shorter than one delimiter.
    pub fn pack(&self, passages: &[Passage]) -> String {
        let delimiter_chars = BLOCK_DELIMITER.chars().count();
        let mut parts: Vec<String> = Vec::new();
        let mut current_length = 0usize;

        for passage in passages {
            let block = render_block(passage);
            let block_chars = block.chars().count();
            let separator_chars = if parts.is_empty() { 0 } else { delimiter_chars };

            if current_length + separator_chars + block_chars > self.max_length {
                let remaining = self
                    .max_length
                    .saturating_sub(current_length + separator_chars);
                if remaining > MIN_TRUNCATED_BLOCK_CHARS {
                    let mut cut = take_chars(&block, remaining);
                    cut.push_str("...");
                    parts.push(cut);
                }
                break;
            }

            current_length += separator_chars + block_chars;
            parts.push(block);
        }

        parts.join(BLOCK_DELIMITER)
    }
}

/// Render one passage as a provenance header followed by its content
fn render_block(passage: &Passage) -> String {
    let mut header = format!("Source: {}", passage.source().unwrap_or("Unknown"));

    if let Some(title) = passage.metadata.get("title").filter(|t| !t.is_empty()) {
        header.push_str(" - ");
        header.push_str(title);
    }

    if let Some(timestamp) = passage.metadata.get("timestamp") {
        // Just the calendar date
        let date = take_chars(timestamp, DATE_PREFIX_CHARS);
        header.push_str(&format!(" ({})", date));
    }

    format!("{}\n{}\n", header, passage.content)
}

/// First `n` characters of `text`
pub(crate) fn take_chars(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}
