//! Truncation Utilities
//!
//! Shortens display text without splitting a UTF-8 sequence. Romanian
//! diacritics are multi-byte, so byte slicing is never safe here.

const ELLIPSIS: &str = "…";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruncationPolicy {
    /// Keep at most this many bytes of the original text
    Bytes(usize),
}

/// Cut `content` to the policy's budget, marking the cut with an ellipsis
pub fn truncate_text(content: &str, policy: TruncationPolicy) -> String {
    let end = match policy {
        TruncationPolicy::Bytes(max) => {
            if content.len() <= max {
                return content.to_string();
            }
            content
                .char_indices()
                .map(|(idx, c)| idx + c.len_utf8())
                .take_while(|&char_end| char_end <= max)
                .last()
                .unwrap_or(0)
        }
    };

    format!("{}{}", content[..end].trim_end(), ELLIPSIS)
}
