//! Output encoding normalization.

/// Decode `bytes` as UTF-8, dropping invalid sequences and NUL characters.
///
/// Never fails: whatever cannot be represented is left out.
#[must_use]
pub fn normalize(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut dropped = 0usize;

    for chunk in bytes.utf8_chunks() {
        for ch in chunk.valid().chars() {
            if ch == '\0' {
                dropped += 1;
            } else {
                out.push(ch);
            }
        }
        dropped += chunk.invalid().len();
    }

    if dropped > 0 {
        tracing::debug!(dropped, "Dropped unrepresentable bytes from diff output");
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_valid_utf8_is_unchanged() {
        assert_eq!(normalize("<p>Grüße ✓</p>".as_bytes()), "<p>Grüße ✓</p>");
    }

    #[test]
    fn test_invalid_sequences_are_dropped() {
        assert_eq!(normalize(b"<p>a\xff\xfeb\xc3</p>"), "<p>ab</p>");
    }

    #[test]
    fn test_truncated_multibyte_is_dropped() {
        assert_eq!(normalize(b"caf\xc3"), "caf");
    }

    #[test]
    fn test_nul_is_dropped() {
        assert_eq!(normalize(b"a\0b"), "ab");
    }

    #[test]
    fn test_empty() {
        assert_eq!(normalize(b""), "");
    }
}
