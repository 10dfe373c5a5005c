//! Detection of unresolved `${...}` build-variable references.
//!
//! Only the two markers matter. The scan is a forward pass with a single
//! "inside an opening" flag; no templating grammar is parsed.

const OPEN: &[u8] = b"${";
const CLOSE: u8 = b'}';

/// Returns true when `text` holds an opening marker that is eventually
/// followed by a closing marker.
///
/// Further opening markers met before the closing one are skipped over. An
/// opening marker that is never closed does not flag the text.
pub fn has_unresolved_placeholder(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut cursor = 0;
    let mut opened = false;

    while cursor < bytes.len() {
        if bytes[cursor..].starts_with(OPEN) {
            opened = true;
            cursor += OPEN.len();
            continue;
        }
        if opened && bytes[cursor] == CLOSE {
            return true;
        }
        cursor += 1;
    }

    false
}

/// Trimmed text, or `None` when empty or still carrying a placeholder.
pub fn resolved_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() || has_unresolved_placeholder(trimmed) {
        return None;
    }
    Some(trimmed.to_string())
}

/// [`resolved_text`] lifted over an optional value.
pub fn resolved_opt(text: Option<&str>) -> Option<String> {
    text.and_then(resolved_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_placeholder_is_unresolved() {
        assert!(has_unresolved_placeholder("${foo}"));
        assert!(has_unresolved_placeholder("-Xlint:${lint.level}"));
        assert!(has_unresolved_placeholder("prefix ${a} suffix"));
    }

    #[test]
    fn plain_text_is_resolved() {
        assert!(!has_unresolved_placeholder(""));
        assert!(!has_unresolved_placeholder("-Xlint:all"));
        assert!(!has_unresolved_placeholder("{not a placeholder}"));
        assert!(!has_unresolved_placeholder("$ {spaced}"));
    }

    #[test]
    fn closing_brace_before_opening_does_not_count() {
        assert!(!has_unresolved_placeholder("} ${open"));
    }

    #[test]
    fn nested_openings_are_skipped() {
        assert!(has_unresolved_placeholder("${outer.${inner}}"));
        assert!(has_unresolved_placeholder("${a${b${c}"));
    }

    // Compatibility: a trailing opening that is never closed is treated as
    // a literal value. A real unresolved reference in that shape slips through.
    #[test]
    fn unterminated_placeholder_is_not_flagged() {
        assert!(!has_unresolved_placeholder("${unterminated"));
        assert!(!has_unresolved_placeholder("value-${"));
        assert_eq!(
            resolved_text("${unterminated"),
            Some("${unterminated".to_string())
        );
    }

    #[test]
    fn resolved_text_trims_and_filters() {
        assert_eq!(resolved_text("  -g  "), Some("-g".to_string()));
        assert_eq!(resolved_text("   "), None);
        assert_eq!(resolved_text("${bar}"), None);
        assert_eq!(resolved_opt(None), None);
        assert_eq!(resolved_opt(Some("17")), Some("17".to_string()));
    }
}
