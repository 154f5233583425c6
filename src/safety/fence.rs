//! Code-fence stripping for model output.
//!
//! Models often wrap SQL in markdown fences even when told not to. Fences are
//! only removed at the very start and end of the text.

/// Opening and closing fence marker.
const FENCE: &str = "```";

/// Strips one leading and one trailing code fence, plus surrounding whitespace.
///
/// A leading fence may carry a language tag (```` ```sql ````). Text between
/// the fences is never altered.
pub fn strip_code_fences(text: &str) -> &str {
    let mut stripped = text.trim();

    if let Some(rest) = stripped.strip_prefix(FENCE) {
        stripped = strip_language_tag(rest);
    }

    if let Some(rest) = stripped.strip_suffix(FENCE) {
        stripped = rest;
    }

    stripped.trim()
}

/// Removes a language tag directly after an opening fence.
///
/// `sql` is always treated as a tag. Any other word only counts as a tag when
/// it sits alone on the fence line, and never when it is a read verb.
fn strip_language_tag(rest: &str) -> &str {
    let tag_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+')))
        .unwrap_or(rest.len());
    let (tag, after) = rest.split_at(tag_len);

    if tag.is_empty() {
        return rest;
    }

    if tag.eq_ignore_ascii_case("sql") {
        return after;
    }

    let alone_on_line = after.is_empty() || after.starts_with('\n') || after.starts_with("\r\n");
    let is_read_verb = super::READ_VERBS
        .iter()
        .any(|verb| tag.eq_ignore_ascii_case(verb));

    if alone_on_line && !is_read_verb {
        after
    } else {
        rest
    }
}
