use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

/// Matches one reasoning span: `<think>…</think>` or `<thinking>…</thinking>`
/// (the two tag names are synonyms and may close each other), case-insensitive,
/// spanning newlines. Lazy body match, so an open tag with no close stays put.
fn reasoning_span() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<(?:think|thinking)>.*?</(?:think|thinking)>")
            .expect("reasoning span pattern is valid")
    })
}

/// Strip provider reasoning markup from raw model output and trim the result.
///
/// Removal runs to a fixed point: deleting a span can butt two halves of an
/// outer tag together, and a single pass would leave that new span behind.
/// The fixed point also makes idempotence structural.
///
/// Unmatched or malformed tags are left verbatim; this never fails.
pub fn sanitize(raw: &str) -> String {
    let mut text = Cow::Borrowed(raw);
    loop {
        match reasoning_span().replace_all(&text, "") {
            Cow::Borrowed(_) => break,
            Cow::Owned(next) => text = Cow::Owned(next),
        }
    }
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_think_span_and_trims() {
        let raw = "<think>reasoning...</think>Corrected Sentence: He goes to school.";
        assert_eq!(sanitize(raw), "Corrected Sentence: He goes to school.");
    }

    #[test]
    fn test_removes_span_across_newlines() {
        let raw = "before <think>line one\nline two\nline three</think> after";
        assert_eq!(sanitize(raw), "before  after");
    }

    #[test]
    fn test_tag_matching_is_case_insensitive() {
        assert_eq!(sanitize("<THINK>x</Think>kept"), "kept");
    }

    #[test]
    fn test_thinking_tag_is_a_synonym() {
        assert_eq!(sanitize("<thinking>x</thinking>kept"), "kept");
        assert_eq!(sanitize("<think>x</thinking>kept"), "kept");
    }

    #[test]
    fn test_multiple_spans_removed_text_between_preserved() {
        let raw = "a<think>1</think>b<thinking>2</thinking>c";
        assert_eq!(sanitize(raw), "abc");
    }

    #[test]
    fn test_unmatched_open_tag_left_verbatim() {
        let raw = "<think>never closed, so this stays";
        assert_eq!(sanitize(raw), raw);
    }

    #[test]
    fn test_stray_close_tag_left_verbatim() {
        assert_eq!(sanitize("text </think> more"), "text </think> more");
    }

    #[test]
    fn test_idempotent_on_plain_text() {
        let once = sanitize("no markup here");
        assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn test_idempotent_when_removal_forms_new_span() {
        // Removing the inner span joins "<thi" and "nk>y</think>" into a
        // fresh span; the fixed point removes that too, so a second sanitize
        // is a no-op.
        let raw = "<thi<think>x</think>nk>y</think>z";
        let once = sanitize(raw);
        assert_eq!(once, "z");
        assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        assert_eq!(sanitize("  \n result \n "), "result");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(sanitize(""), "");
    }
}
