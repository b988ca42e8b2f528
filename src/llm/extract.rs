use regex::Regex;

/// Label patterns recognized by the grammar-check flow, in priority order.
pub const CORRECTION_LABELS: [&str; 3] = [
    "Corrected Sentence:",
    "Suggested Correction:",
    "Corrected version:",
];

/// Pull a single labeled answer out of sanitized model prose.
///
/// Labels are tried in the caller's priority order; the first label present in
/// the text (case-insensitive) wins regardless of where it sits, and everything
/// after it is returned, trimmed and unquoted. `None` when no label matched —
/// callers fall back to showing the full text, absence is not an error.
///
/// This is deliberately textual: the upstream output is free-form prose, not a
/// structure we can parse strictly.
pub fn extract_labeled(text: &str, labels: &[&str]) -> Option<String> {
    for label in labels {
        let matched = Regex::new(&format!("(?i){}", regex::escape(label)))
            .ok()
            .and_then(|re| re.find(text));
        if let Some(m) = matched {
            let answer = trim_wrapping_quotes(text[m.end()..].trim());
            return Some(answer.to_string());
        }
    }
    None
}

/// Strip exactly one layer of matching wrapping quotes. A lone quote or a
/// mismatched pair is kept as-is.
fn trim_wrapping_quotes(text: &str) -> &str {
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_text_after_label() {
        let text = "Corrected Sentence: He goes to school.";
        let answer = extract_labeled(text, &CORRECTION_LABELS);
        assert_eq!(answer.as_deref(), Some("He goes to school."));
    }

    #[test]
    fn test_label_match_is_case_insensitive() {
        let text = "corrected sentence: He goes to school.";
        let answer = extract_labeled(text, &CORRECTION_LABELS);
        assert_eq!(answer.as_deref(), Some("He goes to school."));
    }

    #[test]
    fn test_label_found_mid_paragraph() {
        let text = "The verb disagrees with the subject.\n\nCorrected version: He goes.";
        let answer = extract_labeled(text, &CORRECTION_LABELS);
        assert_eq!(answer.as_deref(), Some("He goes."));
    }

    #[test]
    fn test_caller_priority_order_wins_over_text_position() {
        // The lower-priority label appears first in the text; the higher-priority
        // one must still win.
        let text = "Suggested Correction: early\nCorrected Sentence: late";
        let answer = extract_labeled(text, &CORRECTION_LABELS);
        assert_eq!(answer.as_deref(), Some("late"));
    }

    #[test]
    fn test_no_label_returns_none() {
        assert_eq!(extract_labeled("no labels here", &CORRECTION_LABELS), None);
    }

    #[test]
    fn test_strips_one_layer_of_double_quotes() {
        let text = "Corrected Sentence: \"He goes.\"";
        let answer = extract_labeled(text, &CORRECTION_LABELS);
        assert_eq!(answer.as_deref(), Some("He goes."));
    }

    #[test]
    fn test_strips_one_layer_of_single_quotes() {
        let text = "Corrected Sentence: 'He goes.'";
        let answer = extract_labeled(text, &CORRECTION_LABELS);
        assert_eq!(answer.as_deref(), Some("He goes."));
    }

    #[test]
    fn test_never_strips_two_quote_layers() {
        let text = "Corrected Sentence: \"\"He goes.\"\"";
        let answer = extract_labeled(text, &CORRECTION_LABELS);
        assert_eq!(answer.as_deref(), Some("\"He goes.\""));
    }

    #[test]
    fn test_lone_quote_is_kept() {
        let text = "Corrected Sentence: \"";
        let answer = extract_labeled(text, &CORRECTION_LABELS);
        assert_eq!(answer.as_deref(), Some("\""));
    }

    #[test]
    fn test_mismatched_quotes_are_kept() {
        let text = "Corrected Sentence: \"He goes.'";
        let answer = extract_labeled(text, &CORRECTION_LABELS);
        assert_eq!(answer.as_deref(), Some("\"He goes.'"));
    }

    #[test]
    fn test_empty_labels_returns_none() {
        assert_eq!(extract_labeled("anything", &[]), None);
    }
}
