//! Post-processing for model output used in emails.

use storesync_core::constants::{MAX_PREVIEW_CHARS, MAX_SUBJECT_CHARS};

/// Remove a leading ```` ```html ```` / ```` ``` ```` fence and a trailing ```` ``` ````.
pub fn strip_code_fences(raw: &str) -> String {
    let mut html = raw.trim();
    if let Some(rest) = html.strip_prefix("```html") {
        html = rest;
    } else if let Some(rest) = html.strip_prefix("```") {
        html = rest;
    }
    if let Some(rest) = html.strip_suffix("```") {
        html = rest;
    }
    html.trim().to_string()
}

/// Unquote and cap a model-written subject line.
pub fn clean_subject(raw: &str) -> String {
    let mut subject = raw.trim();
    for quote in ['"', '\''] {
        if subject.len() >= 2 && subject.starts_with(quote) && subject.ends_with(quote) {
            subject = subject[1..subject.len() - 1].trim();
        }
    }
    truncate_with_ellipsis(subject, MAX_SUBJECT_CHARS)
}

/// Inbox preview text derived from content without calling a model.
///
/// Tries each sentence separator in turn and keeps the first sentence if it
/// fits; otherwise truncates with an ellipsis.
pub fn preview_text(content: &str) -> String {
    let content = content.trim();
    for sep in [". ", "! ", "? "] {
        if let Some((first, _)) = content.split_once(sep) {
            let sentence = format!("{first}{}", &sep[..1]);
            if sentence.chars().count() <= MAX_PREVIEW_CHARS {
                return sentence;
            }
        }
    }
    truncate_with_ellipsis(content, MAX_PREVIEW_CHARS)
}

/// Keep `text` if it fits in `max` chars, else `max - 3` chars plus `...`.
pub fn truncate_with_ellipsis(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
