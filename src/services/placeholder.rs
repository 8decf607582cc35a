use std::sync::OnceLock;

use regex::Regex;

use crate::model::issue::{IssueKind, ValidationIssue};

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // \w do JS é só ASCII; o do regex crate é Unicode
    RE.get_or_init(|| Regex::new(r"\{[A-Za-z0-9_]+\}").expect("static placeholder pattern"))
}

/// Tokens `{nome}` na ordem em que aparecem, com repetições.
pub fn extract_placeholders(text: &str) -> Vec<&str> {
    placeholder_re().find_iter(text).map(|m| m.as_str()).collect()
}

/// Compara só presença e quantidade; a ordem pode mudar na tradução.
pub fn placeholders_match(source: &str, target: &str) -> bool {
    let src = extract_placeholders(source);
    let dst = extract_placeholders(target);

    if src.len() != dst.len() {
        return false;
    }
    src.iter().all(|p| dst.contains(p))
}

pub fn validate_placeholders(key: &str, source: &str, target: &str) -> Option<ValidationIssue> {
    if placeholders_match(source, target) {
        return None;
    }

    let message = format!(
        "Placeholder mismatch: expected [{}], found [{}]",
        extract_placeholders(source).join(", "),
        extract_placeholders(target).join(", ")
    );

    Some(ValidationIssue::new(IssueKind::PlaceholderMismatch, key, message).with_texts(source, Some(target)))
}
