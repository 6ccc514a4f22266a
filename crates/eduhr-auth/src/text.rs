//! Text sanitizing and email format validation for asserted attributes.

use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag pattern"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n\t ]+").expect("valid whitespace pattern"));

static EMAIL_LOCAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9!#$%&'*+/=?^_`{|}~.-]+$").expect("valid local part pattern")
});

static DOMAIN_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9-]+$").expect("valid label pattern"));

/// Sanitizes a single-line text value.
///
/// Strips markup tags and control characters, collapses whitespace runs into
/// a single space and trims the result.
#[must_use]
pub fn sanitize_text_field(value: &str) -> String {
    let without_tags = TAG_RE.replace_all(value, "");
    let without_controls: String = without_tags
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
        .collect();
    WHITESPACE_RE
        .replace_all(&without_controls, " ")
        .trim()
        .to_string()
}

/// Basic email format validation.
///
/// Requires at least six characters, a non-empty local part of permitted
/// characters and a domain of at least two dot-separated labels.
#[must_use]
pub fn is_email(value: &str) -> bool {
    if value.len() < 6 {
        return false;
    }

    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };

    if local.is_empty() || !EMAIL_LOCAL_RE.is_match(local) {
        return false;
    }

    if domain.contains("..") || domain.trim_matches(|c: char| c == '.' || c.is_whitespace()) != domain
    {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    labels.iter().all(|label| {
        label.trim_matches(|c: char| c == '-' || c.is_whitespace()) == *label
            && DOMAIN_LABEL_RE.is_match(label)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_tags_and_whitespace() {
        assert_eq!(sanitize_text_field("  Ana   Marija "), "Ana Marija");
        assert_eq!(sanitize_text_field("<b>Ivan</b>"), "Ivan");
        assert_eq!(sanitize_text_field("Iva\n\tHorvat"), "Iva Horvat");
        assert_eq!(sanitize_text_field("Lu\u{0007}ka"), "Luka");
        assert_eq!(sanitize_text_field(""), "");
    }

    #[test]
    fn test_sanitize_keeps_unicode_letters() {
        assert_eq!(sanitize_text_field("Marko Ivančić"), "Marko Ivančić");
    }

    #[test]
    fn test_is_email_accepts_common_addresses() {
        assert!(is_email("alice@dept.uni.hr"));
        assert!(is_email("alice@uni.hr"));
        assert!(is_email("first.last+tag@srce.hr"));
    }

    #[test]
    fn test_is_email_rejects_malformed() {
        assert!(!is_email("a@b.c"));
        assert!(!is_email("no-at-sign.hr"));
        assert!(!is_email("@uni.hr.com"));
        assert!(!is_email("alice@localhost"));
        assert!(!is_email("alice@uni..hr"));
        assert!(!is_email("alice@.uni.hr"));
        assert!(!is_email("alice@-uni.hr"));
        assert!(!is_email("alice@uni@hr.hr"));
        assert!(!is_email("ali ce@uni.hr"));
    }
}
