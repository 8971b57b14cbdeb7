use regex::Regex;
use std::sync::LazyLock;

/// A letter, a hyphen, digits, a hyphen, digits. No word boundaries:
/// the token is also found inside longer alphanumeric runs.
const IDENTIFIER_PATTERN: &str = r"(?i)[a-z]-[0-9]+-[0-9]+";

static IDENTIFIER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(IDENTIFIER_PATTERN).expect("identifier pattern is valid"));

/// Identifier and category decomposed from a subject line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSubject {
    pub identifier: String,
    pub category: String,
}

/// Returns the first identifier-shaped token of the subject, verbatim.
///
/// `"Re: e-12-345 Skin"` gives `Some("e-12-345")`; later occurrences are ignored.
pub fn extract_identifier(subject: &str) -> Option<&str> {
    IDENTIFIER_REGEX.find(subject).map(|m| m.as_str())
}

/// Returns the subject with its identifier removed, or `None` when there is no identifier.
///
/// The text before and after the identifier is trimmed separately. When both
/// sides exist they are joined with a single space; internal whitespace is kept.
pub fn extract_category(subject: &str) -> Option<String> {
    let found = IDENTIFIER_REGEX.find(subject)?;
    let before = &subject[..found.start()];
    let after = &subject[found.end()..];

    let category = if found.start() == 0 {
        after.trim().to_string()
    } else if found.end() == subject.len() {
        before.trim().to_string()
    } else {
        format!("{} {}", before.trim(), after.trim())
    };

    Some(category)
}

/// Both parts or nothing: a subject without an identifier is not decomposed.
pub fn parse_subject(subject: &str) -> Option<ParsedSubject> {
    let identifier = extract_identifier(subject)?;
    let category = extract_category(subject)?;

    Some(ParsedSubject {
        identifier: identifier.to_string(),
        category,
    })
}
