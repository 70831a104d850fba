//! Response status classification.
//!
//! # Responsibilities
//! - Compile configured failure-status entries into a matcher
//! - Decide at request time whether a status counts as a call failure
//!
//! # Design Decisions
//! - Grammar: literal 3-digit codes ("429") or first-digit wildcards
//!   ("1**".."5**"); nothing else
//! - Malformed entries fail compilation, so they surface at config load
//!   time rather than being silently ignored per request

use axum::http::StatusCode;
use thiserror::Error;

/// A failure-status entry outside the supported grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid status pattern '{pattern}': expected a three-digit status code or a first-digit wildcard (\"1**\"..\"5**\")")]
pub struct ClassificationParseError {
    /// The offending entry, verbatim.
    pub pattern: String,
}

/// Compiled set of statuses treated as call failures.
#[derive(Debug, Clone, Default)]
pub struct StatusClassification {
    /// Literal status codes.
    literals: Vec<u16>,
    /// First digits covered by wildcard entries (1..=5).
    wildcard_digits: Vec<u16>,
}

impl StatusClassification {
    /// Compile configured entries. Fails on the first malformed entry.
    pub fn parse(entries: &[String]) -> Result<Self, ClassificationParseError> {
        let mut literals = Vec::new();
        let mut wildcard_digits = Vec::new();

        for entry in entries {
            if let Some(digit) = parse_wildcard(entry) {
                if !wildcard_digits.contains(&digit) {
                    wildcard_digits.push(digit);
                }
            } else if let Some(code) = parse_literal(entry) {
                if !literals.contains(&code) {
                    literals.push(code);
                }
            } else {
                return Err(ClassificationParseError {
                    pattern: entry.clone(),
                });
            }
        }

        Ok(Self {
            literals,
            wildcard_digits,
        })
    }

    /// Returns true if the status is classified as a failure.
    pub fn matches(&self, status: StatusCode) -> bool {
        let code = status.as_u16();
        self.literals.contains(&code) || self.wildcard_digits.contains(&(code / 100))
    }

    /// Returns true if no entry is configured (nothing classifies as failure).
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty() && self.wildcard_digits.is_empty()
    }
}

/// "5**" → Some(5). Only the five HTTP status classes are valid.
fn parse_wildcard(entry: &str) -> Option<u16> {
    let digit = entry.strip_suffix("**")?;
    match digit {
        "1" => Some(1),
        "2" => Some(2),
        "3" => Some(3),
        "4" => Some(4),
        "5" => Some(5),
        _ => None,
    }
}

/// "429" → Some(429). Must be exactly three digits and a representable code.
fn parse_literal(entry: &str) -> Option<u16> {
    if entry.len() != 3 || !entry.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let code: u16 = entry.parse().ok()?;
    StatusCode::from_u16(code).ok()?;
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classification(entries: &[&str]) -> StatusClassification {
        let entries: Vec<String> = entries.iter().map(|s| s.to_string()).collect();
        StatusClassification::parse(&entries).unwrap()
    }

    #[test]
    fn test_wildcard_matching() {
        let c = classification(&["4**", "5**"]);
        assert!(c.matches(StatusCode::NOT_FOUND));
        assert!(c.matches(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!c.matches(StatusCode::OK));
        assert!(!c.matches(StatusCode::MOVED_PERMANENTLY));
    }

    #[test]
    fn test_literal_matching_is_exact() {
        let c = classification(&["429"]);
        assert!(c.matches(StatusCode::TOO_MANY_REQUESTS));
        assert!(!c.matches(StatusCode::from_u16(430).unwrap()));
        assert!(!c.matches(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_literals_and_wildcards_combine() {
        let c = classification(&["302", "5**"]);
        assert!(c.matches(StatusCode::FOUND));
        assert!(c.matches(StatusCode::BAD_GATEWAY));
        assert!(!c.matches(StatusCode::MOVED_PERMANENTLY));
    }

    #[test]
    fn test_out_of_range_wildcard_rejected() {
        let err = StatusClassification::parse(&["6**".to_string()]).unwrap_err();
        assert_eq!(err.pattern, "6**");
        assert!(StatusClassification::parse(&["0**".to_string()]).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(StatusClassification::parse(&["abc".to_string()]).is_err());
        assert!(StatusClassification::parse(&["42".to_string()]).is_err());
        assert!(StatusClassification::parse(&["4040".to_string()]).is_err());
        assert!(StatusClassification::parse(&["**4".to_string()]).is_err());
        assert!(StatusClassification::parse(&["099".to_string()]).is_err());
    }

    #[test]
    fn test_empty_classifies_nothing() {
        let c = StatusClassification::parse(&[]).unwrap();
        assert!(c.is_empty());
        assert!(!c.matches(StatusCode::INTERNAL_SERVER_ERROR));
    }
}
