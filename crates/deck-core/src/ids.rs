//! ID and identifier generation.
//!
//! The store never generates IDs; callers compute them here from the
//! current snapshot before calling `add_*`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

use crate::error::DeckError;
use crate::model::Issue;

/// `PREFIX-NUMBER`, e.g. `ENG-42`.
#[allow(clippy::expect_used)]
static IDENTIFIER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9]+)-(\d+)$").expect("identifier regex is valid")
});

/// Scope of the issue identifier counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NumberingScope {
    /// One counter across all teams. Matches the observed product but is
    /// probably a defect: team prefixes suggest independent counters.
    #[default]
    Global,
    /// One counter per team identifier prefix.
    PerTeam,
}

impl NumberingScope {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::PerTeam => "per-team",
        }
    }
}

impl fmt::Display for NumberingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NumberingScope {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "global" => Ok(Self::Global),
            "per-team" | "per_team" | "team" => Ok(Self::PerTeam),
            other => Err(DeckError::InvalidOption {
                option: "numbering",
                value: other.to_string(),
            }),
        }
    }
}

/// Next numeric ID: `max(numeric ids, 0) + 1`.
///
/// Non-numeric or malformed IDs count as 0. Saturates at `u64::MAX`.
#[must_use]
pub fn next_numeric_id<'a, I>(ids: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let max = ids
        .into_iter()
        .map(|id| id.trim().parse::<u64>().unwrap_or(0))
        .max()
        .unwrap_or(0);
    max.saturating_add(1).to_string()
}

/// Parse an identifier into `(prefix, number)`.
#[must_use]
pub fn parse_identifier(identifier: &str) -> Option<(&str, u64)> {
    let caps = IDENTIFIER_RE.captures(identifier.trim())?;
    let prefix = caps.get(1)?.as_str();
    let number = caps.get(2)?.as_str().parse().ok()?;
    Some((prefix, number))
}

/// Next human-facing identifier for a team prefix.
///
/// With `NumberingScope::Global` the number is one past the highest suffix of
/// any matching identifier regardless of prefix. Numbering restarts at 1
/// when nothing matches.
#[must_use]
pub fn next_issue_identifier(issues: &[Issue], team_prefix: &str, scope: NumberingScope) -> String {
    let max = issues
        .iter()
        .filter_map(|issue| parse_identifier(&issue.identifier))
        .filter(|(prefix, _)| match scope {
            NumberingScope::Global => true,
            NumberingScope::PerTeam => prefix.eq_ignore_ascii_case(team_prefix),
        })
        .map(|(_, number)| number)
        .max()
        .unwrap_or(0);
    format!("{}-{}", team_prefix.to_uppercase(), max.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue_with(identifier: &str) -> Issue {
        Issue {
            identifier: identifier.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_next_numeric_id_tolerates_garbage() {
        assert_eq!(next_numeric_id(["1", "7", "abc", "", "3"]), "8");
        assert_eq!(next_numeric_id(Vec::<&str>::new()), "1");
        assert_eq!(next_numeric_id(["x-9", "label"]), "1");
    }

    #[test]
    fn test_parse_identifier() {
        assert_eq!(parse_identifier("ENG-42"), Some(("ENG", 42)));
        assert_eq!(parse_identifier("ENG42"), None);
        assert_eq!(parse_identifier("-4"), None);
        assert_eq!(parse_identifier("9X-3"), Some(("9X", 3)));
    }

    #[test]
    fn test_next_ids_saturate_at_max() {
        let max = u64::MAX.to_string();
        assert_eq!(next_numeric_id([max.as_str(), "4"]), max);

        let issues = vec![issue_with(&format!("ENG-{max}"))];
        assert_eq!(
            next_issue_identifier(&issues, "ENG", NumberingScope::Global),
            format!("ENG-{max}")
        );
    }

    #[test]
    fn test_digit_led_prefix_advances() {
        let issues = vec![issue_with("9X-4")];
        assert_eq!(
            next_issue_identifier(&issues, "9x", NumberingScope::PerTeam),
            "9X-5"
        );
    }

    #[test]
    fn test_global_numbering_spans_teams() {
        let issues = vec![issue_with("ENG-3"), issue_with("DES-11"), issue_with("junk")];
        assert_eq!(
            next_issue_identifier(&issues, "ENG", NumberingScope::Global),
            "ENG-12"
        );
    }

    #[test]
    fn test_per_team_numbering() {
        let issues = vec![issue_with("ENG-3"), issue_with("DES-11")];
        assert_eq!(
            next_issue_identifier(&issues, "eng", NumberingScope::PerTeam),
            "ENG-4"
        );
        assert_eq!(
            next_issue_identifier(&issues, "OPS", NumberingScope::PerTeam),
            "OPS-1"
        );
    }

    #[test]
    fn test_numbering_restarts_when_nothing_matches() {
        let issues = vec![issue_with("no pattern here")];
        assert_eq!(
            next_issue_identifier(&issues, "ENG", NumberingScope::Global),
            "ENG-1"
        );
    }
}
