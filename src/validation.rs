//! Input validation and sanitizing.
//!
//! Everything the user types is checked here before the first `gh` call. The
//! result is a [`StatsConfig`] that the rest of the pipeline receives by value.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDate};
use regex::Regex;
use serde::Serialize;

use crate::error::ValidationError;

#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static USER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_](?:[A-Za-z0-9_-]{0,37}[A-Za-z0-9_])?$").unwrap()
});

#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static ORG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,37}[A-Za-z0-9])?$").unwrap());

#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap());

#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static COMMIT_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{40}$").unwrap());

/// Characters besides ASCII alphanumerics that survive [`sanitize`].
const SANITIZE_EXTRA: &[char] = &['/', '.', '-', '_', '@', ':', '+'];

/// Which commit timestamp drives range filtering and sorting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateKind {
    /// When the commit was originally authored.
    AuthorDate,
    /// When the commit was applied to the branch.
    #[default]
    CommitterDate,
}

impl DateKind {
    /// Returns the qualifier name used by GitHub search (`author-date`, `committer-date`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AuthorDate => "author-date",
            Self::CommitterDate => "committer-date",
        }
    }

    /// Returns the jq path to the matching timestamp of a commit object.
    pub fn commit_field(self) -> &'static str {
        match self {
            Self::AuthorDate => ".commit.author.date",
            Self::CommitterDate => ".commit.committer.date",
        }
    }
}

impl fmt::Display for DateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "author-date" => Ok(Self::AuthorDate),
            "committer-date" => Ok(Self::CommitterDate),
            other => Err(ValidationError::InvalidDateKind(other.to_string())),
        }
    }
}

/// Unvalidated input exactly as it came from the command line.
#[derive(Debug, Clone, Default)]
pub struct RawInput {
    /// GitHub login to report on.
    pub user: String,
    /// Optional organization filter.
    pub org: Option<String>,
    /// Inclusive start date.
    pub start: String,
    /// Inclusive end date; today when absent.
    pub end: Option<String>,
    /// `author-date` or `committer-date`; the latter when absent.
    pub date_kind: Option<String>,
}

/// Validated run configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsConfig {
    /// GitHub login whose commits are counted.
    pub user: String,
    /// Organization to iterate instead of using the search index.
    pub org: Option<String>,
    /// First day of the range.
    pub start: NaiveDate,
    /// Last day of the range. May precede `start`; the range is not reordered.
    pub end: NaiveDate,
    /// Timestamp used for filtering and ordering.
    pub date_kind: DateKind,
}

impl StatsConfig {
    /// Validates raw input, using `today` as the end date when none was given.
    pub fn from_raw(raw: &RawInput, today: NaiveDate) -> Result<Self, ValidationError> {
        let user = validate_user(&raw.user)?;
        let org = raw.org.as_deref().map(validate_org).transpose()?;
        let start = parse_date(&raw.start)?;
        let end = match raw.end.as_deref() {
            Some(end) => parse_date(end)?,
            None => today,
        };
        let date_kind = match raw.date_kind.as_deref() {
            Some(kind) => kind.parse()?,
            None => DateKind::default(),
        };

        Ok(Self {
            user,
            org,
            start,
            end,
            date_kind,
        })
    }

    /// Lower bound as an ISO-8601 timestamp at the start of `start`.
    pub fn since(&self) -> String {
        format!("{}T00:00:00Z", self.start.format("%Y-%m-%d"))
    }

    /// Upper bound as an ISO-8601 timestamp at the end of `end`.
    pub fn until(&self) -> String {
        format!("{}T23:59:59Z", self.end.format("%Y-%m-%d"))
    }

    /// Returns true when `date` falls on a UTC day between `start` and `end`.
    pub fn covers(&self, date: &DateTime<FixedOffset>) -> bool {
        let day = date.naive_utc().date();
        self.start <= day && day <= self.end
    }
}

/// Checks a GitHub user login.
pub fn validate_user(user: &str) -> Result<String, ValidationError> {
    if USER_PATTERN.is_match(user) {
        Ok(user.to_string())
    } else {
        Err(ValidationError::InvalidUser(user.to_string()))
    }
}

/// Checks a GitHub organization login. Underscores are not allowed here.
pub fn validate_org(org: &str) -> Result<String, ValidationError> {
    if ORG_PATTERN.is_match(org) {
        Ok(org.to_string())
    } else {
        Err(ValidationError::InvalidOrg(org.to_string()))
    }
}

/// Parses a strict `YYYY-MM-DD` date that must exist in the calendar.
pub fn parse_date(date: &str) -> Result<NaiveDate, ValidationError> {
    if !DATE_PATTERN.is_match(date) {
        return Err(ValidationError::InvalidDate(date.to_string()));
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(date.to_string()))
}

/// Returns true for a full 40-character hexadecimal commit id.
pub fn is_commit_id(sha: &str) -> bool {
    COMMIT_ID_PATTERN.is_match(sha)
}

/// Drops every character that is not safe to pass back to `gh`.
///
/// Keeps ASCII alphanumerics and `/ . - _ @ : +`.
pub fn sanitize(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || SANITIZE_EXTRA.contains(c))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn raw(user: &str, start: &str) -> RawInput {
        RawInput {
            user: user.to_string(),
            start: start.to_string(),
            ..RawInput::default()
        }
    }

    // --- users ---

    #[test]
    fn user_accepts_valid_logins() {
        let longest = "a".repeat(39);
        for user in ["a", "alice", "Alice_Smith", "a-b-c", "_x_", "9", longest.as_str()] {
            assert!(validate_user(user).is_ok(), "{user} should be valid");
        }
    }

    #[test]
    fn user_rejects_each_rule_violation() {
        let too_long = "a".repeat(40);
        for user in ["", "-alice", "alice-", "al ice", "al.ice", "álice", too_long.as_str()] {
            assert_eq!(
                validate_user(user),
                Err(ValidationError::InvalidUser(user.to_string()))
            );
        }
    }

    // --- organizations ---

    #[test]
    fn org_rejects_underscore() {
        assert!(validate_org("my-org").is_ok());
        assert_eq!(
            validate_org("my_org"),
            Err(ValidationError::InvalidOrg("my_org".to_string()))
        );
    }

    #[test]
    fn org_rejects_hyphen_bounds_and_length() {
        assert!(validate_org("-org").is_err());
        assert!(validate_org("org-").is_err());
        assert!(validate_org(&"o".repeat(40)).is_err());
        assert!(validate_org(&"o".repeat(39)).is_ok());
    }

    // --- dates ---

    #[test]
    fn date_parses_real_calendar_dates() {
        assert_eq!(
            parse_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn date_rejects_bad_format_and_missing_days() {
        let bad = [
            "2026-1-01",
            "26-01-01",
            "2026/01/01",
            "2026-02-30",
            "2025-02-29",
            "",
            "2026-01-01T00:00",
        ];
        for date in bad {
            assert_eq!(
                parse_date(date),
                Err(ValidationError::InvalidDate(date.to_string()))
            );
        }
    }

    // --- date kind ---

    #[test]
    fn date_kind_parses_both_values() {
        assert_eq!("author-date".parse::<DateKind>().unwrap(), DateKind::AuthorDate);
        assert_eq!(
            "committer-date".parse::<DateKind>().unwrap(),
            DateKind::CommitterDate
        );
        assert_eq!(
            "push-date".parse::<DateKind>(),
            Err(ValidationError::InvalidDateKind("push-date".to_string()))
        );
    }

    #[test]
    fn date_kind_fields_use_matching_paths() {
        assert_eq!(DateKind::AuthorDate.commit_field(), ".commit.author.date");
        assert_eq!(DateKind::CommitterDate.commit_field(), ".commit.committer.date");
    }

    // --- config ---

    #[test]
    fn config_defaults_end_and_kind() {
        let config = StatsConfig::from_raw(&raw("alice", "2026-01-01"), today()).unwrap();
        assert_eq!(config.end, today());
        assert_eq!(config.date_kind, DateKind::CommitterDate);
        assert!(config.org.is_none());
    }

    #[test]
    fn config_keeps_reversed_range() {
        let mut input = raw("alice", "2026-02-01");
        input.end = Some("2026-01-01".to_string());
        let config = StatsConfig::from_raw(&input, today()).unwrap();
        assert!(config.end < config.start);
        assert_eq!(config.since(), "2026-02-01T00:00:00Z");
        assert_eq!(config.until(), "2026-01-01T23:59:59Z");
    }

    #[test]
    fn covers_compares_utc_days() {
        let mut input = raw("alice", "2026-01-01");
        input.end = Some("2026-01-31".to_string());
        let config = StatsConfig::from_raw(&input, today()).unwrap();
        let at = |s: &str| DateTime::parse_from_rfc3339(s).unwrap();

        assert!(config.covers(&at("2026-01-01T00:00:00Z")));
        assert!(config.covers(&at("2026-01-31T23:59:59Z")));
        assert!(!config.covers(&at("2025-12-31T23:59:59Z")));
        assert!(!config.covers(&at("2026-02-01T00:00:00Z")));
        // 01:00 on Feb 1st at +02:00 is still Jan 31st in UTC.
        assert!(config.covers(&at("2026-02-01T01:00:00+02:00")));
    }

    #[test]
    fn config_reports_first_invalid_field() {
        let mut input = raw("alice", "2026-01-01");
        input.org = Some("bad_org".to_string());
        assert_eq!(
            StatsConfig::from_raw(&input, today()),
            Err(ValidationError::InvalidOrg("bad_org".to_string()))
        );

        let mut input = raw("alice", "2026-01-01");
        input.date_kind = Some("commit-date".to_string());
        assert_eq!(
            StatsConfig::from_raw(&input, today()),
            Err(ValidationError::InvalidDateKind("commit-date".to_string()))
        );
    }

    // --- commit ids and sanitizer ---

    #[test]
    fn commit_id_requires_forty_hex() {
        assert!(is_commit_id(&"a".repeat(40)));
        assert!(is_commit_id("0123456789abcdefABCDEF0123456789abcdef01"));
        assert!(!is_commit_id(&"a".repeat(39)));
        assert!(!is_commit_id(&"g".repeat(40)));
    }

    #[test]
    fn sanitize_strips_shell_metacharacters() {
        assert_eq!(sanitize("octo/repo; rm -rf /"), "octo/reporm-rf/");
        assert_eq!(sanitize("feature/x+y@v1:2_3.4"), "feature/x+y@v1:2_3.4");
        assert_eq!(sanitize("$(whoami)`id`"), "whoamiid");
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn sanitize_output_is_allow_listed(s in ".*") {
                let clean = sanitize(&s);
                prop_assert!(clean
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || SANITIZE_EXTRA.contains(&c)));
            }

            #[test]
            fn sanitize_is_idempotent(s in ".*") {
                let once = sanitize(&s);
                prop_assert_eq!(sanitize(&once), once.clone());
            }

            #[test]
            fn generated_logins_are_accepted(
                user in "[A-Za-z0-9_]([A-Za-z0-9_-]{0,37}[A-Za-z0-9_])?"
            ) {
                prop_assert!(validate_user(&user).is_ok());
            }

            #[test]
            fn hyphen_bounded_logins_are_rejected(inner in "[A-Za-z0-9_]{0,30}") {
                let leading = format!("-{inner}");
                let trailing = format!("{inner}-");
                prop_assert!(validate_user(&leading).is_err());
                prop_assert!(validate_user(&trailing).is_err());
            }
        }
    }
}
