//! Version constraint engine
//!
//! Parses `MAJOR.MINOR[.PATCH]` versions and comma-separated comparator
//! requirements such as `">=1.0, <2.0"`, and evaluates whether an installed
//! version satisfies them.

use crate::error::{Error, Result};
use regex::Regex;
use std::cmp::Ordering;
use std::sync::OnceLock;

// =============================================================================
// Types
// =============================================================================

/// A parsed version; an absent patch acts as a wildcard in requirements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionTuple {
    pub major: u64,
    pub minor: u64,
    pub patch: Option<u64>,
}

impl VersionTuple {
    pub fn new(major: u64, minor: u64, patch: Option<u64>) -> Self {
        Self { major, minor, patch }
    }
}

impl std::fmt::Display for VersionTuple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.patch {
            Some(patch) => write!(f, "{}.{}.{}", self.major, self.minor, patch),
            None => write!(f, "{}.{}", self.major, self.minor),
        }
    }
}

/// Comparison operator of a requirement clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    GreaterOrEqual,
    LessOrEqual,
    Equal,
    Greater,
    Less,
    NotEqual,
}

impl Comparator {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            ">=" => Some(Comparator::GreaterOrEqual),
            "<=" => Some(Comparator::LessOrEqual),
            "==" | "=" => Some(Comparator::Equal),
            ">" => Some(Comparator::Greater),
            "<" => Some(Comparator::Less),
            "!=" => Some(Comparator::NotEqual),
            _ => None,
        }
    }

    fn holds(&self, ordering: Ordering) -> bool {
        match self {
            Comparator::GreaterOrEqual => ordering != Ordering::Less,
            Comparator::LessOrEqual => ordering != Ordering::Greater,
            Comparator::Equal => ordering == Ordering::Equal,
            Comparator::Greater => ordering == Ordering::Greater,
            Comparator::Less => ordering == Ordering::Less,
            Comparator::NotEqual => ordering != Ordering::Equal,
        }
    }
}

impl std::fmt::Display for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = match self {
            Comparator::GreaterOrEqual => ">=",
            Comparator::LessOrEqual => "<=",
            Comparator::Equal => "==",
            Comparator::Greater => ">",
            Comparator::Less => "<",
            Comparator::NotEqual => "!=",
        };
        f.write_str(token)
    }
}

/// One `(comparator, version)` clause of a requirement set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirement {
    pub comparator: Comparator,
    pub version: VersionTuple,
}

// =============================================================================
// Parsing
// =============================================================================

fn requirement_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(>=|<=|==|!=|=|<|>)\s*(\S+)\s*$").expect("requirement regex is valid")
    })
}

fn parse_number(segment: &str) -> Option<u64> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// Parse `MAJOR.MINOR[.PATCH]`; returns `None` when the text does not match
///
/// Only the leading digits of the patch segment are kept, so pre-release
/// suffixes are ignored (`"2.3.5a"` parses as `2.3.5`).
pub fn parse_version(text: &str) -> Option<VersionTuple> {
    let segments: Vec<&str> = text.trim().split('.').collect();
    if !(2..=3).contains(&segments.len()) {
        return None;
    }

    let major = parse_number(segments[0])?;
    let minor = parse_number(segments[1])?;
    let patch = match segments.get(2) {
        Some(segment) => {
            let digits_end = segment
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(segment.len());
            Some(parse_number(&segment[..digits_end])?)
        }
        None => None,
    };

    Some(VersionTuple { major, minor, patch })
}

/// Parse a comma-separated requirement set such as `">=1.0, <2.0"`
pub fn parse_requirements(text: &str) -> Result<Vec<Requirement>> {
    text.split(',')
        .map(|clause| -> Result<Requirement> {
            let invalid =
                || Error::InvalidRequirement(format!("'{}' in '{}'", clause.trim(), text));
            let captures = requirement_regex().captures(clause).ok_or_else(invalid)?;
            let comparator = Comparator::from_token(&captures[1]).ok_or_else(invalid)?;
            let version = parse_version(&captures[2]).ok_or_else(|| {
                Error::InvalidRequirement(format!("bad version '{}' in '{}'", &captures[2], text))
            })?;

            Ok(Requirement { comparator, version })
        })
        .collect()
}

// =============================================================================
// Evaluation
// =============================================================================

/// Evaluate one clause
///
/// When the requirement has no patch only `(major, minor)` take part in the
/// comparison. A missing candidate patch compares as 0.
pub fn compare(comparator: Comparator, version: &VersionTuple, requirement: &VersionTuple) -> bool {
    let ordering = match requirement.patch {
        None => (version.major, version.minor).cmp(&(requirement.major, requirement.minor)),
        Some(patch) => (version.major, version.minor, version.patch.unwrap_or(0))
            .cmp(&(requirement.major, requirement.minor, patch)),
    };
    comparator.holds(ordering)
}

/// Check a parsed version against every clause of a requirement set
pub fn satisfies(version: &VersionTuple, requirements: &[Requirement]) -> bool {
    requirements
        .iter()
        .all(|req| compare(req.comparator, version, &req.version))
}

/// Parse both sides and check that the version satisfies all requirements
///
/// An unparsable version never satisfies anything; a malformed requirement
/// string is a programming error and is returned as such.
pub fn version_satisfied(version_text: &str, requirements_text: &str) -> Result<bool> {
    let requirements = parse_requirements(requirements_text)?;
    Ok(parse_version(version_text)
        .map(|version| satisfies(&version, &requirements))
        .unwrap_or(false))
}
