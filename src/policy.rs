//! Access-control policy keywords.
//!
//! `DmPolicy` and `GroupPolicy` gate who may reach the integration over
//! direct messages and group channels. Both share the "open" safety rule
//! enforced by [`require_open_allow_from`]: an open policy is only honored
//! when the matching allow-list spells out the wildcard, so "anyone may
//! write" is always an explicit operator decision.

use serde::{Deserialize, Serialize};

use crate::issue::{FieldPath, ValidationIssue};
use crate::schema::KeywordEnum;

/// The allow-list entry meaning "all senders".
pub const WILDCARD: &str = "*";

/// Who may initiate a direct-message session with the integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DmPolicy {
    /// Senders must pair with the integration first.
    #[default]
    Pairing,
    /// Only allow-listed senders.
    Allowlist,
    /// Any sender, gated by an explicit `"*"` allow-list entry.
    Open,
}

impl KeywordEnum for DmPolicy {
    const KEYWORDS: &'static [&'static str] = &["pairing", "allowlist", "open"];

    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "pairing" => Some(Self::Pairing),
            "allowlist" => Some(Self::Allowlist),
            "open" => Some(Self::Open),
            _ => None,
        }
    }
}

/// Admission rule for group/channel participation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupPolicy {
    /// Only allow-listed groups.
    #[default]
    Allowlist,
    /// Any group, gated by an explicit `"*"` allow-list entry.
    Open,
    /// No group participation at all.
    Disabled,
}

impl KeywordEnum for GroupPolicy {
    const KEYWORDS: &'static [&'static str] = &["allowlist", "open", "disabled"];

    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "allowlist" => Some(Self::Allowlist),
            "open" => Some(Self::Open),
            "disabled" => Some(Self::Disabled),
            _ => None,
        }
    }
}

/// Policies with an "open" variant that must be backed by a wildcard
/// allow-list entry.
pub trait AccessPolicy {
    fn is_open(&self) -> bool;
}

impl AccessPolicy for DmPolicy {
    fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}

impl AccessPolicy for GroupPolicy {
    fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}

/// Cross-field check: an open policy requires `"*"` in its allow-list.
///
/// Without the wildcard an open policy would admit nobody while reading as
/// if it admitted everyone. Does nothing when the policy is not open. On
/// failure, appends one issue with the caller's `path` and `message`, so the
/// same check serves every access-control-gated surface in the host.
pub fn require_open_allow_from<P: AccessPolicy>(
    policy: &P,
    allow_from: Option<&[String]>,
    path: &FieldPath,
    message: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    if !policy.is_open() {
        return;
    }
    let has_wildcard = allow_from
        .map(|entries| entries.iter().any(|entry| entry == WILDCARD))
        .unwrap_or(false);
    if !has_wildcard {
        issues.push(ValidationIssue::new(path.clone(), message));
    }
}
