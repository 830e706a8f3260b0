//! Configuration validation for the MS Teams channel plugin.
//!
//! The host orchestrator hands this crate one untyped configuration value
//! (already decoded from the operator-edited document) and gets back either
//! a [`MsTeamsConfig`] with defaults applied or a [`ValidationReport`] whose
//! issues each carry a field path into the original document.
//!
//! Validation is a pure function of its input: fully synchronous, no I/O,
//! no shared state, safe to call concurrently. Invalid input is an expected,
//! representable result, never a panic; the host decides what a rejection
//! means (refuse to start the integration, warn, and so on).
//!
//! # Example
//!
//! ```
//! use msteams_channel_config::{validate_config, DmPolicy, GroupPolicy};
//! use serde_json::json;
//!
//! let config = validate_config(&json!({
//!     "dmPolicy": "open",
//!     "allowFrom": ["*", "user:123"],
//! }))
//! .unwrap();
//! assert_eq!(config.dm_policy, DmPolicy::Open);
//! // Absent fields get their documented defaults.
//! assert_eq!(config.group_policy, GroupPolicy::Allowlist);
//!
//! let report = validate_config(&json!({ "dmPolicy": "open" })).unwrap_err();
//! assert_eq!(report.issues[0].path.to_string(), "allowFrom");
//! ```

pub mod channel;
pub mod issue;
pub mod policy;
pub mod schema;

pub use channel::{
    ChannelOverrides, ChunkMode, ConfigValidator, ExternalSchemas, HeartbeatVisibility,
    MsTeamsConfig, ReplyStyle, TeamConfig, WebhookConfig, OPEN_DM_ALLOW_FROM_MESSAGE,
};
pub use issue::{FieldPath, PathSegment, ValidationIssue, ValidationReport};
pub use policy::{require_open_allow_from, AccessPolicy, DmPolicy, GroupPolicy, WILDCARD};
pub use schema::{AcceptAny, ExternalSchema, KeywordEnum};

/// Validate with permissive defaults for every host-owned sub-schema.
///
/// Hosts that want their tool-policy, per-DM, markdown, or coalesce schemas
/// enforced construct a [`ConfigValidator`] via
/// [`ConfigValidator::with_schemas`] instead.
pub fn validate_config(
    value: &serde_json::Value,
) -> Result<MsTeamsConfig, ValidationReport> {
    ConfigValidator::new().validate(value)
}
