//! Shape and validation of the MS Teams channel configuration.
//!
//! [`ConfigValidator::validate`] takes one untyped value (the host decodes
//! the operator's document before calling in) and produces either a
//! [`MsTeamsConfig`] with defaults applied or a [`ValidationReport`]. Every
//! object level shown here is closed: unrecognized keys are rejected at the
//! root, inside team and channel entries, and inside `webhook` and
//! `heartbeat`.
//!
//! Structural validation runs first, field by field, collecting every issue.
//! The one cross-field rule (`dmPolicy: "open"` requires `"*"` in
//! `allowFrom`) runs afterwards, and only when both fields are themselves
//! well-typed.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::issue::{FieldPath, ValidationIssue, ValidationReport};
use crate::policy::{require_open_allow_from, DmPolicy, GroupPolicy};
use crate::schema::{self, AcceptAny, ExternalSchema, KeywordEnum, ObjectReader};

/// Message attached to `allowFrom` when an open DM policy lacks the wildcard.
pub const OPEN_DM_ALLOW_FROM_MESSAGE: &str =
    r#"channels.msteams.dmPolicy="open" requires channels.msteams.allowFrom to include "*""#;

/// Where replies land: inside the originating thread, or as new posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReplyStyle {
    Thread,
    TopLevel,
}

impl KeywordEnum for ReplyStyle {
    const KEYWORDS: &'static [&'static str] = &["thread", "top-level"];

    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "thread" => Some(Self::Thread),
            "top-level" => Some(Self::TopLevel),
            _ => None,
        }
    }
}

/// Strategy for splitting long outgoing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkMode {
    /// Split at the character limit.
    Length,
    /// Prefer newline boundaries.
    Newline,
}

impl KeywordEnum for ChunkMode {
    const KEYWORDS: &'static [&'static str] = &["length", "newline"];

    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "length" => Some(Self::Length),
            "newline" => Some(Self::Newline),
            _ => None,
        }
    }
}

/// Presentation toggles for liveness signals. The three flags are
/// independent; none implies another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatVisibility {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_ok: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_alerts: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_indicator: Option<bool>,
}

/// Inbound webhook listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Per-channel overrides. Layering onto team defaults is the host's job;
/// this crate only validates shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_mention: Option<bool>,
    /// Host-owned tool policy, kept opaque.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Value>,
    /// Per-sender tool policies keyed by sender identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools_by_sender: Option<HashMap<String, Option<Value>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_style: Option<ReplyStyle>,
}

/// Team-level defaults plus per-channel overrides.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_mention: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools_by_sender: Option<HashMap<String, Option<Value>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_style: Option<ReplyStyle>,
    /// Channel entries keyed by channel identifier; a `null` entry means
    /// "no channel-level overrides".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<HashMap<String, Option<ChannelOverrides>>>,
}

/// Validated root configuration with defaults applied.
///
/// Every field is optional in the document; `dm_policy` and `group_policy`
/// are always set here because validation fills their defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsTeamsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Vec<String>>,
    /// Host-owned markdown rendering config, kept opaque.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markdown: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_writes: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook: Option<WebhookConfig>,
    /// Defaults to [`DmPolicy::Pairing`].
    #[serde(default)]
    pub dm_policy: DmPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_from: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_allow_from: Option<Vec<String>>,
    /// Defaults to [`GroupPolicy::Allowlist`].
    #[serde(default)]
    pub group_policy: GroupPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_chunk_limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_mode: Option<ChunkMode>,
    /// Host-owned block-streaming coalesce config, kept opaque.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_streaming_coalesce: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_allow_hosts: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_auth_allow_hosts: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_mention: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dm_history_limit: Option<u64>,
    /// Per-DM configs keyed by DM identifier, validated by the host's
    /// per-DM schema and otherwise kept opaque.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dms: Option<HashMap<String, Option<Value>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_style: Option<ReplyStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teams: Option<HashMap<String, Option<TeamConfig>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_sessions: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_max_mb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_point_site_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heartbeat: Option<HeartbeatVisibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_prefix: Option<String>,
}

/// Host-owned validators for the opaque sub-schemas nested in the config.
///
/// The defaults accept anything, which keeps this crate usable standalone;
/// the host swaps in its real schemas and their issues surface on the nested
/// field paths.
pub struct ExternalSchemas {
    pub tool_policy: Box<dyn ExternalSchema>,
    pub dm_config: Box<dyn ExternalSchema>,
    pub markdown: Box<dyn ExternalSchema>,
    pub block_streaming_coalesce: Box<dyn ExternalSchema>,
}

impl Default for ExternalSchemas {
    fn default() -> Self {
        Self {
            tool_policy: Box::new(AcceptAny),
            dm_config: Box::new(AcceptAny),
            markdown: Box::new(AcceptAny),
            block_streaming_coalesce: Box::new(AcceptAny),
        }
    }
}

/// Validates candidate configurations. Pure and stateless; one instance can
/// serve any number of concurrent callers.
pub struct ConfigValidator {
    schemas: ExternalSchemas,
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidator {
    /// Validator with permissive defaults for every host-owned sub-schema.
    pub fn new() -> Self {
        Self {
            schemas: ExternalSchemas::default(),
        }
    }

    /// Validator wired to the host's sub-schemas.
    pub fn with_schemas(schemas: ExternalSchemas) -> Self {
        Self { schemas }
    }

    /// Validate a candidate configuration value.
    ///
    /// On success the returned config has `dmPolicy`/`groupPolicy` defaults
    /// filled in. On failure the report carries every issue found, each with
    /// a path into the original document.
    pub fn validate(&self, value: &Value) -> Result<MsTeamsConfig, ValidationReport> {
        let mut issues = Vec::new();
        let config = self.root(value, &FieldPath::root(), &mut issues);
        match config {
            Some(config) if issues.is_empty() => {
                debug!("channel config accepted");
                Ok(config)
            }
            _ => {
                debug!(issues = issues.len(), "channel config rejected");
                Err(ValidationReport::new(issues))
            }
        }
    }

    fn root(
        &self,
        value: &Value,
        path: &FieldPath,
        issues: &mut Vec<ValidationIssue>,
    ) -> Option<MsTeamsConfig> {
        let mut reader = ObjectReader::new(value, path, issues)?;

        let enabled = reader
            .take("enabled")
            .and_then(|(v, p)| schema::expect_bool(v, &p, issues));
        let capabilities = reader
            .take("capabilities")
            .and_then(|(v, p)| schema::expect_string_array(v, &p, issues));
        let markdown = reader.take("markdown").map(|(v, p)| {
            self.schemas.markdown.validate(v, &p, issues);
            v.clone()
        });
        let config_writes = reader
            .take("configWrites")
            .and_then(|(v, p)| schema::expect_bool(v, &p, issues));
        let app_id = reader
            .take("appId")
            .and_then(|(v, p)| schema::expect_string(v, &p, issues));
        let app_password = reader
            .take("appPassword")
            .and_then(|(v, p)| schema::expect_string(v, &p, issues));
        let tenant_id = reader
            .take("tenantId")
            .and_then(|(v, p)| schema::expect_string(v, &p, issues));
        let webhook = reader
            .take("webhook")
            .and_then(|(v, p)| webhook_config(v, &p, issues));

        // The cross-field check below only runs against well-typed fields,
        // so remember whether these two parsed.
        let mut dm_policy_ok = true;
        let dm_policy = reader.take("dmPolicy").and_then(|(v, p)| {
            let parsed = schema::expect_keyword::<DmPolicy>(v, &p, issues);
            dm_policy_ok = parsed.is_some();
            parsed
        });
        let mut allow_from_ok = true;
        let allow_from = reader.take("allowFrom").and_then(|(v, p)| {
            let parsed = schema::expect_string_array(v, &p, issues);
            allow_from_ok = parsed.is_some();
            parsed
        });

        let group_allow_from = reader
            .take("groupAllowFrom")
            .and_then(|(v, p)| schema::expect_string_array(v, &p, issues));
        let group_policy = reader
            .take("groupPolicy")
            .and_then(|(v, p)| schema::expect_keyword::<GroupPolicy>(v, &p, issues));
        let text_chunk_limit = reader
            .take("textChunkLimit")
            .and_then(|(v, p)| schema::expect_positive_int(v, &p, issues));
        let chunk_mode = reader
            .take("chunkMode")
            .and_then(|(v, p)| schema::expect_keyword::<ChunkMode>(v, &p, issues));
        let block_streaming_coalesce = reader.take("blockStreamingCoalesce").map(|(v, p)| {
            self.schemas.block_streaming_coalesce.validate(v, &p, issues);
            v.clone()
        });
        let media_allow_hosts = reader
            .take("mediaAllowHosts")
            .and_then(|(v, p)| schema::expect_string_array(v, &p, issues));
        let media_auth_allow_hosts = reader
            .take("mediaAuthAllowHosts")
            .and_then(|(v, p)| schema::expect_string_array(v, &p, issues));
        let require_mention = reader
            .take("requireMention")
            .and_then(|(v, p)| schema::expect_bool(v, &p, issues));
        let history_limit = reader
            .take("historyLimit")
            .and_then(|(v, p)| schema::expect_non_negative_int(v, &p, issues));
        let dm_history_limit = reader
            .take("dmHistoryLimit")
            .and_then(|(v, p)| schema::expect_non_negative_int(v, &p, issues));
        let dms = reader.take("dms").and_then(|(v, p)| {
            schema::expect_record(v, &p, issues, |v, p, issues| {
                self.schemas.dm_config.validate(v, p, issues);
                Some(v.clone())
            })
        });
        let reply_style = reader
            .take("replyStyle")
            .and_then(|(v, p)| schema::expect_keyword::<ReplyStyle>(v, &p, issues));
        let teams = reader.take("teams").and_then(|(v, p)| {
            schema::expect_record(v, &p, issues, |v, p, issues| self.team(v, p, issues))
        });
        let thread_sessions = reader
            .take("threadSessions")
            .and_then(|(v, p)| schema::expect_bool(v, &p, issues));
        let media_max_mb = reader
            .take("mediaMaxMb")
            .and_then(|(v, p)| schema::expect_positive_number(v, &p, issues));
        let share_point_site_id = reader
            .take("sharePointSiteId")
            .and_then(|(v, p)| schema::expect_string(v, &p, issues));
        let heartbeat = reader
            .take("heartbeat")
            .and_then(|(v, p)| heartbeat_visibility(v, &p, issues));
        let response_prefix = reader
            .take("responsePrefix")
            .and_then(|(v, p)| schema::expect_string(v, &p, issues));

        reader.finish(issues);

        // Defaults, then the one cross-field rule.
        let dm_policy = dm_policy.unwrap_or_default();
        let group_policy = group_policy.unwrap_or_default();
        if dm_policy_ok && allow_from_ok {
            require_open_allow_from(
                &dm_policy,
                allow_from.as_deref(),
                &path.key("allowFrom"),
                OPEN_DM_ALLOW_FROM_MESSAGE,
                issues,
            );
        }

        Some(MsTeamsConfig {
            enabled,
            capabilities,
            markdown,
            config_writes,
            app_id,
            app_password,
            tenant_id,
            webhook,
            dm_policy,
            allow_from,
            group_allow_from,
            group_policy,
            text_chunk_limit,
            chunk_mode,
            block_streaming_coalesce,
            media_allow_hosts,
            media_auth_allow_hosts,
            require_mention,
            history_limit,
            dm_history_limit,
            dms,
            reply_style,
            teams,
            thread_sessions,
            media_max_mb,
            share_point_site_id,
            heartbeat,
            response_prefix,
        })
    }

    fn team(
        &self,
        value: &Value,
        path: &FieldPath,
        issues: &mut Vec<ValidationIssue>,
    ) -> Option<TeamConfig> {
        let mut reader = ObjectReader::new(value, path, issues)?;
        let (require_mention, tools, tools_by_sender, reply_style) =
            self.override_fields(&mut reader, issues);
        let channels = reader.take("channels").and_then(|(v, p)| {
            schema::expect_record(v, &p, issues, |v, p, issues| self.channel(v, p, issues))
        });
        reader.finish(issues);
        Some(TeamConfig {
            require_mention,
            tools,
            tools_by_sender,
            reply_style,
            channels,
        })
    }

    fn channel(
        &self,
        value: &Value,
        path: &FieldPath,
        issues: &mut Vec<ValidationIssue>,
    ) -> Option<ChannelOverrides> {
        let mut reader = ObjectReader::new(value, path, issues)?;
        let (require_mention, tools, tools_by_sender, reply_style) =
            self.override_fields(&mut reader, issues);
        reader.finish(issues);
        Some(ChannelOverrides {
            require_mention,
            tools,
            tools_by_sender,
            reply_style,
        })
    }

    // Fields shared by team and channel entries.
    fn override_fields(
        &self,
        reader: &mut ObjectReader<'_>,
        issues: &mut Vec<ValidationIssue>,
    ) -> (
        Option<bool>,
        Option<Value>,
        Option<HashMap<String, Option<Value>>>,
        Option<ReplyStyle>,
    ) {
        let require_mention = reader
            .take("requireMention")
            .and_then(|(v, p)| schema::expect_bool(v, &p, issues));
        let tools = reader.take("tools").map(|(v, p)| {
            self.schemas.tool_policy.validate(v, &p, issues);
            v.clone()
        });
        let tools_by_sender = reader.take("toolsBySender").and_then(|(v, p)| {
            schema::expect_record(v, &p, issues, |v, p, issues| {
                self.schemas.tool_policy.validate(v, p, issues);
                Some(v.clone())
            })
        });
        let reply_style = reader
            .take("replyStyle")
            .and_then(|(v, p)| schema::expect_keyword::<ReplyStyle>(v, &p, issues));
        (require_mention, tools, tools_by_sender, reply_style)
    }
}

fn webhook_config(
    value: &Value,
    path: &FieldPath,
    issues: &mut Vec<ValidationIssue>,
) -> Option<WebhookConfig> {
    let mut reader = ObjectReader::new(value, path, issues)?;
    let port = reader
        .take("port")
        .and_then(|(v, p)| schema::expect_positive_int(v, &p, issues));
    let webhook_path = reader
        .take("path")
        .and_then(|(v, p)| schema::expect_string(v, &p, issues));
    reader.finish(issues);
    Some(WebhookConfig {
        port,
        path: webhook_path,
    })
}

fn heartbeat_visibility(
    value: &Value,
    path: &FieldPath,
    issues: &mut Vec<ValidationIssue>,
) -> Option<HeartbeatVisibility> {
    let mut reader = ObjectReader::new(value, path, issues)?;
    let show_ok = reader
        .take("showOk")
        .and_then(|(v, p)| schema::expect_bool(v, &p, issues));
    let show_alerts = reader
        .take("showAlerts")
        .and_then(|(v, p)| schema::expect_bool(v, &p, issues));
    let use_indicator = reader
        .take("useIndicator")
        .and_then(|(v, p)| schema::expect_bool(v, &p, issues));
    reader.finish(issues);
    Some(HeartbeatVisibility {
        show_ok,
        show_alerts,
        use_indicator,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::PathSegment;
    use serde_json::json;

    fn validate(value: Value) -> Result<MsTeamsConfig, ValidationReport> {
        ConfigValidator::new().validate(&value)
    }

    fn paths(report: &ValidationReport) -> Vec<String> {
        report.iter().map(|i| i.path.to_string()).collect()
    }

    #[test]
    fn empty_object_gets_defaults() {
        let config = validate(json!({})).unwrap();
        assert_eq!(config.dm_policy, DmPolicy::Pairing);
        assert_eq!(config.group_policy, GroupPolicy::Allowlist);
        assert_eq!(config.enabled, None);
        assert_eq!(config.webhook, None);
        assert_eq!(config.teams, None);
    }

    #[test]
    fn non_object_root_is_rejected() {
        let report = validate(json!("nope")).unwrap_err();
        assert_eq!(report.len(), 1);
        assert!(report.issues[0].path.is_root());
        assert_eq!(report.issues[0].message, "expected an object");
    }

    #[test]
    fn open_dm_policy_without_wildcard_fails_on_allow_from() {
        let report = validate(json!({ "dmPolicy": "open" })).unwrap_err();
        assert_eq!(report.len(), 1);
        assert_eq!(
            report.issues[0].path.segments(),
            &[PathSegment::Key("allowFrom".into())]
        );
        assert_eq!(report.issues[0].message, OPEN_DM_ALLOW_FROM_MESSAGE);

        let report =
            validate(json!({ "dmPolicy": "open", "allowFrom": ["user:123"] })).unwrap_err();
        assert_eq!(report.len(), 1);
        assert_eq!(paths(&report), vec!["allowFrom"]);
    }

    #[test]
    fn open_dm_policy_with_wildcard_succeeds() {
        let config =
            validate(json!({ "dmPolicy": "open", "allowFrom": ["*", "user:123"] })).unwrap();
        assert_eq!(config.dm_policy, DmPolicy::Open);
        assert_eq!(
            config.allow_from,
            Some(vec!["*".to_string(), "user:123".to_string()])
        );
        // The other default still applies.
        assert_eq!(config.group_policy, GroupPolicy::Allowlist);
    }

    #[test]
    fn cross_field_check_skipped_when_dm_policy_is_invalid() {
        let report = validate(json!({ "dmPolicy": "wide-open" })).unwrap_err();
        assert_eq!(report.len(), 1);
        assert_eq!(paths(&report), vec!["dmPolicy"]);
        assert!(report.issues[0].message.contains("\"pairing\""));
    }

    #[test]
    fn cross_field_check_skipped_when_allow_from_is_malformed() {
        let report = validate(json!({ "dmPolicy": "open", "allowFrom": [42] })).unwrap_err();
        assert_eq!(paths(&report), vec!["allowFrom[0]"]);
        assert!(report
            .iter()
            .all(|i| i.message != OPEN_DM_ALLOW_FROM_MESSAGE));
    }

    #[test]
    fn cross_field_check_still_runs_when_unrelated_fields_fail() {
        let report = validate(json!({ "dmPolicy": "open", "enabled": 1 })).unwrap_err();
        let mut got = paths(&report);
        got.sort();
        assert_eq!(got, vec!["allowFrom", "enabled"]);
        assert!(report
            .iter()
            .any(|i| i.message == OPEN_DM_ALLOW_FROM_MESSAGE));
    }

    #[test]
    fn unknown_keys_are_rejected_at_every_closed_level() {
        let report = validate(json!({ "bogus": true })).unwrap_err();
        assert_eq!(paths(&report), vec!["bogus"]);

        let report = validate(json!({ "webhook": { "prot": 3978 } })).unwrap_err();
        assert_eq!(paths(&report), vec!["webhook.prot"]);

        let report = validate(json!({ "heartbeat": { "showAll": true } })).unwrap_err();
        assert_eq!(paths(&report), vec!["heartbeat.showAll"]);

        let report = validate(json!({ "teams": { "t1": { "color": "red" } } })).unwrap_err();
        assert_eq!(paths(&report), vec!["teams.t1.color"]);

        let report = validate(
            json!({ "teams": { "t1": { "channels": { "c1": { "mention": true } } } } }),
        )
        .unwrap_err();
        assert_eq!(paths(&report), vec!["teams.t1.channels.c1.mention"]);
    }

    #[test]
    fn webhook_port_bounds() {
        for bad in [json!(0), json!(-1), json!(1.25), json!("3978")] {
            let report = validate(json!({ "webhook": { "port": bad } })).unwrap_err();
            assert_eq!(paths(&report), vec!["webhook.port"]);
        }

        for good in [1u64, 3978, 99999] {
            let config = validate(json!({ "webhook": { "port": good } })).unwrap();
            assert_eq!(config.webhook.unwrap().port, Some(good));
        }
    }

    #[test]
    fn reply_style_is_checked_at_all_three_levels() {
        let report = validate(json!({ "replyStyle": "sideways" })).unwrap_err();
        assert_eq!(paths(&report), vec!["replyStyle"]);

        let report =
            validate(json!({ "teams": { "t1": { "replyStyle": "sideways" } } })).unwrap_err();
        assert_eq!(paths(&report), vec!["teams.t1.replyStyle"]);

        let report = validate(
            json!({ "teams": { "t1": { "channels": { "c1": { "replyStyle": "sideways" } } } } }),
        )
        .unwrap_err();
        assert_eq!(paths(&report), vec!["teams.t1.channels.c1.replyStyle"]);

        let config = validate(json!({ "replyStyle": "top-level" })).unwrap();
        assert_eq!(config.reply_style, Some(ReplyStyle::TopLevel));
    }

    #[test]
    fn nested_team_and_channel_entries_validate() {
        let config = validate(json!({
            "teams": {
                "t1": {
                    "channels": {
                        "c1": { "requireMention": true, "replyStyle": "thread" },
                        "c2": null
                    }
                },
                "t2": null
            }
        }))
        .unwrap();

        let teams = config.teams.unwrap();
        assert_eq!(teams.get("t2"), Some(&None));
        let t1 = teams.get("t1").unwrap().as_ref().unwrap();
        let channels = t1.channels.as_ref().unwrap();
        assert_eq!(channels.get("c2"), Some(&None));
        let c1 = channels.get("c1").unwrap().as_ref().unwrap();
        assert_eq!(c1.require_mention, Some(true));
        assert_eq!(c1.reply_style, Some(ReplyStyle::Thread));
    }

    #[test]
    fn numeric_limits() {
        let report = validate(json!({ "historyLimit": -1 })).unwrap_err();
        assert_eq!(paths(&report), vec!["historyLimit"]);
        let report = validate(json!({ "textChunkLimit": 0 })).unwrap_err();
        assert_eq!(paths(&report), vec!["textChunkLimit"]);
        let report = validate(json!({ "mediaMaxMb": 0 })).unwrap_err();
        assert_eq!(paths(&report), vec!["mediaMaxMb"]);

        let config = validate(json!({
            "historyLimit": 0,
            "dmHistoryLimit": 50,
            "textChunkLimit": 4000,
            "mediaMaxMb": 12.5
        }))
        .unwrap();
        assert_eq!(config.history_limit, Some(0));
        assert_eq!(config.dm_history_limit, Some(50));
        assert_eq!(config.text_chunk_limit, Some(4000));
        assert_eq!(config.media_max_mb, Some(12.5));
    }

    #[test]
    fn chunk_mode_keywords() {
        let config = validate(json!({ "chunkMode": "newline" })).unwrap();
        assert_eq!(config.chunk_mode, Some(ChunkMode::Newline));

        let report = validate(json!({ "chunkMode": "words" })).unwrap_err();
        assert_eq!(paths(&report), vec!["chunkMode"]);
    }

    #[test]
    fn independent_errors_are_all_collected() {
        let report = validate(json!({
            "enabled": 1,
            "webhook": { "port": 0 },
            "heartbeat": { "showOk": "yes" },
            "bogus": true
        }))
        .unwrap_err();
        let mut got = paths(&report);
        got.sort();
        assert_eq!(got, vec!["bogus", "enabled", "heartbeat.showOk", "webhook.port"]);
    }

    #[test]
    fn full_config_carries_through() {
        let config = validate(json!({
            "enabled": true,
            "capabilities": ["files", "cards"],
            "markdown": { "anything": "goes" },
            "configWrites": false,
            "appId": "app-1",
            "appPassword": "secret",
            "tenantId": "tenant-1",
            "webhook": { "port": 3978, "path": "/api/messages" },
            "dmPolicy": "allowlist",
            "allowFrom": ["user:1"],
            "groupAllowFrom": ["team:1"],
            "groupPolicy": "open",
            "textChunkLimit": 2000,
            "chunkMode": "length",
            "blockStreamingCoalesce": { "ms": 250 },
            "mediaAllowHosts": ["cdn.example.com"],
            "mediaAuthAllowHosts": ["graph.microsoft.com"],
            "requireMention": true,
            "historyLimit": 100,
            "dmHistoryLimit": 20,
            "dms": { "d1": { "tools": "whatever" }, "d2": null },
            "replyStyle": "thread",
            "threadSessions": true,
            "mediaMaxMb": 25,
            "sharePointSiteId": "site-1",
            "heartbeat": { "showOk": true, "showAlerts": false, "useIndicator": true },
            "responsePrefix": "[bot]"
        }))
        .unwrap();

        assert_eq!(config.enabled, Some(true));
        assert_eq!(config.app_id.as_deref(), Some("app-1"));
        assert_eq!(config.dm_policy, DmPolicy::Allowlist);
        assert_eq!(config.group_policy, GroupPolicy::Open);
        let webhook = config.webhook.as_ref().unwrap();
        assert_eq!(webhook.port, Some(3978));
        assert_eq!(webhook.path.as_deref(), Some("/api/messages"));
        assert_eq!(config.dms.as_ref().unwrap().get("d2"), Some(&None));
        assert_eq!(config.thread_sessions, Some(true));
        assert_eq!(
            config.heartbeat,
            Some(HeartbeatVisibility {
                show_ok: Some(true),
                show_alerts: Some(false),
                use_indicator: Some(true),
            })
        );
    }

    #[test]
    fn revalidating_a_validated_config_is_idempotent() {
        let first = validate(json!({
            "dmPolicy": "open",
            "allowFrom": ["*"],
            "webhook": { "port": 3978 },
            "teams": { "t1": { "channels": { "c1": { "replyStyle": "thread" } } } },
            "mediaMaxMb": 8.5
        }))
        .unwrap();

        let serialized = serde_json::to_value(&first).unwrap();
        let second = validate(serialized).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn explicit_null_fields_are_rejected() {
        let report = validate(json!({ "enabled": null })).unwrap_err();
        assert_eq!(paths(&report), vec!["enabled"]);
        assert_eq!(report.issues[0].message, "expected a boolean");

        let report = validate(json!({ "webhook": { "port": null } })).unwrap_err();
        assert_eq!(paths(&report), vec!["webhook.port"]);

        // A null dmPolicy is a structural error, so the cross-field rule
        // stays quiet.
        let report = validate(json!({ "dmPolicy": null })).unwrap_err();
        assert_eq!(paths(&report), vec!["dmPolicy"]);
        assert_eq!(report.issues[0].message, "expected a string");
    }

    #[test]
    fn capability_entries_must_be_strings() {
        let report = validate(json!({ "capabilities": ["files", 7] })).unwrap_err();
        assert_eq!(paths(&report), vec!["capabilities[1]"]);
    }

    struct RejectAll(&'static str);

    impl ExternalSchema for RejectAll {
        fn validate(&self, _value: &Value, path: &FieldPath, issues: &mut Vec<ValidationIssue>) {
            issues.push(ValidationIssue::new(path.clone(), self.0));
        }
    }

    #[test]
    fn host_schema_issues_surface_on_nested_paths() {
        let validator = ConfigValidator::with_schemas(ExternalSchemas {
            tool_policy: Box::new(RejectAll("bad tool policy")),
            dm_config: Box::new(RejectAll("bad dm config")),
            ..Default::default()
        });

        let report = validator
            .validate(&json!({
                "teams": { "t1": { "tools": "x", "toolsBySender": { "s1": "y" } } },
                "dms": { "d1": {} }
            }))
            .unwrap_err();

        let mut got = paths(&report);
        got.sort();
        assert_eq!(
            got,
            vec!["dms.d1", "teams.t1.tools", "teams.t1.toolsBySender.s1"]
        );
    }

    #[test]
    fn default_config_is_a_valid_document() {
        let value = serde_json::to_value(MsTeamsConfig::default()).unwrap();
        assert_eq!(value, json!({ "dmPolicy": "pairing", "groupPolicy": "allowlist" }));
        assert!(validate(value).is_ok());
    }
}
