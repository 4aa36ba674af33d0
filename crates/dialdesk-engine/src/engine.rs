//! Disposition join and recording resolution
//!
//! The two hard paths of the system. `join_disposition` turns one agent
//! submission into exactly one call-activity record, folding in whatever
//! duration/recording data exists at that moment. `resolve_recording`
//! attaches a recording webhook to the right record even when the webhook
//! carries the child leg's call id.

use std::sync::Arc;

use chrono::{Duration, NaiveTime, TimeZone, Utc};
use serde_json::json;
use tracing::{debug, info, warn};

use dialdesk_audit::AuditLog;
use dialdesk_records::{CallActivityFields, RecordId, RecordStore, TaskFields};
use dialdesk_telephony::{CallId, TelephonyGateway};

use crate::correlation::CorrelationStore;
use crate::error::{EngineError, Result};
use crate::rules::DispositionRules;
use crate::types::{
    non_empty, parse_action_date, parse_currency, CallEvent, DispositionSubmission, JoinOutcome,
    RecordingEvent, ResolveOutcome,
};

const CALL_LOGS_COLLECTION: &str = "call_logs";
const DISPOSITION_LOGS_COLLECTION: &str = "disposition_logs";

/// Engine-level settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Public base URL of this service; recording URLs are rewritten to a
    /// proxy path under it so provider credentials never reach end users.
    pub public_base_url: String,
}

impl EngineConfig {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        EngineConfig {
            public_base_url: public_base_url.into(),
        }
    }

    fn proxy_recording_url(&self, recording_id: &str) -> String {
        let base = self.public_base_url.trim_end_matches('/');
        format!("{base}/play_recording/{recording_id}")
    }
}

/// Stateless join engine over the three external collaborators. One
/// instance is shared across all request handlers; every method is an
/// independent single attempt with no cross-call locking.
pub struct CallFlowEngine {
    gateway: Arc<dyn TelephonyGateway>,
    records: Arc<dyn RecordStore>,
    audit: Arc<dyn AuditLog>,
    correlations: CorrelationStore,
    rules: DispositionRules,
    config: EngineConfig,
}

impl CallFlowEngine {
    pub fn new(
        gateway: Arc<dyn TelephonyGateway>,
        records: Arc<dyn RecordStore>,
        audit: Arc<dyn AuditLog>,
        rules: DispositionRules,
        config: EngineConfig,
    ) -> Self {
        let correlations = CorrelationStore::new(audit.clone());
        CallFlowEngine {
            gateway,
            records,
            audit,
            correlations,
            rules,
            config,
        }
    }

    pub fn correlations(&self) -> &CorrelationStore {
        &self.correlations
    }

    /// Store the call -> record mapping at dial time, before any webhook
    /// can fire.
    pub async fn correlate_call(
        &self,
        call_id: &CallId,
        record_id: &RecordId,
    ) -> dialdesk_audit::Result<()> {
        self.correlations.put(call_id, record_id).await
    }

    /// Persist one status callback. Append-only; failures are logged and
    /// swallowed so the webhook handler can always ack.
    pub async fn record_call_event(&self, event: CallEvent) {
        if matches!(event.status.as_str(), "busy" | "failed" | "no-answer") {
            warn!(call_id = %event.call_id, status = %event.status, "call did not connect");
        }
        let doc = json!({
            "call_sid": event.call_id.as_str(),
            "status": event.status,
            "direction": event.direction,
            "from": event.from,
            "to": event.to,
            "received_at": event.timestamp.to_rfc3339(),
        });
        if let Err(err) = self.audit.append(CALL_LOGS_COLLECTION, doc).await {
            warn!(call_id = %event.call_id, error = %err, "call event audit write failed");
        }
    }

    /// Turn one disposition submission into one call-activity record.
    ///
    /// Only a record-store failure on the activity write itself (or an
    /// unusable submission) is an error; duration lookup, the recording
    /// guard, task creation, and audit writes all degrade to warnings.
    pub async fn join_disposition(&self, submission: DispositionSubmission) -> Result<JoinOutcome> {
        let lead_record_id = submission.record_id.as_u64().ok_or_else(|| {
            EngineError::InvalidSubmission(format!(
                "lead record id {} is not numeric",
                submission.record_id
            ))
        })?;

        let mut warnings = Vec::new();
        let now = Utc::now();

        // Best-effort duration. The call may still be in progress, or the
        // provider may not have settled billing data yet.
        let duration_seconds = match &submission.call_id {
            Some(call_id) => match self.gateway.call_duration(call_id).await {
                Ok(duration) => duration,
                Err(err) => {
                    warn!(call_id = %call_id, error = %err, "duration lookup failed");
                    warnings.push("duration lookup failed".to_string());
                    None
                }
            },
            None => None,
        };

        // The recording webhook may have raced ahead of the agent's form
        // submission. If its metadata is already in the audit log, attach
        // the URL now instead of waiting for a backfill that already ran.
        let recording_url = match &submission.call_id {
            Some(call_id) => self.recorded_url_for(call_id).await,
            None => None,
        };

        let disposition_code = non_empty(&submission.disposition_code);
        let title = match &disposition_code {
            Some(code) => format!("{} - {}", code, now.format("%Y-%m-%d %H:%M")),
            None => format!("Call - {}", now.format("%Y-%m-%d %H:%M")),
        };

        let next_action_date = non_empty(&submission.next_action_date)
            .and_then(|raw| parse_action_date(&raw));
        let asking_price =
            non_empty(&submission.asking_price).and_then(|raw| parse_currency(&raw));

        let fields = CallActivityFields {
            title,
            lead_record_id,
            date_of_call: now,
            duration_seconds,
            recording_url: recording_url.clone(),
            disposition_code: disposition_code.clone(),
            agent_notes: non_empty(&submission.notes),
            motivation_level: non_empty(&submission.motivation),
            next_action_date,
            asking_price,
        };

        // The one fatal step. No activity, no outcome — but the compliance
        // trail records the attempt either way.
        let activity_id = match self.records.create_call_activity(&fields).await {
            Ok(id) => id,
            Err(err) => {
                let audit_doc = json!({
                    "record_id": submission.record_id.as_str(),
                    "call_sid": submission.call_id.as_ref().map(CallId::as_str),
                    "disposition": disposition_code,
                    "outcome": "store_write_failed",
                    "error": err.to_string(),
                    "logged_at": now.to_rfc3339(),
                });
                if let Err(audit_err) =
                    self.audit.append(DISPOSITION_LOGS_COLLECTION, audit_doc).await
                {
                    warn!(error = %audit_err, "disposition audit write failed");
                }
                return Err(err.into());
            }
        };
        info!(activity_id = %activity_id, lead = lead_record_id, "call activity created");

        // Point later recording webhooks at the new activity. A failed
        // mapping write only costs the backfill, not the activity.
        if let Some(call_id) = &submission.call_id {
            if let Err(err) = self.correlations.put(call_id, &activity_id).await {
                warn!(call_id = %call_id, error = %err, "correlation write failed");
                warnings.push("correlation write failed".to_string());
            }
        }

        let task_id = match disposition_code.as_deref().and_then(|c| self.rules.lookup(c)) {
            Some(rule) => {
                let due_date = match next_action_date {
                    Some(date) => Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)),
                    None => now + Duration::days(rule.due_offset_days),
                };
                let task = TaskFields {
                    title: format!("{} - lead {}", rule.task_type, lead_record_id),
                    task_type: rule.task_type.clone(),
                    due_date,
                    lead_record_id,
                };
                match self.records.create_task(&task).await {
                    Ok(id) => {
                        info!(task_id = %id, task_type = %task.task_type, "follow-up task created");
                        Some(id)
                    }
                    Err(err) => {
                        warn!(error = %err, "task creation failed");
                        warnings.push("task creation failed".to_string());
                        None
                    }
                }
            }
            None => None,
        };

        let audit_doc = json!({
            "record_id": submission.record_id.as_str(),
            "activity_id": activity_id.as_str(),
            "call_sid": submission.call_id.as_ref().map(CallId::as_str),
            "disposition": disposition_code,
            "task_id": task_id.as_ref().map(RecordId::as_str),
            "outcome": "created",
            "logged_at": now.to_rfc3339(),
        });
        if let Err(err) = self.audit.append(DISPOSITION_LOGS_COLLECTION, audit_doc).await {
            warn!(error = %err, "disposition audit write failed");
            warnings.push("audit write failed".to_string());
        }

        Ok(JoinOutcome {
            activity_id,
            duration_seconds,
            recording_url,
            task_id,
            warnings,
        })
    }

    /// Resolve a recording webhook to a call-activity record.
    ///
    /// Lookup is two-phase: the event's own call id first, then the parent
    /// leg's id, because recordings attach to the prospect (child) leg
    /// while calls are correlated under the agent (parent) leg. The
    /// recording metadata is persisted to the audit log under the original
    /// call id before any resolution, so a disposition submitted later can
    /// always find it. Never errors; unresolvable events are discarded.
    pub async fn resolve_recording(&self, event: RecordingEvent) -> ResolveOutcome {
        let proxy_url = self.config.proxy_recording_url(&event.recording_id);

        self.persist_recording_metadata(&event, &proxy_url).await;

        let record_id = match self.lookup_with_parent_fallback(&event.call_id).await {
            Some(id) => id,
            None => {
                info!(call_id = %event.call_id, recording_id = %event.recording_id,
                      "recording unresolvable, discarding");
                return ResolveOutcome {
                    resolved: false,
                    record_id: None,
                };
            }
        };

        match self.records.update_recording_url(&record_id, &proxy_url).await {
            Ok(()) => {
                info!(record_id = %record_id, recording_id = %event.recording_id,
                      "recording attached");
                ResolveOutcome {
                    resolved: true,
                    record_id: Some(record_id),
                }
            }
            Err(err) => {
                warn!(record_id = %record_id, error = %err, "recording update failed");
                ResolveOutcome {
                    resolved: false,
                    record_id: Some(record_id),
                }
            }
        }
    }

    /// Direct correlation lookup, then parent-leg fallback.
    async fn lookup_with_parent_fallback(&self, call_id: &CallId) -> Option<RecordId> {
        match self.correlations.get(call_id).await {
            Ok(Some(id)) => return Some(id),
            Ok(None) => {}
            Err(err) => {
                warn!(call_id = %call_id, error = %err, "correlation lookup failed");
                return None;
            }
        }

        let parent = match self.gateway.parent_call_id(call_id).await {
            Ok(Some(parent)) => parent,
            Ok(None) => {
                debug!(call_id = %call_id, "no parent call leg");
                return None;
            }
            Err(err) => {
                warn!(call_id = %call_id, error = %err, "parent lookup failed");
                return None;
            }
        };

        match self.correlations.get(&parent).await {
            Ok(found) => found,
            Err(err) => {
                warn!(call_id = %parent, error = %err, "correlation lookup failed");
                None
            }
        }
    }

    /// Upsert recording metadata into the call log, keyed by the original
    /// event call id. Runs regardless of whether the event can be resolved
    /// to a record, so the join's race guard always sees it.
    async fn persist_recording_metadata(&self, event: &RecordingEvent, proxy_url: &str) {
        let patch = json!({
            "recording_sid": event.recording_id,
            "recording_url": proxy_url,
            "recording_duration": event.duration,
            "recording_received_at": event.timestamp.to_rfc3339(),
        });
        let call_sid = json!(event.call_id.as_str());
        match self
            .audit
            .update_one(CALL_LOGS_COLLECTION, "call_sid", &call_sid, patch.clone())
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                let mut doc = patch;
                doc["call_sid"] = call_sid;
                if let Err(err) = self.audit.append(CALL_LOGS_COLLECTION, doc).await {
                    warn!(call_id = %event.call_id, error = %err,
                          "recording audit write failed");
                }
            }
            Err(err) => {
                warn!(call_id = %event.call_id, error = %err,
                      "recording audit update failed");
            }
        }
    }

    /// Already-persisted recording URL for a call, if the webhook got here
    /// first.
    async fn recorded_url_for(&self, call_id: &CallId) -> Option<String> {
        let call_sid = json!(call_id.as_str());
        match self
            .audit
            .find_one(CALL_LOGS_COLLECTION, "call_sid", &call_sid)
            .await
        {
            Ok(Some(doc)) => doc
                .get("recording_url")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            Ok(None) => None,
            Err(err) => {
                warn!(call_id = %call_id, error = %err, "recording guard lookup failed");
                None
            }
        }
    }
}
