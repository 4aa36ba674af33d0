//! Route handlers
//!
//! Two kinds of surface live here with opposite failure contracts. Webhook
//! endpoints (`/call_status`, `/recording_status`) always return 200 so the
//! provider never retries. Agent-facing endpoints (`/dial`,
//! `/submit_call_data`, `/lead/...`) report failures as structured JSON.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use dialdesk_engine::{CallEvent, DispositionSubmission, EngineError, RecordingEvent};
use dialdesk_records::{LeadIntelligence, LeadSummary, RecordId, RecordsError};
use dialdesk_telephony::{CallId, CallbackUrls, TelephonyError};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/dial", post(dial))
        .route("/call_status", post(call_status))
        .route("/recording_status", post(recording_status))
        .route("/submit_call_data", post(submit_call_data))
        .route("/lead/:record_id/intelligence", get(lead_intelligence))
        .route("/play_recording/:recording_id", get(play_recording))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn error_body(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
struct DialRequest {
    record_id: String,
    prospect_number: String,
    /// Agent's device/number. The provider dials this first (parent leg),
    /// then the voice URL bridges in the prospect (child leg).
    agent_id: Option<String>,
}

/// Originate an outbound call and correlate it to the lead record before
/// any webhook can fire. A failed correlation write is reported but does
/// not undo the call.
async fn dial(State(state): State<AppState>, Json(req): Json<DialRequest>) -> Response {
    let agent_id = match req.agent_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => return error_body(StatusCode::BAD_REQUEST, "agent_id is required".to_string()),
    };

    let callbacks = CallbackUrls::for_prospect(&state.public_base_url, &req.prospect_number);
    let call_id = match state.gateway.create_call(&agent_id, &callbacks).await {
        Ok(id) => id,
        Err(err) => {
            warn!(error = %err, "call origination failed");
            return error_body(StatusCode::BAD_GATEWAY, format!("call origination failed: {err}"));
        }
    };
    info!(call_id = %call_id, record_id = %req.record_id, "call originated");

    let record_id = RecordId::new(req.record_id);
    let mapping_stored = match state.engine.correlate_call(&call_id, &record_id).await {
        Ok(()) => true,
        Err(err) => {
            warn!(call_id = %call_id, error = %err, "correlation write failed");
            false
        }
    };

    Json(json!({
        "success": true,
        "call_sid": call_id.as_str(),
        "mapping_stored": mapping_stored,
    }))
    .into_response()
}

/// Twilio-style status callback form. Field names match the provider's
/// PascalCase wire format.
#[derive(Debug, Deserialize)]
struct CallStatusForm {
    #[serde(rename = "CallSid")]
    call_sid: String,
    #[serde(rename = "CallStatus")]
    call_status: String,
    #[serde(rename = "Direction")]
    direction: Option<String>,
    #[serde(rename = "From")]
    from: Option<String>,
    #[serde(rename = "To")]
    to: Option<String>,
}

async fn call_status(State(state): State<AppState>, Form(form): Form<CallStatusForm>) -> StatusCode {
    state
        .engine
        .record_call_event(CallEvent {
            call_id: CallId::new(form.call_sid),
            status: form.call_status,
            direction: form.direction,
            from: form.from,
            to: form.to,
            timestamp: Utc::now(),
        })
        .await;
    StatusCode::OK
}

#[derive(Debug, Deserialize)]
struct RecordingStatusForm {
    #[serde(rename = "CallSid")]
    call_sid: String,
    #[serde(rename = "RecordingSid")]
    recording_sid: String,
    #[serde(rename = "RecordingUrl")]
    recording_url: String,
    #[serde(rename = "RecordingDuration")]
    recording_duration: Option<String>,
}

async fn recording_status(
    State(state): State<AppState>,
    Form(form): Form<RecordingStatusForm>,
) -> StatusCode {
    let outcome = state
        .engine
        .resolve_recording(RecordingEvent {
            call_id: CallId::new(form.call_sid),
            recording_id: form.recording_sid,
            recording_url: form.recording_url,
            duration: form.recording_duration.and_then(|d| d.parse().ok()),
            timestamp: Utc::now(),
        })
        .await;
    if !outcome.resolved {
        info!("recording not attached to any record");
    }
    StatusCode::OK
}

#[derive(Debug, Deserialize)]
struct SubmitCallDataRequest {
    record_id: String,
    call_sid: Option<String>,
    disposition: Option<String>,
    notes: Option<String>,
    motivation: Option<String>,
    next_action_date: Option<String>,
    asking_price: Option<String>,
}

/// Agent disposition submission. The only endpoint with a user-visible
/// error: a record-store failure means no activity was created.
async fn submit_call_data(
    State(state): State<AppState>,
    Json(req): Json<SubmitCallDataRequest>,
) -> Response {
    let submission = DispositionSubmission {
        record_id: RecordId::new(req.record_id),
        call_id: req.call_sid.map(CallId::new),
        disposition_code: req.disposition,
        notes: req.notes,
        motivation: req.motivation,
        next_action_date: req.next_action_date,
        asking_price: req.asking_price,
    };

    match state.engine.join_disposition(submission).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(EngineError::InvalidSubmission(message)) => {
            error_body(StatusCode::BAD_REQUEST, message)
        }
        Err(EngineError::RecordStore(err)) => {
            warn!(error = %err, "disposition submission failed");
            error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("record store error: {err}"),
            )
        }
    }
}

/// Enriched lead data for the agent workspace.
async fn lead_intelligence(
    State(state): State<AppState>,
    Path(record_id): Path<String>,
) -> Response {
    let record_id = RecordId::new(record_id);
    match state.records.get_lead(&record_id).await {
        Ok(lead) => {
            let summary = LeadSummary::from_lead(&lead, &state.intelligence_fields);
            let intelligence = LeadIntelligence::from_lead(&lead, &state.intelligence_fields);
            Json(json!({ "summary": summary, "intelligence": intelligence })).into_response()
        }
        Err(RecordsError::NotFound(_)) => {
            error_body(StatusCode::NOT_FOUND, format!("lead {record_id} not found"))
        }
        Err(err) => {
            warn!(record_id = %record_id, error = %err, "lead fetch failed");
            error_body(StatusCode::BAD_GATEWAY, format!("record store error: {err}"))
        }
    }
}

/// Authenticated fetch-and-stream proxy for recordings. Keeps provider
/// credentials server-side; the URL persisted on records points here.
async fn play_recording(
    State(state): State<AppState>,
    Path(recording_id): Path<String>,
) -> Response {
    match state.gateway.fetch_recording(&recording_id).await {
        Ok(audio) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "audio/mpeg")],
            audio,
        )
            .into_response(),
        Err(TelephonyError::RecordingNotFound(id)) => {
            error_body(StatusCode::NOT_FOUND, format!("recording {id} not found"))
        }
        Err(err) => {
            warn!(recording_id = %recording_id, error = %err, "recording fetch failed");
            error_body(StatusCode::BAD_GATEWAY, format!("recording fetch failed: {err}"))
        }
    }
}
