//! Route contract tests: webhook acks, agent-facing error mapping.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use bytes::Bytes;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tower::ServiceExt;

use dialdesk_audit::InMemoryAuditLog;
use dialdesk_engine::{CallFlowEngine, DispositionRules, EngineConfig};
use dialdesk_records::{
    CallActivityFields, IntelligenceFieldIds, LeadRecord, RecordId, RecordStore, RecordsError,
    TaskFields,
};
use dialdesk_server::{router, AppState};
use dialdesk_telephony::{CallId, CallbackUrls, TelephonyError, TelephonyGateway};

struct StubGateway {
    recording: Option<Bytes>,
    dialed: Mutex<Vec<String>>,
}

#[async_trait]
impl TelephonyGateway for StubGateway {
    async fn create_call(
        &self,
        to: &str,
        _callbacks: &CallbackUrls,
    ) -> dialdesk_telephony::Result<CallId> {
        self.dialed.lock().push(to.to_string());
        Ok(CallId::new("CA777"))
    }

    async fn call_duration(&self, _call_id: &CallId) -> dialdesk_telephony::Result<Option<u32>> {
        Ok(Some(60))
    }

    async fn parent_call_id(&self, _call_id: &CallId) -> dialdesk_telephony::Result<Option<CallId>> {
        Ok(None)
    }

    async fn fetch_recording(&self, recording_id: &str) -> dialdesk_telephony::Result<Bytes> {
        self.recording
            .clone()
            .ok_or_else(|| TelephonyError::RecordingNotFound(recording_id.to_string()))
    }
}

struct StubRecords {
    activities: Mutex<Vec<CallActivityFields>>,
    fail_auth: bool,
}

impl StubRecords {
    fn new(fail_auth: bool) -> Self {
        StubRecords {
            activities: Mutex::new(Vec::new()),
            fail_auth,
        }
    }
}

#[async_trait]
impl RecordStore for StubRecords {
    async fn create_call_activity(
        &self,
        fields: &CallActivityFields,
    ) -> dialdesk_records::Result<RecordId> {
        if self.fail_auth {
            return Err(RecordsError::Auth("invalid_grant".to_string()));
        }
        self.activities.lock().push(fields.clone());
        Ok(RecordId::new("A1"))
    }

    async fn update_recording_url(
        &self,
        _record_id: &RecordId,
        _recording_url: &str,
    ) -> dialdesk_records::Result<()> {
        Ok(())
    }

    async fn create_task(&self, _fields: &TaskFields) -> dialdesk_records::Result<RecordId> {
        Ok(RecordId::new("T1"))
    }

    async fn get_lead(&self, record_id: &RecordId) -> dialdesk_records::Result<LeadRecord> {
        if record_id.as_str() == "404404" {
            return Err(RecordsError::NotFound(record_id.to_string()));
        }
        Ok(LeadRecord {
            id: record_id.clone(),
            raw: json!({"item_id": 9001, "fields": []}),
        })
    }
}

fn app(
    records: StubRecords,
    recording: Option<Bytes>,
) -> (axum::Router, Arc<InMemoryAuditLog>, Arc<StubGateway>) {
    let gateway = Arc::new(StubGateway {
        recording,
        dialed: Mutex::new(Vec::new()),
    });
    let records = Arc::new(records);
    let audit = Arc::new(InMemoryAuditLog::new());
    let engine = Arc::new(CallFlowEngine::new(
        gateway.clone(),
        records.clone(),
        audit.clone(),
        DispositionRules::default(),
        EngineConfig::new("https://dialdesk.example.com"),
    ));
    let state = AppState {
        engine,
        gateway: gateway.clone(),
        records,
        intelligence_fields: Arc::new(IntelligenceFieldIds::default()),
        public_base_url: "https://dialdesk.example.com".to_string(),
    };
    (router(state), audit, gateway)
}

async fn body_json(body: Body) -> Value {
    let bytes = to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _, _) = app(StubRecords::new(false), None);
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn dial_calls_agent_leg_and_stores_mapping() {
    let (app, audit, gateway) = app(StubRecords::new(false), None);
    let response = app
        .oneshot(json_request(
            "/dial",
            json!({
                "record_id": "9001",
                "prospect_number": "+13035551234",
                "agent_id": "client:agent_42"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["call_sid"], "CA777");
    assert_eq!(body["mapping_stored"], true);

    // The agent is the parent leg; the prospect rides on the voice URL.
    assert_eq!(gateway.dialed.lock().as_slice(), &["client:agent_42"]);

    let mappings = audit.documents("call_mappings");
    assert_eq!(mappings.len(), 1);
    assert_eq!(mappings[0]["record_id"], "9001");
}

#[tokio::test]
async fn dial_without_agent_id_is_rejected() {
    let (app, audit, gateway) = app(StubRecords::new(false), None);
    let response = app
        .oneshot(json_request(
            "/dial",
            json!({"record_id": "9001", "prospect_number": "+13035551234"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(gateway.dialed.lock().is_empty());
    assert!(audit.documents("call_mappings").is_empty());
}

#[tokio::test]
async fn call_status_webhook_always_acks() {
    let (app, audit, _) = app(StubRecords::new(false), None);
    let response = app
        .oneshot(form_request(
            "/call_status",
            "CallSid=CA1&CallStatus=completed&Direction=outbound-api",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let logs = audit.documents("call_logs");
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["status"], "completed");
}

#[tokio::test]
async fn recording_webhook_acks_even_when_unresolvable() {
    let (app, audit, _) = app(StubRecords::new(false), None);
    let response = app
        .oneshot(form_request(
            "/recording_status",
            "CallSid=CA-unknown&RecordingSid=RE1&RecordingUrl=https%3A%2F%2Fprovider%2FRE1&RecordingDuration=30",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    // Metadata persisted regardless of resolution.
    let logs = audit.documents("call_logs");
    assert_eq!(logs.len(), 1);
    assert_eq!(
        logs[0]["recording_url"],
        "https://dialdesk.example.com/play_recording/RE1"
    );
}

#[tokio::test]
async fn submit_call_data_returns_outcome() {
    let (app, _, _) = app(StubRecords::new(false), None);
    let response = app
        .oneshot(json_request(
            "/submit_call_data",
            json!({
                "record_id": "9001",
                "call_sid": "CA1",
                "disposition": "Voicemail",
                "notes": "left a message"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["activity_id"], "A1");
    assert_eq!(body["task_id"], "T1");
}

#[tokio::test]
async fn submit_call_data_surfaces_store_failure() {
    let (app, _, _) = app(StubRecords::new(true), None);
    let response = app
        .oneshot(json_request(
            "/submit_call_data",
            json!({"record_id": "9001", "disposition": "Voicemail"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("record store"));
}

#[tokio::test]
async fn submit_call_data_rejects_non_numeric_record_id() {
    let (app, _, _) = app(StubRecords::new(false), None);
    let response = app
        .oneshot(json_request(
            "/submit_call_data",
            json!({"record_id": "lead-one", "disposition": "Voicemail"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn lead_intelligence_maps_not_found() {
    let (app, _, _) = app(StubRecords::new(false), None);
    let response = app
        .oneshot(
            Request::get("/lead/404404/intelligence")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn lead_intelligence_returns_summary_and_fields() {
    let (app, _, _) = app(StubRecords::new(false), None);
    let response = app
        .oneshot(
            Request::get("/lead/9001/intelligence")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["summary"]["record_id"], "9001");
    assert!(body.get("intelligence").is_some());
}

#[tokio::test]
async fn play_recording_streams_audio() {
    let (app, _, _) = app(StubRecords::new(false), Some(Bytes::from_static(b"ID3audio")));
    let response = app
        .oneshot(
            Request::get("/play_recording/RE9")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "audio/mpeg"
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ID3audio");
}

#[tokio::test]
async fn play_recording_missing_is_404() {
    let (app, _, _) = app(StubRecords::new(false), None);
    let response = app
        .oneshot(
            Request::get("/play_recording/RE-missing")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
