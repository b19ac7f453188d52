//! Axum route handlers for the job API.
//!
//! Clients submit text with `POST /start_job`, poll `GET /status/{job_id}`,
//! and fetch the finished QR code from `GET /result/{job_id}`.

use std::net::IpAddr;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use qrpay::job::{Capacity, JobError, JobId, JobOrchestrator, JobOutcome, JobStatus, JobStatusView};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::ServerError;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Job orchestrator backing every route.
    pub jobs: JobOrchestrator,
    /// Address the server is bound to, reported by `/config`.
    pub host: IpAddr,
    /// Port the server is bound to, reported by `/config`.
    pub port: u16,
}

/// `POST /start_job` request body.
#[derive(Debug, Deserialize)]
pub struct StartJobRequest {
    /// Natural-language payment request.
    #[serde(default)]
    pub input: Option<String>,
}

/// `POST /start_job` response body.
#[derive(Debug, Serialize)]
pub struct StartJobResponse {
    /// Identifier to poll with.
    pub job_id: JobId,
    /// Always `processing`.
    pub status: JobStatus,
}

fn parse_job_id(raw: &str) -> Result<JobId, ServerError> {
    raw.parse().map_err(|_| ServerError::Job(JobError::NotFound))
}

/// `POST /start_job` - Submits a payment request for background processing.
///
/// # Errors
///
/// Returns 400 if the body has no non-empty `input` string.
pub async fn start_job(
    State(state): State<AppState>,
    body: Result<Json<StartJobRequest>, JsonRejection>,
) -> Result<Json<StartJobResponse>, ServerError> {
    let input = body
        .ok()
        .and_then(|Json(req)| req.input)
        .filter(|input| !input.is_empty())
        .ok_or(ServerError::MissingInput)?;

    let job_id = state.jobs.submit(input);
    Ok(Json(StartJobResponse {
        job_id,
        status: JobStatus::Processing,
    }))
}

/// `GET /status/{job_id}` - Returns `{status, error?}`.
///
/// # Errors
///
/// Returns 404 for unknown or expired jobs.
pub async fn get_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<JobStatusView>, ServerError> {
    let id = parse_job_id(&job_id)?;
    Ok(Json(state.jobs.status(&id)?))
}

/// `GET /result/{job_id}` - Returns the payment QR once the job completes.
///
/// 202 while processing, 500 with the stored message if it failed.
///
/// # Errors
///
/// Returns 404 for unknown or expired jobs.
pub async fn get_result(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Response, ServerError> {
    let id = parse_job_id(&job_id)?;
    match state.jobs.result(&id)? {
        JobOutcome::Pending => Ok((
            StatusCode::ACCEPTED,
            Json(json!({ "status": JobStatus::Processing })),
        )
            .into_response()),
        JobOutcome::Completed(qr) => Ok(Json(qr.as_ref()).into_response()),
        JobOutcome::Failed(message) => Err(ServerError::JobFailed(message)),
    }
}

/// `GET /availability` - Advisory load snapshot.
pub async fn get_availability(State(state): State<AppState>) -> Json<Capacity> {
    Json(state.jobs.capacity())
}

/// `GET /input_schema` - Describes the `POST /start_job` body.
pub async fn get_input_schema() -> Json<Value> {
    Json(json!({
        "type": "object",
        "properties": {
            "input": {
                "type": "string",
                "description": "Natural language input describing the payment, including amount, \
                    token, chain and recipient address (e.g., \"Generate a QR code for 0.05 ETH \
                    on ethereum to 0x123... with label 'Consulting'\")",
                "required": true
            }
        }
    }))
}

/// `GET /config` - Reports the bound host and port.
pub async fn get_config(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "port": state.port, "host": state.host }))
}

/// `GET /health` - Liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Creates an Axum [`axum::Router`] with all job endpoints.
///
/// Endpoints:
/// - `POST /start_job` - submit a payment request
/// - `GET /status/{job_id}` - poll job status
/// - `GET /result/{job_id}` - fetch the finished result
/// - `GET /availability` - advisory capacity
/// - `GET /input_schema` - request schema
/// - `GET /config` - bound host and port
/// - `GET /health` - liveness
pub fn app_router(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/start_job", post(start_job))
        .route("/status/{job_id}", get(get_status))
        .route("/result/{job_id}", get(get_result))
        .route("/availability", get(get_availability))
        .route("/input_schema", get(get_input_schema))
        .route("/config", get(get_config))
        .route("/health", get(health))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, header};
    use qrpay::chain::ChainRegistry;
    use qrpay::job::JobConfig;
    use qrpay::pipeline::PaymentRequestPipeline;
    use qrpay::render::PassthroughRenderer;
    use tower::ServiceExt;

    use super::*;

    const VALID: &str =
        r#"send 0.05 ETH to 0x1111111111111111111111111111111111111111 on ethereum labeled "Test""#;

    fn router() -> axum::Router {
        let pipeline = PaymentRequestPipeline::new(ChainRegistry::builtin(), PassthroughRenderer);
        app_router(AppState {
            jobs: JobOrchestrator::new(pipeline, JobConfig::default()),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8080,
        })
    }

    async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn start_req(body: &Value) -> Request<Body> {
        Request::post("/start_job")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn poll_result(app: &axum::Router, id: &str) -> (StatusCode, Value) {
        for _ in 0..200 {
            let (status, body) = send(app, get_req(&format!("/result/{id}"))).await;
            if status != StatusCode::ACCEPTED {
                return (status, body);
            }
            assert_eq!(body, json!({ "status": "processing" }));
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("job {id} did not finish");
    }

    #[tokio::test]
    async fn test_job_lifecycle_success() {
        let app = router();
        let (status, body) = send(&app, start_req(&json!({ "input": VALID }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "processing");
        let id = body["job_id"].as_str().unwrap().to_owned();

        let (status, body) = poll_result(&app, &id).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["uri"],
            "ethereum:0x1111111111111111111111111111111111111111?value=50000000000000000&label=Test"
        );
        assert_eq!(body["params"]["tokenInfo"]["isNative"], true);
        assert!(body["qrCodeImage"].is_string());

        let (status, body) = send(&app, get_req(&format!("/status/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "completed" }));
    }

    #[tokio::test]
    async fn test_job_lifecycle_failure() {
        let app = router();
        let input = "send 1 BTC to 0x1111111111111111111111111111111111111111 on ethereum";
        let (_, body) = send(&app, start_req(&json!({ "input": input }))).await;
        let id = body["job_id"].as_str().unwrap().to_owned();

        let (status, body) = poll_result(&app, &id).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({ "error": "Processing failed: BTC is not supported on ethereum" })
        );

        let (_, body) = send(&app, get_req(&format!("/status/{id}"))).await;
        assert_eq!(body["status"], "failed");
        assert_eq!(body["error"], "Processing failed: BTC is not supported on ethereum");
    }

    #[tokio::test]
    async fn test_missing_input_is_rejected() {
        let app = router();
        for body in [json!({}), json!({ "input": "" }), json!({ "input": 5 })] {
            let (status, body) = send(&app, start_req(&body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, json!({ "error": "Input is required" }));
        }

        let request = Request::post("/start_job").body(Body::empty()).unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_jobs_are_not_found() {
        let app = router();
        let unknown = JobId::new().to_string();
        for uri in [
            format!("/status/{unknown}"),
            format!("/result/{unknown}"),
            "/status/not-a-job".to_owned(),
        ] {
            let (status, body) = send(&app, get_req(&uri)).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body, json!({ "error": "Job not found" }));
        }
    }

    #[tokio::test]
    async fn test_availability_counts_jobs() {
        let app = router();
        let (_, body) = send(&app, get_req("/availability")).await;
        assert_eq!(
            body,
            json!({ "available": true, "current_jobs": 0, "max_jobs": 10 })
        );

        send(&app, start_req(&json!({ "input": "nonsense" }))).await;
        let (_, body) = send(&app, get_req("/availability")).await;
        assert_eq!(body["current_jobs"], 1);
    }

    #[tokio::test]
    async fn test_static_endpoints() {
        let app = router();
        let (_, body) = send(&app, get_req("/config")).await;
        assert_eq!(body, json!({ "port": 8080, "host": "127.0.0.1" }));

        let (_, body) = send(&app, get_req("/health")).await;
        assert_eq!(body["status"], "ok");

        let (_, body) = send(&app, get_req("/input_schema")).await;
        assert_eq!(body["properties"]["input"]["type"], "string");
    }
}
