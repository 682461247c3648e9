use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::calculator::compute_effective;
use crate::config::Config;
use crate::dataset::{Dataset, DatasetStore, NewDataset};
use crate::ingest::{ExtractionResult, Ingest};
use crate::recommendations::{rank_raw, RankedRecommendation};
use crate::report::{build_report, ImpactReport};
use crate::scenario::{
    check_percent, resolve_params, resolve_params_raw, ScenarioId, ScenarioParams,
    ScenarioProfile,
};

#[derive(Clone)]
struct ApiState {
    config: Config,
    db_path: PathBuf,
    ingest: Ingest,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    ok: bool,
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(error: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorBody {
            ok: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, ApiError>;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct ScenarioInfo {
    #[serde(flatten)]
    profile: ScenarioProfile,
    defaults: ScenarioParams,
}

/// `scenario` stays a raw string so unknown identifiers reach the DNA fallback
/// instead of failing deserialization.
#[derive(Debug, Deserialize)]
struct CalculateRequest {
    scenario: String,
    percent: f64,
    #[serde(default = "default_true")]
    use_datasets: bool,
}

#[derive(Debug, Serialize)]
struct CalculateResponse {
    report: Option<ImpactReport>,
}

#[derive(Debug, Serialize)]
struct RecommendationsResponse {
    recommendations: Vec<RankedRecommendation>,
}

#[derive(Debug, Serialize)]
struct DatasetsResponse {
    datasets: Vec<Dataset>,
}

#[derive(Debug, Deserialize)]
struct ExtractRequest {
    file_url: String,
}

pub async fn run_server(config: Config, bind: SocketAddr) -> Result<()> {
    let state = ApiState {
        db_path: config.resolved_db_path(),
        ingest: Ingest::from_config(&config)?,
        config,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("REST API listening on http://{bind}");
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/scenarios", get(scenarios))
        .route("/v1/calculate", post(calculate))
        .route("/v1/recommendations/:scenario", get(recommendations))
        .route("/v1/datasets", get(list_datasets).post(create_dataset))
        .route("/v1/extract", post(extract))
        .route("/v1/config", get(show_config))
        .with_state(state)
}

async fn health() -> Json<ApiResponse<HealthResponse>> {
    ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn show_config(State(state): State<ApiState>) -> Json<ApiResponse<Config>> {
    ok(state.config)
}

async fn scenarios() -> Json<ApiResponse<Vec<ScenarioInfo>>> {
    let infos = ScenarioId::ALL
        .iter()
        .map(|id| ScenarioInfo {
            profile: id.profile(),
            defaults: resolve_params(*id, &[]).params,
        })
        .collect();
    ok(infos)
}

async fn calculate(
    State(state): State<ApiState>,
    Json(request): Json<CalculateRequest>,
) -> ApiResult<CalculateResponse> {
    let percent =
        check_percent(request.percent).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let datasets = if request.use_datasets {
        open_store(&state)?.list().map_err(ApiError::internal)?
    } else {
        Vec::new()
    };
    let effective = resolve_params_raw(&request.scenario, &datasets);
    let report = compute_effective(&effective, percent)
        .map(|result| build_report(result, &state.config.report));
    Ok(ok(CalculateResponse { report }))
}

async fn recommendations(Path(scenario): Path<String>) -> ApiResult<RecommendationsResponse> {
    Ok(ok(RecommendationsResponse {
        recommendations: rank_raw(&scenario),
    }))
}

async fn list_datasets(State(state): State<ApiState>) -> ApiResult<DatasetsResponse> {
    let datasets = open_store(&state)?.list().map_err(ApiError::internal)?;
    Ok(ok(DatasetsResponse { datasets }))
}

async fn create_dataset(
    State(state): State<ApiState>,
    Json(request): Json<NewDataset>,
) -> ApiResult<Dataset> {
    request
        .validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    let created = open_store(&state)?
        .create(&request)
        .map_err(|e| ApiError::internal(format!("failed to save dataset, please try again: {e}")))?;
    Ok(ok(created))
}

async fn extract(
    State(state): State<ApiState>,
    Json(request): Json<ExtractRequest>,
) -> ApiResult<ExtractionResult> {
    if request.file_url.trim().is_empty() {
        return Err(ApiError::bad_request("file_url is required"));
    }
    let result = state
        .ingest
        .extract(&request.file_url)
        .await
        .map_err(|e| ApiError::internal(format!("{e:#}")))?;
    Ok(ok(result))
}

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse { ok: true, data })
}

fn default_true() -> bool {
    true
}

fn open_store(state: &ApiState) -> std::result::Result<DatasetStore, ApiError> {
    DatasetStore::open(&state.db_path).map_err(ApiError::internal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(body: &str) -> CalculateRequest {
        serde_json::from_str(body).expect("request")
    }

    #[test]
    fn calculate_request_defaults_to_dataset_lookup() {
        let parsed = request(r#"{"scenario":"DNA","percent":50}"#);
        assert!(parsed.use_datasets);
        assert_eq!(parsed.percent, 50.0);
    }

    #[test]
    fn calculate_handler_withholds_zero_percent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = Config::default();
        config.storage.db_path = dir.path().join("api.db").display().to_string();
        config.storage.upload_dir = dir.path().join("uploads").display().to_string();
        let state = ApiState {
            db_path: config.resolved_db_path(),
            ingest: Ingest::from_config(&config).expect("ingest"),
            config,
        };

        let zero = tokio_test::block_on(calculate(
            State(state.clone()),
            Json(request(r#"{"scenario":"ASH","percent":0}"#)),
        ))
        .expect("zero percent");
        assert!(zero.0.data.report.is_none());

        let fallback = tokio_test::block_on(calculate(
            State(state.clone()),
            Json(request(r#"{"scenario":"XYZ","percent":50}"#)),
        ))
        .expect("fallback");
        let report = fallback.0.data.report.as_ref().expect("report");
        assert_eq!(report.result.scenario, ScenarioId::Dna);

        let rejected = tokio_test::block_on(calculate(
            State(state),
            Json(request(r#"{"scenario":"DNA","percent":140}"#)),
        ));
        assert!(matches!(rejected, Err(ApiError { status, .. }) if status == StatusCode::BAD_REQUEST));
    }

    #[test]
    fn unknown_recommendation_scenario_is_empty() {
        let response =
            tokio_test::block_on(recommendations(Path("XYZ".to_string()))).expect("response");
        assert!(response.0.data.recommendations.is_empty());
    }

    #[test]
    fn config_endpoint_omits_backend_secret() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = Config::default();
        config.storage.db_path = dir.path().join("api.db").display().to_string();
        config.backend.api_key = "sk-live-secret".to_string();
        let state = ApiState {
            db_path: config.resolved_db_path(),
            ingest: Ingest::from_config(&config).expect("ingest"),
            config,
        };

        let response = tokio_test::block_on(show_config(State(state)));
        let body = serde_json::to_string(&response.0).expect("serialize");
        assert!(!body.contains("sk-live-secret"));
        assert!(!body.contains("api_key"));
        assert_eq!(response.0.data.backend.api_key, "sk-live-secret");
    }
}
