use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use policy_match::{
    error::MatchError,
    ranking::{CosineRanker, LlmRanker},
    tally::{TallyEntry, TallyStore},
    CsvProfileSource, Issue, IssueSet, MatchEngine, MatchQuery, MatchResponse, ProfileSource,
    Settings, SqliteTally, StanceVector,
};

#[derive(Clone)]
struct AppState {
    cosine: Arc<MatchEngine>,
    llm: Option<Arc<MatchEngine>>,
    tally: Arc<SqliteTally>,
}

#[derive(Debug, Deserialize)]
struct MatchRequest {
    answers: StanceVector,
    #[serde(default = "default_top_n")]
    top_n: usize,
    #[serde(default)]
    method: MatchMethod,
    #[serde(default)]
    comments: BTreeMap<String, String>,
    #[serde(default = "default_true")]
    record_tally: bool,
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum MatchMethod {
    #[default]
    Cosine,
    Llm,
}

fn default_top_n() -> usize { policy_match::ranking::DEFAULT_TOP_N }
fn default_true() -> bool { true }

#[derive(Debug, Deserialize)]
struct LeaderboardParams {
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize { 10 }

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    candidates: usize,
    llm_enabled: bool,
}

#[derive(Debug, Serialize)]
struct LeaderboardResponse {
    entries: Vec<TallyEntry>,
    total_points: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "policy_match_server=debug,policy_match=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env();

    tracing::info!("🚀 Starting Policy Match Server");
    tracing::info!("📦 Profiles: {}", settings.profiles_path.display());
    tracing::info!("🗳️ Tally: {}", settings.tally_db);
    tracing::info!("🔌 Port: {}", settings.port);

    let issues = IssueSet::standard();
    let candidates = CsvProfileSource::new(&settings.profiles_path)
        .load(&issues)
        .await?;

    let tally = Arc::new(SqliteTally::new(&settings.tally_db).await?);

    let cosine = MatchEngine::new(issues.clone(), candidates.clone(), Arc::new(CosineRanker::new()))
        .with_tally(tally.clone());

    let llm = if settings.llm_enabled() {
        let ranker = LlmRanker::from_settings(&settings)?;
        Some(Arc::new(
            MatchEngine::new(issues, candidates, Arc::new(ranker)).with_tally(tally.clone()),
        ))
    } else {
        tracing::warn!("⚠️ OPENAI_API_KEY not set, LLM ranking disabled");
        None
    };

    let state = AppState {
        cosine: Arc::new(cosine),
        llm,
        tally,
    };

    // Build router
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/issues", get(issues_handler))
        .route("/v1/match", post(match_handler))
        .route("/v1/leaderboard", get(leaderboard_handler))
        .layer(CorsLayer::permissive())
        .with_state(state);

    // Start server
    let addr = format!("0.0.0.0:{}", settings.port);
    tracing::info!("🗳️ Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: policy_match::VERSION.to_string(),
        candidates: state.cosine.candidates().len(),
        llm_enabled: state.llm.is_some(),
    })
}

async fn issues_handler(State(state): State<AppState>) -> Json<Vec<Issue>> {
    Json(state.cosine.issues().iter().cloned().collect())
}

async fn match_handler(
    State(state): State<AppState>,
    Json(req): Json<MatchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    tracing::debug!("Match request: {:?}", req);

    let engine = match req.method {
        MatchMethod::Cosine => &state.cosine,
        MatchMethod::Llm => state
            .llm
            .as_ref()
            .ok_or_else(|| MatchError::Config("LLM ranking is not configured".to_string()))?,
    };

    let query = MatchQuery {
        top_n: req.top_n,
        record_tally: req.record_tally,
        comments: req.comments,
    };

    let result = engine.run(&req.answers, query).await?;

    tracing::info!("✅ {}", result.display());

    Ok(Json(result))
}

async fn leaderboard_handler(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let entries = state.tally.leaderboard(params.limit).await?;
    let stats = state.tally.stats().await?;

    Ok(Json(LeaderboardResponse {
        entries,
        total_points: stats.total_points,
    }))
}

// Error handling
struct AppError(MatchError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            e if e.is_validation() => StatusCode::BAD_REQUEST,
            MatchError::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
            MatchError::LlmApi(_) | MatchError::MalformedReply(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = self.0.to_string();

        tracing::error!("❌ Error: {} - {}", status, message);

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<MatchError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
