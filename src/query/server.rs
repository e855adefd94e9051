use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::index::IndexState;
use crate::query::pagination::{self, Page};
use crate::store::RecordStore;

/// HTTP 层共享状态：只读存储 + 可换的索引快照。
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub index: Arc<IndexState>,
}

#[derive(Deserialize)]
pub struct UsersParams {
    /// 缺省 0；负数直接 400
    pub start: Option<i64>,
    /// 缺省 100
    pub limit: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlphabetResponse {
    /// 字母 → 全局起始 offset（只含有数据的字母）
    pub alphabet_index: BTreeMap<String, u64>,
    /// 字母 → 记录数（只含有数据的字母）
    pub letter_counts: BTreeMap<String, u64>,
    pub total_users: u64,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ApiError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = match &self {
            ApiError::NotReady => "Server is initializing, please try again shortly".to_string(),
            other => other.to_string(),
        };
        (status, Json(ErrorBody { error: body })).into_response()
    }
}

pub struct ApiServer {
    pub state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(store: Arc<dyn RecordStore>, index: Arc<IndexState>) -> Self {
        Self {
            state: Arc::new(AppState { store, index }),
        }
    }

    pub fn router(self) -> Router {
        Router::new()
            .route("/users", get(users_handler))
            .route("/alphabet-index", get(alphabet_handler))
            .with_state(self.state)
    }

    pub async fn run(self, port: u16) -> anyhow::Result<()> {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
        tracing::info!("HTTP API listening on port {}", port);
        axum::serve(listener, app).await?;
        Ok(())
    }
}

async fn users_handler(
    Query(params): Query<UsersParams>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Page>, ApiError> {
    let start = params.start.unwrap_or(0);
    let limit = params.limit.unwrap_or(100);
    if start < 0 || limit <= 0 {
        return Err(ApiError::InvalidArgument(format!(
            "start/limit must be non-negative, got start={} limit={}",
            start, limit
        )));
    }

    let page = pagination::fetch_range(
        state.store.as_ref(),
        &state.index,
        start as u64,
        limit as u64,
    )?;
    Ok(Json(page))
}

async fn alphabet_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AlphabetResponse>, ApiError> {
    let snapshot = state.index.current().ok_or(ApiError::NotReady)?;

    let mut alphabet_index = BTreeMap::new();
    let mut letter_counts = BTreeMap::new();
    for (letter, span) in snapshot.letters() {
        alphabet_index.insert(letter.to_string(), span.start_offset);
        letter_counts.insert(letter.to_string(), span.count);
    }

    Ok(Json(AlphabetResponse {
        alphabet_index,
        letter_counts,
        total_users: snapshot.total(),
    }))
}
