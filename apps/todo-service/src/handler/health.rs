//! # ヘルスチェックハンドラ
//!
//! - `/health` — Liveness Check（常に `"healthy"` を返す）
//! - `/health/ready` — Readiness Check（データベースへの疎通を確認）
//!
//! レスポンス型は [`todo_shared::HealthResponse`] / [`todo_shared::ReadinessResponse`] を参照。

use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use todo_infra::repository::TodoRepository;
use todo_shared::{CheckStatus, HealthResponse, ReadinessResponse};

/// データベース疎通確認のタイムアウト
const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// ヘルスチェックエンドポイント
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status:  "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness Check 用の State
pub struct ReadinessState {
    pub todo_repository: Arc<dyn TodoRepository>,
}

/// Readiness Check エンドポイント
///
/// 全チェック OK → 200、1 つでも失敗 → 503。
#[tracing::instrument(skip_all)]
pub async fn readiness_check(State(state): State<Arc<ReadinessState>>) -> impl IntoResponse {
    let database = check_database(state.todo_repository.as_ref()).await;

    let response = ReadinessResponse::from_checks(HashMap::from([(
        "database".to_string(),
        database,
    )]));
    let http_status = if response.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (http_status, Json(response))
}

async fn check_database(repository: &dyn TodoRepository) -> CheckStatus {
    match tokio::time::timeout(CHECK_TIMEOUT, repository.ping()).await {
        Ok(Ok(())) => CheckStatus::Ok,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "readiness check: database ping failed");
            CheckStatus::Error
        }
        Err(_) => {
            tracing::warn!("readiness check: database check timed out");
            CheckStatus::Error
        }
    }
}
