//! # アプリケーション構築
//!
//! State を受け取り、ルーター構築を担当する。
//! `main.rs` はインフラ初期化とサーバー起動に集中する。

use std::{path::Path, sync::Arc};

use axum::{
    Router,
    routing::{get, patch},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::handler::{
    ReadinessState,
    TodoState,
    api_root,
    create_todo,
    delete_todo,
    health_check,
    list_todos,
    readiness_check,
    update_todo,
};

/// ルーターを構築する
///
/// どのルートにも一致しないリクエストは `static_dir` 配下の静的ファイルとして配信する。
pub fn build_app(
    todo_state: Arc<TodoState>,
    readiness_state: Arc<ReadinessState>,
    static_dir: &Path,
) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(
            Router::new()
                .route("/health/ready", get(readiness_check))
                .with_state(readiness_state),
        )
        .route("/api", get(api_root))
        .route("/api/", get(api_root))
        .route("/api/todos", get(list_todos).post(create_todo))
        .route(
            "/api/todos/{todo_id}",
            patch(update_todo).delete(delete_todo),
        )
        .with_state(todo_state)
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
}
