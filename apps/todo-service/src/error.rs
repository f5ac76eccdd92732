//! # Todo Service エラー定義
//!
//! Todo Service 固有のエラーと、HTTP レスポンスへの変換を定義する。
//!
//! ハンドラは `Result<_, TodoServiceError>` を返し、失敗はすべて
//! [`IntoResponse`] の実装を経由して `{ "errorMessage": ... }` に変換される。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use todo_domain::DomainError;
use todo_infra::InfraError;
use todo_shared::ErrorResponse;

/// Todo Service で発生するエラー
#[derive(Debug, Error)]
pub enum TodoServiceError {
    /// リソースが見つからない
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// 不正なリクエスト
    #[error("不正なリクエスト: {0}")]
    BadRequest(String),

    /// データベースエラー
    #[error("データベースエラー: {0}")]
    Database(#[from] InfraError),

    /// 内部エラー
    #[error("内部エラー: {0}")]
    Internal(String),
}

impl From<DomainError> for TodoServiceError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::Validation(msg) => Self::BadRequest(msg),
            e @ DomainError::NotFound { .. } => Self::NotFound(e.to_string()),
        }
    }
}

impl IntoResponse for TodoServiceError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            TodoServiceError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::new(msg)),
            TodoServiceError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::new(msg))
            }
            TodoServiceError::Database(e) => {
                tracing::error!(
                    error = %e,
                    span_trace = %e.span_trace(),
                    "データベースエラー"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::internal_error(),
                )
            }
            TodoServiceError::Internal(msg) => {
                tracing::error!("内部エラー: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::internal_error(),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use todo_shared::error_response::INTERNAL_ERROR_MESSAGE;

    use super::*;

    async fn into_parts(error: TodoServiceError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_バリデーションエラーは400とメッセージを返す() {
        let error: TodoServiceError = DomainError::Validation("value は必須です".to_string()).into();

        let (status, body) = into_parts(error).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({ "errorMessage": "value は必須です" }));
    }

    #[tokio::test]
    async fn test_not_foundは404を返す() {
        let error: TodoServiceError = DomainError::NotFound {
            entity_type: "Todo",
            id:          "abc".to_string(),
        }
        .into();

        let (status, body) = into_parts(error).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errorMessage"], "Todo が見つかりません: abc");
    }

    #[tokio::test]
    async fn test_データベースエラーは詳細を隠して500を返す() {
        let error = TodoServiceError::from(InfraError::unexpected("接続先 10.0.0.5 が応答しません"));

        let (status, body) = into_parts(error).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["errorMessage"], INTERNAL_ERROR_MESSAGE);
    }
}
