//! # Todo Service 共有ユーティリティ
//!
//! 複数クレートから使われるレスポンス型とログ初期化をまとめる。
//!
//! - ビジネスロジックを含めない
//! - axum には依存しない（`IntoResponse` 変換は各サービスの責務）

pub mod error_response;
pub mod health;
pub mod observability;

pub use error_response::ErrorResponse;
pub use health::{CheckStatus, HealthResponse, ReadinessResponse, ReadinessStatus};
