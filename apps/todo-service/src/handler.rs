//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュールで re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、ビジネスロジックはユースケースに委譲
//!
//! ## ハンドラ一覧
//!
//! - `health`: ヘルスチェック
//! - `todo`: Todo の作成・一覧・更新・削除

pub mod health;
pub mod todo;

pub use health::{ReadinessState, health_check, readiness_check};
pub use todo::{TodoState, api_root, create_todo, delete_todo, list_todos, update_todo};
