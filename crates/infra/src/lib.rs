//! # Todo Service インフラ層
//!
//! 永続化ストアとの接続を担当する。
//!
//! ## 責務
//!
//! - **データベース接続**: PostgreSQL への接続プールとマイグレーション
//! - **トランザクション**: 並び順の採番・入れ替えを 1 トランザクションにまとめる
//! - **リポジトリ実装**: [`repository::TodoRepository`] の PostgreSQL 実装
//!
//! ## モジュール構成
//!
//! - [`db`] - 接続プール、[`db::TxContext`]、[`db::TransactionManager`]
//! - [`error`] - インフラ層エラー定義
//! - [`repository`] - リポジトリトレイトと実装
//! - `mock` - テスト用インメモリ実装（`test-utils` feature）
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use todo_infra::{db, repository::PostgresTodoRepository};
//!
//! async fn setup() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = db::create_pool("postgres://localhost/todo").await?;
//!     db::run_migrations(&pool).await?;
//!     let repository = PostgresTodoRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod db;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod repository;

pub use db::{PgTransactionManager, TransactionManager, TxContext};
pub use error::{InfraError, InfraErrorKind};
