//! # ユースケース層
//!
//! Todo Service のビジネスロジックを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: リポジトリ・時刻・トランザクション管理を `Arc<dyn Trait>` で外部から注入
//! - **薄いハンドラ**: ハンドラは薄く保ち、ロジックはユースケースに集約

pub mod todo;

pub use todo::{CreateTodoInput, TodoUseCaseImpl, UpdateTodoInput};
