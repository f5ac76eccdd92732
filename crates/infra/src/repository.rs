//! # リポジトリ
//!
//! 永続化ストアへのアクセスをトレイトで抽象化する。
//! ユースケース層はトレイトにのみ依存し、実装は起動時に注入する。

pub mod todo_repository;

pub use todo_repository::{PostgresTodoRepository, TodoRepository};
