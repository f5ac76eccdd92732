//! # Todo ドメイン層
//!
//! Todo リストの中核となるドメインモデルと並び順のルールを定義する。
//!
//! ## 依存関係の方向
//!
//! ```text
//! todo-service → infra → domain
//!        ↘         ↘
//!          shared
//! ```
//!
//! ドメイン層は DB や HTTP に一切依存しない。並び順の計算
//! （[`todo::ordering`]）は純粋関数として実装し、永続化はインフラ層に任せる。
//!
//! ## モジュール構成
//!
//! - [`clock`] - 時刻プロバイダ（`doneAt` の打刻に使用）
//! - [`error`] - ドメイン層で発生するエラーの定義
//! - [`todo`] - Todo エンティティと値オブジェクト、並び順ルール
//!
//! ## 使用例
//!
//! ```rust
//! use todo_domain::{DomainError, todo::TodoValue};
//!
//! let value = TodoValue::new("牛乳を買う").unwrap();
//! assert_eq!(value.as_str(), "牛乳を買う");
//!
//! let error = TodoValue::new("").unwrap_err();
//! assert!(matches!(error, DomainError::Validation(_)));
//! ```

pub mod clock;
pub mod error;
pub mod todo;

pub use error::DomainError;
