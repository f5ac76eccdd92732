//! # Todo Service ライブラリ
//!
//! 並び順付き Todo リストの HTTP API を提供する。
//! 結合テストからルーターを組み立てられるよう、各モジュールを公開する。
//!
//! ## モジュール構成
//!
//! - `app`: ルーター構築
//! - `config`: 環境変数からの設定読み込み
//! - `error`: エラー型と HTTP レスポンスへの変換
//! - `handler`: HTTP ハンドラ
//! - `usecase`: ビジネスロジック

pub mod app;
pub mod config;
pub mod error;
pub mod handler;
pub mod usecase;
