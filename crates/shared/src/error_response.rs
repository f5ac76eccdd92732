//! # エラーレスポンス
//!
//! API が返すエラーボディ `{ "errorMessage": "..." }` を提供する。
//!
//! ステータスコードは HTTP レスポンス側で表現するため、ボディには含めない。

use serde::{Deserialize, Serialize};

/// 内部エラー時に返す固定メッセージ
pub const INTERNAL_ERROR_MESSAGE: &str = "サーバー内部でエラーが発生しました";

/// エラーレスポンスボディ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_message: String,
}

impl ErrorResponse {
    pub fn new(error_message: impl Into<String>) -> Self {
        Self {
            error_message: error_message.into(),
        }
    }

    /// 500 Internal Server Error 用
    ///
    /// 原因はログにのみ出力し、クライアントには固定文言を返す。
    pub fn internal_error() -> Self {
        Self::new(INTERNAL_ERROR_MESSAGE)
    }
}
