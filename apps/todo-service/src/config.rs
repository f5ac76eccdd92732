//! # Todo Service 設定
//!
//! 環境変数から Todo Service サーバーの設定を読み込む。

use std::{env, path::PathBuf};

use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_STATIC_DIR: &str = "./asset";

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} が設定されていません")]
    Missing(&'static str),

    #[error("{name} の値が不正です: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Todo Service サーバーの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoConfig {
    /// バインドアドレス
    pub host:         String,
    /// ポート番号
    pub port:         u16,
    /// データベース接続 URL
    pub database_url: String,
    /// 静的ファイルの配信元ディレクトリ
    pub static_dir:   PathBuf,
}

impl TodoConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    ///
    /// テストでプロセス環境変数を書き換えずに済むよう、参照元を差し替えられる。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("TODO_PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "TODO_PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            host: lookup("TODO_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            database_url: lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            static_dir: lookup("TODO_STATIC_DIR")
                .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string())
                .into(),
        })
    }
}
