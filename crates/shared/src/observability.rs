//! # Observability 基盤
//!
//! トレーシングの初期化とログ出力形式の切り替えを提供する。
//!
//! | 環境変数 | 説明 |
//! |----------|------|
//! | `RUST_LOG` | ログレベル（デフォルト: `info,todo=debug`） |
//! | `LOG_FORMAT` | `json` または `pretty`（デフォルト: `pretty`） |

/// `RUST_LOG` 未設定時のフィルタ
pub const DEFAULT_LOG_FILTER: &str = "info,todo=debug";

/// ログ出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// JSON 形式（本番環境向け）
    Json,
    /// 人間が読みやすい形式（開発環境向け）
    #[default]
    Pretty,
}

impl LogFormat {
    /// 文字列からログ形式をパースする
    ///
    /// 不正な値は [`Pretty`](LogFormat::Pretty) にフォールバックする。
    /// トレーシング初期化前に呼ばれるため、警告は stderr に直接出す。
    pub fn parse(s: &str) -> Self {
        match s {
            "json" => Self::Json,
            "pretty" => Self::Pretty,
            other => {
                eprintln!("WARNING: unknown LOG_FORMAT={other:?}, falling back to pretty");
                Self::Pretty
            }
        }
    }

    pub fn from_env() -> Self {
        std::env::var("LOG_FORMAT")
            .map(|val| Self::parse(&val))
            .unwrap_or_default()
    }
}

/// トレーシング初期化設定
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// サービス名（起動ログと `app` スパンに出力）
    pub service_name: String,
    pub log_format:   LogFormat,
}

impl TracingConfig {
    pub fn new(service_name: impl Into<String>, log_format: LogFormat) -> Self {
        Self {
            service_name: service_name.into(),
            log_format,
        }
    }

    pub fn from_env(service_name: impl Into<String>) -> Self {
        Self::new(service_name, LogFormat::from_env())
    }

    /// プロセス全体を囲む `app` スパンを作成する
    ///
    /// `main` で `init_tracing` の直後に `entered()` しておくと、
    /// 以降のログに `service` フィールドが付く。
    pub fn app_span(&self) -> tracing::Span {
        tracing::info_span!("app", service = %self.service_name)
    }
}

/// トレーシングを初期化する
///
/// `ErrorLayer` を登録するため、インフラ層エラーが保持する `SpanTrace` に
/// 呼び出し経路が記録される。プロセス内で 1 度だけ呼ぶこと。
#[cfg(feature = "observability")]
pub fn init_tracing(config: &TracingConfig) {
    use tracing_subscriber::{Layer as _, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let fmt_layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_target(true)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(tracing_error::ErrorLayer::default())
        .init();
}
