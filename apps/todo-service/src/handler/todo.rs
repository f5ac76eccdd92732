//! # Todo ハンドラ
//!
//! Todo 管理 API を提供する。
//!
//! ## エンドポイント
//!
//! - `GET /api`, `GET /api/` - 疎通確認
//! - `GET /api/todos` - Todo 一覧（`order` 降順）
//! - `POST /api/todos` - Todo 作成
//! - `PATCH /api/todos/{todo_id}` - Todo 更新（本文・並び順・完了状態）
//! - `DELETE /api/todos/{todo_id}` - Todo 削除
//!
//! JSON として解釈できないボディや型の合わないフィールドは、
//! axum 既定の拒否レスポンスではなく `400 { "errorMessage": ... }` に変換する。

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{
        Path,
        State,
        rejection::{BytesRejection, JsonRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use todo_domain::todo::Todo;
use uuid::Uuid;

use crate::{
    error::TodoServiceError,
    usecase::{CreateTodoInput, TodoUseCaseImpl, UpdateTodoInput},
};

/// 疎通確認で返すメッセージ
const CONNECTED_MEMO: &str = "正常に接続されています";

/// Todo API の共有状態
pub struct TodoState {
    pub usecase: TodoUseCaseImpl,
}

// --- リクエスト/レスポンス型 ---

/// Todo 作成リクエスト
#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub value: Option<String>,
}

/// Todo 更新リクエスト
///
/// 全フィールド省略可。ボディ自体がない場合も「変更なし」として扱う。
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoRequest {
    pub value: Option<String>,
    pub order: Option<i64>,
    pub done:  Option<bool>,
}

/// Todo DTO
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TodoDto {
    pub id:         Uuid,
    pub value:      String,
    pub order:      i32,
    pub done_at:    Option<String>,
    pub created_at: String,
}

impl From<&Todo> for TodoDto {
    fn from(todo: &Todo) -> Self {
        Self {
            id:         *todo.id().as_uuid(),
            value:      todo.value().as_str().to_string(),
            order:      todo.order().as_i32(),
            done_at:    todo.done_at().map(|t| t.to_rfc3339()),
            created_at: todo.created_at().to_rfc3339(),
        }
    }
}

/// `{ "todos": ... }` 形式のレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct TodosResponse<T> {
    pub todos: T,
}

/// 空オブジェクト `{}` のレスポンス
#[derive(Debug, Serialize)]
pub struct EmptyResponse {}

/// 疎通確認レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct MemoResponse {
    pub memo: String,
}

fn invalid_body(rejection: JsonRejection) -> TodoServiceError {
    TodoServiceError::BadRequest(rejection.body_text())
}

/// 更新リクエストのボディを解釈する
///
/// 空ボディは全フィールド省略とみなす。Content-Type は問わない。
fn parse_update_body(
    body: Result<Bytes, BytesRejection>,
) -> Result<UpdateTodoRequest, TodoServiceError> {
    let bytes = body.map_err(|e| TodoServiceError::BadRequest(e.body_text()))?;
    if bytes.is_empty() {
        return Ok(UpdateTodoRequest::default());
    }

    let Json(req) = Json::<UpdateTodoRequest>::from_bytes(&bytes).map_err(invalid_body)?;
    Ok(req)
}

// --- ハンドラ ---

/// GET /api, GET /api/
pub async fn api_root() -> Json<MemoResponse> {
    Json(MemoResponse {
        memo: CONNECTED_MEMO.to_string(),
    })
}

/// GET /api/todos
///
/// 全 Todo を `order` 降順で取得する。
#[tracing::instrument(skip_all)]
pub async fn list_todos(
    State(state): State<Arc<TodoState>>,
) -> Result<impl IntoResponse, TodoServiceError> {
    let todos = state.usecase.list_todos().await?;

    let items: Vec<TodoDto> = todos.iter().map(TodoDto::from).collect();
    Ok((StatusCode::OK, Json(TodosResponse { todos: items })))
}

/// POST /api/todos
///
/// ## レスポンス
///
/// - `201 Created`: 作成された Todo（採番された `order` を含む）
/// - `400 Bad Request`: value の欠落、空文字、51 文字以上
#[tracing::instrument(skip_all)]
pub async fn create_todo(
    State(state): State<Arc<TodoState>>,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<impl IntoResponse, TodoServiceError> {
    let Json(req) = payload.map_err(invalid_body)?;

    let todo = state
        .usecase
        .create_todo(CreateTodoInput { value: req.value })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TodosResponse {
            todos: TodoDto::from(&todo),
        }),
    ))
}

/// PATCH /api/todos/{todo_id}
///
/// ## レスポンス
///
/// - `200 OK`: 空オブジェクト
/// - `400 Bad Request`: 不正なフィールド、JSON として解釈できないボディ
/// - `404 Not Found`: Todo が見つからない
#[tracing::instrument(skip_all, fields(%todo_id))]
pub async fn update_todo(
    State(state): State<Arc<TodoState>>,
    Path(todo_id): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, TodoServiceError> {
    let req = parse_update_body(body)?;

    state
        .usecase
        .update_todo(UpdateTodoInput {
            todo_id,
            value: req.value,
            order: req.order,
            done: req.done,
        })
        .await?;

    Ok((StatusCode::OK, Json(EmptyResponse {})))
}

/// DELETE /api/todos/{todo_id}
///
/// ## レスポンス
///
/// - `200 OK`: 空オブジェクト
/// - `404 Not Found`: Todo が見つからない
#[tracing::instrument(skip_all, fields(%todo_id))]
pub async fn delete_todo(
    State(state): State<Arc<TodoState>>,
    Path(todo_id): Path<String>,
) -> Result<impl IntoResponse, TodoServiceError> {
    state.usecase.delete_todo(&todo_id).await?;

    Ok((StatusCode::OK, Json(EmptyResponse {})))
}
