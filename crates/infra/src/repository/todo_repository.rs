//! # TodoRepository
//!
//! Todo の永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **並び順の直列化**: 採番と入れ替えの前に [`TodoRepository::lock_ordering`] で
//!   トランザクションスコープの advisory lock を取得する。同時に作成された
//!   Todo が同じ `order` を受け取ることはない
//! - **一覧は `order` 降順**: 新しい Todo ほど先頭に来る
//! - **物理削除**: 論理削除は行わない

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use todo_domain::todo::{Todo, TodoId, TodoOrder, TodoRecord, TodoValue};
use uuid::Uuid;

use crate::{db::TxContext, error::InfraError};

/// 並び順の変更を直列化する advisory lock のキー
const ORDERING_LOCK_KEY: i64 = 0x746f_646f_6f72_6472;

/// Todo リポジトリトレイト
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// 全 Todo を `order` 降順で取得する
    async fn find_all_order_desc(&self) -> Result<Vec<Todo>, InfraError>;

    /// 並び順の変更をトランザクション終了まで排他する
    async fn lock_ordering(&self, tx: &mut TxContext) -> Result<(), InfraError>;

    /// 最大の `order` を取得する（Todo が 1 件もなければ `None`）
    async fn find_max_order(&self, tx: &mut TxContext) -> Result<Option<TodoOrder>, InfraError>;

    /// ID で Todo を検索する
    ///
    /// 更新に備えて行ロックを取得する。
    async fn find_by_id(
        &self,
        tx: &mut TxContext,
        id: &TodoId,
    ) -> Result<Option<Todo>, InfraError>;

    /// 指定した `order` を使用している Todo を検索する
    async fn find_by_order(
        &self,
        tx: &mut TxContext,
        order: TodoOrder,
    ) -> Result<Option<Todo>, InfraError>;

    async fn insert(&self, tx: &mut TxContext, todo: &Todo) -> Result<(), InfraError>;

    /// 本文・並び順・完了日時を上書きする
    async fn update(&self, tx: &mut TxContext, todo: &Todo) -> Result<(), InfraError>;

    /// Todo を削除する
    ///
    /// 削除した行があれば `true`。
    async fn delete(&self, tx: &mut TxContext, id: &TodoId) -> Result<bool, InfraError>;

    /// ストアへの疎通を確認する（Readiness Check 用）
    async fn ping(&self) -> Result<(), InfraError>;
}

/// `todos` テーブルの行
#[derive(Debug, sqlx::FromRow)]
struct TodoRow {
    id:         Uuid,
    value:      String,
    order:      i32,
    done_at:    Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<TodoRow> for Todo {
    type Error = InfraError;

    fn try_from(row: TodoRow) -> Result<Self, Self::Error> {
        let value = TodoValue::new(row.value).map_err(|e| {
            InfraError::unexpected(format!("不正な value が格納されています: id={}, {e}", row.id))
        })?;

        Ok(Todo::from_db(TodoRecord {
            id: TodoId::from_uuid(row.id),
            value,
            order: TodoOrder::from_db(row.order),
            done_at: row.done_at,
            created_at: row.created_at,
        }))
    }
}

const SELECT_COLUMNS: &str = r#"SELECT id, value, "order", done_at, created_at FROM todos"#;

/// PostgreSQL 実装の TodoRepository
#[derive(Debug, Clone)]
pub struct PostgresTodoRepository {
    pool: PgPool,
}

impl PostgresTodoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoRepository for PostgresTodoRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_all_order_desc(&self) -> Result<Vec<Todo>, InfraError> {
        let rows: Vec<TodoRow> = sqlx::query_as(&format!(
            r#"{SELECT_COLUMNS} ORDER BY "order" DESC, created_at DESC"#
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Todo::try_from).collect()
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn lock_ordering(&self, tx: &mut TxContext) -> Result<(), InfraError> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(ORDERING_LOCK_KEY)
            .execute(tx.conn())
            .await?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_max_order(&self, tx: &mut TxContext) -> Result<Option<TodoOrder>, InfraError> {
        let max: Option<i32> = sqlx::query_scalar(r#"SELECT MAX("order") FROM todos"#)
            .fetch_one(tx.conn())
            .await?;

        Ok(max.map(TodoOrder::from_db))
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(
        &self,
        tx: &mut TxContext,
        id: &TodoId,
    ) -> Result<Option<Todo>, InfraError> {
        let row: Option<TodoRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = $1 FOR UPDATE"))
                .bind(id.as_uuid())
                .fetch_optional(tx.conn())
                .await?;

        row.map(Todo::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%order))]
    async fn find_by_order(
        &self,
        tx: &mut TxContext,
        order: TodoOrder,
    ) -> Result<Option<Todo>, InfraError> {
        let row: Option<TodoRow> = sqlx::query_as(&format!(
            r#"{SELECT_COLUMNS} WHERE "order" = $1 ORDER BY created_at ASC LIMIT 1 FOR UPDATE"#
        ))
        .bind(order.as_i32())
        .fetch_optional(tx.conn())
        .await?;

        row.map(Todo::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = %todo.id()))]
    async fn insert(&self, tx: &mut TxContext, todo: &Todo) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO todos (id, value, "order", done_at, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(todo.id().as_uuid())
        .bind(todo.value().as_str())
        .bind(todo.order().as_i32())
        .bind(todo.done_at())
        .bind(todo.created_at())
        .execute(tx.conn())
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = %todo.id()))]
    async fn update(&self, tx: &mut TxContext, todo: &Todo) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            UPDATE todos
            SET value = $2, "order" = $3, done_at = $4
            WHERE id = $1
            "#,
        )
        .bind(todo.id().as_uuid())
        .bind(todo.value().as_str())
        .bind(todo.order().as_i32())
        .bind(todo.done_at())
        .execute(tx.conn())
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn delete(&self, tx: &mut TxContext, id: &TodoId) -> Result<bool, InfraError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id.as_uuid())
            .execute(tx.conn())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn ping(&self) -> Result<(), InfraError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InfraErrorKind;

    #[test]
    fn test_トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresTodoRepository>();
    }

    #[test]
    fn test_不正なvalueの行はunexpectedエラーになる() {
        let row = TodoRow {
            id:         Uuid::now_v7(),
            value:      String::new(),
            order:      1,
            done_at:    None,
            created_at: Utc::now(),
        };

        let result = Todo::try_from(row);

        assert!(matches!(
            result,
            Err(ref e) if matches!(e.kind(), InfraErrorKind::Unexpected(_))
        ));
    }
}
