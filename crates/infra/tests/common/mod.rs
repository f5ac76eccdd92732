//! テスト共通フィクスチャ
//!
//! DB を使用する統合テストで共通利用するエンティティ生成ヘルパー。

// 各テストファイルが独立したクレートとしてコンパイルされるため、
// 使用しない関数に dead_code 警告が出る。モジュール全体で抑制する。
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use todo_domain::todo::{NewTodo, Todo, TodoId, TodoOrder, TodoValue};

/// テスト用の固定時刻
pub fn test_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

/// テスト用の Todo を作成する
pub fn create_test_todo(value: &str, order: i32) -> Todo {
    Todo::new(NewTodo {
        id:    TodoId::new(),
        value: TodoValue::new(value).unwrap(),
        order: TodoOrder::from_db(order),
        now:   test_now(),
    })
}
