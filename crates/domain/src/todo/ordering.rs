//! # 並び順ルール
//!
//! Todo の `order` を決める純粋関数群。DB アクセスは含まない。
//!
//! ## 作成時
//!
//! 既存の最大 `order` + 1。Todo が 1 件もなければ 1。
//!
//! ## 更新時（swap-if-occupied）
//!
//! ```text
//! 移動前:  A(order=1)  B(order=2)
//! B を order=1 へ移動
//! 移動後:  A(order=2)  B(order=1)   ← A は B の旧 order を受け取る
//! ```
//!
//! 移動先を使用している Todo がなければ、移動する Todo の `order` を
//! 上書きするだけで、他の Todo は変更しない（番号の詰め直しは行わない）。

use super::{Todo, TodoOrder};
use crate::DomainError;

/// 新規作成する Todo の並び順を決める
///
/// `current_max` は既存 Todo の最大 `order`（1 件もなければ `None`）。
pub fn next_order(current_max: Option<TodoOrder>) -> Result<TodoOrder, DomainError> {
    match current_max {
        Some(max) => max.next(),
        None => Ok(TodoOrder::FIRST),
    }
}

/// 並び替えの結果
///
/// 永続化が必要な Todo をまとめて返す。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reorder {
    /// 移動した Todo（新しい `order` を持つ）
    pub moved:     Todo,
    /// 入れ替えで旧 `order` を受け取った Todo
    pub displaced: Option<Todo>,
}

/// Todo を `target` の位置に移動する
///
/// `occupant` は移動前に `target` を使用している Todo。
/// 移動する Todo 自身が `target` を使用している場合（同じ位置への移動）は
/// 入れ替えを行わない。
pub fn reorder(mover: Todo, target: TodoOrder, occupant: Option<Todo>) -> Reorder {
    let old_order = mover.order();

    let displaced = occupant
        .filter(|other| other.id() != mover.id())
        .map(|other| other.with_order(old_order));

    Reorder {
        moved: mover.with_order(target),
        displaced,
    }
}
