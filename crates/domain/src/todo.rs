//! # Todo
//!
//! Todo リストの 1 項目を表すドメインモデル。
//!
//! ## 並び順（order）
//!
//! 各 Todo は整数の `order` を持ち、大きいほど新しい（または優先度が高い）。
//! 作成時は既存の最大値 + 1 が割り当てられ、更新時は
//! 「移動先が使用中なら入れ替え、空いていれば上書き」で調整する。
//! 計算ルールは [`ordering`] を参照。
//!
//! ## 使用例
//!
//! ```rust
//! use todo_domain::todo::{NewTodo, Todo, TodoId, TodoOrder, TodoValue};
//!
//! let now = chrono::Utc::now();
//! let todo = Todo::new(NewTodo {
//!     id: TodoId::new(),
//!     value: TodoValue::new("牛乳を買う").unwrap(),
//!     order: TodoOrder::FIRST,
//!     now,
//! });
//!
//! assert_eq!(todo.order(), TodoOrder::FIRST);
//! assert!(!todo.is_done());
//!
//! let done = todo.with_done(true, now);
//! assert_eq!(done.done_at(), Some(now));
//! ```

pub mod ordering;

use chrono::{DateTime, Utc};
use derive_more::Display;
use uuid::Uuid;

use crate::DomainError;

// =========================================================================
// TodoId
// =========================================================================

/// Todo の一意識別子（UUID v7）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("{_0}")]
pub struct TodoId(Uuid);

impl TodoId {
    /// 新しい ID を生成する
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// パスパラメータなどの文字列から復元する
    ///
    /// UUID として解釈できない場合は `None`。
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TodoId {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// TodoValue（やること本文）
// =========================================================================

/// 本文の最小文字数
pub const MIN_TODO_VALUE_LENGTH: usize = 1;

/// 本文の最大文字数（DB: `VARCHAR(50)`）
pub const MAX_TODO_VALUE_LENGTH: usize = 50;

/// Todo の本文（値オブジェクト）
///
/// # 不変条件
///
/// - 1 文字以上 50 文字以下（`chars().count()` で数える）
///
/// 前後の空白は除去しない。入力された文字列をそのまま保持する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoValue(String);

impl TodoValue {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        let length = value.chars().count();

        if length < MIN_TODO_VALUE_LENGTH {
            return Err(DomainError::Validation(format!(
                "value は {MIN_TODO_VALUE_LENGTH} 文字以上である必要があります"
            )));
        }

        if length > MAX_TODO_VALUE_LENGTH {
            return Err(DomainError::Validation(format!(
                "value は {MAX_TODO_VALUE_LENGTH} 文字以内である必要があります"
            )));
        }

        Ok(Self(value))
    }

    /// 必須項目として検証する
    ///
    /// 作成リクエストで `value` が省略された場合は `None` が渡される。
    pub fn required(value: Option<String>) -> Result<Self, DomainError> {
        let value = value.ok_or_else(|| DomainError::Validation("value は必須です".to_string()))?;
        Self::new(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TodoValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =========================================================================
// TodoOrder（並び順）
// =========================================================================

/// Todo の並び順（値オブジェクト）
///
/// 1 以上の整数。DB では `INTEGER` として保存する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display("{_0}")]
pub struct TodoOrder(i32);

impl TodoOrder {
    /// Todo が 1 件もないときに割り当てる並び順
    pub const FIRST: Self = Self(1);

    /// クライアント入力（JSON の number）から作成する
    pub fn new(value: i64) -> Result<Self, DomainError> {
        if value < i64::from(Self::FIRST.0) {
            return Err(DomainError::Validation(
                "order は 1 以上の整数である必要があります".to_string(),
            ));
        }

        let value = i32::try_from(value).map_err(|_| {
            DomainError::Validation(format!("order は {} 以下である必要があります", i32::MAX))
        })?;

        Ok(Self(value))
    }

    /// DB から復元する
    ///
    /// 格納値の範囲は CHECK 制約で保証されているため検証しない。
    pub fn from_db(value: i32) -> Self {
        Self(value)
    }

    /// 直後の並び順を返す
    pub fn next(self) -> Result<Self, DomainError> {
        self.0
            .checked_add(1)
            .map(Self)
            .ok_or_else(|| DomainError::Validation("order が上限に達しました".to_string()))
    }

    pub fn as_i32(self) -> i32 {
        self.0
    }
}

// =========================================================================
// Todo（エンティティ）
// =========================================================================

/// 新規 Todo の生成パラメータ
pub struct NewTodo {
    pub id:    TodoId,
    pub value: TodoValue,
    pub order: TodoOrder,
    pub now:   DateTime<Utc>,
}

/// DB から復元する際のパラメータ
pub struct TodoRecord {
    pub id:         TodoId,
    pub value:      TodoValue,
    pub order:      TodoOrder,
    pub done_at:    Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Todo エンティティ
///
/// 状態遷移メソッドは自身を消費して新しいインスタンスを返す。
///
/// # 不変条件
///
/// - `id` と `created_at` は作成後に変わらない
/// - `done_at` は `None`（未完了）か、完了にした時刻のどちらか
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    id:         TodoId,
    value:      TodoValue,
    order:      TodoOrder,
    done_at:    Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl Todo {
    /// 未完了の Todo を作成する
    pub fn new(params: NewTodo) -> Self {
        Self {
            id:         params.id,
            value:      params.value,
            order:      params.order,
            done_at:    None,
            created_at: params.now,
        }
    }

    pub fn from_db(record: TodoRecord) -> Self {
        Self {
            id:         record.id,
            value:      record.value,
            order:      record.order,
            done_at:    record.done_at,
            created_at: record.created_at,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> &TodoId {
        &self.id
    }

    pub fn value(&self) -> &TodoValue {
        &self.value
    }

    pub fn order(&self) -> TodoOrder {
        self.order
    }

    pub fn done_at(&self) -> Option<DateTime<Utc>> {
        self.done_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_done(&self) -> bool {
        self.done_at.is_some()
    }

    // 状態遷移メソッド

    /// 本文を変更する
    pub fn with_value(self, value: TodoValue) -> Self {
        Self { value, ..self }
    }

    /// 並び順を変更する
    ///
    /// 他の Todo との入れ替えは [`ordering::reorder`] が担当する。
    pub fn with_order(self, order: TodoOrder) -> Self {
        Self { order, ..self }
    }

    /// 完了状態を切り替える
    ///
    /// `done = true` なら `now` を打刻し、`false` なら打刻を消す。
    /// 既に完了済みの Todo を再度完了にした場合も `now` で上書きする。
    pub fn with_done(self, done: bool, now: DateTime<Utc>) -> Self {
        Self {
            done_at: done.then_some(now),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn sample_todo() -> Todo {
        Todo::new(NewTodo {
            id:    TodoId::new(),
            value: TodoValue::new("牛乳を買う").unwrap(),
            order: TodoOrder::FIRST,
            now:   fixed_now(),
        })
    }

    // ===== TodoValue =====

    #[rstest]
    #[case::一文字("a")]
    #[case::ちょうど50文字(&"あ".repeat(50))]
    #[case::前後の空白を含む("  散歩  ")]
    fn test_todo_value_有効な本文を受け付ける(#[case] input: &str) {
        let value = TodoValue::new(input).unwrap();

        assert_eq!(value.as_str(), input);
    }

    #[rstest]
    #[case::空文字("")]
    #[case::五十一文字(&"a".repeat(51))]
    #[case::マルチバイトで五十一文字(&"あ".repeat(51))]
    fn test_todo_value_範囲外の本文はバリデーションエラー(#[case] input: &str) {
        let result = TodoValue::new(input);

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_todo_value_requiredは未指定をバリデーションエラーにする() {
        let result = TodoValue::required(None);

        assert_eq!(
            result,
            Err(DomainError::Validation("value は必須です".to_string()))
        );
    }

    #[test]
    fn test_todo_value_requiredは指定された本文を検証する() {
        assert!(TodoValue::required(Some("散歩".to_string())).is_ok());
        assert!(TodoValue::required(Some(String::new())).is_err());
    }

    // ===== TodoOrder =====

    #[rstest]
    #[case(1, 1)]
    #[case(42, 42)]
    #[case(i64::from(i32::MAX), i32::MAX)]
    fn test_todo_order_1以上の整数を受け付ける(#[case] input: i64, #[case] expected: i32) {
        assert_eq!(TodoOrder::new(input).unwrap().as_i32(), expected);
    }

    #[rstest]
    #[case::ゼロ(0)]
    #[case::負数(-3)]
    #[case::i32の範囲外(i64::from(i32::MAX) + 1)]
    fn test_todo_order_範囲外はバリデーションエラー(#[case] input: i64) {
        assert!(matches!(
            TodoOrder::new(input),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_todo_order_nextは1大きい値を返す() {
        let order = TodoOrder::from_db(7);

        assert_eq!(order.next().unwrap(), TodoOrder::from_db(8));
    }

    #[test]
    fn test_todo_order_nextは上限でエラーを返す() {
        assert!(TodoOrder::from_db(i32::MAX).next().is_err());
    }

    // ===== Todo =====

    #[test]
    fn test_newで未完了のtodoが作成される() {
        let todo = sample_todo();

        assert!(!todo.is_done());
        assert_eq!(todo.done_at(), None);
        assert_eq!(todo.created_at(), fixed_now());
    }

    #[test]
    fn test_with_done_trueで現在時刻が打刻される() {
        let later = fixed_now() + chrono::Duration::hours(1);

        let todo = sample_todo().with_done(true, later);

        assert_eq!(todo.done_at(), Some(later));
        assert!(todo.is_done());
    }

    #[test]
    fn test_with_done_falseで打刻が消える() {
        let todo = sample_todo()
            .with_done(true, fixed_now())
            .with_done(false, fixed_now());

        assert_eq!(todo.done_at(), None);
    }

    #[test]
    fn test_状態遷移でidと作成日時は変わらない() {
        let original = sample_todo();
        let id = *original.id();

        let changed = original
            .with_value(TodoValue::new("犬の散歩").unwrap())
            .with_order(TodoOrder::from_db(5));

        assert_eq!(changed.id(), &id);
        assert_eq!(changed.created_at(), fixed_now());
        assert_eq!(changed.value().as_str(), "犬の散歩");
        assert_eq!(changed.order(), TodoOrder::from_db(5));
    }

    #[test]
    fn test_todo_id_parseは不正な文字列でnoneを返す() {
        assert_eq!(TodoId::parse("not-a-uuid"), None);

        let id = TodoId::new();
        assert_eq!(TodoId::parse(&id.to_string()), Some(id));
    }
}
