//! Todo 管理ユースケース

use std::sync::Arc;

use todo_domain::{
    DomainError,
    clock::Clock,
    todo::{
        NewTodo,
        Todo,
        TodoId,
        TodoOrder,
        TodoValue,
        ordering::{self, Reorder},
    },
};
use todo_infra::{TransactionManager, repository::TodoRepository};

use crate::error::TodoServiceError;

/// Todo 作成の入力
pub struct CreateTodoInput {
    /// 省略時は `None`（バリデーションで弾かれる）
    pub value: Option<String>,
}

/// Todo 更新の入力
///
/// 各フィールドは独立しており、`None` は「変更なし」を表す。
pub struct UpdateTodoInput {
    /// パスパラメータのまま受け取る（UUID として不正なら 404）
    pub todo_id: String,
    pub value:   Option<String>,
    pub order:   Option<i64>,
    pub done:    Option<bool>,
}

/// Todo 管理ユースケース
pub struct TodoUseCaseImpl {
    todo_repository: Arc<dyn TodoRepository>,
    clock:           Arc<dyn Clock>,
    tx_manager:      Arc<dyn TransactionManager>,
}

fn not_found(todo_id: &str) -> TodoServiceError {
    DomainError::NotFound {
        entity_type: "Todo",
        id:          todo_id.to_string(),
    }
    .into()
}

impl TodoUseCaseImpl {
    pub fn new(
        todo_repository: Arc<dyn TodoRepository>,
        clock: Arc<dyn Clock>,
        tx_manager: Arc<dyn TransactionManager>,
    ) -> Self {
        Self {
            todo_repository,
            clock,
            tx_manager,
        }
    }

    /// Todo 一覧を取得する（`order` 降順）
    pub async fn list_todos(&self) -> Result<Vec<Todo>, TodoServiceError> {
        let todos = self.todo_repository.find_all_order_desc().await?;
        Ok(todos)
    }

    /// Todo を作成する
    ///
    /// 1. value バリデーション
    /// 2. 並び順ロックを取得し、最大 `order` + 1 を採番
    /// 3. 挿入してコミット
    pub async fn create_todo(&self, input: CreateTodoInput) -> Result<Todo, TodoServiceError> {
        let value = TodoValue::required(input.value)?;

        let mut tx = self.tx_manager.begin().await?;
        self.todo_repository.lock_ordering(&mut tx).await?;

        let current_max = self.todo_repository.find_max_order(&mut tx).await?;
        let order = ordering::next_order(current_max)
            .map_err(|e| TodoServiceError::Internal(e.to_string()))?;

        let todo = Todo::new(NewTodo {
            id: TodoId::new(),
            value,
            order,
            now: self.clock.now(),
        });
        self.todo_repository.insert(&mut tx, &todo).await?;
        tx.commit().await?;

        tracing::info!(todo_id = %todo.id(), order = %todo.order(), "Todo を作成しました");
        Ok(todo)
    }

    /// Todo を更新する
    ///
    /// 本文・並び順・完了状態はそれぞれ独立に指定できる。
    /// 並び順の変更先を別の Todo が使用していれば、その Todo と入れ替える。
    /// 入れ替えの 2 行は同一トランザクションで書き込む。
    pub async fn update_todo(&self, input: UpdateTodoInput) -> Result<Todo, TodoServiceError> {
        let todo_id = TodoId::parse(&input.todo_id).ok_or_else(|| not_found(&input.todo_id))?;
        let value = input.value.map(TodoValue::new).transpose()?;
        let order = input.order.map(TodoOrder::new).transpose()?;

        let mut tx = self.tx_manager.begin().await?;
        // 行ロックより先に並び順ロックを取得する（作成処理とロック順序を揃える）
        if order.is_some() {
            self.todo_repository.lock_ordering(&mut tx).await?;
        }

        let todo = self
            .todo_repository
            .find_by_id(&mut tx, &todo_id)
            .await?
            .ok_or_else(|| not_found(&input.todo_id))?;

        let todo = match order {
            Some(target) => {
                let occupant = self.todo_repository.find_by_order(&mut tx, target).await?;
                let Reorder { moved, displaced } = ordering::reorder(todo, target, occupant);
                if let Some(displaced) = displaced {
                    tracing::debug!(
                        displaced_id = %displaced.id(),
                        order = %displaced.order(),
                        "並び順を入れ替えます"
                    );
                    self.todo_repository.update(&mut tx, &displaced).await?;
                }
                moved
            }
            None => todo,
        };

        let todo = match value {
            Some(value) => todo.with_value(value),
            None => todo,
        };

        let todo = match input.done {
            Some(done) => todo.with_done(done, self.clock.now()),
            None => todo,
        };

        self.todo_repository.update(&mut tx, &todo).await?;
        tx.commit().await?;

        Ok(todo)
    }

    /// Todo を削除する
    pub async fn delete_todo(&self, todo_id: &str) -> Result<(), TodoServiceError> {
        let id = TodoId::parse(todo_id).ok_or_else(|| not_found(todo_id))?;

        let mut tx = self.tx_manager.begin().await?;
        if !self.todo_repository.delete(&mut tx, &id).await? {
            return Err(not_found(todo_id));
        }
        tx.commit().await?;

        tracing::info!(todo_id = %id, "Todo を削除しました");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use todo_domain::clock::FixedClock;
    use todo_infra::mock::{MockTodoRepository, MockTransactionManager};

    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn create_sut(repo: &MockTodoRepository) -> TodoUseCaseImpl {
        TodoUseCaseImpl::new(
            Arc::new(repo.clone()),
            Arc::new(FixedClock::new(fixed_now())),
            Arc::new(MockTransactionManager),
        )
    }

    fn todo_at(value: &str, order: i32) -> Todo {
        Todo::new(NewTodo {
            id:    TodoId::new(),
            value: TodoValue::new(value).unwrap(),
            order: TodoOrder::from_db(order),
            now:   fixed_now(),
        })
    }

    fn update_input(todo: &Todo) -> UpdateTodoInput {
        UpdateTodoInput {
            todo_id: todo.id().to_string(),
            value:   None,
            order:   None,
            done:    None,
        }
    }

    fn orders(repo: &MockTodoRepository) -> Vec<(String, i32)> {
        repo.snapshot()
            .iter()
            .map(|t| (t.value().to_string(), t.order().as_i32()))
            .collect()
    }

    // --- create_todo ---

    #[tokio::test]
    async fn test_create_空のストアではorder1が採番される() {
        let repo = MockTodoRepository::new();
        let sut = create_sut(&repo);

        let todo = sut
            .create_todo(CreateTodoInput {
                value: Some("牛乳を買う".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(todo.order(), TodoOrder::FIRST);
        assert_eq!(todo.created_at(), fixed_now());
        assert_eq!(todo.done_at(), None);
        assert_eq!(repo.snapshot(), vec![todo]);
    }

    #[tokio::test]
    async fn test_create_最大orderの次が採番される() {
        let repo = MockTodoRepository::with_todos(vec![todo_at("a", 3), todo_at("b", 7)]);
        let sut = create_sut(&repo);

        let todo = sut
            .create_todo(CreateTodoInput {
                value: Some("c".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(todo.order(), TodoOrder::from_db(8));
    }

    #[rstest]
    #[case::省略(None)]
    #[case::空文字(Some(String::new()))]
    #[case::五十一文字(Some("あ".repeat(51)))]
    #[tokio::test]
    async fn test_create_不正なvalueは400で何も保存されない(#[case] value: Option<String>) {
        let repo = MockTodoRepository::new();
        let sut = create_sut(&repo);

        let result = sut.create_todo(CreateTodoInput { value }).await;

        assert!(matches!(result, Err(TodoServiceError::BadRequest(_))));
        assert!(repo.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_create_ストア障害はデータベースエラー() {
        let repo = MockTodoRepository::new();
        repo.set_unavailable(true);
        let sut = create_sut(&repo);

        let result = sut
            .create_todo(CreateTodoInput {
                value: Some("a".to_string()),
            })
            .await;

        assert!(matches!(result, Err(TodoServiceError::Database(_))));
    }

    // --- list_todos ---

    #[tokio::test]
    async fn test_list_order降順で返る() {
        let repo = MockTodoRepository::new();
        let sut = create_sut(&repo);
        for value in ["一", "二", "三"] {
            sut.create_todo(CreateTodoInput {
                value: Some(value.to_string()),
            })
            .await
            .unwrap();
        }

        let todos = sut.list_todos().await.unwrap();

        let values: Vec<&str> = todos.iter().map(|t| t.value().as_str()).collect();
        assert_eq!(values, vec!["三", "二", "一"]);
    }

    // --- update_todo ---

    #[tokio::test]
    async fn test_update_使用中のorderへ移動すると1回だけ入れ替わる() {
        let a = todo_at("牛乳を買う", 1);
        let b = todo_at("犬の散歩", 2);
        let c = todo_at("掃除", 3);
        let repo = MockTodoRepository::with_todos(vec![a, b.clone(), c]);
        let sut = create_sut(&repo);

        sut.update_todo(UpdateTodoInput {
            order: Some(1),
            ..update_input(&b)
        })
        .await
        .unwrap();

        assert_eq!(
            orders(&repo),
            vec![
                ("掃除".to_string(), 3),
                ("牛乳を買う".to_string(), 2),
                ("犬の散歩".to_string(), 1),
            ]
        );
    }

    #[tokio::test]
    async fn test_update_空いているorderへの移動は上書きのみ() {
        let a = todo_at("a", 1);
        let b = todo_at("b", 2);
        let repo = MockTodoRepository::with_todos(vec![a.clone(), b]);
        let sut = create_sut(&repo);

        let updated = sut
            .update_todo(UpdateTodoInput {
                order: Some(10),
                ..update_input(&a)
            })
            .await
            .unwrap();

        assert_eq!(updated.order(), TodoOrder::from_db(10));
        assert_eq!(
            orders(&repo),
            vec![("a".to_string(), 10), ("b".to_string(), 2)]
        );
    }

    #[tokio::test]
    async fn test_update_doneの切り替え() {
        let todo = todo_at("a", 1);
        let repo = MockTodoRepository::with_todos(vec![todo.clone()]);
        let sut = create_sut(&repo);

        // done: true で打刻
        let done = sut
            .update_todo(UpdateTodoInput {
                done: Some(true),
                ..update_input(&todo)
            })
            .await
            .unwrap();
        assert_eq!(done.done_at(), Some(fixed_now()));

        // 省略時は維持
        let kept = sut
            .update_todo(UpdateTodoInput {
                value: Some("b".to_string()),
                ..update_input(&todo)
            })
            .await
            .unwrap();
        assert_eq!(kept.done_at(), Some(fixed_now()));
        assert_eq!(kept.value().as_str(), "b");

        // done: false で解除
        let undone = sut
            .update_todo(UpdateTodoInput {
                done: Some(false),
                ..update_input(&todo)
            })
            .await
            .unwrap();
        assert_eq!(undone.done_at(), None);
        assert_eq!(repo.snapshot(), vec![undone]);
    }

    #[tokio::test]
    async fn test_update_存在しないidは404で何も変更されない() {
        let todo = todo_at("a", 1);
        let repo = MockTodoRepository::with_todos(vec![todo.clone()]);
        let sut = create_sut(&repo);

        let result = sut
            .update_todo(UpdateTodoInput {
                todo_id: TodoId::new().to_string(),
                value:   Some("b".to_string()),
                order:   None,
                done:    Some(true),
            })
            .await;

        assert!(matches!(result, Err(TodoServiceError::NotFound(_))));
        assert_eq!(repo.snapshot(), vec![todo]);
    }

    #[tokio::test]
    async fn test_update_uuidでないidは404() {
        let repo = MockTodoRepository::new();
        let sut = create_sut(&repo);

        let result = sut
            .update_todo(UpdateTodoInput {
                todo_id: "not-a-uuid".to_string(),
                value:   None,
                order:   None,
                done:    None,
            })
            .await;

        assert!(matches!(result, Err(TodoServiceError::NotFound(_))));
    }

    #[rstest]
    #[case::空のvalue(Some(String::new()), None)]
    #[case::長すぎるvalue(Some("x".repeat(51)), None)]
    #[case::orderが0(None, Some(0))]
    #[case::orderが負(None, Some(-3))]
    #[case::orderがi32を超える(None, Some(i64::from(i32::MAX) + 1))]
    #[tokio::test]
    async fn test_update_不正なフィールドは400(
        #[case] value: Option<String>,
        #[case] order: Option<i64>,
    ) {
        let todo = todo_at("a", 1);
        let repo = MockTodoRepository::with_todos(vec![todo.clone()]);
        let sut = create_sut(&repo);

        let result = sut
            .update_todo(UpdateTodoInput {
                value,
                order,
                ..update_input(&todo)
            })
            .await;

        assert!(matches!(result, Err(TodoServiceError::BadRequest(_))));
        assert_eq!(repo.snapshot(), vec![todo]);
    }

    // --- delete_todo ---

    #[tokio::test]
    async fn test_delete_2回目は404() {
        let todo = todo_at("a", 1);
        let repo = MockTodoRepository::with_todos(vec![todo.clone()]);
        let sut = create_sut(&repo);
        let id = todo.id().to_string();

        sut.delete_todo(&id).await.unwrap();
        let second = sut.delete_todo(&id).await;

        assert!(repo.snapshot().is_empty());
        assert!(matches!(second, Err(TodoServiceError::NotFound(_))));
    }
}
