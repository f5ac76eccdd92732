//! # テスト用モックリポジトリ
//!
//! ユースケーステスト・ハンドラテストで使用するインメモリ実装。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! todo-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{
    Arc,
    Mutex,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use todo_domain::todo::{Todo, TodoId, TodoOrder};

use crate::{
    db::{TransactionManager, TxContext},
    error::InfraError,
    repository::TodoRepository,
};

// ===== MockTodoRepository =====

/// インメモリの TodoRepository
///
/// `set_unavailable(true)` にすると、全メソッドがエラーを返す。
/// ストア障害時の 500 / 503 応答の確認に使う。
#[derive(Clone, Default)]
pub struct MockTodoRepository {
    todos:       Arc<Mutex<Vec<Todo>>>,
    unavailable: Arc<AtomicBool>,
}

impl MockTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_todos(todos: Vec<Todo>) -> Self {
        Self {
            todos:       Arc::new(Mutex::new(todos)),
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 保存されている Todo を `order` 降順で返す
    pub fn snapshot(&self) -> Vec<Todo> {
        let mut todos = self.todos.lock().unwrap().clone();
        todos.sort_by(|a, b| b.order().cmp(&a.order()));
        todos
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), InfraError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(InfraError::unexpected("ストアに接続できません"));
        }
        Ok(())
    }
}

#[async_trait]
impl TodoRepository for MockTodoRepository {
    async fn find_all_order_desc(&self) -> Result<Vec<Todo>, InfraError> {
        self.check_available()?;
        Ok(self.snapshot())
    }

    async fn lock_ordering(&self, _tx: &mut TxContext) -> Result<(), InfraError> {
        self.check_available()
    }

    async fn find_max_order(&self, _tx: &mut TxContext) -> Result<Option<TodoOrder>, InfraError> {
        self.check_available()?;
        Ok(self.todos.lock().unwrap().iter().map(Todo::order).max())
    }

    async fn find_by_id(
        &self,
        _tx: &mut TxContext,
        id: &TodoId,
    ) -> Result<Option<Todo>, InfraError> {
        self.check_available()?;
        Ok(self
            .todos
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id() == id)
            .cloned())
    }

    async fn find_by_order(
        &self,
        _tx: &mut TxContext,
        order: TodoOrder,
    ) -> Result<Option<Todo>, InfraError> {
        self.check_available()?;
        Ok(self
            .todos
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.order() == order)
            .cloned())
    }

    async fn insert(&self, _tx: &mut TxContext, todo: &Todo) -> Result<(), InfraError> {
        self.check_available()?;
        self.todos.lock().unwrap().push(todo.clone());
        Ok(())
    }

    async fn update(&self, _tx: &mut TxContext, todo: &Todo) -> Result<(), InfraError> {
        self.check_available()?;
        let mut todos = self.todos.lock().unwrap();
        if let Some(existing) = todos.iter_mut().find(|t| t.id() == todo.id()) {
            *existing = todo.clone();
        }
        Ok(())
    }

    async fn delete(&self, _tx: &mut TxContext, id: &TodoId) -> Result<bool, InfraError> {
        self.check_available()?;
        let mut todos = self.todos.lock().unwrap();
        let before = todos.len();
        todos.retain(|t| t.id() != id);
        Ok(todos.len() < before)
    }

    async fn ping(&self) -> Result<(), InfraError> {
        self.check_available()
    }
}

// ===== MockTransactionManager =====

/// 常に Mock の [`TxContext`] を返す TransactionManager
pub struct MockTransactionManager;

#[async_trait]
impl TransactionManager for MockTransactionManager {
    async fn begin(&self) -> Result<TxContext, InfraError> {
        Ok(TxContext::mock())
    }
}
