//! Client-side task board.
//!
//! Holds the local task list and history, applies every change locally
//! first, then pushes the complete list to the backend in a spawned task.
//! A failed push is logged and nothing else: the local state is not rolled
//! back, so the two sides stay apart until the next successful push.

mod sync;

pub use sync::{HttpTaskSync, StoreTaskSync, SyncError, TaskSync};

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::task::{board, CompletedTask, Task, TaskError, TaskId};

/// Local copy of both documents.
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    pub tasks: Vec<Task>,
    pub history: Vec<CompletedTask>,
}

/// Outcome of a local change plus the background push it started.
pub struct Mutation<T> {
    pub value: T,
    push: Option<JoinHandle<()>>,
}

impl<T> Mutation<T> {
    fn new(value: T, push: Option<JoinHandle<()>>) -> Self {
        Self { value, push }
    }

    /// Whether the change started a push.
    pub fn pushed(&self) -> bool {
        self.push.is_some()
    }

    /// Wait for the push to finish, then return the value.
    pub async fn settled(self) -> T {
        if let Some(push) = self.push {
            if let Err(e) = push.await {
                tracing::error!("Push task did not finish: {}", e);
            }
        }
        self.value
    }

    /// Let the push run on its own.
    pub fn detach(self) -> T {
        self.value
    }
}

/// The task list as the user manipulates it.
#[derive(Clone)]
pub struct TaskBoard {
    sync: Arc<dyn TaskSync>,
    state: Arc<RwLock<BoardState>>,
}

impl TaskBoard {
    pub fn new(sync: Arc<dyn TaskSync>) -> Self {
        Self {
            sync,
            state: Arc::new(RwLock::new(BoardState::default())),
        }
    }

    /// Replace local state with what the backend holds.
    ///
    /// Each document is fetched on its own; a failure leaves that half of the
    /// local state untouched and is returned after both were attempted.
    pub async fn load(&self) -> Result<(), SyncError> {
        let tasks = self.sync.fetch_tasks().await;
        let history = self.sync.fetch_history().await;

        let mut state = self.state.write().await;
        let mut first_error = None;
        match tasks {
            Ok(tasks) => state.tasks = tasks,
            Err(e) => {
                tracing::error!("Failed to fetch tasks: {}", e);
                first_error = Some(e);
            }
        }
        match history {
            Ok(history) => state.history = history,
            Err(e) => {
                tracing::error!("Failed to fetch history: {}", e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
        tracing::debug!(
            "Loaded {} task(s) and {} history entries",
            state.tasks.len(),
            state.history.len()
        );

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Active tasks in display order.
    pub async fn tasks(&self) -> Vec<Task> {
        self.state.read().await.tasks.clone()
    }

    /// History, most recently completed first.
    pub async fn history(&self) -> Vec<CompletedTask> {
        board::history_by_completion(&self.state.read().await.history)
    }

    /// The task currently being worked on.
    pub async fn current_focus(&self) -> Option<Task> {
        board::current_focus(&self.state.read().await.tasks).cloned()
    }

    pub async fn snapshot(&self) -> BoardState {
        self.state.read().await.clone()
    }

    /// Append a new task.
    pub async fn add_task(
        &self,
        description: &str,
        target_date: Option<DateTime<Utc>>,
    ) -> Result<Mutation<Task>, TaskError> {
        let mut state = self.state.write().await;
        let (tasks, task) = board::insert(state.tasks.clone(), description, target_date)?;
        state.tasks = tasks;
        let push = self.spawn_push_tasks(state.tasks.clone());
        Ok(Mutation::new(task, Some(push)))
    }

    /// Drag `active` onto `over`. Unknown or identical ids change nothing and
    /// push nothing.
    pub async fn reorder(&self, active: &TaskId, over: &TaskId) -> Mutation<()> {
        let mut state = self.state.write().await;
        let before: Vec<TaskId> = state.tasks.iter().map(|t| t.id.clone()).collect();
        state.tasks = board::reorder(std::mem::take(&mut state.tasks), active, over);

        let moved = state
            .tasks
            .iter()
            .map(|t| &t.id)
            .ne(before.iter());
        if !moved {
            return Mutation::new((), None);
        }
        let push = self.spawn_push_tasks(state.tasks.clone());
        Mutation::new((), Some(push))
    }

    /// Make `id` the single top-priority task.
    pub async fn set_top_priority(&self, id: &TaskId) -> Result<Mutation<()>, TaskError> {
        let mut state = self.state.write().await;
        state.tasks = board::set_top_priority(state.tasks.clone(), id)?;
        let push = self.spawn_push_tasks(state.tasks.clone());
        Ok(Mutation::new((), Some(push)))
    }

    /// Clear the top-priority flag on `id`.
    pub async fn unset_top_priority(&self, id: &TaskId) -> Result<Mutation<()>, TaskError> {
        let mut state = self.state.write().await;
        state.tasks = board::unset_top_priority(state.tasks.clone(), id)?;
        let push = self.spawn_push_tasks(state.tasks.clone());
        Ok(Mutation::new((), Some(push)))
    }

    /// Move `id` to history.
    ///
    /// The push writes the task list, then re-reads the remote history,
    /// prepends the new entry, writes it back and adopts it locally. A
    /// history read answered with an error status counts as an empty
    /// history. If the backend cannot be reached or its answer cannot be
    /// parsed, the remote history is left alone.
    pub async fn complete(&self, id: &TaskId) -> Result<Mutation<CompletedTask>, TaskError> {
        let mut state = self.state.write().await;
        let completion = board::complete(state.tasks.clone(), state.history.clone(), id)?;
        state.tasks = completion.tasks;
        state.history = completion.history;
        let tasks = state.tasks.clone();
        drop(state);

        let sync = Arc::clone(&self.sync);
        let shared = Arc::clone(&self.state);
        let completed = completion.completed.clone();
        let push = tokio::spawn(async move {
            if let Err(e) = sync.push_tasks(&tasks).await {
                tracing::error!("Failed to push task list: {}", e);
            }

            let existing = match sync.fetch_history().await {
                Ok(history) => history,
                Err(SyncError::Status { url, status, .. }) => {
                    tracing::warn!("{} returned {}, starting history afresh", url, status);
                    Vec::new()
                }
                Err(e) => {
                    tracing::error!("Failed to update task history: {}", e);
                    return;
                }
            };
            let updated = board::prepend(existing, completed);
            match sync.push_history(&updated).await {
                Ok(()) => shared.write().await.history = updated,
                Err(e) => tracing::error!("Failed to update task history: {}", e),
            }
        });

        Ok(Mutation::new(completion.completed, Some(push)))
    }

    fn spawn_push_tasks(&self, tasks: Vec<Task>) -> JoinHandle<()> {
        let sync = Arc::clone(&self.sync);
        tokio::spawn(async move {
            if let Err(e) = sync.push_tasks(&tasks).await {
                tracing::error!("Failed to push task list: {}", e);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::document_store::InMemoryDocumentStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn store_board() -> (TaskBoard, Arc<StoreTaskSync>) {
        let sync = Arc::new(StoreTaskSync::new(Arc::new(InMemoryDocumentStore::new())));
        (TaskBoard::new(sync.clone()), sync)
    }

    /// Backend that refuses every write.
    struct ReadOnlySync {
        history: Vec<CompletedTask>,
        pushes: AtomicUsize,
    }

    #[async_trait]
    impl TaskSync for ReadOnlySync {
        async fn fetch_tasks(&self) -> Result<Vec<Task>, SyncError> {
            Ok(Vec::new())
        }

        async fn push_tasks(&self, _tasks: &[Task]) -> Result<(), SyncError> {
            self.pushes.fetch_add(1, Ordering::SeqCst);
            Err(SyncError::Status {
                url: "/tasks".to_string(),
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                body: String::new(),
            })
        }

        async fn fetch_history(&self) -> Result<Vec<CompletedTask>, SyncError> {
            Ok(self.history.clone())
        }

        async fn push_history(&self, _history: &[CompletedTask]) -> Result<(), SyncError> {
            self.pushes.fetch_add(1, Ordering::SeqCst);
            Err(SyncError::Status {
                url: "/history".to_string(),
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                body: String::new(),
            })
        }
    }

    /// Store-backed sync whose history reads always fail.
    struct HistoryReadFails {
        inner: StoreTaskSync,
        with_status: bool,
    }

    #[async_trait]
    impl TaskSync for HistoryReadFails {
        async fn fetch_tasks(&self) -> Result<Vec<Task>, SyncError> {
            self.inner.fetch_tasks().await
        }

        async fn push_tasks(&self, tasks: &[Task]) -> Result<(), SyncError> {
            self.inner.push_tasks(tasks).await
        }

        async fn fetch_history(&self) -> Result<Vec<CompletedTask>, SyncError> {
            if self.with_status {
                return Err(SyncError::Status {
                    url: "/history".to_string(),
                    status: reqwest::StatusCode::BAD_GATEWAY,
                    body: String::new(),
                });
            }
            let source = serde_json::from_str::<Vec<CompletedTask>>("<html>").unwrap_err();
            Err(SyncError::Parse {
                url: "/history".to_string(),
                source,
            })
        }

        async fn push_history(&self, history: &[CompletedTask]) -> Result<(), SyncError> {
            self.inner.push_history(history).await
        }
    }

    async fn history_failing_board(
        with_status: bool,
    ) -> (TaskBoard, StoreTaskSync, CompletedTask) {
        let store = StoreTaskSync::new(Arc::new(InMemoryDocumentStore::new()));
        let elsewhere = Task::new("Done on another device", None, 0)
            .unwrap()
            .into_completed();
        store
            .push_history(std::slice::from_ref(&elsewhere))
            .await
            .unwrap();
        let board = TaskBoard::new(Arc::new(HistoryReadFails {
            inner: store.clone(),
            with_status,
        }));
        (board, store, elsewhere)
    }

    #[tokio::test]
    async fn buy_milk_walk_dog_scenario_reaches_backend() {
        let (board, sync) = store_board();
        board.load().await.unwrap();
        assert!(board.tasks().await.is_empty());
        assert!(board.current_focus().await.is_none());

        let milk = board.add_task("Buy milk", None).await.unwrap().settled().await;
        assert_eq!(milk.order, 0);
        let dog = board.add_task("Walk dog", None).await.unwrap().settled().await;
        assert_eq!(dog.order, 1);

        board
            .set_top_priority(&dog.id)
            .await
            .unwrap()
            .settled()
            .await;
        let tasks = board.tasks().await;
        assert_eq!(tasks[0].id, dog.id);
        assert!(tasks[0].is_top_priority);
        assert_eq!(tasks[1].id, milk.id);
        assert_eq!(tasks[1].order, 1);

        let completed = board.complete(&milk.id).await.unwrap().settled().await;
        assert!(completed.completed_date >= milk.created_date);

        let remote_tasks = sync.fetch_tasks().await.unwrap();
        assert_eq!(remote_tasks.len(), 1);
        assert_eq!(remote_tasks[0].description, "Walk dog");
        assert_eq!(remote_tasks[0].order, 0);
        assert!(remote_tasks[0].is_top_priority);

        let remote_history = sync.fetch_history().await.unwrap();
        assert_eq!(remote_history.len(), 1);
        assert_eq!(remote_history[0].description, "Buy milk");
        assert_eq!(board.history().await, remote_history);
        assert_eq!(board.current_focus().await.unwrap().id, dog.id);
    }

    #[tokio::test]
    async fn complete_prepends_to_remote_history_written_elsewhere() {
        let (board, sync) = store_board();
        let elsewhere = Task::new("Done on another device", None, 0)
            .unwrap()
            .into_completed();
        sync.push_history(std::slice::from_ref(&elsewhere))
            .await
            .unwrap();

        let task = board.add_task("Buy milk", None).await.unwrap().settled().await;
        board.complete(&task.id).await.unwrap().settled().await;

        let remote = sync.fetch_history().await.unwrap();
        assert_eq!(remote.len(), 2);
        assert_eq!(remote[0].id, task.id);
        assert_eq!(remote[1].id, elsewhere.id);
        assert_eq!(board.snapshot().await.history, remote);
    }

    #[tokio::test]
    async fn detached_changes_are_visible_locally_at_once() {
        let (board, _) = store_board();
        let task = board.add_task("Buy milk", None).await.unwrap().detach();
        assert_eq!(board.tasks().await, vec![task.clone()]);
        assert_eq!(board.current_focus().await, Some(task));
    }

    #[tokio::test]
    async fn reorder_noop_pushes_nothing() {
        let (board, _) = store_board();
        let a = board.add_task("a", None).await.unwrap().settled().await;
        let b = board.add_task("b", None).await.unwrap().settled().await;

        let same = board.reorder(&a.id, &a.id).await;
        assert!(!same.pushed());

        let moved = board.reorder(&a.id, &b.id).await;
        assert!(moved.pushed());
        moved.settled().await;
        let names: Vec<String> = board
            .tasks()
            .await
            .into_iter()
            .map(|t| t.description)
            .collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn failed_pushes_keep_optimistic_local_state() {
        let backend = Arc::new(ReadOnlySync {
            history: Vec::new(),
            pushes: AtomicUsize::new(0),
        });
        let board = TaskBoard::new(backend.clone());

        let a = board.add_task("a", None).await.unwrap().settled().await;
        board.add_task("b", None).await.unwrap().settled().await;
        let done = board.complete(&a.id).await.unwrap().settled().await;

        let state = board.snapshot().await;
        assert_eq!(state.tasks.len(), 1);
        assert_eq!(state.tasks[0].order, 0);
        assert_eq!(state.history, vec![done]);
        // Two adds, then the task list and history writes of the completion.
        assert_eq!(backend.pushes.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn history_error_status_counts_as_empty_history() {
        let (board, store, _) = history_failing_board(true).await;

        let task = board.add_task("Buy milk", None).await.unwrap().settled().await;
        let done = board.complete(&task.id).await.unwrap().settled().await;

        assert!(store.fetch_tasks().await.unwrap().is_empty());
        assert_eq!(store.fetch_history().await.unwrap(), vec![done.clone()]);
        assert_eq!(board.history().await, vec![done]);
    }

    #[tokio::test]
    async fn unreadable_history_is_left_alone() {
        let (board, store, elsewhere) = history_failing_board(false).await;

        let task = board.add_task("Buy milk", None).await.unwrap().settled().await;
        let done = board.complete(&task.id).await.unwrap().settled().await;

        assert!(store.fetch_tasks().await.unwrap().is_empty());
        assert_eq!(store.fetch_history().await.unwrap(), vec![elsewhere]);
        assert_eq!(board.history().await, vec![done]);
    }

    #[tokio::test]
    async fn unknown_ids_are_reported_without_pushing() {
        let (board, sync) = store_board();
        let missing = TaskId::from("missing");

        assert!(matches!(
            board.set_top_priority(&missing).await,
            Err(TaskError::NotFound(_))
        ));
        assert!(matches!(
            board.unset_top_priority(&missing).await,
            Err(TaskError::NotFound(_))
        ));
        assert!(matches!(
            board.complete(&missing).await,
            Err(TaskError::NotFound(_))
        ));
        assert!(matches!(
            board.add_task("  ", None).await,
            Err(TaskError::EmptyDescription)
        ));
        assert!(sync.fetch_tasks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unset_top_priority_falls_back_to_head_for_focus() {
        let (board, _) = store_board();
        let a = board.add_task("a", None).await.unwrap().settled().await;
        let b = board.add_task("b", None).await.unwrap().settled().await;

        board.set_top_priority(&b.id).await.unwrap().settled().await;
        assert_eq!(board.current_focus().await.unwrap().id, b.id);

        board.unset_top_priority(&b.id).await.unwrap().settled().await;
        let focus = board.current_focus().await.unwrap();
        assert_eq!(focus.id, b.id);
        assert!(!focus.is_top_priority);
        assert_eq!(board.tasks().await[1].id, a.id);
    }
}
