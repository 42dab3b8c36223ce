//! In-memory task store, useful for testing and ephemeral sessions.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use taskpilot_core::error::StoreError;
use taskpilot_core::task::{DeleteTarget, NewTask, Task, TaskFilter, TaskStore, TaskUpdate};
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    tasks: Vec<Task>,
    next_id: i64,
}

/// A task store backed by a Vec kept in id order.
pub struct InMemoryTaskStore {
    inner: RwLock<Inner>,
    mutations: AtomicU64,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                tasks: Vec::new(),
                next_id: 1,
            }),
            mutations: AtomicU64::new(0),
        }
    }

    /// Number of successful writes (create, update, delete) so far.
    pub fn mutations(&self) -> u64 {
        self.mutations.load(Ordering::SeqCst)
    }

    fn record_mutation(&self) {
        self.mutations.fetch_add(1, Ordering::SeqCst);
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn create(&self, task: NewTask) -> Result<Task, StoreError> {
        let mut inner = self.inner.write().await;
        let id = inner.next_id;
        inner.next_id += 1;

        let task = Task {
            id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
            created_at: Utc::now(),
            updated_at: None,
        };
        inner.tasks.push(task.clone());
        self.record_mutation();
        Ok(task)
    }

    async fn list(&self, filter: TaskFilter) -> Result<Vec<Task>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.tasks.iter().filter(|t| filter.matches(t)).cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Task>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn update(&self, id: i64, update: TaskUpdate) -> Result<Option<Task>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(task) = inner.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        update.apply_to(task);
        task.updated_at = Some(Utc::now());
        let updated = task.clone();
        self.record_mutation();
        Ok(Some(updated))
    }

    async fn delete(&self, target: DeleteTarget) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let position = match &target {
            DeleteTarget::Id(id) => inner.tasks.iter().position(|t| t.id == *id),
            DeleteTarget::TitleContains(text) => {
                let needle = text.to_lowercase();
                inner
                    .tasks
                    .iter()
                    .position(|t| t.title.to_lowercase().contains(&needle))
            }
        };

        match position {
            Some(index) => {
                inner.tasks.remove(index);
                self.record_mutation();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.inner.read().await.tasks.len())
    }
}
