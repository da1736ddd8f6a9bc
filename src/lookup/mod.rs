// file: src/lookup/mod.rs
// description: background readme retrieval with ttl-bounded task tracking
// reference: https://docs.rs/tokio/latest/tokio/task/fn.spawn.html

use crate::github::GithubClient;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

pub type TaskId = Uuid;

pub const DEFAULT_TASK_TTL: Duration = Duration::from_secs(600);

/// Where readme text comes from.
pub trait ReadmeSource: Send + Sync + 'static {
    fn readme(&self, full_name: &str) -> impl Future<Output = Option<String>> + Send;
}

impl ReadmeSource for GithubClient {
    fn readme(&self, full_name: &str) -> impl Future<Output = Option<String>> + Send {
        self.fetch_readme(full_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskPoll {
    Pending,
    Ready(Option<String>),
    Unknown,
}

#[derive(Debug)]
enum TaskState {
    Pending,
    Ready(Option<String>),
}

/// `touched` is reset when the fetch finishes, so the ttl runs from there.
#[derive(Debug)]
struct TaskEntry {
    touched: Instant,
    state: TaskState,
}

type TaskMap = Arc<Mutex<HashMap<TaskId, TaskEntry>>>;

pub struct ReadmeLookup<S: ReadmeSource = GithubClient> {
    source: Arc<S>,
    tasks: TaskMap,
    ttl: Duration,
}

impl<S: ReadmeSource> ReadmeLookup<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self::with_ttl(source, DEFAULT_TASK_TTL)
    }

    pub fn with_ttl(source: Arc<S>, ttl: Duration) -> Self {
        Self {
            source,
            tasks: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Spawn the fetch and return its id without waiting for it.
    pub async fn start(&self, full_name: &str) -> TaskId {
        let id = Uuid::new_v4();
        {
            let mut tasks = self.tasks.lock().await;
            evict(&mut tasks, self.ttl);
            tasks.insert(
                id,
                TaskEntry {
                    touched: Instant::now(),
                    state: TaskState::Pending,
                },
            );
        }

        info!("Started README lookup {} for {}", id, full_name);

        let source = self.source.clone();
        let tasks = self.tasks.clone();
        let full_name = full_name.to_string();
        tokio::spawn(async move {
            let readme = source.readme(&full_name).await;
            debug!(
                "README task {} for {} finished (found: {})",
                id,
                full_name,
                readme.is_some()
            );
            if let Some(entry) = tasks.lock().await.get_mut(&id) {
                entry.state = TaskState::Ready(readme);
                entry.touched = Instant::now();
            }
        });

        id
    }

    /// A ready result is handed out once and then forgotten.
    pub async fn poll(&self, id: TaskId) -> TaskPoll {
        let mut tasks = self.tasks.lock().await;
        evict(&mut tasks, self.ttl);

        match tasks.get(&id).map(|entry| matches!(entry.state, TaskState::Ready(_))) {
            None => TaskPoll::Unknown,
            Some(false) => TaskPoll::Pending,
            Some(true) => match tasks.remove(&id) {
                Some(TaskEntry {
                    state: TaskState::Ready(readme),
                    ..
                }) => TaskPoll::Ready(readme),
                _ => TaskPoll::Unknown,
            },
        }
    }

    /// Drop entries untouched for longer than the ttl, returning how many went.
    pub async fn evict_expired(&self) -> usize {
        let mut tasks = self.tasks.lock().await;
        evict(&mut tasks, self.ttl)
    }

    pub async fn len(&self) -> usize {
        self.tasks.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tasks.lock().await.is_empty()
    }
}

fn evict(tasks: &mut HashMap<TaskId, TaskEntry>, ttl: Duration) -> usize {
    let before = tasks.len();
    tasks.retain(|_, entry| entry.touched.elapsed() <= ttl);
    let evicted = before - tasks.len();
    if evicted > 0 {
        debug!("Evicted {} expired README tasks", evicted);
    }
    evicted
}
