use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use super::pipeline::Pipeline;
use super::queue::JobQueue;
use super::store::{PipelineResult, ResultStore};
use crate::utils::display_name;

/// Emitted once the queue has been drained
pub const BATCH_COMPLETED: &str = "Batch processing completed";

/// Receives human-readable progress messages from the worker
pub type ProgressListener = Arc<dyn Fn(&str) + Send + Sync>;

/// Drains a job queue on a background task, one file at a time.
///
/// The worker is a cheap handle: clones share the same queue, results and
/// state. Callers never wait on a drain; they poll [`is_draining`](Self::is_draining)
/// and [`results`](Self::results) or watch the progress listener.
#[derive(Clone)]
pub struct BatchWorker {
    inner: Arc<Inner>,
}

struct Inner {
    pipeline: Pipeline,
    queue: JobQueue,
    results: Mutex<ResultStore>,
    draining: AtomicBool,
    current_file: Mutex<Option<String>>,
    listener: RwLock<Option<ProgressListener>>,
}

impl BatchWorker {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            inner: Arc::new(Inner {
                pipeline,
                queue: JobQueue::new(),
                results: Mutex::new(ResultStore::new()),
                draining: AtomicBool::new(false),
                current_file: Mutex::new(None),
                listener: RwLock::new(None),
            }),
        }
    }

    /// Queue a file. Safe to call while a drain is running; the running drain picks it up.
    pub fn enqueue(&self, file_id: impl Into<String>) {
        self.inner.queue.enqueue(file_id);
    }

    /// Start draining the queue on a background Tokio task.
    ///
    /// Returns `false` without doing anything if a drain is already running,
    /// or if called outside a Tokio runtime.
    pub fn start_draining(&self) -> bool {
        if self
            .inner
            .draining
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Batch worker already draining, ignoring start request");
            return false;
        }

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                self.inner.draining.store(false, Ordering::Release);
                tracing::error!("Cannot start batch worker outside a Tokio runtime: {}", e);
                return false;
            }
        };

        tracing::info!("Starting batch drain with {} queued file(s)", self.inner.queue.len());
        let inner = Arc::clone(&self.inner);
        handle.spawn(inner.drain());
        true
    }

    pub fn is_draining(&self) -> bool {
        self.inner.draining.load(Ordering::Acquire)
    }

    pub fn pending_count(&self) -> usize {
        self.inner.queue.len()
    }

    /// File currently being processed, if any
    pub fn current_file(&self) -> Option<String> {
        self.inner
            .current_file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Snapshot of every result stored so far
    pub fn results(&self) -> ResultStore {
        self.inner.results.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn result(&self, file_id: &str) -> Option<PipelineResult> {
        self.inner
            .results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(file_id)
            .cloned()
    }

    /// Forget all stored results. The worker itself never does this.
    pub fn clear_results(&self) {
        self.inner.results.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    /// Replace the progress listener; only the most recent one is called
    pub fn set_progress_listener<F>(&self, listener: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let mut slot = self.inner.listener.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::new(listener));
    }

    pub fn clear_progress_listener(&self) {
        *self.inner.listener.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl Inner {
    async fn drain(self: Arc<Self>) {
        loop {
            while let Some(file_id) = self.queue.try_dequeue() {
                self.process(file_id).await;
            }

            self.set_current(None);
            self.draining.store(false, Ordering::Release);

            // A file enqueued after the last empty check would otherwise sit
            // in the queue until someone starts another drain.
            if self.queue.is_empty()
                || self
                    .draining
                    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                    .is_err()
            {
                break;
            }
            tracing::debug!("Files arrived while finishing, resuming drain");
        }

        // Exactly once per session, after the worker is idle again
        self.emit(BATCH_COMPLETED);
    }

    async fn process(&self, file_id: String) {
        let name = display_name(&file_id);
        self.set_current(Some(file_id.clone()));
        self.emit(&format!("Processing {}", name));

        let outcome = AssertUnwindSafe(self.pipeline.run(&file_id)).catch_unwind().await;
        match outcome {
            Ok(result) => {
                tracing::info!("Finished {} with status {}", file_id, result.status);
                self.store(result);
                self.emit(&format!("Completed {}", name));
            }
            Err(panic) => {
                let message = panic_message(&*panic);
                tracing::error!("Unexpected fault while processing {}: {}", file_id, message);
                self.store(PipelineResult::failed(file_id, message.clone()));
                self.emit(&format!("Error processing file: {}", message));
            }
        }
    }

    fn store(&self, result: PipelineResult) {
        self.results.lock().unwrap_or_else(PoisonError::into_inner).insert(result);
    }

    fn set_current(&self, file_id: Option<String>) {
        *self.current_file.lock().unwrap_or_else(PoisonError::into_inner) = file_id;
    }

    fn emit(&self, message: &str) {
        tracing::debug!("Progress: {}", message);

        let listener = self.listener.read().unwrap_or_else(PoisonError::into_inner).clone();
        if let Some(listener) = listener {
            if std::panic::catch_unwind(AssertUnwindSafe(|| listener(message))).is_err() {
                tracing::warn!("Progress listener panicked on message {:?}", message);
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown error".to_string()
    }
}
