use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// FIFO of file paths waiting to be processed.
///
/// Producers may enqueue from any thread while the worker pops from the front.
/// The lock is only held for the push/pop itself, so neither side ever waits on
/// a pipeline run.
#[derive(Debug, Default)]
pub struct JobQueue {
    items: Mutex<VecDeque<String>>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<String>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a file id to the tail. The id is not validated.
    pub fn enqueue(&self, file_id: impl Into<String>) {
        self.lock().push_back(file_id.into());
    }

    /// Remove and return the head, or `None` when empty
    pub fn try_dequeue(&self) -> Option<String> {
        self.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_fifo_order() {
        let queue = JobQueue::new();
        queue.enqueue("a.mp4");
        queue.enqueue("b.mp4".to_string());
        queue.enqueue("a.mp4");

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.try_dequeue().as_deref(), Some("a.mp4"));
        assert_eq!(queue.try_dequeue().as_deref(), Some("b.mp4"));
        assert_eq!(queue.try_dequeue().as_deref(), Some("a.mp4"));
        assert_eq!(queue.try_dequeue(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_concurrent_producers() {
        let queue = Arc::new(JobQueue::new());

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let queue = Arc::clone(&queue);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        queue.enqueue(format!("{}-{}.mp4", t, i));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(queue.len(), 400);

        // Each producer's items keep their relative order
        let mut last_seen = [None::<usize>; 4];
        while let Some(id) = queue.try_dequeue() {
            let (t, rest) = id.split_once('-').unwrap();
            let t: usize = t.parse().unwrap();
            let i: usize = rest.trim_end_matches(".mp4").parse().unwrap();
            if let Some(prev) = last_seen[t] {
                assert!(i > prev);
            }
            last_seen[t] = Some(i);
        }
    }
}
