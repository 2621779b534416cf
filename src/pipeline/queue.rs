//! Shared task source with a completion barrier.
//!
//! Multi-producer / multi-consumer: any number of tasks may enqueue while
//! workers dequeue concurrently. Every dequeued item must be acknowledged with
//! [`TaskQueue::mark_done`]; [`TaskQueue::wait_until_all_done`] resolves once
//! the pending count drops to zero.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::{mpsc, Mutex as AsyncMutex, Notify};

pub struct TaskQueue<T> {
    sender: Mutex<Option<mpsc::UnboundedSender<T>>>,
    receiver: AsyncMutex<mpsc::UnboundedReceiver<T>>,
    pending: AtomicUsize,
    idle: Notify,
    cancelled: AtomicBool,
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TaskQueue<T> {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender: Mutex::new(Some(sender)),
            receiver: AsyncMutex::new(receiver),
            pending: AtomicUsize::new(0),
            idle: Notify::new(),
            cancelled: AtomicBool::new(false),
        }
    }

    /// Add a task. Hands the item back if the queue is already closed.
    pub fn enqueue(&self, item: T) -> Result<(), T> {
        let guard = match self.sender.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let Some(sender) = guard.as_ref() else {
            return Err(item);
        };

        // Count before sending so a fast worker can't drive the counter below zero.
        self.pending.fetch_add(1, Ordering::AcqRel);
        sender.send(item).map_err(|returned| {
            self.mark_done();
            returned.0
        })
    }

    /// Take the next task, waiting while the queue is empty.
    ///
    /// Returns `None` once the queue is closed and drained.
    pub async fn dequeue(&self) -> Option<T> {
        self.receiver.lock().await.recv().await
    }

    /// Acknowledge one dequeued task as finished, whether it succeeded or was skipped.
    pub fn mark_done(&self) {
        let previous = self
            .pending
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
        if previous == Ok(1) {
            self.idle.notify_waiters();
        }
    }

    /// Wait until every enqueued task has been marked done.
    pub async fn wait_until_all_done(&self) {
        loop {
            let notified = self.idle.notified();
            if self.pending.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Stop accepting tasks; workers exit once the remaining items are drained.
    pub fn close(&self) {
        let mut guard = match self.sender.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.take();
    }

    /// Close the queue and ask workers to skip whatever is still queued.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.close();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn barrier_waits_for_every_task() {
        let queue = Arc::new(TaskQueue::new());
        let done = Arc::new(AtomicUsize::new(0));

        let workers: Vec<_> = (0..3)
            .map(|_| {
                let queue = queue.clone();
                let done = done.clone();
                tokio::spawn(async move {
                    while let Some(delay) = queue.dequeue().await {
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        done.fetch_add(1, Ordering::SeqCst);
                        queue.mark_done();
                    }
                })
            })
            .collect();

        for i in 0..10u64 {
            queue.enqueue(i % 4).unwrap();
        }
        queue.wait_until_all_done().await;

        assert_eq!(done.load(Ordering::SeqCst), 10);
        assert_eq!(queue.pending(), 0);

        queue.close();
        for worker in workers {
            worker.await.unwrap();
        }
    }

    #[tokio::test]
    async fn empty_queue_is_already_done() {
        let queue: TaskQueue<u32> = TaskQueue::new();
        queue.wait_until_all_done().await;
    }

    #[tokio::test]
    async fn closed_queue_rejects_and_drains() {
        let queue = TaskQueue::new();
        queue.enqueue("a").unwrap();
        queue.close();

        assert_eq!(queue.enqueue("b"), Err("b"));
        assert_eq!(queue.dequeue().await, Some("a"));
        assert_eq!(queue.dequeue().await, None);
        queue.mark_done();
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn cancel_closes_the_queue() {
        let queue = TaskQueue::new();
        queue.cancel();
        assert!(queue.is_cancelled());
        assert_eq!(queue.enqueue(1), Err(1));
    }

    #[test]
    fn extra_mark_done_does_not_underflow() {
        let queue: TaskQueue<u8> = TaskQueue::new();
        queue.mark_done();
        assert_eq!(queue.pending(), 0);
    }
}
