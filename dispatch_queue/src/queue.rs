use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// An unbounded thread safe FIFO queue with a blocking dequeue.
///
/// `push` never blocks. `pop` parks the calling thread until an element is
/// available; one waiter is woken per pushed element.
pub struct WorkQueue<T> {
    items: Mutex<VecDeque<T>>,
    ready: Condvar,
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> WorkQueue<T> {
    /// Returns an empty queue.
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            ready: Condvar::new(),
        }
    }

    /// Appends an element and wakes one blocked `pop`.
    pub fn push(&self, item: T) {
        let mut items = self.items.lock();
        items.push_back(item);
        drop(items);
        self.ready.notify_one();
    }

    /// Removes and returns the front element, blocking while the queue is
    /// empty.
    pub fn pop(&self) -> T {
        let mut items = self.items.lock();
        loop {
            if let Some(item) = items.pop_front() {
                return item;
            }
            self.ready.wait(&mut items);
        }
    }

    /// Like `pop`, but gives up after `timeout` and returns `None` if no
    /// element arrived in time.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut items = self.items.lock();
        loop {
            if let Some(item) = items.pop_front() {
                return Some(item);
            }
            if self.ready.wait_until(&mut items, deadline).timed_out() {
                return items.pop_front();
            }
        }
    }

    /// The number of queued elements.
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Returns `true` when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_push_pop_is_fifo() {
        let queue = WorkQueue::new();
        queue.push(1);
        queue.push(2);
        queue.push(3);
        assert_eq!(3, queue.len());
        assert_eq!(1, queue.pop());
        assert_eq!(2, queue.pop());
        assert_eq!(3, queue.pop());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_pop_blocks_until_an_element_arrives() {
        let queue = Arc::new(WorkQueue::new());
        let consumer_queue = Arc::clone(&queue);
        let consumer = thread::spawn(move || consumer_queue.pop());
        thread::sleep(Duration::from_millis(20));
        queue.push(42);
        assert_eq!(42, consumer.join().unwrap());
    }

    #[test]
    fn test_pop_timeout_on_an_empty_queue() {
        let queue: WorkQueue<u32> = WorkQueue::new();
        assert_eq!(None, queue.pop_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn test_pop_timeout_returns_an_element_pushed_in_time() {
        let queue = Arc::new(WorkQueue::new());
        let producer_queue = Arc::clone(&queue);
        let producer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            producer_queue.push(7);
        });
        assert_eq!(Some(7), queue.pop_timeout(Duration::from_millis(500)));
        producer.join().unwrap();
    }

    #[test]
    fn test_concurrent_producers_deliver_everything() {
        let queue = Arc::new(WorkQueue::new());
        let per_producer = 1_000u32;
        let mut producers = Vec::new();
        for id in 0u32..4 {
            let queue = Arc::clone(&queue);
            producers.push(thread::spawn(move || {
                for i in 0..per_producer {
                    queue.push(id * per_producer + i);
                }
            }));
        }
        for producer in producers {
            producer.join().unwrap();
        }
        let mut drained = Vec::new();
        while let Some(item) = queue.pop_timeout(Duration::from_millis(10)) {
            drained.push(item);
        }
        assert_eq!(4 * per_producer as usize, drained.len());
    }
}
