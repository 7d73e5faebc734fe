use std::collections::VecDeque;

use parking_lot::Mutex;

/// Bounded queue of raw sample buffers between the capture callback and
/// the classification consumer.
///
/// `push` never blocks: when the queue is full, the oldest buffer is
/// evicted so the consumer always sees the most recent audio. Delivery is
/// best-effort; real-time freshness matters more than completeness.
///
/// Wrap in `Arc` to share between the capture context and the consumer.
pub struct SampleFeed {
    inner: Mutex<FeedInner>,
    capacity: usize,
}

struct FeedInner {
    buffers: VecDeque<Vec<f32>>,
    dropped: u64,
}

impl SampleFeed {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "feed capacity must be at least one buffer");
        Self {
            inner: Mutex::new(FeedInner {
                buffers: VecDeque::with_capacity(capacity),
                dropped: 0,
            }),
            capacity,
        }
    }

    /// Enqueue one buffer, evicting the oldest if the queue is full.
    pub fn push(&self, samples: Vec<f32>) {
        let mut inner = self.inner.lock();
        if inner.buffers.len() == self.capacity {
            inner.buffers.pop_front();
            inner.dropped += 1;
        }
        inner.buffers.push_back(samples);
    }

    /// Dequeue the oldest buffer, if any.
    pub fn pop(&self) -> Option<Vec<f32>> {
        self.inner.lock().buffers.pop_front()
    }

    /// Dequeue all buffered data in delivery order.
    pub fn drain(&self) -> Vec<Vec<f32>> {
        self.inner.lock().buffers.drain(..).collect()
    }

    /// Number of buffers currently queued.
    pub fn len(&self) -> usize {
        self.inner.lock().buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().buffers.is_empty()
    }

    /// Total number of buffers evicted due to overflow.
    pub fn dropped(&self) -> u64 {
        self.inner.lock().dropped
    }

    /// Discard all queued buffers. The drop counter is preserved.
    pub fn clear(&self) {
        self.inner.lock().buffers.clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_fifo() {
        let feed = SampleFeed::new(4);
        feed.push(vec![1.0]);
        feed.push(vec![2.0]);

        assert_eq!(feed.len(), 2);
        assert_eq!(feed.pop(), Some(vec![1.0]));
        assert_eq!(feed.pop(), Some(vec![2.0]));
        assert_eq!(feed.pop(), None);
    }

    #[test]
    fn overflow_drops_oldest() {
        let feed = SampleFeed::new(3);
        for i in 0..5 {
            feed.push(vec![i as f32]);
        }

        // 0 and 1 were evicted; 2, 3, 4 survive in order.
        assert_eq!(feed.len(), 3);
        assert_eq!(feed.dropped(), 2);
        assert_eq!(feed.drain(), vec![vec![2.0], vec![3.0], vec![4.0]]);
    }

    #[test]
    fn drain_empties_queue() {
        let feed = SampleFeed::new(8);
        feed.push(vec![0.5, 0.5]);
        feed.push(vec![0.25]);

        let drained = feed.drain();
        assert_eq!(drained.len(), 2);
        assert!(feed.is_empty());
        assert_eq!(feed.dropped(), 0);
    }

    #[test]
    fn clear_preserves_drop_counter() {
        let feed = SampleFeed::new(1);
        feed.push(vec![1.0]);
        feed.push(vec![2.0]); // evicts the first
        feed.clear();

        assert!(feed.is_empty());
        assert_eq!(feed.dropped(), 1);
    }

    #[test]
    #[should_panic(expected = "feed capacity")]
    fn zero_capacity_panics() {
        SampleFeed::new(0);
    }
}
