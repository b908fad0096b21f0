use rand::Rng;

/// Fixed-capacity ring buffer for storing training transitions.
///
/// Once full, each insert overwrites the slot at the write cursor, so the
/// contents are an unordered bag and must be sampled as such.
pub struct ReplayBuffer<T> {
    items: Vec<T>,
    capacity: usize,
    index: usize,
}

impl<T> ReplayBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "replay buffer capacity must be > 0");
        ReplayBuffer {
            items: Vec::with_capacity(capacity),
            capacity,
            index: 0,
        }
    }

    /// Add an item. When the buffer is full the item replaces the slot at the
    /// write cursor and the evicted item is returned to the caller.
    pub fn append(&mut self, item: T) -> Option<T> {
        if self.items.len() < self.capacity {
            self.items.push(item);
            return None;
        }
        let evicted = std::mem::replace(&mut self.items[self.index], item);
        self.index = (self.index + 1) % self.items.len();
        Some(evicted)
    }

    /// Lazily draw `n` items uniformly at random, with replacement. Each call
    /// yields a fresh sequence.
    ///
    /// # Panics
    ///
    /// If the buffer is empty.
    pub fn sample<'a, R: Rng + ?Sized>(
        &'a self,
        n: usize,
        rng: &'a mut R,
    ) -> impl Iterator<Item = &'a T> + 'a {
        assert!(
            !self.items.is_empty(),
            "cannot sample from an empty replay buffer"
        );
        (0..n).map(move |_| &self.items[rng.random_range(0..self.items.len())])
    }

    /// Stored items in slot order (not insertion order once wrapped).
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Counts drops so eviction can be checked for exactly-once release.
    struct Tracked {
        id: usize,
        drops: Rc<Cell<usize>>,
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
        }
    }

    #[test]
    fn test_append_and_len() {
        let mut buf = ReplayBuffer::new(10);
        assert!(buf.is_empty());

        assert!(buf.append(1).is_none());
        assert_eq!(buf.len(), 1);

        for i in 0..9 {
            buf.append(i);
        }
        assert_eq!(buf.len(), 10);
        assert_eq!(buf.capacity(), 10);
    }

    #[test]
    fn test_ring_buffer_overwrites_oldest_first() {
        let mut buf = ReplayBuffer::new(3);
        for i in 0..3 {
            buf.append(i);
        }
        assert_eq!(buf.append(3), Some(0));
        assert_eq!(buf.append(4), Some(1));
        assert_eq!(buf.append(5), Some(2));
        assert_eq!(buf.append(6), Some(3));
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut buf = ReplayBuffer::new(5);
        for i in 0..12 {
            buf.append(i);
            assert!(buf.len() <= 5);
        }
        assert_eq!(buf.len(), 5);
    }

    #[test]
    fn test_evicted_items_released_exactly_once() {
        let drops = Rc::new(Cell::new(0));
        let max_size = 4;
        let extra = 3;
        let mut buf = ReplayBuffer::new(max_size);

        for id in 0..max_size + extra {
            let evicted = buf.append(Tracked {
                id,
                drops: drops.clone(),
            });
            if let Some(old) = evicted {
                assert_eq!(old.id, id - max_size);
            }
        }

        assert_eq!(buf.len(), max_size);
        assert_eq!(drops.get(), extra);

        drop(buf);
        assert_eq!(drops.get(), max_size + extra);
    }

    #[test]
    fn test_sample_with_replacement() {
        let mut buf = ReplayBuffer::new(100);
        buf.append(7);
        let mut rng = StdRng::seed_from_u64(0);
        let batch: Vec<&i32> = buf.sample(10, &mut rng).collect();
        assert_eq!(batch.len(), 10);
        assert!(batch.iter().all(|&&v| v == 7));
    }

    #[test]
    fn test_sample_draws_from_contents() {
        let mut buf = ReplayBuffer::new(50);
        for i in 0..50 {
            buf.append(i);
        }
        let mut rng = StdRng::seed_from_u64(1);
        let first: Vec<i32> = buf.sample(20, &mut rng).copied().collect();
        let second: Vec<i32> = buf.sample(20, &mut rng).copied().collect();
        assert_eq!(first.len(), 20);
        assert_eq!(second.len(), 20);
        assert!(first.iter().chain(second.iter()).all(|v| (0..50).contains(v)));
    }

    #[test]
    #[should_panic(expected = "empty replay buffer")]
    fn test_sample_empty_panics() {
        let buf: ReplayBuffer<i32> = ReplayBuffer::new(10);
        let mut rng = StdRng::seed_from_u64(0);
        let _ = buf.sample(5, &mut rng).count();
    }
}
