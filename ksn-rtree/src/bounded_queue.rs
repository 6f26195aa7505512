//! Fixed-capacity priority queue used by nearest-neighbour queries.

use std::cmp::Ordering;

/// A priority queue that keeps only the `max_size` best items seen so far.
///
/// "Best" means smallest under the comparator. Internally the items form a
/// binary max-heap, so the current worst item sits at the root and can be
/// evicted in `O(log n)` when a better one arrives.
///
/// # Examples
///
/// ```rust
/// use ksn_rtree::BoundedPriorityQueue;
///
/// let mut queue = BoundedPriorityQueue::new(2, |a: &i32, b: &i32| a.cmp(b));
/// for item in [5, 1, 4, 2] {
///     queue.add(item);
/// }
/// assert_eq!(queue.into_ordered_vec(), vec![1, 2]);
/// ```
pub struct BoundedPriorityQueue<T, C> {
    max_size: usize,
    comparator: C,
    heap: Vec<T>,
}

impl<T, C> BoundedPriorityQueue<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    pub fn new(max_size: usize, comparator: C) -> Self {
        BoundedPriorityQueue {
            max_size,
            comparator,
            heap: Vec::new(),
        }
    }

    /// Offers an item to the queue.
    ///
    /// The item is kept while the queue has room. Once it is full the item
    /// replaces the current worst only if it is strictly better.
    pub fn add(&mut self, item: T) {
        if self.heap.len() < self.max_size {
            self.heap.push(item);
            self.sift_up(self.heap.len() - 1);
        } else if let Some(worst) = self.heap.first() {
            if (self.comparator)(&item, worst) == Ordering::Less {
                self.heap[0] = item;
                self.sift_down(0);
            }
        }
    }

    /// The worst item currently kept.
    pub fn peek_worst(&self) -> Option<&T> {
        self.heap.first()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Consumes the queue, returning the kept items sorted from best to worst.
    pub fn into_ordered_vec(self) -> Vec<T> {
        let BoundedPriorityQueue {
            comparator,
            mut heap,
            ..
        } = self;
        heap.sort_by(|a, b| comparator(a, b));
        heap
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if (self.comparator)(&self.heap[index], &self.heap[parent]) != Ordering::Greater {
                break;
            }
            self.heap.swap(index, parent);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut largest = index;
            if left < len
                && (self.comparator)(&self.heap[left], &self.heap[largest]) == Ordering::Greater
            {
                largest = left;
            }
            if right < len
                && (self.comparator)(&self.heap[right], &self.heap[largest]) == Ordering::Greater
            {
                largest = right;
            }
            if largest == index {
                break;
            }
            self.heap.swap(index, largest);
            index = largest;
        }
    }
}
