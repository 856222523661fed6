//! The ascending doubly-linked list of [`ValueNode`]s.
//!
//! The Sorted Queue is the only structure that is walked for order-statistic
//! queries (`min`, `max`, `sum`, `mean`, `median`, `iterate`); the tree is
//! never consulted for these. It exclusively owns every `ValueNode` it links
//! — the tree only ever holds non-owning handles into it.

use crate::arena::Arena;
use crate::value_node::{ValueNode, ValueNodeHandle};

/// The ascending doubly-linked list of distinct keys.
pub(crate) struct SortedQueue<K> {
    nodes: Arena<ValueNode<K>>,
    min: Option<ValueNodeHandle<K>>,
    max: Option<ValueNodeHandle<K>>,
    len: usize,
}

/// Result of a [`SortedQueue::median`] computation.
///
/// Kept separate from a single resolved value because averaging the two
/// middle keys only makes sense for numeric domains; callers over a
/// string-keyed ASA can still match on [`Median::Pair`] and decide what to
/// do with the two candidates themselves (see [`crate::Aggregable`] for the
/// numeric convenience).
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Median<'a, K> {
    /// The multiset has an exact middle key.
    Single(&'a K),
    /// The multiset splits evenly between two adjacent keys.
    Pair(&'a K, &'a K),
}

impl<'a, K: std::fmt::Debug> std::fmt::Debug for Median<'a, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Median::Single(k) => f.debug_tuple("Single").field(k).finish(),
            Median::Pair(a, b) => f.debug_tuple("Pair").field(a).field(b).finish(),
        }
    }
}

impl<K> SortedQueue<K>
where
    K: Ord,
{
    pub fn new() -> Self {
        Self {
            nodes: Arena::new(),
            min: None,
            max: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn key(&self, handle: ValueNodeHandle<K>) -> &K {
        &self.get(handle).key
    }

    pub fn count(&self, handle: ValueNodeHandle<K>) -> usize {
        self.get(handle).count
    }

    pub fn increment(&mut self, handle: ValueNodeHandle<K>) {
        self.get_mut(handle).count += 1;
    }

    /// Decrement the occurrence count, returning the value after decrementing.
    pub fn decrement(&mut self, handle: ValueNodeHandle<K>) -> usize {
        let node = self.get_mut(handle);
        debug_assert!(node.count > 1, "decrement called on a count-1 node");
        node.count -= 1;
        node.count
    }

    pub fn min_handle(&self) -> Option<ValueNodeHandle<K>> {
        self.min
    }

    pub fn max_handle(&self) -> Option<ValueNodeHandle<K>> {
        self.max
    }

    pub fn prev(&self, handle: ValueNodeHandle<K>) -> Option<ValueNodeHandle<K>> {
        self.get(handle).prev
    }

    pub fn next(&self, handle: ValueNodeHandle<K>) -> Option<ValueNodeHandle<K>> {
        self.get(handle).next
    }

    /// Create the first Value Node in an empty queue. Panics if the queue is not empty.
    pub fn add_first(&mut self, key: K) -> ValueNodeHandle<K> {
        assert!(self.min.is_none() && self.max.is_none(), "queue not empty");

        let handle = self.nodes.insert(ValueNode {
            key,
            count: 1,
            prev: None,
            next: None,
        });
        self.min = Some(handle);
        self.max = Some(handle);
        self.len += 1;
        handle
    }

    /// Create a new Value Node for `key` and splice it adjacent to `anchor`,
    /// choosing [`Self::link_before`] if `key` sorts before the anchor's key,
    /// [`Self::link_after`] otherwise. The caller must guarantee `anchor` is a
    /// correct immediate neighbour of `key` in the final order.
    pub fn add_neighbour(&mut self, key: K, anchor: ValueNodeHandle<K>) -> ValueNodeHandle<K> {
        if key < *self.key(anchor) {
            self.link_before(key, anchor)
        } else {
            self.link_after(key, anchor)
        }
    }

    fn link_after(&mut self, key: K, anchor: ValueNodeHandle<K>) -> ValueNodeHandle<K> {
        let anchor_next = self.get(anchor).next;
        let handle = self.nodes.insert(ValueNode {
            key,
            count: 1,
            prev: Some(anchor),
            next: anchor_next,
        });

        match anchor_next {
            Some(next) => self.get_mut(next).prev = Some(handle),
            None => self.max = Some(handle),
        }
        self.get_mut(anchor).next = Some(handle);
        self.len += 1;
        handle
    }

    fn link_before(&mut self, key: K, anchor: ValueNodeHandle<K>) -> ValueNodeHandle<K> {
        let anchor_prev = self.get(anchor).prev;
        let handle = self.nodes.insert(ValueNode {
            key,
            count: 1,
            prev: anchor_prev,
            next: Some(anchor),
        });

        match anchor_prev {
            Some(prev) => self.get_mut(prev).next = Some(handle),
            None => self.min = Some(handle),
        }
        self.get_mut(anchor).prev = Some(handle);
        self.len += 1;
        handle
    }

    /// Unlink and drop a Value Node, advancing `min`/`max` if necessary.
    pub fn delete(&mut self, handle: ValueNodeHandle<K>) {
        let node = self
            .nodes
            .remove(handle)
            .expect("deleting a dangling value node handle");

        match node.prev {
            Some(prev) => self.get_mut(prev).next = node.next,
            None => self.min = node.next,
        }
        match node.next {
            Some(next) => self.get_mut(next).prev = node.prev,
            None => self.max = node.prev,
        }
        self.len -= 1;
    }

    pub fn iterate(&self) -> Iter<'_, K> {
        Iter {
            queue: self,
            front: self.min,
            back: self.max,
            done: self.is_empty(),
        }
    }

    pub fn reverse_iterate(&self) -> ReverseIter<'_, K> {
        ReverseIter(self.iterate())
    }

    /// Two-finger order-statistic walk; see [`crate::Asa::median`] for the contract.
    pub fn median(&self) -> Option<Median<'_, K>> {
        let mut left = self.min?;
        let mut right = self.max?;

        if left == right {
            return Some(Median::Single(self.key(left)));
        }

        let mut balance = self.count(left) as isize - self.count(right) as isize;

        loop {
            if left == right {
                return Some(Median::Single(self.key(left)));
            }
            if self.next(left) == Some(right) {
                return Some(match balance.cmp(&0) {
                    std::cmp::Ordering::Greater => Median::Single(self.key(left)),
                    std::cmp::Ordering::Less => Median::Single(self.key(right)),
                    std::cmp::Ordering::Equal => Median::Pair(self.key(left), self.key(right)),
                });
            }

            if balance > 0 {
                right = self.prev(right).expect("right exhausted before converging");
                balance -= self.count(right) as isize;
            } else if balance < 0 {
                left = self.next(left).expect("left exhausted before converging");
                balance += self.count(left) as isize;
            } else {
                let next_left = self.next(left).expect("left exhausted before converging");
                let prev_right = self.prev(right).expect("right exhausted before converging");
                if next_left == prev_right {
                    return Some(Median::Single(self.key(next_left)));
                }
                left = next_left;
                right = prev_right;
                balance = self.count(left) as isize - self.count(right) as isize;
            }
        }
    }

    fn get(&self, handle: ValueNodeHandle<K>) -> &ValueNode<K> {
        self.nodes.get(handle).expect("dangling value node handle")
    }

    fn get_mut(&mut self, handle: ValueNodeHandle<K>) -> &mut ValueNode<K> {
        self.nodes
            .get_mut(handle)
            .expect("dangling value node handle")
    }
}

/// Forward traversal from `min` to `max`. Finite and restartable: each call
/// to [`SortedQueue::iterate`] starts over from `min`.
pub struct Iter<'a, K> {
    queue: &'a SortedQueue<K>,
    front: Option<ValueNodeHandle<K>>,
    back: Option<ValueNodeHandle<K>>,
    done: bool,
}

impl<'a, K: Ord> Iterator for Iter<'a, K> {
    type Item = (&'a K, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let handle = self.front?;
        let node = self.queue.get(handle);

        if Some(handle) == self.back {
            self.done = true;
        } else {
            self.front = node.next;
        }
        Some((&node.key, node.count))
    }
}

/// Reverse traversal from `max` to `min`.
pub struct ReverseIter<'a, K>(Iter<'a, K>);

impl<'a, K: Ord> Iterator for ReverseIter<'a, K> {
    type Item = (&'a K, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.0.done {
            return None;
        }
        let handle = self.0.back?;
        let node = self.0.queue.get(handle);

        if Some(handle) == self.0.front {
            self.0.done = true;
        } else {
            self.0.back = node.prev;
        }
        Some((&node.key, node.count))
    }
}
