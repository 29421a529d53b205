//! Circular doubly linked ring of page headers.
//!
//! Both arenas keep their pages on such a ring. The headers live inside the pages they describe,
//! so the ring never allocates. An empty ring has no head; there is no sentinel node, which keeps
//! the owning arena freely movable.
use std::{marker::PhantomData, ptr::NonNull};

/// Neighbour pointers embedded in a ring node.
pub(crate) struct Links<N> {
    next: NonNull<N>,
    prev: NonNull<N>,
}

impl<N> Links<N> {
    /// Links that are overwritten when the node is pushed onto a ring.
    pub fn unlinked() -> Self {
        Self {
            next: NonNull::dangling(),
            prev: NonNull::dangling(),
        }
    }
}

/// A type that embeds [`Links`] to itself.
///
/// # Safety
/// `links` and `links_mut` must always return the same embedded field.
pub(crate) unsafe trait RingNode: Sized {
    fn links(&self) -> &Links<Self>;
    fn links_mut(&mut self) -> &mut Links<Self>;
}

pub(crate) struct Ring<N: RingNode> {
    head: Option<NonNull<N>>,
    len: usize,
}

impl<N: RingNode> Default for Ring<N> {
    fn default() -> Self {
        Self { head: None, len: 0 }
    }
}

/// # Safety
/// `node` must point to a live node.
unsafe fn next_of<N: RingNode>(node: NonNull<N>) -> NonNull<N> {
    // SAFETY: delegated to caller
    unsafe { node.as_ref().links().next }
}

/// # Safety
/// `node` must point to a live node.
unsafe fn prev_of<N: RingNode>(node: NonNull<N>) -> NonNull<N> {
    // SAFETY: delegated to caller
    unsafe { node.as_ref().links().prev }
}

/// # Safety
/// `node` must point to a live node that is not borrowed elsewhere.
unsafe fn links_of<'a, N: RingNode>(node: NonNull<N>) -> &'a mut Links<N> {
    // SAFETY: delegated to caller
    unsafe { (*node.as_ptr()).links_mut() }
}

impl<N: RingNode> Ring<N> {
    pub fn len(&self) -> usize {
        self.len
    }

    /// The most recently pushed node that is still linked.
    pub fn tail(&self) -> Option<NonNull<N>> {
        // SAFETY: the head of a non-empty ring is live
        self.head.map(|head| unsafe { prev_of(head) })
    }

    /// Appends `node` after the current tail.
    ///
    /// # Safety
    /// `node` must point to a live node that is not linked into any ring and that stays live
    /// until it is unlinked again or the ring is drained.
    pub unsafe fn push_back(&mut self, node: NonNull<N>) {
        match self.head {
            None => {
                // SAFETY: node is live per our requirements
                let links = unsafe { links_of(node) };
                links.next = node;
                links.prev = node;
                self.head = Some(node);
            }
            Some(head) => {
                // SAFETY: all linked nodes are live, as is `node`; each links borrow ends before
                // the next one starts, so they never alias even if `tail == head`
                unsafe {
                    let tail = prev_of(head);
                    let links = links_of(node);
                    links.prev = tail;
                    links.next = head;
                    links_of(tail).next = node;
                    links_of(head).prev = node;
                }
            }
        }
        self.len += 1;
    }

    /// Removes `node` from the ring.
    ///
    /// # Safety
    /// `node` must currently be linked into this ring.
    pub unsafe fn unlink(&mut self, node: NonNull<N>) {
        debug_assert!(self.len > 0);
        if self.len == 1 {
            self.head = None;
        } else {
            // SAFETY: node and its neighbours are linked, hence live
            unsafe {
                let next = next_of(node);
                let prev = prev_of(node);
                links_of(prev).next = next;
                links_of(next).prev = prev;
                if self.head == Some(node) {
                    self.head = Some(next);
                }
            }
        }
        self.len -= 1;
    }

    /// Iterates over all linked nodes, from head to tail.
    pub fn iter(&self) -> RingIter<'_, N> {
        RingIter {
            next: self.head,
            remaining: self.len,
            _phantom: PhantomData,
        }
    }

    /// Empties the ring, returning an iterator over the nodes it contained.
    ///
    /// The iterator reads a node's successor before yielding it, so callers may release each
    /// yielded node before advancing.
    pub fn drain(&mut self) -> RingIter<'static, N> {
        let iter = RingIter {
            next: self.head,
            remaining: self.len,
            _phantom: PhantomData,
        };
        self.head = None;
        self.len = 0;
        iter
    }
}

pub(crate) struct RingIter<'a, N: RingNode> {
    next: Option<NonNull<N>>,
    remaining: usize,
    _phantom: PhantomData<&'a ()>,
}

impl<N: RingNode> Iterator for RingIter<'_, N> {
    type Item = NonNull<N>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.next?;
        self.remaining -= 1;
        if self.remaining != 0 {
            // SAFETY: the node has not been yielded yet, so it is still live
            self.next = Some(unsafe { next_of(node) });
        }
        Some(node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestNode {
        links: Links<TestNode>,
        value: u32,
    }

    // SAFETY: always the same field
    unsafe impl RingNode for TestNode {
        fn links(&self) -> &Links<Self> {
            &self.links
        }
        fn links_mut(&mut self) -> &mut Links<Self> {
            &mut self.links
        }
    }

    fn values(ring: &Ring<TestNode>) -> Vec<u32> {
        // SAFETY: all nodes are kept alive by the test's boxes
        ring.iter().map(|node| unsafe { node.as_ref().value }).collect()
    }

    #[test]
    fn push_unlink_drain() {
        let mut nodes: Vec<Box<TestNode>> = (0..5)
            .map(|value| {
                Box::new(TestNode {
                    links: Links::unlinked(),
                    value,
                })
            })
            .collect();
        let ptrs: Vec<NonNull<TestNode>> =
            nodes.iter_mut().map(|n| NonNull::from(&mut **n)).collect();

        let mut ring = Ring::default();
        assert!(ring.tail().is_none());
        for &ptr in &ptrs {
            // SAFETY: boxes outlive the ring
            unsafe { ring.push_back(ptr) };
        }
        assert_eq!(ring.len(), 5);
        assert_eq!(values(&ring), [0, 1, 2, 3, 4]);
        assert_eq!(ring.tail(), Some(ptrs[4]));

        // SAFETY: all three are linked
        unsafe {
            ring.unlink(ptrs[0]);
            ring.unlink(ptrs[2]);
            ring.unlink(ptrs[4]);
        }
        assert_eq!(values(&ring), [1, 3]);
        assert_eq!(ring.tail(), Some(ptrs[3]));

        let drained: Vec<_> = ring.drain().collect();
        assert_eq!(drained, [ptrs[1], ptrs[3]]);
        assert_eq!(ring.len(), 0);
        assert!(ring.iter().next().is_none());
    }
}
