//! A balanced ordered set with stable handles.
//!
//! [`OrderedSet`] is an AVL tree whose nodes live in an arena of slots.
//! Every entry is additionally threaded into a doubly linked list in
//! comparator order, so stepping to the next or previous entry is O(1)
//! while insertion, search and removal stay O(log n).
//!
//! The ordering is injected as a comparator closure. Two sets can index the
//! same logical objects under different orderings: the archive keeps the
//! nodes themselves in one set and plain [`Handle`]s into that set in a
//! second one, so only the first set ever drops a node.
//!
//! ```
//! use biobj_logger::ordered_set::OrderedSet;
//!
//! let mut set = OrderedSet::new(|a: &i32, b: &i32| a.cmp(b));
//! for v in [5, 1, 4, 2] {
//!     set.insert(v);
//! }
//! let h = set.search_right(&3).unwrap();
//! assert_eq!(set.get(h), Some(&4));
//! assert_eq!(set.prev(h).and_then(|p| set.get(p)), Some(&2));
//! assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![1, 2, 4, 5]);
//! ```

use core::cmp::Ordering;

/// Stable identifier of an entry in an [`OrderedSet`].
///
/// A handle stays valid until its entry is removed. Afterwards it resolves
/// to nothing, even when the underlying slot is reused by a later insert.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle {
    index: usize,
    generation: u32,
}

struct Node<T> {
    item: T,
    parent: Option<usize>,
    left: Option<usize>,
    right: Option<usize>,
    prev: Option<usize>,
    next: Option<usize>,
    height: u32,
}

struct Slot<T> {
    generation: u32,
    node: Option<Node<T>>,
}

/// An ordered collection backed by an AVL tree.
///
/// `C` decides the order. Entries comparing equal are all kept, the later
/// insert placed after the earlier ones.
pub struct OrderedSet<T, C> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    root: Option<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
    cmp: C,
}

impl<T, C> OrderedSet<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    /// Creates an empty set ordered by `cmp`.
    #[must_use]
    pub fn new(cmp: C) -> Self {
        Self::with_capacity(0, cmp)
    }

    /// Creates an empty set with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize, cmp: C) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            root: None,
            head: None,
            tail: None,
            len: 0,
            cmp,
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the set holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts `item` and returns its handle.
    pub fn insert(&mut self, item: T) -> Handle {
        let mut parent = None;
        let mut go_left = false;
        let mut cur = self.root;
        while let Some(i) = cur {
            parent = Some(i);
            let node = self.node(i);
            go_left = (self.cmp)(&item, &node.item) == Ordering::Less;
            cur = if go_left { node.left } else { node.right };
        }

        // A fresh leaf sits right before its parent when it hangs on the
        // left and right after it otherwise.
        let (prev, next) = match parent {
            None => (None, None),
            Some(p) if go_left => (self.node(p).prev, Some(p)),
            Some(p) => (Some(p), self.node(p).next),
        };

        let index = self.allocate(Node {
            item,
            parent,
            left: None,
            right: None,
            prev,
            next,
            height: 1,
        });

        match parent {
            None => self.root = Some(index),
            Some(p) if go_left => self.node_mut(p).left = Some(index),
            Some(p) => self.node_mut(p).right = Some(index),
        }
        match prev {
            Some(p) => self.node_mut(p).next = Some(index),
            None => self.head = Some(index),
        }
        match next {
            Some(n) => self.node_mut(n).prev = Some(index),
            None => self.tail = Some(index),
        }

        self.len += 1;
        self.rebalance(parent);
        self.handle(index)
    }

    /// Removes the entry behind `handle` and returns its item.
    ///
    /// Returns `None` if the handle is stale.
    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        if !self.contains(handle) {
            return None;
        }
        let i = handle.index;

        let (prev, next) = {
            let node = self.node(i);
            (node.prev, node.next)
        };
        match prev {
            Some(p) => self.node_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.node_mut(n).prev = prev,
            None => self.tail = prev,
        }

        let start = self.detach(i);
        self.rebalance(start);
        self.len -= 1;

        let slot = &mut self.slots[i];
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(i);
        slot.node.take().map(|node| node.item)
    }

    /// Removes every entry, dropping the items.
    ///
    /// All handles issued so far become stale.
    pub fn purge(&mut self) {
        self.free.clear();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free.push(i);
        }
        self.root = None;
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Returns the first entry not less than `probe`.
    pub fn search_right(&self, probe: &T) -> Option<Handle> {
        self.search_right_by(|item| (self.cmp)(item, probe))
    }

    /// Returns the first entry for which `f` does not return `Less`.
    ///
    /// `f` reports how an entry compares to the sought key and must be
    /// consistent with the set order.
    pub fn search_right_by(&self, mut f: impl FnMut(&T) -> Ordering) -> Option<Handle> {
        let mut best = None;
        let mut cur = self.root;
        while let Some(i) = cur {
            let node = self.node(i);
            if f(&node.item) == Ordering::Less {
                cur = node.right;
            } else {
                best = Some(i);
                cur = node.left;
            }
        }
        best.map(|i| self.handle(i))
    }

    /// Returns the first entry for which `f` returns `Equal`.
    pub fn find_by(&self, mut f: impl FnMut(&T) -> Ordering) -> Option<Handle> {
        let handle = self.search_right_by(&mut f)?;
        let item = self.get(handle)?;
        (f(item) == Ordering::Equal).then_some(handle)
    }

    /// Returns `true` if `handle` refers to a live entry.
    #[must_use]
    pub fn contains(&self, handle: Handle) -> bool {
        self.slots
            .get(handle.index)
            .is_some_and(|slot| slot.generation == handle.generation && slot.node.is_some())
    }

    /// Returns the item behind `handle`.
    #[must_use]
    pub fn get(&self, handle: Handle) -> Option<&T> {
        if !self.contains(handle) {
            return None;
        }
        self.slots[handle.index].node.as_ref().map(|node| &node.item)
    }

    /// Returns the item behind `handle` mutably.
    ///
    /// The caller must not change the fields the comparator looks at.
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        if !self.contains(handle) {
            return None;
        }
        self.slots[handle.index].node.as_mut().map(|node| &mut node.item)
    }

    /// Returns the smallest entry.
    #[must_use]
    pub fn first(&self) -> Option<Handle> {
        self.head.map(|i| self.handle(i))
    }

    /// Returns the largest entry.
    #[must_use]
    pub fn last(&self) -> Option<Handle> {
        self.tail.map(|i| self.handle(i))
    }

    /// Returns the entry following `handle` in set order.
    #[must_use]
    pub fn next(&self, handle: Handle) -> Option<Handle> {
        if !self.contains(handle) {
            return None;
        }
        self.node(handle.index).next.map(|i| self.handle(i))
    }

    /// Returns the entry preceding `handle` in set order.
    #[must_use]
    pub fn prev(&self, handle: Handle) -> Option<Handle> {
        if !self.contains(handle) {
            return None;
        }
        self.node(handle.index).prev.map(|i| self.handle(i))
    }

    /// Iterates over the items in set order.
    pub fn iter(&self) -> Iter<'_, T, C> {
        Iter {
            set: self,
            cur: self.head,
            remaining: self.len,
        }
    }

    /// Iterates over the handles in set order.
    pub fn handles(&self) -> impl Iterator<Item = Handle> + '_ {
        core::iter::successors(self.first(), |&h| self.next(h))
    }

    fn handle(&self, index: usize) -> Handle {
        Handle {
            index,
            generation: self.slots[index].generation,
        }
    }

    fn allocate(&mut self, node: Node<T>) -> usize {
        if let Some(i) = self.free.pop() {
            self.slots[i].node = Some(node);
            i
        } else {
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            self.slots.len() - 1
        }
    }

    fn node(&self, i: usize) -> &Node<T> {
        match &self.slots[i].node {
            Some(node) => node,
            None => unreachable!("ordered set link points to a vacant slot"),
        }
    }

    fn node_mut(&mut self, i: usize) -> &mut Node<T> {
        match &mut self.slots[i].node {
            Some(node) => node,
            None => unreachable!("ordered set link points to a vacant slot"),
        }
    }

    /// Unhooks node `i` from the tree (not from the thread list) and returns
    /// the lowest node whose subtree changed.
    fn detach(&mut self, i: usize) -> Option<usize> {
        let (parent, left, right) = {
            let node = self.node(i);
            (node.parent, node.left, node.right)
        };

        match (left, right) {
            (None, child) | (child, None) => {
                if let Some(c) = child {
                    self.node_mut(c).parent = parent;
                }
                self.replace_child(parent, i, child);
                parent
            }
            (Some(l), Some(r)) => {
                // The in-order successor takes the place of `i`.
                let mut succ_parent = i;
                let mut succ = r;
                while let Some(sl) = self.node(succ).left {
                    succ_parent = succ;
                    succ = sl;
                }

                let start = if succ_parent == i {
                    succ
                } else {
                    let succ_right = self.node(succ).right;
                    self.node_mut(succ_parent).left = succ_right;
                    if let Some(sr) = succ_right {
                        self.node_mut(sr).parent = Some(succ_parent);
                    }
                    self.node_mut(succ).right = Some(r);
                    self.node_mut(r).parent = Some(succ);
                    succ_parent
                };

                self.node_mut(succ).left = Some(l);
                self.node_mut(l).parent = Some(succ);
                self.node_mut(succ).parent = parent;
                self.replace_child(parent, i, Some(succ));
                Some(start)
            }
        }
    }

    fn replace_child(&mut self, parent: Option<usize>, old: usize, new: Option<usize>) {
        match parent {
            None => self.root = new,
            Some(p) => {
                let node = self.node_mut(p);
                if node.left == Some(old) {
                    node.left = new;
                } else {
                    node.right = new;
                }
            }
        }
    }

    fn height(&self, i: Option<usize>) -> u32 {
        i.map_or(0, |i| self.node(i).height)
    }

    fn balance(&self, i: usize) -> i64 {
        let node = self.node(i);
        i64::from(self.height(node.left)) - i64::from(self.height(node.right))
    }

    fn update_height(&mut self, i: usize) {
        let node = self.node(i);
        let height = 1 + self.height(node.left).max(self.height(node.right));
        self.node_mut(i).height = height;
    }

    fn rotate_left(&mut self, x: usize) -> usize {
        let Some(y) = self.node(x).right else {
            return x;
        };
        let inner = self.node(y).left;
        let parent = self.node(x).parent;

        self.node_mut(x).right = inner;
        if let Some(t) = inner {
            self.node_mut(t).parent = Some(x);
        }
        self.node_mut(y).left = Some(x);
        self.node_mut(x).parent = Some(y);
        self.node_mut(y).parent = parent;
        self.replace_child(parent, x, Some(y));

        self.update_height(x);
        self.update_height(y);
        y
    }

    fn rotate_right(&mut self, x: usize) -> usize {
        let Some(y) = self.node(x).left else {
            return x;
        };
        let inner = self.node(y).right;
        let parent = self.node(x).parent;

        self.node_mut(x).left = inner;
        if let Some(t) = inner {
            self.node_mut(t).parent = Some(x);
        }
        self.node_mut(y).right = Some(x);
        self.node_mut(x).parent = Some(y);
        self.node_mut(y).parent = parent;
        self.replace_child(parent, x, Some(y));

        self.update_height(x);
        self.update_height(y);
        y
    }

    /// Walks from `cur` up to the root restoring heights and AVL balance.
    fn rebalance(&mut self, mut cur: Option<usize>) {
        while let Some(i) = cur {
            self.update_height(i);
            let balance = self.balance(i);
            let top = if balance > 1 {
                if let Some(l) = self.node(i).left {
                    if self.balance(l) < 0 {
                        self.rotate_left(l);
                    }
                }
                self.rotate_right(i)
            } else if balance < -1 {
                if let Some(r) = self.node(i).right {
                    if self.balance(r) > 0 {
                        self.rotate_right(r);
                    }
                }
                self.rotate_left(i)
            } else {
                i
            };
            cur = self.node(top).parent;
        }
    }

    /// Checks tree shape, balance, parent links and the thread list.
    #[cfg(test)]
    pub(crate) fn assert_valid(&self) {
        fn walk<T, C: Fn(&T, &T) -> Ordering>(
            set: &OrderedSet<T, C>,
            i: Option<usize>,
            parent: Option<usize>,
            order: &mut Vec<usize>,
        ) -> u32 {
            let Some(i) = i else { return 0 };
            let node = set.node(i);
            assert_eq!(node.parent, parent, "broken parent link");
            let hl = walk(set, node.left, Some(i), order);
            order.push(i);
            let hr = walk(set, node.right, Some(i), order);
            assert!(hl.abs_diff(hr) <= 1, "AVL balance violated");
            assert_eq!(node.height, 1 + hl.max(hr), "stale height");
            node.height
        }

        let mut in_order = Vec::new();
        walk(self, self.root, None, &mut in_order);
        assert_eq!(in_order.len(), self.len);

        let threaded: Vec<usize> = self.handles().map(|h| h.index).collect();
        assert_eq!(in_order, threaded, "thread list disagrees with tree order");

        let backwards: Vec<usize> =
            core::iter::successors(self.last(), |&h| self.prev(h)).map(|h| h.index).collect();
        assert_eq!(backwards.into_iter().rev().collect::<Vec<_>>(), threaded);

        for pair in in_order.windows(2) {
            let ord = (self.cmp)(&self.node(pair[0]).item, &self.node(pair[1]).item);
            assert_ne!(ord, Ordering::Greater, "entries out of order");
        }
    }
}

/// Iterator over the items of an [`OrderedSet`] in set order.
pub struct Iter<'a, T, C> {
    set: &'a OrderedSet<T, C>,
    cur: Option<usize>,
    remaining: usize,
}

impl<'a, T, C> Iterator for Iter<'a, T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let i = self.cur?;
        let node = self.set.node(i);
        self.cur = node.next;
        self.remaining -= 1;
        Some(&node.item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, C> ExactSizeIterator for Iter<'_, T, C> where C: Fn(&T, &T) -> Ordering {}

impl<'a, T, C> IntoIterator for &'a OrderedSet<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_set() -> OrderedSet<i64, fn(&i64, &i64) -> Ordering> {
        OrderedSet::new(|a, b| a.cmp(b))
    }

    #[test]
    fn test_insert_keeps_sorted_order() {
        let mut rng = fastrand::Rng::with_seed(7);
        let mut set = int_set();
        let mut reference = Vec::new();
        for _ in 0..500 {
            let v = rng.i64(-1000..1000);
            set.insert(v);
            reference.push(v);
        }
        set.assert_valid();
        reference.sort_unstable();
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), reference);
        assert_eq!(set.len(), 500);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut set = OrderedSet::new(|a: &(u32, u32), b: &(u32, u32)| a.0.cmp(&b.0));
        for (seq, key) in [3, 1, 3, 2, 3, 1].into_iter().enumerate() {
            set.insert((key, u32::try_from(seq).unwrap()));
        }
        set.assert_valid();
        let items: Vec<_> = set.iter().copied().collect();
        assert_eq!(items, vec![(1, 1), (1, 5), (2, 3), (3, 0), (3, 2), (3, 4)]);
    }

    #[test]
    fn test_random_removals_stay_balanced() {
        let mut rng = fastrand::Rng::with_seed(11);
        let mut set = int_set();
        let mut live: Vec<(Handle, i64)> = (0..400)
            .map(|_| {
                let v = rng.i64(0..10_000);
                (set.insert(v), v)
            })
            .collect();

        while !live.is_empty() {
            let k = rng.usize(..live.len());
            let (h, v) = live.swap_remove(k);
            assert_eq!(set.remove(h), Some(v));
            if live.len() % 37 == 0 {
                set.assert_valid();
            }
            if rng.bool() {
                let v = rng.i64(0..10_000);
                live.push((set.insert(v), v));
            }
        }
        set.assert_valid();
        assert!(set.is_empty());
        assert!(set.first().is_none());
        assert!(set.last().is_none());
    }

    #[test]
    fn test_search_right() {
        let mut set = int_set();
        for v in [10, 20, 30, 40] {
            set.insert(v);
        }
        let at = |probe: i64| set.search_right(&probe).and_then(|h| set.get(h)).copied();
        assert_eq!(at(5), Some(10));
        assert_eq!(at(10), Some(10));
        assert_eq!(at(11), Some(20));
        assert_eq!(at(40), Some(40));
        assert_eq!(at(41), None);
    }

    #[test]
    fn test_find_by_requires_equality() {
        let mut set = int_set();
        for v in [1, 3, 5] {
            set.insert(v);
        }
        assert!(set.find_by(|v| v.cmp(&3)).is_some());
        assert!(set.find_by(|v| v.cmp(&4)).is_none());
        assert!(set.find_by(|v| v.cmp(&6)).is_none());
    }

    #[test]
    fn test_neighbors() {
        let mut set = int_set();
        let handles: Vec<Handle> = [2, 4, 6].into_iter().map(|v| set.insert(v)).collect();
        assert_eq!(set.prev(handles[0]), None);
        assert_eq!(set.next(handles[0]), Some(handles[1]));
        assert_eq!(set.prev(handles[2]), Some(handles[1]));
        assert_eq!(set.next(handles[2]), None);

        set.remove(handles[1]);
        assert_eq!(set.next(handles[0]), Some(handles[2]));
        assert_eq!(set.prev(handles[2]), Some(handles[0]));
    }

    #[test]
    fn test_stale_handle_does_not_alias_reused_slot() {
        let mut set = int_set();
        let h = set.insert(1);
        assert_eq!(set.remove(h), Some(1));
        let h2 = set.insert(2);
        assert_eq!(h.index, h2.index, "slot should be reused");
        assert!(!set.contains(h));
        assert_eq!(set.get(h), None);
        assert_eq!(set.remove(h), None);
        assert_eq!(set.get(h2), Some(&2));
    }

    #[test]
    fn test_purge_invalidates_handles() {
        let mut set = int_set();
        let handles: Vec<Handle> = (0..10).map(|v| set.insert(v)).collect();
        set.purge();
        assert!(set.is_empty());
        assert_eq!(set.iter().count(), 0);
        assert!(handles.iter().all(|&h| !set.contains(h)));

        set.insert(42);
        set.assert_valid();
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![42]);
    }

    #[test]
    fn test_get_mut_updates_payload() {
        let mut set = OrderedSet::new(|a: &(i32, f64), b: &(i32, f64)| a.0.cmp(&b.0));
        let h = set.insert((1, 0.0));
        if let Some(entry) = set.get_mut(h) {
            entry.1 = 2.5;
        }
        assert_eq!(set.get(h), Some(&(1, 2.5)));
    }
}
