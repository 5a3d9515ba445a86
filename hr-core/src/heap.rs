//! Array-backed binary heap over an injected total order.
//!
//! Unlike [`std::collections::BinaryHeap`], this heap exposes positions: callers can overwrite
//! the value in a given slot and have the heap property restored from there. To find the slot of
//! a particular element without scanning, build the heap with a [`SlotTable`]; the heap then
//! records every move of every element keyed by [`HeapKey::heap_key`].

use std::fmt;

use crate::errors::{
    Error,
    Result,
};

/// Order injected into a [`BinHeap`].
///
/// `precedes(a, b)` plays the role of `a <= b` in a min-heap: it holds when `a` may sit above `b`.
/// Equal elements must precede each other.
pub trait TotalOrder<T> {
    /// Whether `a` may be an ancestor of `b`.
    fn precedes(&self, a: &T, b: &T) -> bool;
}

impl<T, F> TotalOrder<T> for F
where
    F: Fn(&T, &T) -> bool,
{
    fn precedes(&self, a: &T, b: &T) -> bool {
        self(a, b)
    }
}

/// Smallest element at the root.
#[derive(Clone, Copy, Debug, Default)]
pub struct MinOrder;

impl<T: PartialOrd> TotalOrder<T> for MinOrder {
    fn precedes(&self, a: &T, b: &T) -> bool {
        a <= b
    }
}

/// Largest element at the root.
#[derive(Clone, Copy, Debug, Default)]
pub struct MaxOrder;

impl<T: PartialOrd> TotalOrder<T> for MaxOrder {
    fn precedes(&self, a: &T, b: &T) -> bool {
        a >= b
    }
}

/// Elements with a small, stable integer identity that a [`SlotTable`] can index.
pub trait HeapKey {
    /// Identity of this element. Two elements alive in the same heap must not share a key.
    fn heap_key(&self) -> usize;
}

/// Observer told about every slot change the heap makes.
pub trait SlotTracker<T> {
    /// `item` now lives at `slot`.
    fn placed(&mut self, item: &T, slot: usize);
    /// `item` has left the heap.
    fn evicted(&mut self, item: &T);
}

/// Tracker that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct Untracked;

impl<T> SlotTracker<T> for Untracked {
    fn placed(&mut self, _item: &T, _slot: usize) {}

    fn evicted(&mut self, _item: &T) {}
}

/// Side table from element key to current slot.
///
/// This is a lookup accelerator owned by the heap, never a second owner of the elements.
#[derive(Clone, Debug, Default)]
pub struct SlotTable {
    /// `slots[key]` is the slot of the element with that key, if it is in the heap.
    slots: Vec<Option<usize>>,
}

impl SlotTable {
    /// Slot currently holding the element with `key`.
    #[must_use]
    pub fn get(&self, key: usize) -> Option<usize> {
        self.slots.get(key).copied().flatten()
    }
}

impl<T: HeapKey> SlotTracker<T> for SlotTable {
    fn placed(&mut self, item: &T, slot: usize) {
        let key = item.heap_key();
        if key >= self.slots.len() {
            self.slots.resize(key + 1, None);
        }
        self.slots[key] = Some(slot);
    }

    fn evicted(&mut self, item: &T) {
        if let Some(slot) = self.slots.get_mut(item.heap_key()) {
            *slot = None;
        }
    }
}

/// Parent slot, `None` for the root.
#[must_use]
pub const fn parent(node: usize) -> Option<usize> {
    if node == 0 {
        None
    } else {
        Some((node - 1) / 2)
    }
}

/// Left child slot (may be past the end).
#[must_use]
pub const fn left(node: usize) -> usize {
    2 * node + 1
}

/// Right child slot (may be past the end).
#[must_use]
pub const fn right(node: usize) -> usize {
    2 * node + 2
}

/// Binary heap with an injected order `O` and slot tracker `S`.
///
/// Invariant: for every occupied slot `i > 0`, `order.precedes(items[parent(i)], items[i])`.
#[derive(Clone, Debug)]
pub struct BinHeap<T, O, S = Untracked> {
    /// Occupied slots, root first.
    items: Vec<T>,
    /// Upper bound on `items.len()`; `insert` fails beyond it.
    capacity: usize,
    /// The injected order.
    order: O,
    /// Receives every slot change.
    slots: S,
}

impl<T, O: TotalOrder<T>> BinHeap<T, O> {
    /// Heapify `items` in O(n). The capacity is fixed at `items.len()`.
    pub fn new(items: Vec<T>, order: O) -> Self {
        let capacity = items.len();
        Self::build(items, capacity, order, Untracked)
    }

    /// Empty heap that accepts up to `capacity` inserts.
    pub fn with_capacity(capacity: usize, order: O) -> Self {
        Self::build(Vec::with_capacity(capacity), capacity, order, Untracked)
    }
}

impl<T: HeapKey, O: TotalOrder<T>> BinHeap<T, O, SlotTable> {
    /// Like [`BinHeap::new`], additionally tracking the slot of every element.
    pub fn tracked(items: Vec<T>, order: O) -> Self {
        let capacity = items.len();
        Self::build(items, capacity, order, SlotTable::default())
    }

    /// Like [`BinHeap::with_capacity`], additionally tracking the slot of every element.
    pub fn tracked_with_capacity(capacity: usize, order: O) -> Self {
        Self::build(Vec::with_capacity(capacity), capacity, order, SlotTable::default())
    }

    /// Slot of the element whose [`HeapKey::heap_key`] is `key`, if it is still in the heap.
    #[must_use]
    pub fn position_of(&self, key: usize) -> Option<usize> {
        self.slots.get(key)
    }
}

impl<T, O, S> BinHeap<T, O, S>
where
    O: TotalOrder<T>,
    S: SlotTracker<T>,
{
    /// Restore the heap property bottom-up over an arbitrary buffer.
    fn build(items: Vec<T>, capacity: usize, order: O, slots: S) -> Self {
        let mut heap = Self { items, capacity, order, slots };
        for (slot, item) in heap.items.iter().enumerate() {
            heap.slots.placed(item, slot);
        }
        for node in (0..heap.items.len() / 2).rev() {
            heap.sift_down(node);
        }
        heap
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no slot is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maximum number of elements the heap accepts.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// The root, if any.
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.items.first()
    }

    /// Element in slot `position`.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&T> {
        self.items.get(position)
    }

    /// Occupied slots in array order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Swap two slots and report both moves.
    fn swap(&mut self, a: usize, b: usize) {
        self.items.swap(a, b);
        self.slots.placed(&self.items[a], a);
        self.slots.placed(&self.items[b], b);
    }

    /// Push the element at `node` down until neither child strictly precedes it. On a tie between
    /// the children the left one is taken.
    fn sift_down(&mut self, mut node: usize) {
        let size = self.items.len();
        loop {
            let left = left(node);
            if left >= size {
                return;
            }
            let right = right(node);
            let child = if right < size && !self.order.precedes(&self.items[left], &self.items[right]) {
                right
            } else {
                left
            };
            if self.order.precedes(&self.items[node], &self.items[child]) {
                return;
            }
            self.swap(node, child);
            node = child;
        }
    }

    /// Pull the element at `node` up while its parent does not precede it.
    fn sift_up(&mut self, mut node: usize) {
        while let Some(parent) = parent(node) {
            if self.order.precedes(&self.items[parent], &self.items[node]) {
                return;
            }
            self.swap(node, parent);
            node = parent;
        }
    }

    /// Fails unless `position` is an occupied slot.
    fn check_position(&self, position: usize) -> Result<()> {
        if position < self.items.len() {
            Ok(())
        } else {
            Err(Error::PositionOutOfBounds { position, size: self.items.len() })
        }
    }

    /// Overwrite a slot, reporting the eviction of the old value and the placement of the new one.
    fn overwrite(&mut self, position: usize, value: T) -> T {
        let old = std::mem::replace(&mut self.items[position], value);
        self.slots.evicted(&old);
        self.slots.placed(&self.items[position], position);
        old
    }

    /// Remove and return the root.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyHeap`] when there is nothing to remove.
    pub fn remove_minimum(&mut self) -> Result<T> {
        if self.items.is_empty() {
            return Err(Error::EmptyHeap);
        }
        let removed = self.items.swap_remove(0);
        self.slots.evicted(&removed);
        if let Some(root) = self.items.first() {
            self.slots.placed(root, 0);
            self.sift_down(0);
        }
        Ok(removed)
    }

    /// Replace the value at `position` with one that strictly precedes it, then sift up.
    ///
    /// # Errors
    ///
    /// [`Error::NotDecreasing`] when the current value already precedes `value` (including
    /// equality), [`Error::PositionOutOfBounds`] for an unoccupied slot. Nothing changes on error.
    pub fn decrease_key(&mut self, position: usize, value: T) -> Result<()> {
        self.check_position(position)?;
        if self.order.precedes(&self.items[position], &value) {
            return Err(Error::NotDecreasing { position });
        }
        self.overwrite(position, value);
        self.sift_up(position);
        Ok(())
    }

    /// Re-establish the heap property downward from `position`, after the value there got worse.
    ///
    /// # Errors
    ///
    /// [`Error::PositionOutOfBounds`] for an unoccupied slot.
    pub fn reheapify_from(&mut self, position: usize) -> Result<()> {
        self.check_position(position)?;
        self.sift_down(position);
        Ok(())
    }

    /// Overwrite the value at `position` in either direction and return the old value.
    ///
    /// # Errors
    ///
    /// [`Error::PositionOutOfBounds`] for an unoccupied slot.
    pub fn replace(&mut self, position: usize, value: T) -> Result<T> {
        self.check_position(position)?;
        let improves = !self.order.precedes(&self.items[position], &value);
        let old = self.overwrite(position, value);
        if improves {
            self.sift_up(position);
        } else {
            self.sift_down(position);
        }
        Ok(old)
    }

    /// Append `value` and sift it up.
    ///
    /// # Errors
    ///
    /// [`Error::HeapFull`] once `capacity` elements are stored.
    pub fn insert(&mut self, value: T) -> Result<()> {
        if self.items.len() >= self.capacity {
            return Err(Error::HeapFull { capacity: self.capacity });
        }
        self.items.push(value);
        let last = self.items.len() - 1;
        self.slots.placed(&self.items[last], last);
        self.sift_up(last);
        Ok(())
    }
}

/// One heap level per line, entries separated by tabs.
impl<T: fmt::Display, O, S> fmt::Display for BinHeap<T, O, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut start = 0;
        let mut width = 1;
        while start < self.items.len() {
            if start > 0 {
                writeln!(f)?;
            }
            let end = (start + width).min(self.items.len());
            for (i, item) in self.items[start..end].iter().enumerate() {
                if i > 0 {
                    write!(f, "\t")?;
                }
                write!(f, "{item}")?;
            }
            start = end;
            width *= 2;
        }
        Ok(())
    }
}
