//! Insertion, erasure and bulk replacement in the middle of the ring.
//!
//! Both directions open or close gaps by moving the shorter side of the ring,
//! so the cost is bounded by half the length. Slots touched by a move are
//! stamped, which invalidates cursors to them.

use core::cmp::Ordering;

use tracing::trace;

use crate::cursor::Cursor;
use crate::error::CircularBufferError;
use crate::index;
use crate::ring::CircularBuffer;

/// Part of the ring that moves when a gap is opened or closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Front,
    Back,
}

impl Side {
    fn shorter(front: usize, back: usize, tie: Self) -> Self {
        match front.cmp(&back) {
            Ordering::Less => Self::Front,
            Ordering::Greater => Self::Back,
            Ordering::Equal => tie,
        }
    }
}

/// Keeps the ring consistent while a gap is being filled.
///
/// The elements in front of the gap count as live through `len`, the `tail`
/// elements behind it are tracked here. Dropping the guard, on success or
/// while unwinding from a panicking `Clone` or iterator, pulls the tail back
/// over whatever part of the gap stayed empty.
struct GapFiller<'a, T> {
    ring: &'a mut CircularBuffer<T>,
    at: usize,
    width: usize,
    filled: usize,
    tail: usize,
}

impl<T> GapFiller<'_, T> {
    fn fill<I: Iterator<Item = T>>(&mut self, items: I) {
        for item in items.take(self.width) {
            let slot = self.ring.slot_of(self.at + self.filled);
            // SAFETY: gap slots are raw until written here.
            unsafe { self.ring.storage.write(slot, item) };
            self.filled += 1;
        }
    }
}

impl<T> Drop for GapFiller<'_, T> {
    fn drop(&mut self) {
        if self.filled < self.width {
            for offset in 0..self.tail {
                let from = self.ring.slot_of(self.at + self.width + offset);
                let to = self.ring.slot_of(self.at + self.filled + offset);
                self.ring.relocate(from, to);
            }
        }
        self.ring.len = self.at + self.filled + self.tail;
    }
}

impl<T> CircularBuffer<T> {
    /// Inserts `item` before `pos`, evicting from the front when full.
    ///
    /// On a full buffer with `pos == begin()` nothing is inserted and
    /// `begin()` is returned. Otherwise returns a cursor to the new element.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::InvalidCursor` for a stale or foreign
    /// cursor.
    pub fn insert(&mut self, pos: Cursor, item: T) -> Result<Cursor, CircularBufferError> {
        let index = self.resolve(pos)?;
        let count = self.insert_room(index).min(1);
        Ok(self.insert_exact(index, count, core::iter::once(item)))
    }

    /// Inserts `n` copies of `item` before `pos`.
    ///
    /// At most `capacity() - (len() - index)` copies fit, where `index` is the
    /// position of `pos`; elements are evicted from the front to make room.
    /// Returns a cursor to the first inserted element.
    ///
    /// ```
    /// # use cyclic_buffer::CircularBuffer;
    /// let mut buffer = CircularBuffer::new(6).unwrap();
    /// buffer.extend([1, 2, 3, 4]);
    ///
    /// let pos = buffer.cursor_at(2).unwrap();
    /// buffer.insert_n(pos, 5, 6).unwrap();
    /// assert_eq!(buffer, [6, 6, 6, 6, 3, 4]);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::InvalidCursor` for a stale or foreign
    /// cursor.
    pub fn insert_n(&mut self, pos: Cursor, n: usize, item: T) -> Result<Cursor, CircularBufferError>
    where
        T: Clone,
    {
        let index = self.resolve(pos)?;
        let count = self.insert_room(index).min(n);
        Ok(self.insert_exact(index, count, (0..count).map(|_| item.clone())))
    }

    /// Inserts `items` before `pos`. When they do not all fit, the last ones
    /// are kept and elements are evicted from the front.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::InvalidCursor` for a stale or foreign
    /// cursor.
    pub fn insert_iter<I>(&mut self, pos: Cursor, items: I) -> Result<Cursor, CircularBufferError>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let index = self.resolve(pos)?;
        let mut items = items.into_iter();
        let requested = items.len();
        let count = self.insert_room(index).min(requested);
        if requested > count {
            items.nth(requested - count - 1);
        }
        Ok(self.insert_exact(index, count, items))
    }

    /// Inserts `item` before `pos`, evicting from the back when full.
    ///
    /// On a full buffer with `pos == end()` nothing is inserted and `end()` is
    /// returned. Otherwise returns a cursor to the new element.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::InvalidCursor` for a stale or foreign
    /// cursor.
    pub fn rinsert(&mut self, pos: Cursor, item: T) -> Result<Cursor, CircularBufferError> {
        let index = self.resolve(pos)?;
        let count = self.rinsert_room(index).min(1);
        Ok(self.rinsert_exact(index, count, core::iter::once(item)))
    }

    /// Inserts `n` copies of `item` before `pos`.
    ///
    /// At most `capacity() - index` copies fit; elements are evicted from the
    /// back to make room. Returns a cursor to the first inserted element.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::InvalidCursor` for a stale or foreign
    /// cursor.
    pub fn rinsert_n(&mut self, pos: Cursor, n: usize, item: T) -> Result<Cursor, CircularBufferError>
    where
        T: Clone,
    {
        let index = self.resolve(pos)?;
        let count = self.rinsert_room(index).min(n);
        Ok(self.rinsert_exact(index, count, (0..count).map(|_| item.clone())))
    }

    /// Inserts `items` before `pos`. When they do not all fit, the first ones
    /// are kept and elements are evicted from the back.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::InvalidCursor` for a stale or foreign
    /// cursor.
    pub fn rinsert_iter<I>(&mut self, pos: Cursor, items: I) -> Result<Cursor, CircularBufferError>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let index = self.resolve(pos)?;
        let items = items.into_iter();
        let count = self.rinsert_room(index).min(items.len());
        Ok(self.rinsert_exact(index, count, items))
    }

    /// Removes the element at `pos` and returns a cursor to the element that
    /// followed it, or `end()`.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::InvalidCursor` for a stale or foreign
    /// cursor and `CircularBufferError::EndOfBuffer` for `end()`.
    pub fn erase(&mut self, pos: Cursor) -> Result<Cursor, CircularBufferError> {
        let index = self.resolve_element(pos)?;
        self.remove_range(index, 1, Side::Back);
        Ok(self.cursor_for(index))
    }

    /// Removes `[first, last)` and returns a cursor to the element that
    /// followed the range, or `end()`.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::InvalidCursor` for a stale or foreign
    /// cursor and `CircularBufferError::InvalidRange` if `first` is after
    /// `last`.
    pub fn erase_range(&mut self, first: Cursor, last: Cursor) -> Result<Cursor, CircularBufferError> {
        let (from, to) = self.resolve_range(first, last)?;
        self.remove_range(from, to - from, Side::Back);
        Ok(self.cursor_for(from))
    }

    /// Removes the element at `pos` and returns a cursor to the element that
    /// preceded it, or `begin()`.
    ///
    /// ```
    /// # use cyclic_buffer::CircularBuffer;
    /// let mut buffer = CircularBuffer::from(vec![1, 2, 3]);
    /// let second = buffer.cursor_at(1).unwrap();
    /// let before = buffer.rerase(second).unwrap();
    /// assert_eq!(before.get(&buffer), Ok(&1));
    /// assert_eq!(buffer, [1, 3]);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::InvalidCursor` for a stale or foreign
    /// cursor and `CircularBufferError::EndOfBuffer` for `end()`.
    pub fn rerase(&mut self, pos: Cursor) -> Result<Cursor, CircularBufferError> {
        let index = self.resolve_element(pos)?;
        self.remove_range(index, 1, Side::Front);
        Ok(self.cursor_for(index.saturating_sub(1)))
    }

    /// Removes `[first, last)` and returns a cursor to the element that
    /// preceded the range, or `begin()`. An empty range returns `first`.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::InvalidCursor` for a stale or foreign
    /// cursor and `CircularBufferError::InvalidRange` if `first` is after
    /// `last`.
    pub fn rerase_range(&mut self, first: Cursor, last: Cursor) -> Result<Cursor, CircularBufferError> {
        let (from, to) = self.resolve_range(first, last)?;
        if from == to {
            return Ok(self.cursor_for(from));
        }
        self.remove_range(from, to - from, Side::Front);
        Ok(self.cursor_for(from.saturating_sub(1)))
    }

    /// Grows to `new_size` by appending copies of `item`, raising the capacity
    /// if needed, or shrinks by dropping elements from the front.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::AllocationFailed` if the capacity has to
    /// grow and the new block cannot be allocated.
    pub fn resize(&mut self, new_size: usize, item: T) -> Result<(), CircularBufferError>
    where
        T: Clone,
    {
        if new_size > self.len {
            if new_size > self.capacity() {
                self.set_capacity(new_size)?;
            }
            let count = new_size - self.len;
            self.insert_exact(self.len, count, (0..count).map(|_| item.clone()));
        } else {
            while self.len > new_size {
                drop(self.pop_front());
            }
        }
        Ok(())
    }

    /// Grows to `new_size` by prepending copies of `item`, raising the
    /// capacity if needed, or shrinks by dropping elements from the back.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::AllocationFailed` if the capacity has to
    /// grow and the new block cannot be allocated.
    pub fn rresize(&mut self, new_size: usize, item: T) -> Result<(), CircularBufferError>
    where
        T: Clone,
    {
        if new_size > self.len {
            if new_size > self.capacity() {
                self.rset_capacity(new_size)?;
            }
            let count = new_size - self.len;
            self.rinsert_exact(0, count, (0..count).map(|_| item.clone()));
        } else {
            while self.len > new_size {
                drop(self.pop_back());
            }
        }
        Ok(())
    }

    /// Replaces the contents with `n` copies of `item`. The capacity grows to
    /// exactly `n` when it is smaller, and is kept otherwise.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::AllocationFailed` if a larger block is
    /// needed and cannot be allocated; the buffer is left untouched.
    pub fn assign(&mut self, n: usize, item: T) -> Result<(), CircularBufferError>
    where
        T: Clone,
    {
        let capacity = self.capacity().max(n);
        self.replace_contents(capacity, (0..n).map(|_| item.clone()))
    }

    /// Replaces the contents with `n` copies of `item` in a buffer of exactly
    /// `capacity` slots.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::InvalidCapacity` if `n > capacity` and
    /// `CircularBufferError::AllocationFailed` if the block cannot be
    /// allocated.
    pub fn assign_with_capacity(
        &mut self,
        capacity: usize,
        n: usize,
        item: T,
    ) -> Result<(), CircularBufferError>
    where
        T: Clone,
    {
        if n > capacity {
            return Err(CircularBufferError::InvalidCapacity {
                capacity,
                min_capacity: n,
            });
        }
        self.replace_contents(capacity, (0..n).map(|_| item.clone()))
    }

    /// Replaces the contents with `items`, growing the capacity to their count
    /// when it is smaller.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::AllocationFailed` if a larger block is
    /// needed and cannot be allocated; the buffer is left untouched.
    pub fn assign_iter<I>(&mut self, items: I) -> Result<(), CircularBufferError>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let items = items.into_iter();
        let capacity = self.capacity().max(items.len());
        self.replace_contents(capacity, items)
    }

    /// Replaces the contents with `items` in a buffer of exactly `capacity`
    /// slots, keeping the last `capacity` items.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::AllocationFailed` if the block cannot be
    /// allocated.
    pub fn assign_iter_with_capacity<I>(
        &mut self,
        capacity: usize,
        items: I,
    ) -> Result<(), CircularBufferError>
    where
        I: IntoIterator<Item = T>,
    {
        self.replace_contents(capacity, items)
    }

    pub(crate) fn insert_room(&self, index: usize) -> usize {
        self.capacity() - (self.len - index)
    }

    pub(crate) fn rinsert_room(&self, index: usize) -> usize {
        self.capacity() - index
    }

    /// Inserts exactly `count` items before `index` after evicting from the
    /// front; `count` must not exceed `insert_room(index)`.
    pub(crate) fn insert_exact<I: Iterator<Item = T>>(
        &mut self,
        index: usize,
        count: usize,
        items: I,
    ) -> Cursor {
        if count == 0 {
            return self.cursor_for(index);
        }
        let evicted = (self.len + count).saturating_sub(self.capacity());
        for _ in 0..evicted {
            drop(self.pop_front());
        }
        let index = index - evicted;
        self.fill_gap(index, count, Side::Back, items);
        self.cursor_for(index)
    }

    /// Inserts exactly `count` items before `index` after evicting from the
    /// back; `count` must not exceed `rinsert_room(index)`.
    pub(crate) fn rinsert_exact<I: Iterator<Item = T>>(
        &mut self,
        index: usize,
        count: usize,
        items: I,
    ) -> Cursor {
        if count == 0 {
            return self.cursor_for(index);
        }
        let evicted = (self.len + count).saturating_sub(self.capacity());
        for _ in 0..evicted {
            drop(self.pop_back());
        }
        self.fill_gap(index, count, Side::Front, items);
        self.cursor_for(index)
    }

    /// Opens a gap of `width` slots before `index` by moving the shorter side
    /// outwards, then fills it from `items`.
    fn fill_gap<I: Iterator<Item = T>>(&mut self, index: usize, width: usize, tie: Side, items: I) {
        debug_assert!(self.len + width <= self.capacity());
        let capacity = self.capacity();
        let tail = self.len - index;
        match Side::shorter(index, tail, tie) {
            Side::Back => {
                for offset in (index..self.len).rev() {
                    let from = self.slot_of(offset);
                    let to = self.slot_of(offset + width);
                    self.relocate(from, to);
                }
            }
            Side::Front => {
                let start = index::sub(self.start, width, capacity);
                for offset in 0..index {
                    let from = self.slot_of(offset);
                    let to = index::add(start, offset, capacity);
                    self.relocate(from, to);
                }
                self.start = start;
            }
        }
        self.len = index;
        let mut gap = GapFiller {
            ring: self,
            at: index,
            width,
            filled: 0,
            tail,
        };
        gap.fill(items);
    }

    /// Drops `count` elements starting at `index`, closing the hole from the
    /// shorter side.
    fn remove_range(&mut self, index: usize, count: usize, tie: Side) {
        if count == 0 {
            return;
        }
        let tail = self.len - index - count;
        match Side::shorter(index, tail, tie) {
            Side::Front => {
                for offset in (0..index).rev() {
                    let from = self.slot_of(offset);
                    let to = self.slot_of(offset + count);
                    self.relocate(from, to);
                }
                for _ in 0..count {
                    drop(self.pop_front());
                }
            }
            Side::Back => {
                for offset in index + count..self.len {
                    let from = self.slot_of(offset);
                    let to = self.slot_of(offset - count);
                    self.relocate(from, to);
                }
                for _ in 0..count {
                    drop(self.pop_back());
                }
            }
        }
    }

    /// Swaps two slots and stamps both.
    fn relocate(&mut self, from: usize, to: usize) {
        self.storage.swap(from, to);
        self.registry.touch(from);
        self.registry.touch(to);
    }

    /// Refills in place when `capacity` matches, otherwise builds a fresh
    /// block first so a failed allocation leaves the buffer as it was.
    fn replace_contents<I>(&mut self, capacity: usize, items: I) -> Result<(), CircularBufferError>
    where
        I: IntoIterator<Item = T>,
    {
        if capacity == self.capacity() {
            self.clear();
            self.extend(items);
        } else {
            let mut fresh = Self::with_capacity_from(capacity, items)?;
            trace!(
                previous = self.capacity(),
                capacity,
                len = fresh.len,
                "replaced circular buffer storage"
            );
            self.exchange_contents(&mut fresh);
            self.registry.invalidate_all();
        }
        Ok(())
    }

    fn resolve_element(&self, pos: Cursor) -> Result<usize, CircularBufferError> {
        let index = self.resolve(pos)?;
        if index == self.len {
            return Err(CircularBufferError::EndOfBuffer);
        }
        Ok(index)
    }

    fn resolve_range(&self, first: Cursor, last: Cursor) -> Result<(usize, usize), CircularBufferError> {
        let from = self.resolve(first)?;
        let to = self.resolve(last)?;
        if from > to {
            return Err(CircularBufferError::InvalidRange {
                first: from,
                last: to,
            });
        }
        Ok((from, to))
    }
}
