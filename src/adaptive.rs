use core::fmt;
use core::mem;
use core::ops::{Index, IndexMut};

use tracing::{debug, warn};

use crate::control::CapacityControl;
use crate::cursor::{Cursor, CursorTarget};
use crate::error::CircularBufferError;
use crate::iter::{Iter, IterMut};
use crate::ring::CircularBuffer;

/// A ring buffer that only allocates the storage it currently needs.
///
/// The buffer behaves like a `CircularBuffer` of `capacity()` elements, but
/// its storage block floats between `min_capacity()` and `capacity()`. It is
/// doubled when an insertion does not fit and halved once at most a third of
/// it is in use. The gap between the grow and shrink thresholds keeps a
/// buffer that alternates pushes and pops from reallocating on every call.
///
/// Any reallocation invalidates the cursors of the buffer except `end()`;
/// cursors returned by mutators are always fresh.
///
/// ```
/// # use cyclic_buffer::{AdaptiveCircularBuffer, CapacityControl};
/// let mut buffer = AdaptiveCircularBuffer::new(CapacityControl::from(1000)).unwrap();
/// assert_eq!(buffer.internal_capacity(), 0);
///
/// for i in 0..10 {
///     buffer.push_back(i).unwrap();
/// }
/// assert_eq!(buffer.capacity(), 1000);
/// assert!(buffer.internal_capacity() < 1000);
/// ```
#[derive(Clone)]
pub struct AdaptiveCircularBuffer<T> {
    ring: CircularBuffer<T>,
    control: CapacityControl,
}

impl<T> AdaptiveCircularBuffer<T> {
    /// Creates an empty buffer with `min_capacity` slots allocated.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::AllocationFailed` if the initial block
    /// cannot be allocated.
    pub fn new(control: CapacityControl) -> Result<Self, CircularBufferError> {
        Ok(Self {
            ring: CircularBuffer::new(control.min_capacity())?,
            control,
        })
    }

    /// Creates a buffer holding `n` copies of `item`.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::InvalidCapacity` if `n` exceeds the
    /// configured capacity and `CircularBufferError::AllocationFailed` if the
    /// initial block cannot be allocated.
    pub fn with_len(control: CapacityControl, n: usize, item: T) -> Result<Self, CircularBufferError>
    where
        T: Clone,
    {
        if n > control.capacity() {
            return Err(CircularBufferError::InvalidCapacity {
                capacity: control.capacity(),
                min_capacity: n,
            });
        }
        let mut ring = CircularBuffer::new(control.min_capacity().max(n))?;
        ring.extend((0..n).map(|_| item.clone()));
        Ok(Self { ring, control })
    }

    /// Creates a full buffer of `capacity()` copies of `item`.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::AllocationFailed` if the block cannot be
    /// allocated.
    pub fn filled(control: CapacityControl, item: T) -> Result<Self, CircularBufferError>
    where
        T: Clone,
    {
        Self::with_len(control, control.capacity(), item)
    }

    /// Creates a buffer from `items`, keeping the last `capacity()` of them.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::AllocationFailed` if the block cannot be
    /// allocated.
    pub fn with_capacity_from<I>(control: CapacityControl, items: I) -> Result<Self, CircularBufferError>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let items = items.into_iter();
        let physical = control
            .capacity()
            .min(control.min_capacity().max(items.len()));
        let mut buffer = Self {
            ring: CircularBuffer::with_capacity_from(physical, items)?,
            control,
        };
        buffer.check_high_capacity();
        Ok(buffer)
    }

    /// Most elements the buffer will hold before it starts overwriting.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.control.capacity()
    }

    #[must_use]
    pub fn min_capacity(&self) -> usize {
        self.control.min_capacity()
    }

    #[must_use]
    pub fn capacity_control(&self) -> CapacityControl {
        self.control
    }

    /// Number of slots currently allocated.
    #[must_use]
    pub fn internal_capacity(&self) -> usize {
        self.ring.capacity()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Whether `len()` reached the configured capacity, regardless of how
    /// much storage is allocated.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.ring.len() >= self.control.capacity()
    }

    #[must_use]
    pub fn remaining_capacity(&self) -> usize {
        self.control.capacity().saturating_sub(self.ring.len())
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.ring.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.ring.get_mut(index)
    }

    /// # Errors
    ///
    /// Returns `CircularBufferError::IndexOutOfRange` if `index >= len()`.
    pub fn at(&self, index: usize) -> Result<&T, CircularBufferError> {
        self.ring.at(index)
    }

    /// # Errors
    ///
    /// Returns `CircularBufferError::IndexOutOfRange` if `index >= len()`.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, CircularBufferError> {
        self.ring.at_mut(index)
    }

    #[must_use]
    pub fn front(&self) -> Option<&T> {
        self.ring.front()
    }

    #[must_use]
    pub fn back(&self) -> Option<&T> {
        self.ring.back()
    }

    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.ring.front_mut()
    }

    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.ring.back_mut()
    }

    #[must_use]
    pub fn as_slices(&self) -> (&[T], &[T]) {
        self.ring.as_slices()
    }

    pub fn as_mut_slices(&mut self) -> (&mut [T], &mut [T]) {
        self.ring.as_mut_slices()
    }

    #[must_use]
    pub fn array_one(&self) -> &[T] {
        self.ring.array_one()
    }

    #[must_use]
    pub fn array_two(&self) -> &[T] {
        self.ring.array_two()
    }

    #[must_use]
    pub fn is_linearized(&self) -> bool {
        self.ring.is_linearized()
    }

    pub fn linearize(&mut self) -> &mut [T] {
        self.ring.linearize()
    }

    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        self.ring.iter()
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        self.ring.iter_mut()
    }

    #[must_use]
    pub fn begin(&self) -> Cursor {
        self.ring.begin()
    }

    #[must_use]
    pub fn end(&self) -> Cursor {
        self.ring.end()
    }

    /// # Errors
    ///
    /// Returns `CircularBufferError::IndexOutOfRange` if `index > len()`.
    pub fn cursor_at(&self, index: usize) -> Result<Cursor, CircularBufferError> {
        self.ring.cursor_at(index)
    }

    /// # Errors
    ///
    /// Returns `CircularBufferError::InvalidCursor` for a stale or foreign
    /// cursor and `CircularBufferError::EndOfBuffer` for the end cursor.
    pub fn get_at_mut(&mut self, cursor: Cursor) -> Result<&mut T, CircularBufferError> {
        self.ring.get_at_mut(cursor)
    }

    /// Appends `item`, growing the storage if needed. A full buffer
    /// overwrites and returns its front element.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::AllocationFailed` if the storage has to
    /// grow and cannot; `item` is dropped and the buffer is unchanged.
    pub fn push_back(&mut self, item: T) -> Result<Option<T>, CircularBufferError> {
        if !self.is_full() {
            self.check_low_capacity(1)?;
        }
        Ok(self.ring.push_back(item))
    }

    /// Prepends `item`, growing the storage if needed. A full buffer
    /// overwrites and returns its back element.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::AllocationFailed` if the storage has to
    /// grow and cannot; `item` is dropped and the buffer is unchanged.
    pub fn push_front(&mut self, item: T) -> Result<Option<T>, CircularBufferError> {
        if !self.is_full() {
            self.check_low_capacity(1)?;
        }
        Ok(self.ring.push_front(item))
    }

    pub fn pop_back(&mut self) -> Option<T> {
        let item = self.ring.pop_back();
        if item.is_some() {
            self.check_high_capacity();
        }
        item
    }

    pub fn pop_front(&mut self) -> Option<T> {
        let item = self.ring.pop_front();
        if item.is_some() {
            self.check_high_capacity();
        }
        item
    }

    /// See [`CircularBuffer::insert`].
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::InvalidCursor` for a stale or foreign
    /// cursor and `CircularBufferError::AllocationFailed` if the storage has
    /// to grow and cannot.
    pub fn insert(&mut self, pos: Cursor, item: T) -> Result<Cursor, CircularBufferError> {
        let index = self.ring.resolve(pos)?;
        self.check_low_capacity(1)?;
        self.ring.insert(self.ring.cursor_for(index), item)
    }

    /// See [`CircularBuffer::insert_n`].
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::InvalidCursor` for a stale or foreign
    /// cursor and `CircularBufferError::AllocationFailed` if the storage has
    /// to grow and cannot.
    pub fn insert_n(&mut self, pos: Cursor, n: usize, item: T) -> Result<Cursor, CircularBufferError>
    where
        T: Clone,
    {
        let index = self.ring.resolve(pos)?;
        self.check_low_capacity(n)?;
        self.ring.insert_n(self.ring.cursor_for(index), n, item)
    }

    /// See [`CircularBuffer::insert_iter`].
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::InvalidCursor` for a stale or foreign
    /// cursor and `CircularBufferError::AllocationFailed` if the storage has
    /// to grow and cannot.
    pub fn insert_iter<I>(&mut self, pos: Cursor, items: I) -> Result<Cursor, CircularBufferError>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let index = self.ring.resolve(pos)?;
        let items = items.into_iter();
        self.check_low_capacity(items.len())?;
        self.ring.insert_iter(self.ring.cursor_for(index), items)
    }

    /// See [`CircularBuffer::rinsert`].
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::InvalidCursor` for a stale or foreign
    /// cursor and `CircularBufferError::AllocationFailed` if the storage has
    /// to grow and cannot.
    pub fn rinsert(&mut self, pos: Cursor, item: T) -> Result<Cursor, CircularBufferError> {
        let index = self.ring.resolve(pos)?;
        self.check_low_capacity(1)?;
        self.ring.rinsert(self.ring.cursor_for(index), item)
    }

    /// See [`CircularBuffer::rinsert_n`].
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::InvalidCursor` for a stale or foreign
    /// cursor and `CircularBufferError::AllocationFailed` if the storage has
    /// to grow and cannot.
    pub fn rinsert_n(&mut self, pos: Cursor, n: usize, item: T) -> Result<Cursor, CircularBufferError>
    where
        T: Clone,
    {
        let index = self.ring.resolve(pos)?;
        self.check_low_capacity(n)?;
        self.ring.rinsert_n(self.ring.cursor_for(index), n, item)
    }

    /// See [`CircularBuffer::rinsert_iter`].
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::InvalidCursor` for a stale or foreign
    /// cursor and `CircularBufferError::AllocationFailed` if the storage has
    /// to grow and cannot.
    pub fn rinsert_iter<I>(&mut self, pos: Cursor, items: I) -> Result<Cursor, CircularBufferError>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let index = self.ring.resolve(pos)?;
        let items = items.into_iter();
        self.check_low_capacity(items.len())?;
        self.ring.rinsert_iter(self.ring.cursor_for(index), items)
    }

    /// See [`CircularBuffer::erase`].
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::InvalidCursor` for a stale or foreign
    /// cursor and `CircularBufferError::EndOfBuffer` for `end()`.
    pub fn erase(&mut self, pos: Cursor) -> Result<Cursor, CircularBufferError> {
        let next = self.ring.erase(pos)?;
        self.shrink_keeping(next)
    }

    /// See [`CircularBuffer::erase_range`].
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::InvalidCursor` for a stale or foreign
    /// cursor and `CircularBufferError::InvalidRange` for a reversed range.
    pub fn erase_range(&mut self, first: Cursor, last: Cursor) -> Result<Cursor, CircularBufferError> {
        let next = self.ring.erase_range(first, last)?;
        self.shrink_keeping(next)
    }

    /// See [`CircularBuffer::rerase`].
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::InvalidCursor` for a stale or foreign
    /// cursor and `CircularBufferError::EndOfBuffer` for `end()`.
    pub fn rerase(&mut self, pos: Cursor) -> Result<Cursor, CircularBufferError> {
        let previous = self.ring.rerase(pos)?;
        self.shrink_keeping(previous)
    }

    /// See [`CircularBuffer::rerase_range`].
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::InvalidCursor` for a stale or foreign
    /// cursor and `CircularBufferError::InvalidRange` for a reversed range.
    pub fn rerase_range(&mut self, first: Cursor, last: Cursor) -> Result<Cursor, CircularBufferError> {
        let previous = self.ring.rerase_range(first, last)?;
        self.shrink_keeping(previous)
    }

    /// Removes every element and releases storage down to `min_capacity()`.
    pub fn clear(&mut self) {
        self.ring.clear();
        self.check_high_capacity();
    }

    /// Grows to `new_size` by appending copies of `item`, raising the
    /// configured capacity if needed, or shrinks by dropping from the back.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::AllocationFailed` if the storage has to
    /// grow and cannot.
    pub fn resize(&mut self, new_size: usize, item: T) -> Result<(), CircularBufferError>
    where
        T: Clone,
    {
        let len = self.ring.len();
        if new_size > len {
            self.control.grow_to(new_size);
            self.check_low_capacity(new_size - len)?;
            self.ring.insert_n(self.ring.end(), new_size - len, item)?;
        } else {
            while self.ring.len() > new_size {
                drop(self.ring.pop_back());
            }
            self.check_high_capacity();
        }
        Ok(())
    }

    /// Grows to `new_size` by prepending copies of `item`, raising the
    /// configured capacity if needed, or shrinks by dropping from the front.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::AllocationFailed` if the storage has to
    /// grow and cannot.
    pub fn rresize(&mut self, new_size: usize, item: T) -> Result<(), CircularBufferError>
    where
        T: Clone,
    {
        let len = self.ring.len();
        if new_size > len {
            self.control.grow_to(new_size);
            self.check_low_capacity(new_size - len)?;
            self.ring.rinsert_n(self.ring.begin(), new_size - len, item)?;
        } else {
            while self.ring.len() > new_size {
                drop(self.ring.pop_front());
            }
            self.check_high_capacity();
        }
        Ok(())
    }

    /// Replaces the contents with `n` copies of `item`; the configured
    /// capacity becomes `n` with no storage floor.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::AllocationFailed` if the block cannot be
    /// allocated.
    pub fn assign(&mut self, n: usize, item: T) -> Result<(), CircularBufferError>
    where
        T: Clone,
    {
        self.ring.assign_with_capacity(n, n, item)?;
        self.control = CapacityControl::from(n);
        Ok(())
    }

    /// Replaces the contents with `n` copies of `item` under new settings.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::InvalidCapacity` if `n` exceeds the new
    /// capacity and `CircularBufferError::AllocationFailed` if the block
    /// cannot be allocated.
    pub fn assign_with_control(
        &mut self,
        control: CapacityControl,
        n: usize,
        item: T,
    ) -> Result<(), CircularBufferError>
    where
        T: Clone,
    {
        if n > control.capacity() {
            return Err(CircularBufferError::InvalidCapacity {
                capacity: control.capacity(),
                min_capacity: n,
            });
        }
        self.ring
            .assign_with_capacity(control.min_capacity().max(n), n, item)?;
        self.control = control;
        Ok(())
    }

    /// Replaces the contents with `items`; the configured capacity becomes
    /// their count with no storage floor.
    ///
    /// The configured capacity is exactly the item count even when the
    /// previous storage was larger. The block is replaced by one of that
    /// size, so the storage never exceeds the configured capacity.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::AllocationFailed` if the block cannot be
    /// allocated.
    pub fn assign_iter<I>(&mut self, items: I) -> Result<(), CircularBufferError>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let items = items.into_iter();
        let n = items.len();
        self.ring.assign_iter_with_capacity(n, items)?;
        self.control = CapacityControl::from(n);
        Ok(())
    }

    /// Replaces the contents with the last `control.capacity()` of `items`
    /// under new settings.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::AllocationFailed` if the block cannot be
    /// allocated.
    pub fn assign_iter_with_control<I>(
        &mut self,
        control: CapacityControl,
        items: I,
    ) -> Result<(), CircularBufferError>
    where
        I: IntoIterator<Item = T>,
    {
        self.ring
            .assign_iter_with_capacity(control.capacity(), items)?;
        self.control = control;
        self.check_high_capacity();
        Ok(())
    }

    /// Applies new settings, dropping elements from the front if the buffer
    /// holds more than the new capacity.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::AllocationFailed` if a required
    /// reallocation fails.
    pub fn set_capacity(&mut self, control: CapacityControl) -> Result<(), CircularBufferError> {
        if control.capacity() < self.ring.capacity() {
            self.ring.set_capacity(control.capacity())?;
        }
        self.control = control;
        self.apply_min_capacity()
    }

    /// Applies new settings, dropping elements from the back if the buffer
    /// holds more than the new capacity.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::AllocationFailed` if a required
    /// reallocation fails.
    pub fn rset_capacity(&mut self, control: CapacityControl) -> Result<(), CircularBufferError> {
        if control.capacity() < self.ring.capacity() {
            self.ring.rset_capacity(control.capacity())?;
        }
        self.control = control;
        self.apply_min_capacity()
    }

    /// Changes the storage floor, keeping the configured capacity.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::InvalidCapacity` if `min_capacity`
    /// exceeds `capacity()` and `CircularBufferError::AllocationFailed` if
    /// the storage has to grow and cannot.
    pub fn set_min_capacity(&mut self, min_capacity: usize) -> Result<(), CircularBufferError> {
        let control = CapacityControl::new(self.control.capacity(), min_capacity)?;
        self.set_capacity(control)
    }

    /// Exchanges contents and settings. Cursors of both buffers are
    /// invalidated.
    pub fn swap(&mut self, other: &mut Self) {
        self.ring.swap(&mut other.ring);
        mem::swap(&mut self.control, &mut other.control);
    }

    fn apply_min_capacity(&mut self) -> Result<(), CircularBufferError> {
        let min_capacity = self.control.min_capacity();
        if min_capacity > self.ring.capacity() {
            self.ring.set_capacity(min_capacity)
        } else {
            self.check_high_capacity();
            Ok(())
        }
    }

    /// Keeps at least 20% of the storage free after a resize, within the
    /// configured capacity.
    fn ensure_reserve(&self, capacity: usize, len: usize) -> usize {
        let mut capacity = capacity;
        if len.saturating_add(capacity / 5) >= capacity {
            capacity = capacity.saturating_mul(2);
        }
        capacity.min(self.control.capacity())
    }

    /// Grows the storage so `n` more elements fit.
    fn check_low_capacity(&mut self, n: usize) -> Result<(), CircularBufferError> {
        let len = self.ring.len();
        let wanted = len.saturating_add(n);
        let previous = self.ring.capacity();
        if wanted <= previous {
            return Ok(());
        }
        let mut capacity = previous.max(1);
        while wanted > capacity {
            capacity = capacity.saturating_mul(2);
        }
        let capacity = self.ensure_reserve(capacity, wanted);
        if capacity != previous {
            self.ring.set_capacity(capacity)?;
            debug!(previous, capacity, len, "grew adaptive buffer storage");
        }
        Ok(())
    }

    /// Halves the storage while at most a third of it is in use, never going
    /// below `min_capacity()`. A failed allocation keeps the current block.
    fn check_high_capacity(&mut self) {
        let len = self.ring.len();
        let previous = self.ring.capacity();
        let min_capacity = self.control.min_capacity();
        let mut capacity = previous;
        while capacity / 3 >= len {
            capacity /= 2;
            if capacity <= min_capacity {
                capacity = min_capacity;
                break;
            }
        }
        let capacity = self.ensure_reserve(capacity, len);
        if capacity == previous {
            return;
        }
        match self.ring.set_capacity(capacity) {
            Ok(()) => debug!(previous, capacity, len, "shrank adaptive buffer storage"),
            Err(error) => warn!(previous, capacity, len, %error, "kept adaptive buffer storage"),
        }
    }

    /// Re-derives a cursor by index after a possible reallocation.
    fn shrink_keeping(&mut self, cursor: Cursor) -> Result<Cursor, CircularBufferError> {
        let index = self.ring.resolve(cursor)?;
        self.check_high_capacity();
        Ok(self.ring.cursor_for(index))
    }
}

impl<T> CursorTarget for AdaptiveCircularBuffer<T> {
    type Item = T;

    fn ring(&self) -> &CircularBuffer<T> {
        &self.ring
    }
}

impl<T> Default for AdaptiveCircularBuffer<T> {
    fn default() -> Self {
        Self {
            ring: CircularBuffer::default(),
            control: CapacityControl::default(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for AdaptiveCircularBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdaptiveCircularBuffer")
            .field("items", &self.ring)
            .field("capacity", &self.control.capacity())
            .field("min_capacity", &self.control.min_capacity())
            .field("internal_capacity", &self.ring.capacity())
            .finish()
    }
}

impl<T, U> PartialEq<AdaptiveCircularBuffer<U>> for AdaptiveCircularBuffer<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &AdaptiveCircularBuffer<U>) -> bool {
        self.ring == other.ring
    }
}

impl<T: Eq> Eq for AdaptiveCircularBuffer<T> {}

impl<T, U, const N: usize> PartialEq<[U; N]> for AdaptiveCircularBuffer<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U; N]) -> bool {
        self.ring == *other
    }
}

impl<T> Index<usize> for AdaptiveCircularBuffer<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.ring[index]
    }
}

impl<T> IndexMut<usize> for AdaptiveCircularBuffer<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.ring[index]
    }
}

impl<'a, T> IntoIterator for &'a AdaptiveCircularBuffer<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.ring.iter()
    }
}
