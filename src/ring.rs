use alloc::boxed::Box;
use core::mem;
use core::ptr;

use tracing::trace;

use crate::cursor::CursorRegistry;
use crate::error::CircularBufferError;
use crate::index;
use crate::storage::StorageBlock;

/// Which end loses elements when the live run has to shrink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Trim {
    Front,
    Back,
}

/// A fixed-capacity ring buffer.
///
/// Elements live in a single storage block allocated up front. Pushing onto a
/// full buffer overwrites the element at the opposite end, so the buffer
/// never grows on its own; only `set_capacity`, `rset_capacity`, `resize`,
/// `rresize` and the `assign` family reallocate.
pub struct CircularBuffer<T> {
    pub(crate) storage: StorageBlock<T>,
    pub(crate) start: usize,
    pub(crate) len: usize,
    pub(crate) registry: CursorRegistry,
}

impl<T> CircularBuffer<T> {
    /// Creates an empty buffer able to hold `capacity` elements.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::AllocationFailed` if the storage block
    /// cannot be allocated.
    pub fn new(capacity: usize) -> Result<Self, CircularBufferError> {
        Ok(Self {
            storage: StorageBlock::allocate(capacity)?,
            start: 0,
            len: 0,
            registry: CursorRegistry::new(capacity)?,
        })
    }

    /// Creates a full buffer holding `capacity` copies of `item`.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::AllocationFailed` if the storage block
    /// cannot be allocated.
    pub fn filled(capacity: usize, item: T) -> Result<Self, CircularBufferError>
    where
        T: Clone,
    {
        let mut buffer = Self::new(capacity)?;
        buffer.extend((0..capacity).map(|_| item.clone()));
        Ok(buffer)
    }

    /// Creates a buffer of `capacity` slots from `items`. When there are more
    /// items than slots only the last `capacity` ones are kept.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::AllocationFailed` if the storage block
    /// cannot be allocated.
    pub fn with_capacity_from<I>(capacity: usize, items: I) -> Result<Self, CircularBufferError>
    where
        I: IntoIterator<Item = T>,
    {
        let mut buffer = Self::new(capacity)?;
        buffer.extend(items);
        Ok(buffer)
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Number of elements that can be pushed before the buffer starts
    /// overwriting.
    #[must_use]
    pub fn remaining_capacity(&self) -> usize {
        self.capacity() - self.len
    }

    /// Physical slot of logical `index`, `index <= capacity`.
    #[inline]
    pub(crate) fn slot_of(&self, index: usize) -> usize {
        index::add(self.start, index, self.capacity())
    }

    /// Physical slot one past the last element.
    pub(crate) fn finish(&self) -> usize {
        self.slot_of(self.len)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index < self.len {
            let slot = self.slot_of(index);
            // SAFETY: logical indices below `len` map to live slots.
            Some(unsafe { self.storage.get(slot) })
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index < self.len {
            let slot = self.slot_of(index);
            // SAFETY: logical indices below `len` map to live slots.
            Some(unsafe { self.storage.get_mut(slot) })
        } else {
            None
        }
    }

    /// Bounds-checked access.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::IndexOutOfRange` if `index >= len()`.
    pub fn at(&self, index: usize) -> Result<&T, CircularBufferError> {
        let length = self.len;
        self.get(index)
            .ok_or(CircularBufferError::IndexOutOfRange { index, length })
    }

    /// Bounds-checked mutable access.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::IndexOutOfRange` if `index >= len()`.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, CircularBufferError> {
        let length = self.len;
        self.get_mut(index)
            .ok_or(CircularBufferError::IndexOutOfRange { index, length })
    }

    #[must_use]
    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    #[must_use]
    pub fn back(&self) -> Option<&T> {
        self.len.checked_sub(1).and_then(|last| self.get(last))
    }

    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.get_mut(0)
    }

    pub fn back_mut(&mut self) -> Option<&mut T> {
        match self.len.checked_sub(1) {
            Some(last) => self.get_mut(last),
            None => None,
        }
    }

    /// The contents as two slices: the run from the first element towards the
    /// end of the storage block, then the wrapped part from the block start.
    #[must_use]
    pub fn as_slices(&self) -> (&[T], &[T]) {
        // SAFETY: the `len` slots following `start` are live.
        unsafe { self.storage.wrapped_slices(self.start, self.len) }
    }

    pub fn as_mut_slices(&mut self) -> (&mut [T], &mut [T]) {
        // SAFETY: the `len` slots following `start` are live.
        unsafe { self.storage.wrapped_slices_mut(self.start, self.len) }
    }

    /// First contiguous run of elements.
    #[must_use]
    pub fn array_one(&self) -> &[T] {
        self.as_slices().0
    }

    /// Wrapped run of elements; empty when the buffer is linearized.
    #[must_use]
    pub fn array_two(&self) -> &[T] {
        self.as_slices().1
    }

    /// Whether all elements already occupy one contiguous run.
    #[must_use]
    pub fn is_linearized(&self) -> bool {
        self.start + self.len <= self.capacity()
    }

    /// Rearranges the storage so the elements form one contiguous slice and
    /// returns it. Nothing moves if the buffer is already linearized.
    ///
    /// Moving invalidates every cursor except `end()`.
    pub fn linearize(&mut self) -> &mut [T] {
        if !self.is_linearized() {
            let capacity = self.capacity();
            let relocated = self.storage.rotate_left(self.start);
            debug_assert_eq!(relocated, capacity);
            trace!(
                capacity,
                len = self.len,
                start = self.start,
                "rotated circular buffer storage"
            );
            self.start = 0;
            self.registry.invalidate_all_except_end();
        }
        self.as_mut_slices().0
    }

    /// Appends `item` at the back. On a full buffer the front element is
    /// overwritten and returned; a zero-capacity buffer hands `item` back.
    pub fn push_back(&mut self, item: T) -> Option<T> {
        let capacity = self.capacity();
        if capacity == 0 {
            return Some(item);
        }
        if self.is_full() {
            let slot = self.start;
            self.registry.touch(slot);
            self.start = index::increment(slot, capacity);
            // SAFETY: a full buffer has every slot live.
            Some(mem::replace(unsafe { self.storage.get_mut(slot) }, item))
        } else {
            let slot = self.finish();
            // SAFETY: the slot after the last element is raw when not full.
            unsafe { self.storage.write(slot, item) };
            self.len += 1;
            None
        }
    }

    /// Prepends `item` at the front. On a full buffer the back element is
    /// overwritten and returned; a zero-capacity buffer hands `item` back.
    pub fn push_front(&mut self, item: T) -> Option<T> {
        let capacity = self.capacity();
        if capacity == 0 {
            return Some(item);
        }
        let slot = index::decrement(self.start, capacity);
        self.start = slot;
        if self.is_full() {
            self.registry.touch(slot);
            // SAFETY: a full buffer has every slot live.
            Some(mem::replace(unsafe { self.storage.get_mut(slot) }, item))
        } else {
            // SAFETY: the slot before the first element is raw when not full.
            unsafe { self.storage.write(slot, item) };
            self.len += 1;
            None
        }
    }

    pub fn pop_back(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        self.len -= 1;
        let slot = self.slot_of(self.len);
        self.registry.touch(slot);
        // SAFETY: the slot was the last live one and is now outside the run.
        Some(unsafe { self.storage.read(slot) })
    }

    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let slot = self.start;
        self.start = index::increment(slot, self.capacity());
        self.len -= 1;
        self.registry.touch(slot);
        // SAFETY: the slot was the first live one and is now outside the run.
        Some(unsafe { self.storage.read(slot) })
    }

    /// Removes every element. Invalidates all cursors, `end()` included.
    pub fn clear(&mut self) {
        self.registry.invalidate_all();
        self.drop_contents();
    }

    /// Changes the capacity, dropping elements from the front when the
    /// buffer holds more than `capacity`.
    ///
    /// Survivors move to the new block before the dropped elements are
    /// destroyed, so a panicking destructor still leaves the buffer at the
    /// new capacity with every survivor in place.
    ///
    /// Invalidates every cursor except `end()`.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::AllocationFailed` if the new block cannot
    /// be allocated; the buffer is left untouched.
    pub fn set_capacity(&mut self, capacity: usize) -> Result<(), CircularBufferError> {
        self.reallocate(capacity, Trim::Front)
    }

    /// Changes the capacity, dropping elements from the back when the buffer
    /// holds more than `capacity`. A panicking destructor behaves as in
    /// [`set_capacity`](Self::set_capacity).
    ///
    /// Invalidates every cursor except `end()`.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::AllocationFailed` if the new block cannot
    /// be allocated; the buffer is left untouched.
    pub fn rset_capacity(&mut self, capacity: usize) -> Result<(), CircularBufferError> {
        self.reallocate(capacity, Trim::Back)
    }

    /// Exchanges the contents of two buffers. Cursors of both are invalidated.
    pub fn swap(&mut self, other: &mut Self) {
        self.exchange_contents(other);
        self.registry.invalidate_all();
        other.registry.invalidate_all();
    }

    pub(crate) fn reallocate(
        &mut self,
        capacity: usize,
        trim: Trim,
    ) -> Result<(), CircularBufferError> {
        let previous = self.capacity();
        if capacity == previous {
            return Ok(());
        }
        let mut storage = StorageBlock::allocate(capacity)?;
        let stamps = CursorRegistry::allocate_stamps(capacity)?;

        let kept = self.len.min(capacity);
        let trimmed = self.len - kept;
        let (first_kept, first_trimmed) = match trim {
            Trim::Front => (trimmed, 0),
            Trim::Back => (0, kept),
        };
        for index in 0..kept {
            let slot = self.slot_of(first_kept + index);
            // SAFETY: `slot` is live and is never read again from the old
            // block, so each survivor is moved exactly once.
            unsafe { storage.write(index, self.storage.read(slot)) };
        }
        let trimmed_start = self.slot_of(first_trimmed);

        let mut detached = mem::replace(&mut self.storage, storage);
        self.start = 0;
        self.len = kept;
        self.registry.install_stamps(stamps);
        self.registry.invalidate_all_except_end();
        trace!(previous, capacity, len = kept, trimmed, "reallocated circular buffer storage");

        // The buffer is in its final state before any trimmed element drops.
        // SAFETY: the trimmed run is still live in the detached block, which
        // never drops its slots on its own.
        unsafe {
            let (front, back) = detached.wrapped_slices_mut(trimmed_start, trimmed);
            let _back_dropper = Dropper(back);
            ptr::drop_in_place(front);
        }
        Ok(())
    }

    /// Swaps storage and fill state while each side keeps its own cursor
    /// identity.
    pub(crate) fn exchange_contents(&mut self, other: &mut Self) {
        mem::swap(&mut self.storage, &mut other.storage);
        mem::swap(&mut self.start, &mut other.start);
        mem::swap(&mut self.len, &mut other.len);
        self.registry.exchange_stamps(&mut other.registry);
    }

    /// Drops every live element and resets the fill state. A panicking
    /// destructor still leaves the buffer empty.
    pub(crate) fn drop_contents(&mut self) {
        let (front, back): (*mut [T], *mut [T]) = {
            let (front, back) = self.as_mut_slices();
            (front, back)
        };
        self.start = 0;
        self.len = 0;
        // SAFETY: the slices are no longer covered by `len`, so each element
        // is dropped exactly once even if one destructor panics.
        unsafe {
            let _back_dropper = Dropper(&mut *back);
            ptr::drop_in_place(front);
        }
    }
}

/// Drops a slice in place when it goes out of scope.
struct Dropper<'a, T>(&'a mut [T]);

impl<T> Drop for Dropper<'_, T> {
    fn drop(&mut self) {
        // SAFETY: the owner handed over the slice for dropping.
        unsafe { ptr::drop_in_place(&mut *self.0) }
    }
}

impl<T> Drop for CircularBuffer<T> {
    fn drop(&mut self) {
        self.drop_contents();
    }
}

impl<T> Default for CircularBuffer<T> {
    fn default() -> Self {
        Self {
            storage: StorageBlock::empty(),
            start: 0,
            len: 0,
            registry: CursorRegistry::with_stamps(Box::new([])),
        }
    }
}
