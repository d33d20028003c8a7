use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use crate::error::CircularBufferError;
use crate::index;
use crate::ring::CircularBuffer;

static NEXT_OWNER: AtomicUsize = AtomicUsize::new(1);

/// A checked position inside a buffer.
///
/// A cursor is a plain `Copy` value: it never borrows the buffer, so it can be
/// kept across mutations. Every operation takes the buffer explicitly and
/// first checks that the cursor is still valid for it. A cursor goes stale
/// when the slot it points to is destroyed, overwritten or relocated, and
/// when the whole buffer is swapped, cleared, reassigned or reallocated.
/// Cursors equal to `end()` survive capacity changes and linearization.
///
/// ```
/// # use cyclic_buffer::CircularBuffer;
/// let mut buffer = CircularBuffer::from(vec![1, 2, 3]);
///
/// let second = buffer.begin().next(&buffer).unwrap();
/// assert_eq!(second.get(&buffer), Ok(&2));
///
/// buffer.pop_back();
/// assert!(second.is_valid(&buffer));
///
/// buffer.push_back(4);
/// buffer.push_back(5); // overwrites the slot holding 1
/// assert!(second.is_valid(&buffer));
/// assert_eq!(second.index(&buffer), Ok(0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor {
    owner: usize,
    slot: Option<usize>,
    generation: u64,
    stamp: u64,
}

/// Buffers that cursors can be resolved against.
pub trait CursorTarget {
    /// Element type of the buffer
    type Item;

    /// The ring that owns the slots cursors point into.
    fn ring(&self) -> &CircularBuffer<Self::Item>;
}

impl<T> CursorTarget for CircularBuffer<T> {
    type Item = T;

    fn ring(&self) -> &CircularBuffer<T> {
        self
    }
}

/// Per-buffer bookkeeping that decides whether a cursor is still valid.
///
/// `generation` covers bulk invalidation, `end_generation` lets end cursors
/// survive reallocation, and `stamps` holds one counter per physical slot that
/// is bumped whenever that slot is destroyed, replaced or relocated.
pub(crate) struct CursorRegistry {
    owner: usize,
    generation: u64,
    end_generation: u64,
    stamps: Box<[u64]>,
}

impl CursorRegistry {
    pub(crate) fn new(capacity: usize) -> Result<Self, CircularBufferError> {
        Ok(Self::with_stamps(Self::allocate_stamps(capacity)?))
    }

    pub(crate) fn with_stamps(stamps: Box<[u64]>) -> Self {
        Self {
            owner: NEXT_OWNER.fetch_add(1, AtomicOrdering::Relaxed),
            generation: 0,
            end_generation: 0,
            stamps,
        }
    }

    pub(crate) fn allocate_stamps(capacity: usize) -> Result<Box<[u64]>, CircularBufferError> {
        let mut stamps = Vec::new();
        stamps
            .try_reserve_exact(capacity)
            .map_err(|_| CircularBufferError::AllocationFailed {
                requested: capacity,
            })?;
        stamps.resize(capacity, 0);
        Ok(stamps.into_boxed_slice())
    }

    /// Replaces the stamp table after the storage block was reallocated.
    pub(crate) fn install_stamps(&mut self, stamps: Box<[u64]>) {
        self.stamps = stamps;
    }

    pub(crate) fn exchange_stamps(&mut self, other: &mut Self) {
        core::mem::swap(&mut self.stamps, &mut other.stamps);
    }

    #[inline]
    pub(crate) fn touch(&mut self, slot: usize) {
        if let Some(stamp) = self.stamps.get_mut(slot) {
            *stamp = stamp.wrapping_add(1);
        }
    }

    pub(crate) fn invalidate_all(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.end_generation = self.end_generation.wrapping_add(1);
    }

    pub(crate) fn invalidate_all_except_end(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    pub(crate) fn slot_cursor(&self, slot: usize) -> Cursor {
        Cursor {
            owner: self.owner,
            slot: Some(slot),
            generation: self.generation,
            stamp: self.stamps.get(slot).copied().unwrap_or_default(),
        }
    }

    pub(crate) fn end_cursor(&self) -> Cursor {
        Cursor {
            owner: self.owner,
            slot: None,
            generation: self.end_generation,
            stamp: 0,
        }
    }

    pub(crate) fn is_valid(&self, cursor: &Cursor) -> bool {
        if cursor.owner != self.owner {
            return false;
        }
        match cursor.slot {
            None => cursor.generation == self.end_generation,
            Some(slot) => {
                cursor.generation == self.generation
                    && self.stamps.get(slot) == Some(&cursor.stamp)
            }
        }
    }
}

impl<T> CircularBuffer<T> {
    /// Cursor to the first element, or `end()` when the buffer is empty.
    #[must_use]
    pub fn begin(&self) -> Cursor {
        self.cursor_for(0)
    }

    /// Cursor one past the last element.
    #[must_use]
    pub fn end(&self) -> Cursor {
        self.registry.end_cursor()
    }

    /// Cursor to the element at logical `index`; `index == len()` yields `end()`.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::IndexOutOfRange` if `index > len()`.
    pub fn cursor_at(&self, index: usize) -> Result<Cursor, CircularBufferError> {
        if index > self.len {
            return Err(CircularBufferError::IndexOutOfRange {
                index,
                length: self.len,
            });
        }
        Ok(self.cursor_for(index))
    }

    /// Mutable access to the element under `cursor`.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::InvalidCursor` for a stale or foreign
    /// cursor and `CircularBufferError::EndOfBuffer` for the end cursor.
    pub fn get_at_mut(&mut self, cursor: Cursor) -> Result<&mut T, CircularBufferError> {
        let index = self.resolve(cursor)?;
        self.get_mut(index).ok_or(CircularBufferError::EndOfBuffer)
    }

    pub(crate) fn cursor_for(&self, index: usize) -> Cursor {
        debug_assert!(index <= self.len);
        if index >= self.len {
            self.registry.end_cursor()
        } else {
            self.registry.slot_cursor(self.slot_of(index))
        }
    }

    /// Logical index of a cursor after checking it belongs to this buffer.
    pub(crate) fn resolve(&self, cursor: Cursor) -> Result<usize, CircularBufferError> {
        if !self.registry.is_valid(&cursor) {
            return Err(CircularBufferError::InvalidCursor);
        }
        Ok(index::position_index(
            cursor.slot,
            self.start,
            self.len,
            self.capacity(),
        ))
    }
}

impl Cursor {
    /// Whether this is a one-past-end cursor.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.slot.is_none()
    }

    #[must_use]
    pub fn is_valid<B: CursorTarget + ?Sized>(&self, buffer: &B) -> bool {
        buffer.ring().registry.is_valid(self)
    }

    /// Logical index of the cursor, `len()` for the end cursor.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::InvalidCursor` if the cursor is stale.
    pub fn index<B: CursorTarget + ?Sized>(&self, buffer: &B) -> Result<usize, CircularBufferError> {
        buffer.ring().resolve(*self)
    }

    /// Element under the cursor.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::InvalidCursor` if the cursor is stale and
    /// `CircularBufferError::EndOfBuffer` if it is the end cursor.
    pub fn get<'a, B: CursorTarget + ?Sized>(
        &self,
        buffer: &'a B,
    ) -> Result<&'a B::Item, CircularBufferError> {
        let ring = buffer.ring();
        let index = ring.resolve(*self)?;
        ring.get(index).ok_or(CircularBufferError::EndOfBuffer)
    }

    /// Cursor to the following element.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::CursorOutOfRange` when called on the end
    /// cursor, or `CircularBufferError::InvalidCursor` if the cursor is stale.
    pub fn next<B: CursorTarget + ?Sized>(&self, buffer: &B) -> Result<Self, CircularBufferError> {
        self.offset(buffer, 1)
    }

    /// Cursor to the preceding element.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::CursorOutOfRange` when called on `begin()`,
    /// or `CircularBufferError::InvalidCursor` if the cursor is stale.
    pub fn prev<B: CursorTarget + ?Sized>(&self, buffer: &B) -> Result<Self, CircularBufferError> {
        self.offset(buffer, -1)
    }

    /// Cursor moved by `n` logical positions; the result must stay within
    /// `[begin(), end()]`.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::CursorOutOfRange` if the target position
    /// lies outside the buffer, or `CircularBufferError::InvalidCursor` if the
    /// cursor is stale.
    pub fn offset<B: CursorTarget + ?Sized>(
        &self,
        buffer: &B,
        n: isize,
    ) -> Result<Self, CircularBufferError> {
        let ring = buffer.ring();
        let index = ring.resolve(*self)?;
        let length = ring.len();
        match index.checked_add_signed(n) {
            Some(target) if target <= length => Ok(ring.cursor_for(target)),
            _ => Err(CircularBufferError::CursorOutOfRange {
                index,
                offset: n,
                length,
            }),
        }
    }

    /// Signed number of steps from `self` to `other`.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::InvalidCursor` if either cursor is stale.
    pub fn distance_to<B: CursorTarget + ?Sized>(
        &self,
        other: &Self,
        buffer: &B,
    ) -> Result<isize, CircularBufferError> {
        let ring = buffer.ring();
        if !ring.registry.is_valid(self) || !ring.registry.is_valid(other) {
            return Err(CircularBufferError::InvalidCursor);
        }
        Ok(index::logical_distance(
            self.slot,
            other.slot,
            ring.start,
            ring.len(),
            ring.capacity(),
        ))
    }

    /// Orders two cursors by logical position.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::InvalidCursor` if either cursor is stale.
    pub fn compare<B: CursorTarget + ?Sized>(
        &self,
        other: &Self,
        buffer: &B,
    ) -> Result<Ordering, CircularBufferError> {
        Ok(self.distance_to(other, buffer)?.cmp(&0).reverse())
    }
}
