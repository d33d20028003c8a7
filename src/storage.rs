use alloc::boxed::Box;
use alloc::vec::Vec;
use core::mem::MaybeUninit;

use crate::error::CircularBufferError;

/// Fixed-size block of possibly uninitialized element slots.
///
/// The block never tracks which slots are live. Callers derive liveness from
/// their own `start`/`len` bookkeeping and must uphold it for every `unsafe`
/// accessor below.
pub(crate) struct StorageBlock<T> {
    slots: Box<[MaybeUninit<T>]>,
}

impl<T> StorageBlock<T> {
    /// Allocates `capacity` raw slots.
    ///
    /// # Errors
    ///
    /// Returns `CircularBufferError::AllocationFailed` if the allocator refuses
    /// the request or the byte size overflows.
    pub(crate) fn allocate(capacity: usize) -> Result<Self, CircularBufferError> {
        let mut slots: Vec<MaybeUninit<T>> = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| CircularBufferError::AllocationFailed {
                requested: capacity,
            })?;
        slots.resize_with(capacity, MaybeUninit::uninit);
        Ok(Self {
            slots: slots.into_boxed_slice(),
        })
    }

    pub(crate) fn empty() -> Self {
        Self {
            slots: Box::new([]),
        }
    }

    /// Takes over a boxed slice whose slots are all initialized.
    pub(crate) fn from_initialized(items: Box<[T]>) -> Self {
        let raw = Box::into_raw(items) as *mut [MaybeUninit<T>];
        // SAFETY: `MaybeUninit<T>` has the same layout as `T`, so the allocation
        // and its length stay valid under the new element type.
        let slots = unsafe { Box::from_raw(raw) };
        Self { slots }
    }

    #[must_use]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// # Safety
    ///
    /// `slot` must be raw. A live slot would be overwritten without running
    /// its destructor.
    pub(crate) unsafe fn write(&mut self, slot: usize, value: T) {
        self.slots[slot].write(value);
    }

    /// Moves the value out, leaving the slot raw.
    ///
    /// # Safety
    ///
    /// `slot` must be live, and the caller must treat it as raw afterwards.
    pub(crate) unsafe fn read(&mut self, slot: usize) -> T {
        self.slots[slot].assume_init_read()
    }

    /// # Safety
    ///
    /// `slot` must be live.
    pub(crate) unsafe fn get(&self, slot: usize) -> &T {
        self.slots[slot].assume_init_ref()
    }

    /// # Safety
    ///
    /// `slot` must be live.
    pub(crate) unsafe fn get_mut(&mut self, slot: usize) -> &mut T {
        self.slots[slot].assume_init_mut()
    }

    /// The live run of `len` slots starting at `start`, split where it wraps.
    ///
    /// # Safety
    ///
    /// The `len` slots following `start` (with wrap-around) must be live.
    pub(crate) unsafe fn wrapped_slices(&self, start: usize, len: usize) -> (&[T], &[T]) {
        if len == 0 {
            return (&[], &[]);
        }
        let (head, tail) = self.slots.split_at(start);
        if len <= tail.len() {
            (assume_init_slice(&tail[..len]), &[])
        } else {
            let wrapped = len - tail.len();
            (assume_init_slice(tail), assume_init_slice(&head[..wrapped]))
        }
    }

    /// # Safety
    ///
    /// Same contract as [`StorageBlock::wrapped_slices`].
    pub(crate) unsafe fn wrapped_slices_mut(
        &mut self,
        start: usize,
        len: usize,
    ) -> (&mut [T], &mut [T]) {
        if len == 0 {
            return (&mut [], &mut []);
        }
        let (head, tail) = self.slots.split_at_mut(start);
        if len <= tail.len() {
            (assume_init_slice_mut(&mut tail[..len]), &mut [])
        } else {
            let wrapped = len - tail.len();
            (
                assume_init_slice_mut(tail),
                assume_init_slice_mut(&mut head[..wrapped]),
            )
        }
    }

    /// Exchanges the contents of two slots, live or raw.
    pub(crate) fn swap(&mut self, a: usize, b: usize) {
        self.slots.swap(a, b);
    }

    /// Rotates every slot left by `mid` along displacement cycles, so the slot
    /// at `mid` ends up at 0.
    ///
    /// Returns the number of slots relocated, which is the whole block unless
    /// the rotation is a no-op.
    pub(crate) fn rotate_left(&mut self, mid: usize) -> usize {
        let n = self.slots.len();
        if n == 0 || mid % n == 0 {
            return 0;
        }
        let mid = mid % n;
        let mut relocated = 0;
        for leader in 0..gcd(n, mid) {
            let mut hole = leader;
            loop {
                let mut next = hole + mid;
                if next >= n {
                    next -= n;
                }
                if next == leader {
                    break;
                }
                self.slots.swap(hole, next);
                relocated += 1;
                hole = next;
            }
            relocated += 1;
        }
        relocated
    }
}

unsafe fn assume_init_slice<T>(part: &[MaybeUninit<T>]) -> &[T] {
    core::slice::from_raw_parts(part.as_ptr().cast::<T>(), part.len())
}

unsafe fn assume_init_slice_mut<T>(part: &mut [MaybeUninit<T>]) -> &mut [T] {
    core::slice::from_raw_parts_mut(part.as_mut_ptr().cast::<T>(), part.len())
}

pub(crate) fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}
