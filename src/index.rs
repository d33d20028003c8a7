//! Wrap-around arithmetic over physical slot indices.
//!
//! Every position comparison and difference inside the crate goes through
//! these helpers. A one-past-end position is never represented by a slot
//! number: callers pass `None`, which resolves the `start == finish`
//! ambiguity of empty and full rings.

/// Slot after `slot`, wrapping to 0 at the end of the block.
#[inline]
pub(crate) fn increment(slot: usize, capacity: usize) -> usize {
    let next = slot + 1;
    if next == capacity {
        0
    } else {
        next
    }
}

/// Slot before `slot`, wrapping to the last slot at the start of the block.
#[inline]
pub(crate) fn decrement(slot: usize, capacity: usize) -> usize {
    if slot == 0 {
        capacity - 1
    } else {
        slot - 1
    }
}

/// Moves `slot` forward by `n` slots, `n <= capacity`.
#[inline]
pub(crate) fn add(slot: usize, n: usize, capacity: usize) -> usize {
    debug_assert!(n <= capacity);
    let room = capacity - slot;
    if n >= room {
        n - room
    } else {
        slot + n
    }
}

/// Moves `slot` backward by `n` slots, `n <= capacity`.
#[inline]
pub(crate) fn sub(slot: usize, n: usize, capacity: usize) -> usize {
    debug_assert!(n <= capacity);
    if n > slot {
        slot + (capacity - n)
    } else {
        slot - n
    }
}

/// Logical index of a live `slot` in a ring starting at `start`.
#[inline]
pub(crate) fn logical_offset(start: usize, slot: usize, capacity: usize) -> usize {
    if slot >= start {
        slot - start
    } else {
        slot + (capacity - start)
    }
}

/// Logical index of a position, with `None` standing for one-past-end.
#[inline]
pub(crate) fn position_index(
    position: Option<usize>,
    start: usize,
    len: usize,
    capacity: usize,
) -> usize {
    match position {
        Some(slot) => logical_offset(start, slot, capacity),
        None => len,
    }
}

/// Signed number of increments needed to walk from `from` to `to`.
#[inline]
#[allow(clippy::cast_possible_wrap)]
pub(crate) fn logical_distance(
    from: Option<usize>,
    to: Option<usize>,
    start: usize,
    len: usize,
    capacity: usize,
) -> isize {
    let a = position_index(from, start, len, capacity);
    let b = position_index(to, start, len, capacity);
    b as isize - a as isize
}
