use thiserror::Error;

/// Error types for `CircularBuffer` and `AdaptiveCircularBuffer` operations
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum CircularBufferError {
    /// Logical index is beyond the current buffer length
    #[error("Index out of range: index {index} is beyond buffer length {length}")]
    IndexOutOfRange {
        /// Index that was accessed
        index: usize,
        /// Current length of the buffer
        length: usize,
    },
    /// The storage block could not be allocated
    #[error("Allocation failed: could not reserve storage for {requested} elements")]
    AllocationFailed {
        /// Number of element slots requested
        requested: usize,
    },
    /// Cursor belongs to another buffer or was invalidated by a mutation
    #[error("Invalid cursor: the cursor was invalidated or belongs to another buffer")]
    InvalidCursor,
    /// The one-past-end cursor was dereferenced or erased
    #[error("End of buffer: the end cursor does not refer to an element")]
    EndOfBuffer,
    /// Cursor arithmetic moved outside of `[begin, end]`
    #[error("Cursor out of range: moving index {index} by {offset} leaves buffer length {length}")]
    CursorOutOfRange {
        /// Logical index the cursor started at
        index: usize,
        /// Requested offset
        offset: isize,
        /// Current length of the buffer
        length: usize,
    },
    /// A cursor range whose first position lies after its last position
    #[error("Invalid range: first position {first} is after last position {last}")]
    InvalidRange {
        /// Logical index of the first cursor
        first: usize,
        /// Logical index of the last cursor
        last: usize,
    },
    /// Capacity control with a floor above its ceiling, or a request above the ceiling
    #[error("Invalid capacity: {capacity} is incompatible with minimum capacity {min_capacity}")]
    InvalidCapacity {
        /// Requested (logical) capacity
        capacity: usize,
        /// Requested minimum capacity
        min_capacity: usize,
    },
}
