use crate::error::CircularBufferError;

/// Capacity settings of an `AdaptiveCircularBuffer`.
///
/// `capacity` is the most elements the buffer will ever hold; `min_capacity`
/// is the amount of storage it keeps allocated even when (nearly) empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CapacityControl {
    capacity: usize,
    min_capacity: usize,
}

impl CapacityControl {
    /// # Errors
    ///
    /// Returns `CircularBufferError::InvalidCapacity` if `min_capacity`
    /// exceeds `capacity`.
    pub fn new(capacity: usize, min_capacity: usize) -> Result<Self, CircularBufferError> {
        if min_capacity > capacity {
            return Err(CircularBufferError::InvalidCapacity {
                capacity,
                min_capacity,
            });
        }
        Ok(Self {
            capacity,
            min_capacity,
        })
    }

    /// Settings without a storage floor.
    #[must_use]
    pub fn unbounded_min(capacity: usize) -> Self {
        Self {
            capacity,
            min_capacity: 0,
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn min_capacity(&self) -> usize {
        self.min_capacity
    }

    /// Raises the ceiling, keeping the floor.
    pub(crate) fn grow_to(&mut self, capacity: usize) {
        self.capacity = self.capacity.max(capacity);
    }
}

impl From<usize> for CapacityControl {
    fn from(capacity: usize) -> Self {
        Self::unbounded_min(capacity)
    }
}
