use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::{Index, IndexMut};

use crate::cursor::CursorRegistry;
use crate::ring::CircularBuffer;
use crate::storage::StorageBlock;

impl<T: fmt::Debug> fmt::Debug for CircularBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Clone> Clone for CircularBuffer<T> {
    #[allow(clippy::expect_used)]
    fn clone(&self) -> Self {
        let mut copy =
            Self::new(self.capacity()).expect("Allocation of a clone of an existing buffer");
        copy.extend(self.iter().cloned());
        copy
    }
}

impl<T, U> PartialEq<CircularBuffer<U>> for CircularBuffer<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &CircularBuffer<U>) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T: Eq> Eq for CircularBuffer<T> {}

impl<T, U> PartialEq<[U]> for CircularBuffer<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U]) -> bool {
        let (front, back) = self.as_slices();
        self.len() == other.len() && front == &other[..front.len()] && back == &other[front.len()..]
    }
}

impl<T, U> PartialEq<&[U]> for CircularBuffer<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &&[U]) -> bool {
        *self == **other
    }
}

impl<T, U, const N: usize> PartialEq<[U; N]> for CircularBuffer<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U; N]) -> bool {
        *self == other[..]
    }
}

impl<T, U> PartialEq<Vec<U>> for CircularBuffer<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &Vec<U>) -> bool {
        *self == other[..]
    }
}

impl<T: PartialOrd> PartialOrd for CircularBuffer<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord> Ord for CircularBuffer<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Hash> Hash for CircularBuffer<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        self.iter().for_each(|item| item.hash(state));
    }
}

impl<T> Index<usize> for CircularBuffer<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        let length = self.len();
        self.get(index).unwrap_or_else(|| {
            panic!("Index out of range: index {index} is beyond buffer length {length}")
        })
    }
}

impl<T> IndexMut<usize> for CircularBuffer<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let length = self.len();
        self.get_mut(index).unwrap_or_else(|| {
            panic!("Index out of range: index {index} is beyond buffer length {length}")
        })
    }
}

impl<T> Extend<T> for CircularBuffer<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, items: I) {
        for item in items {
            let _ = self.push_back(item);
        }
    }
}

impl<'a, T: Copy + 'a> Extend<&'a T> for CircularBuffer<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, items: I) {
        self.extend(items.into_iter().copied());
    }
}

/// Builds a full buffer whose capacity is the vector length, reusing the
/// vector's allocation for the elements.
impl<T> From<Vec<T>> for CircularBuffer<T> {
    #[allow(clippy::expect_used)]
    fn from(items: Vec<T>) -> Self {
        let len = items.len();
        let registry = CursorRegistry::new(len).expect("Stamp table for an existing allocation");
        Self {
            storage: StorageBlock::from_initialized(items.into_boxed_slice()),
            start: 0,
            len,
            registry,
        }
    }
}

impl<T, const N: usize> From<[T; N]> for CircularBuffer<T> {
    fn from(items: [T; N]) -> Self {
        Self::from(Vec::from(items))
    }
}

impl<T> FromIterator<T> for CircularBuffer<T> {
    fn from_iter<I: IntoIterator<Item = T>>(items: I) -> Self {
        Self::from(items.into_iter().collect::<Vec<_>>())
    }
}
