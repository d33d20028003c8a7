#![no_std]

//! `CircularBuffer`: a fixed-capacity ring buffer with checked cursors.
//!
//! The buffer stores its elements in one storage block allocated up front.
//! Pushing at either end is O(1), and pushing onto a full buffer overwrites
//! the element at the opposite end instead of growing. Elements can also be
//! inserted or erased anywhere; those operations move whichever side of the
//! ring is shorter.
//!
//! `AdaptiveCircularBuffer` offers the same interface but allocates lazily:
//! its storage grows and shrinks with the number of elements, bounded by a
//! configured capacity and an optional storage floor.
//!
//! This crate is `no_std` compatible and only needs `alloc`.
//!
//! # Performance Characteristics
//!
//! ## Time Complexity
//! - `push_back()`, `push_front()`, `pop_back()`, `pop_front()`: O(1)
//! - `get()`, `at()`, indexing: O(1) - one wrap-around addition
//! - `insert*()`, `erase*()`: O(min(distance to front, distance to back) + n)
//! - `linearize()`: O(1) if already contiguous, otherwise O(capacity)
//! - `set_capacity()`, `resize()` with growth, `clear()`: O(len)
//!
//! ## Space Complexity
//! - One storage block of `capacity` slots
//! - One 8-byte stamp per slot for cursor validation
//!
//! ## `no_std` Compatibility
//!
//! Enable the optional `std` feature to build `thiserror` and `tracing`
//! against `std`:
//! ```toml
//! [dependencies]
//! cyclic_buffer = { version = "0.1", features = ["std"] }
//! ```
//!
//! # Overwriting at the Ends
//!
//! ```
//! # use cyclic_buffer::CircularBuffer;
//! let mut buffer = CircularBuffer::new(3).unwrap();
//! buffer.push_back(1);
//! buffer.push_back(2);
//! buffer.push_back(3);
//! assert!(buffer.is_full());
//!
//! // The oldest element makes room and is handed back
//! assert_eq!(buffer.push_back(4), Some(1));
//! assert_eq!(buffer, [2, 3, 4]);
//!
//! assert_eq!(buffer.push_front(0), Some(4));
//! assert_eq!(buffer, [0, 2, 3]);
//!
//! assert_eq!(buffer.pop_front(), Some(0));
//! assert_eq!(buffer.pop_back(), Some(3));
//! assert_eq!(buffer.len(), 1);
//! ```
//!
//! # Inserting in the Middle
//!
//! Inserting never grows the buffer. `insert` makes room by evicting from the
//! front and keeps the last of the inserted items; `rinsert` evicts from the
//! back and keeps the first ones:
//!
//! ```
//! # use cyclic_buffer::CircularBuffer;
//! let mut buffer = CircularBuffer::new(6).unwrap();
//! buffer.extend([1, 2, 3, 4]);
//! let pos = buffer.cursor_at(2).unwrap();
//! buffer.insert_iter(pos, [5, 6, 7, 8, 9]).unwrap();
//! assert_eq!(buffer, [6, 7, 8, 9, 3, 4]);
//!
//! let mut buffer = CircularBuffer::new(6).unwrap();
//! buffer.extend([1, 2, 3, 4]);
//! let pos = buffer.cursor_at(2).unwrap();
//! buffer.rinsert_iter(pos, [5, 6, 7, 8, 9]).unwrap();
//! assert_eq!(buffer, [1, 2, 5, 6, 7, 8]);
//! ```
//!
//! # Cursors
//!
//! Positions are `Cursor` values. They do not borrow the buffer, and every
//! use is checked: a cursor whose element was removed, overwritten or moved
//! is rejected with `CircularBufferError::InvalidCursor`.
//!
//! ```
//! # use cyclic_buffer::{CircularBuffer, CircularBufferError};
//! let mut buffer = CircularBuffer::from(vec![1, 2, 3]);
//! let first = buffer.begin();
//! let last = buffer.cursor_at(2).unwrap();
//!
//! buffer.push_back(4); // overwrites 1
//! assert_eq!(first.get(&buffer), Err(CircularBufferError::InvalidCursor));
//! assert_eq!(last.get(&buffer), Ok(&3));
//! assert_eq!(last.index(&buffer), Ok(1));
//! ```
//!
//! # Contiguous Access
//!
//! ```
//! # use cyclic_buffer::CircularBuffer;
//! let mut buffer = CircularBuffer::new(4).unwrap();
//! buffer.extend([1, 2, 3, 4, 5, 6]);
//! assert_eq!(buffer.array_one(), &[3, 4]);
//! assert_eq!(buffer.array_two(), &[5, 6]);
//!
//! assert_eq!(buffer.linearize(), &[3, 4, 5, 6]);
//! assert!(buffer.array_two().is_empty());
//! ```
//!
//! # Adaptive Storage
//!
//! ```
//! # use cyclic_buffer::{AdaptiveCircularBuffer, CapacityControl};
//! let control = CapacityControl::new(100, 8).unwrap();
//! let mut buffer = AdaptiveCircularBuffer::new(control).unwrap();
//! assert_eq!(buffer.internal_capacity(), 8);
//!
//! for i in 0..50 {
//!     buffer.push_back(i).unwrap();
//! }
//! assert!(buffer.internal_capacity() >= 50);
//!
//! while buffer.len() > 2 {
//!     buffer.pop_front();
//! }
//! assert_eq!(buffer.internal_capacity(), 8);
//! ```

extern crate alloc;

mod adaptive;
mod control;
mod cursor;
mod edit;
mod error;
mod impls;
mod index;
mod iter;
mod ring;
mod storage;

// Re-export public types and traits
pub use adaptive::AdaptiveCircularBuffer;
pub use control::CapacityControl;
pub use cursor::{Cursor, CursorTarget};
pub use error::CircularBufferError;
pub use iter::{IntoIter, Iter, IterMut};
pub use ring::CircularBuffer;
