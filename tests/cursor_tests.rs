use std::cmp::Ordering;

use cyclic_buffer::{CircularBuffer, CircularBufferError};

fn full_buffer(items: &[i32]) -> CircularBuffer<i32> {
    CircularBuffer::from(items.to_vec())
}

#[test]
fn test_begin_and_end_of_empty_buffer_coincide() {
    let buffer = CircularBuffer::<i32>::new(3).unwrap();
    assert!(buffer.begin().is_end());
    assert_eq!(buffer.begin(), buffer.end());
    assert_eq!(buffer.begin().get(&buffer), Err(CircularBufferError::EndOfBuffer));
}

#[test]
fn test_walk_forward_and_back() {
    let mut buffer = CircularBuffer::new(4).unwrap();
    buffer.extend(1..=6);

    let mut cursor = buffer.begin();
    let mut seen = Vec::new();
    while !cursor.is_end() {
        seen.push(*cursor.get(&buffer).unwrap());
        cursor = cursor.next(&buffer).unwrap();
    }
    assert_eq!(seen, vec![3, 4, 5, 6]);

    let last = buffer.end().prev(&buffer).unwrap();
    assert_eq!(last.get(&buffer), Ok(&6));
}

#[test]
fn test_stepping_outside_is_rejected() {
    let buffer = full_buffer(&[1, 2, 3]);
    assert_eq!(
        buffer.end().next(&buffer),
        Err(CircularBufferError::CursorOutOfRange {
            index: 3,
            offset: 1,
            length: 3
        })
    );
    assert_eq!(
        buffer.begin().prev(&buffer),
        Err(CircularBufferError::CursorOutOfRange {
            index: 0,
            offset: -1,
            length: 3
        })
    );
    assert!(buffer.begin().offset(&buffer, 4).is_err());
}

#[test]
fn test_offset_and_distance() {
    let mut buffer = CircularBuffer::new(5).unwrap();
    buffer.extend(0..8);
    let begin = buffer.begin();
    let end = buffer.end();

    assert_eq!(begin.distance_to(&end, &buffer), Ok(5));
    assert_eq!(end.distance_to(&begin, &buffer), Ok(-5));

    let third = begin.offset(&buffer, 2).unwrap();
    assert_eq!(third.get(&buffer), Ok(&5));
    assert_eq!(third.offset(&buffer, -2), Ok(begin));
    assert_eq!(third.offset(&buffer, 3), Ok(end));
    assert_eq!(buffer.cursor_at(5), Ok(end));
    assert!(buffer.cursor_at(6).is_err());
}

#[test]
fn test_compare_orders_by_position() {
    let mut buffer = CircularBuffer::new(3).unwrap();
    buffer.extend([1, 2, 3, 4]);
    let begin = buffer.begin();
    let middle = buffer.cursor_at(1).unwrap();
    let end = buffer.end();
    assert_eq!(begin.compare(&middle, &buffer), Ok(Ordering::Less));
    assert_eq!(end.compare(&middle, &buffer), Ok(Ordering::Greater));
    assert_eq!(middle.compare(&middle, &buffer), Ok(Ordering::Equal));
}

#[test]
fn test_get_at_mut_writes_through() {
    let mut buffer = full_buffer(&[1, 2, 3]);
    let middle = buffer.cursor_at(1).unwrap();
    *buffer.get_at_mut(middle).unwrap() = 20;
    assert_eq!(buffer, [1, 20, 3]);
    assert_eq!(
        buffer.get_at_mut(buffer.end()),
        Err(CircularBufferError::EndOfBuffer)
    );
}

#[test]
fn test_swap_invalidates_both_buffers() {
    let mut first = CircularBuffer::filled(10, 0).unwrap();
    let mut second = CircularBuffer::filled(20, 0).unwrap();
    let end = first.end();
    let begin = second.begin();
    assert!(end.is_valid(&first));
    assert!(begin.is_valid(&second));

    first.swap(&mut second);
    assert!(!end.is_valid(&first));
    assert!(!end.is_valid(&second));
    assert!(!begin.is_valid(&first));
    assert!(!begin.is_valid(&second));
}

#[test]
fn test_push_back_on_full_invalidates_only_overwritten_slot() {
    let mut buffer = CircularBuffer::filled(20, 0).unwrap();
    let fourth = buffer.cursor_at(3).unwrap();
    let first = buffer.begin();
    buffer.push_back(1);
    assert!(fourth.is_valid(&buffer));
    assert!(!first.is_valid(&buffer));
    assert_eq!(first.get(&buffer), Err(CircularBufferError::InvalidCursor));
}

#[test]
fn test_push_front_on_full_invalidates_only_overwritten_slot() {
    let mut buffer = full_buffer(&[1, 2, 3, 4, 5]);
    let fourth = buffer.cursor_at(3).unwrap();
    let last = buffer.end().prev(&buffer).unwrap();
    buffer.push_front(7);
    assert!(fourth.is_valid(&buffer));
    assert!(!last.is_valid(&buffer));
    assert_eq!(fourth.index(&buffer), Ok(4));
}

#[test]
fn test_insert_into_full_keeps_untouched_cursors() {
    let mut buffer = full_buffer(&[1, 2, 3, 4, 5]);
    let third = buffer.cursor_at(2).unwrap();
    let first = buffer.begin();
    buffer.insert(buffer.cursor_at(3).unwrap(), 6).unwrap();
    assert!(third.is_valid(&buffer));
    assert!(!first.is_valid(&buffer));
    assert_eq!(third.get(&buffer), Ok(&3));
}

#[test]
fn test_rinsert_into_full_keeps_untouched_cursors() {
    let mut buffer = full_buffer(&[1, 2, 3, 4, 5]);
    let fourth = buffer.cursor_at(3).unwrap();
    let first = buffer.begin();
    buffer.rinsert(buffer.cursor_at(2).unwrap(), 6).unwrap();
    assert!(fourth.is_valid(&buffer));
    assert!(!first.is_valid(&buffer));
    assert_eq!(buffer, [1, 2, 6, 3, 4]);
    assert_eq!(fourth.get(&buffer), Ok(&4));
}

#[test]
fn test_pop_invalidates_only_removed_element() {
    let mut buffer = CircularBuffer::filled(20, 0).unwrap();
    let middle = buffer.cursor_at(5).unwrap();
    let last = buffer.end().prev(&buffer).unwrap();
    buffer.pop_back();
    assert!(middle.is_valid(&buffer));
    assert!(!last.is_valid(&buffer));

    let first = buffer.begin();
    buffer.pop_front();
    assert!(middle.is_valid(&buffer));
    assert!(!first.is_valid(&buffer));
    assert_eq!(middle.index(&buffer), Ok(4));
}

#[test]
fn test_set_capacity_keeps_only_end_cursors() {
    let mut buffer = full_buffer(&[1, 2, 3]);
    let end = buffer.end();
    let first = buffer.begin();
    buffer.set_capacity(10).unwrap();
    assert!(end.is_valid(&buffer));
    assert!(!first.is_valid(&buffer));

    buffer.rset_capacity(2).unwrap();
    assert!(end.is_valid(&buffer));
    assert_eq!(end.index(&buffer), Ok(2));
}

#[test]
fn test_linearize_keeps_only_end_cursors() {
    let mut buffer = CircularBuffer::new(4).unwrap();
    buffer.extend(0..6);
    let end = buffer.end();
    let first = buffer.begin();
    buffer.linearize();
    assert!(end.is_valid(&buffer));
    assert!(!first.is_valid(&buffer));

    // Nothing moves the second time
    let first = buffer.begin();
    buffer.linearize();
    assert!(first.is_valid(&buffer));
}

#[test]
fn test_clear_and_assign_invalidate_end_too() {
    let mut buffer = full_buffer(&[1, 2, 3]);
    let end = buffer.end();
    buffer.clear();
    assert!(!end.is_valid(&buffer));

    let end = buffer.end();
    buffer.assign(2, 5).unwrap();
    assert!(!end.is_valid(&buffer));
}

#[test]
fn test_cursor_of_clone_is_foreign() {
    let buffer = full_buffer(&[1, 2, 3]);
    let copy = buffer.clone();
    let cursor = buffer.begin();
    assert!(!cursor.is_valid(&copy));
    assert_eq!(cursor.index(&copy), Err(CircularBufferError::InvalidCursor));
}

#[test]
fn test_distance_with_stale_cursor_fails() {
    let mut buffer = full_buffer(&[1, 2, 3]);
    let first = buffer.begin();
    buffer.pop_front();
    assert_eq!(
        first.distance_to(&buffer.end(), &buffer),
        Err(CircularBufferError::InvalidCursor)
    );
}
