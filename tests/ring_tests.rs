use cyclic_buffer::{CircularBuffer, CircularBufferError};

fn collect(buffer: &CircularBuffer<i32>) -> Vec<i32> {
    buffer.iter().copied().collect()
}

#[test]
fn test_new_buffer_is_empty() {
    let buffer = CircularBuffer::<i32>::new(5).unwrap();
    assert_eq!(buffer.capacity(), 5);
    assert_eq!(buffer.len(), 0);
    assert!(buffer.is_empty());
    assert!(!buffer.is_full());
    assert_eq!(buffer.remaining_capacity(), 5);
    assert_eq!(buffer.front(), None);
    assert_eq!(buffer.back(), None);
}

#[test]
fn test_push_back_until_full() {
    let mut buffer = CircularBuffer::new(3).unwrap();
    assert_eq!(buffer.push_back(1), None);
    assert_eq!(buffer.push_back(2), None);
    assert_eq!(buffer.push_back(3), None);
    assert!(buffer.is_full());
    assert_eq!(buffer.remaining_capacity(), 0);
    assert_eq!(collect(&buffer), vec![1, 2, 3]);
}

#[test]
fn test_push_back_on_full_evicts_front() {
    let mut buffer = CircularBuffer::from(vec![10, 11, 12, 13]);
    assert_eq!(buffer.push_back(99), Some(10));
    assert_eq!(collect(&buffer), vec![11, 12, 13, 99]);
    assert_eq!(buffer.len(), 4);
}

#[test]
fn test_push_front_on_full_evicts_back() {
    let mut buffer = CircularBuffer::from(vec![10, 11, 12, 13]);
    assert_eq!(buffer.push_front(99), Some(13));
    assert_eq!(collect(&buffer), vec![99, 10, 11, 12]);
    assert_eq!(buffer.len(), 4);
}

#[test]
fn test_push_front_wraps_storage() {
    let mut buffer = CircularBuffer::new(4).unwrap();
    buffer.push_front(1);
    buffer.push_front(2);
    buffer.push_back(3);
    assert_eq!(collect(&buffer), vec![2, 1, 3]);
    assert_eq!(buffer.front(), Some(&2));
    assert_eq!(buffer.back(), Some(&3));
}

#[test]
fn test_pop_both_ends() {
    let mut buffer = CircularBuffer::from(vec![1, 2, 3, 4]);
    assert_eq!(buffer.pop_front(), Some(1));
    assert_eq!(buffer.pop_back(), Some(4));
    assert_eq!(collect(&buffer), vec![2, 3]);
    assert_eq!(buffer.pop_back(), Some(3));
    assert_eq!(buffer.pop_front(), Some(2));
    assert_eq!(buffer.pop_front(), None);
    assert_eq!(buffer.pop_back(), None);
    assert!(buffer.is_empty());
}

#[test]
fn test_zero_capacity_rejects_pushes() {
    let mut buffer = CircularBuffer::new(0).unwrap();
    assert_eq!(buffer.push_back(1), Some(1));
    assert_eq!(buffer.push_front(2), Some(2));
    assert!(buffer.is_empty());
    assert!(buffer.is_full());
    assert_eq!(buffer.pop_back(), None);

    let default = CircularBuffer::<i32>::default();
    assert_eq!(default.capacity(), 0);
}

#[test]
fn test_at_reports_index_and_length() {
    let buffer = CircularBuffer::from(vec![1, 2, 3]);
    assert_eq!(buffer.at(2), Ok(&3));
    assert_eq!(
        buffer.at(3),
        Err(CircularBufferError::IndexOutOfRange {
            index: 3,
            length: 3
        })
    );
}

#[test]
fn test_at_mut_and_index_mut() {
    let mut buffer = CircularBuffer::from(vec![1, 2, 3]);
    *buffer.at_mut(0).unwrap() = 10;
    buffer[1] = 20;
    *buffer.back_mut().unwrap() = 30;
    assert_eq!(buffer, [10, 20, 30]);
    assert!(buffer.at_mut(5).is_err());
}

#[test]
#[should_panic(expected = "Index out of range")]
fn test_index_out_of_range_panics() {
    let buffer = CircularBuffer::from(vec![1, 2, 3]);
    let _ = buffer[3];
}

#[test]
fn test_indexing_follows_logical_order_after_wrap() {
    let mut buffer = CircularBuffer::new(4).unwrap();
    buffer.extend(0..7);
    assert_eq!(buffer[0], 3);
    assert_eq!(buffer[3], 6);
    assert_eq!(buffer.get(4), None);
}

#[test]
fn test_filled_clones_item() {
    let buffer = CircularBuffer::filled(3, String::from("x")).unwrap();
    assert!(buffer.is_full());
    assert!(buffer.iter().all(|s| s == "x"));
}

#[test]
fn test_with_capacity_from_keeps_last_items() {
    let buffer = CircularBuffer::with_capacity_from(3, 1..=5).unwrap();
    assert_eq!(buffer, [3, 4, 5]);

    let buffer = CircularBuffer::with_capacity_from(5, 1..=2).unwrap();
    assert_eq!(buffer, [1, 2]);
    assert_eq!(buffer.capacity(), 5);
}

#[test]
fn test_from_vec_is_full_with_exact_capacity() {
    let buffer = CircularBuffer::from(vec![1, 2, 3]);
    assert_eq!(buffer.capacity(), 3);
    assert!(buffer.is_full());

    let collected: CircularBuffer<i32> = (0..4).collect();
    assert_eq!(collected.capacity(), 4);
    assert_eq!(collected, [0, 1, 2, 3]);

    let from_array = CircularBuffer::from([7, 8]);
    assert_eq!(from_array, vec![7, 8]);
}

#[test]
fn test_clone_preserves_capacity_and_order() {
    let mut buffer = CircularBuffer::new(5).unwrap();
    buffer.extend(0..8);
    let copy = buffer.clone();
    assert_eq!(copy.capacity(), 5);
    assert_eq!(copy, buffer);
    assert_eq!(collect(&copy), vec![3, 4, 5, 6, 7]);
}

#[test]
fn test_equality_ignores_layout_and_capacity() {
    let mut wrapped = CircularBuffer::new(3).unwrap();
    wrapped.extend([0, 1, 2, 3]);
    let mut roomy = CircularBuffer::new(10).unwrap();
    roomy.extend([1, 2, 3]);
    assert_eq!(wrapped, roomy);
    assert_eq!(wrapped, [1, 2, 3]);
    assert_eq!(wrapped, &[1, 2, 3][..]);
    assert_ne!(wrapped, [1, 2]);
}

#[test]
fn test_ordering_is_lexicographic() {
    let a = CircularBuffer::from(vec![1, 2, 3]);
    let b = CircularBuffer::from(vec![1, 3]);
    let c = CircularBuffer::from(vec![1, 2]);
    assert!(a < b);
    assert!(c < a);
    assert_eq!(a.cmp(&a.clone()), std::cmp::Ordering::Equal);
}

#[test]
fn test_hash_matches_for_equal_contents() {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(buffer: &CircularBuffer<i32>) -> u64 {
        let mut hasher = DefaultHasher::new();
        buffer.hash(&mut hasher);
        hasher.finish()
    }

    let mut wrapped = CircularBuffer::new(3).unwrap();
    wrapped.extend([0, 1, 2, 3]);
    let plain = CircularBuffer::from(vec![1, 2, 3]);
    assert_eq!(hash_of(&wrapped), hash_of(&plain));
}

#[test]
fn test_debug_lists_elements() {
    let mut buffer = CircularBuffer::new(2).unwrap();
    buffer.extend([1, 2, 3]);
    assert_eq!(format!("{:?}", buffer), "[2, 3]");
}

#[test]
fn test_swap_exchanges_contents_and_capacity() {
    let mut first = CircularBuffer::from(vec![1, 2, 3]);
    let mut second = CircularBuffer::new(10).unwrap();
    second.push_back(9);

    first.swap(&mut second);
    assert_eq!(first, [9]);
    assert_eq!(first.capacity(), 10);
    assert_eq!(second, [1, 2, 3]);
    assert_eq!(second.capacity(), 3);
}

#[test]
fn test_clear_keeps_capacity() {
    let mut buffer = CircularBuffer::from(vec![1, 2, 3]);
    buffer.clear();
    assert!(buffer.is_empty());
    assert_eq!(buffer.capacity(), 3);
    buffer.push_back(4);
    assert_eq!(buffer, [4]);
}

#[test]
fn test_extend_by_reference() {
    let mut buffer: CircularBuffer<i32> = CircularBuffer::new(3).unwrap();
    buffer.extend(&[1, 2, 3, 4]);
    assert_eq!(buffer, [2, 3, 4]);
}

#[test]
fn test_error_messages() {
    let error = CircularBufferError::IndexOutOfRange {
        index: 7,
        length: 3,
    };
    assert_eq!(
        error.to_string(),
        "Index out of range: index 7 is beyond buffer length 3"
    );
    assert_eq!(
        CircularBufferError::AllocationFailed { requested: 4 }.to_string(),
        "Allocation failed: could not reserve storage for 4 elements"
    );
}
