use cyclic_buffer::CircularBuffer;

fn wrapped() -> CircularBuffer<i32> {
    let mut buffer = CircularBuffer::new(5).unwrap();
    buffer.extend(0..8);
    buffer
}

#[test]
fn test_iter_follows_logical_order_across_wrap() {
    let buffer = wrapped();
    assert!(!buffer.is_linearized());
    let items: Vec<i32> = buffer.iter().copied().collect();
    assert_eq!(items, vec![3, 4, 5, 6, 7]);
}

#[test]
fn test_iter_reverse_and_mixed_ends() {
    let buffer = wrapped();
    let reversed: Vec<i32> = buffer.iter().rev().copied().collect();
    assert_eq!(reversed, vec![7, 6, 5, 4, 3]);

    let mut iter = buffer.iter();
    assert_eq!(iter.next(), Some(&3));
    assert_eq!(iter.next_back(), Some(&7));
    assert_eq!(iter.len(), 3);
    assert_eq!(iter.next_back(), Some(&6));
    assert_eq!(iter.next(), Some(&4));
    assert_eq!(iter.next(), Some(&5));
    assert_eq!(iter.next(), None);
    assert_eq!(iter.next_back(), None);
}

#[test]
fn test_iter_is_exact_size() {
    let buffer = wrapped();
    let mut iter = buffer.iter();
    assert_eq!(iter.size_hint(), (5, Some(5)));
    iter.next();
    assert_eq!(iter.len(), 4);

    let empty = CircularBuffer::<i32>::new(3).unwrap();
    assert_eq!(empty.iter().len(), 0);
    assert_eq!(empty.iter().next(), None);
}

#[test]
fn test_iter_clone_is_independent() {
    let buffer = wrapped();
    let mut iter = buffer.iter();
    iter.next();
    let copy = iter.clone();
    iter.next();
    assert_eq!(copy.copied().collect::<Vec<_>>(), vec![4, 5, 6, 7]);
}

#[test]
fn test_iter_mut_updates_in_place() {
    let mut buffer = wrapped();
    for item in buffer.iter_mut() {
        *item *= 10;
    }
    assert_eq!(buffer, [30, 40, 50, 60, 70]);

    if let Some(last) = buffer.iter_mut().next_back() {
        *last = 0;
    }
    assert_eq!(buffer.back(), Some(&0));
}

#[test]
fn test_for_loops_over_references() {
    let mut buffer = wrapped();
    let mut sum = 0;
    for item in &buffer {
        sum += item;
    }
    assert_eq!(sum, 25);

    for item in &mut buffer {
        *item += 1;
    }
    assert_eq!(buffer, [4, 5, 6, 7, 8]);
}

#[test]
fn test_into_iter_drains_both_ends() {
    let buffer = CircularBuffer::from(vec![
        String::from("a"),
        String::from("b"),
        String::from("c"),
    ]);
    let mut iter = buffer.into_iter();
    assert_eq!(iter.len(), 3);
    assert_eq!(iter.next_back().as_deref(), Some("c"));
    assert_eq!(iter.next().as_deref(), Some("a"));
    assert_eq!(iter.next().as_deref(), Some("b"));
    assert_eq!(iter.next(), None);
}

#[test]
fn test_into_iter_partially_consumed_drops_rest() {
    let buffer: CircularBuffer<Vec<u8>> = (0..4).map(|n| vec![n; 3]).collect();
    let mut iter = buffer.into_iter();
    assert_eq!(iter.next(), Some(vec![0, 0, 0]));
    drop(iter);
}

#[test]
fn test_iterator_adapters() {
    let buffer = wrapped();
    let evens: Vec<i32> = buffer.iter().filter(|n| *n % 2 == 0).copied().collect();
    assert_eq!(evens, vec![4, 6]);
    assert_eq!(buffer.iter().max(), Some(&7));
    assert_eq!(buffer.iter().nth(3), Some(&6));
    assert_eq!(buffer.iter().position(|n| *n == 5), Some(2));
}
