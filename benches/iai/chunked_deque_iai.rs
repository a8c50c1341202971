//! IAI-Callgrind benchmark for ChunkedDeque operations.
//!
//! Measures instruction counts for end operations, indexed access, middle
//! insertion and removal, iteration and deep copies.
//!
//! # Data Sizes
//!
//! - **push_back / push_front**: 1000, 100000 (the larger size crosses
//!   several directory growths)
//! - **get_sequential / insert_middle / remove_middle**: 1000, 10000
//! - **iter / try_clone**: 10000
//!
//! Setup functions passed through `#[bench::with_setup]` are not attributed
//! to the measurement.

use blockdeque::ChunkedDeque;
use iai_callgrind::{library_benchmark, library_benchmark_group, main};
use std::hint::black_box;

fn setup_deque_1000() -> ChunkedDeque<i32> {
    (0..1000).collect()
}

fn setup_deque_10000() -> ChunkedDeque<i32> {
    (0..10000).collect()
}

#[library_benchmark]
fn push_back_1000() -> ChunkedDeque<i32> {
    let mut deque = ChunkedDeque::new();
    for index in 0..1000 {
        let _ = deque.push_back(black_box(index));
    }
    black_box(deque)
}

#[library_benchmark]
fn push_back_100000() -> ChunkedDeque<i32> {
    let mut deque = ChunkedDeque::new();
    for index in 0..100_000 {
        let _ = deque.push_back(black_box(index));
    }
    black_box(deque)
}

#[library_benchmark]
fn push_front_1000() -> ChunkedDeque<i32> {
    let mut deque = ChunkedDeque::new();
    for index in 0..1000 {
        let _ = deque.push_front(black_box(index));
    }
    black_box(deque)
}

#[library_benchmark]
fn push_front_100000() -> ChunkedDeque<i32> {
    let mut deque = ChunkedDeque::new();
    for index in 0..100_000 {
        let _ = deque.push_front(black_box(index));
    }
    black_box(deque)
}

#[library_benchmark]
#[bench::with_setup(setup_deque_1000())]
fn get_sequential_1000(deque: ChunkedDeque<i32>) -> i64 {
    let deque = black_box(deque);
    let mut sum = 0;
    for index in 0..1000 {
        if let Some(&value) = deque.get(black_box(index)) {
            sum += i64::from(value);
        }
    }
    black_box(sum)
}

#[library_benchmark]
#[bench::with_setup(setup_deque_10000())]
fn get_sequential_10000(deque: ChunkedDeque<i32>) -> i64 {
    let deque = black_box(deque);
    let mut sum = 0;
    for index in 0..10000 {
        if let Some(&value) = deque.get(black_box(index)) {
            sum += i64::from(value);
        }
    }
    black_box(sum)
}

#[library_benchmark]
#[bench::with_setup(setup_deque_1000())]
fn insert_middle_1000(mut deque: ChunkedDeque<i32>) -> ChunkedDeque<i32> {
    let _ = deque.insert(black_box(500), black_box(-1));
    black_box(deque)
}

#[library_benchmark]
#[bench::with_setup(setup_deque_10000())]
fn insert_middle_10000(mut deque: ChunkedDeque<i32>) -> ChunkedDeque<i32> {
    let _ = deque.insert(black_box(5000), black_box(-1));
    black_box(deque)
}

#[library_benchmark]
#[bench::with_setup(setup_deque_1000())]
fn remove_middle_1000(mut deque: ChunkedDeque<i32>) -> ChunkedDeque<i32> {
    let _ = black_box(deque.remove(black_box(500)));
    black_box(deque)
}

#[library_benchmark]
#[bench::with_setup(setup_deque_10000())]
fn remove_middle_10000(mut deque: ChunkedDeque<i32>) -> ChunkedDeque<i32> {
    let _ = black_box(deque.remove(black_box(5000)));
    black_box(deque)
}

#[library_benchmark]
#[bench::with_setup(setup_deque_10000())]
fn iter_10000(deque: ChunkedDeque<i32>) -> i64 {
    let deque = black_box(deque);
    black_box(deque.iter().map(|&value| i64::from(value)).sum())
}

#[library_benchmark]
#[bench::with_setup(setup_deque_10000())]
fn try_clone_10000(deque: ChunkedDeque<i32>) -> ChunkedDeque<i32> {
    black_box(black_box(&deque).try_clone().unwrap_or_default())
}

library_benchmark_group!(
    name = chunked_deque_group;
    benchmarks =
        push_back_1000, push_back_100000,
        push_front_1000, push_front_100000,
        get_sequential_1000, get_sequential_10000,
        insert_middle_1000, insert_middle_10000,
        remove_middle_1000, remove_middle_10000,
        iter_10000,
        try_clone_10000
);

main!(library_benchmark_groups = chunked_deque_group);
