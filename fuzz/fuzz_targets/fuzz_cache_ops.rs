#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use memolite::cache::{BoundedCache, EvictionPolicy};

#[derive(Arbitrary, Debug)]
enum Op {
    Put(u8, u8),
    Get(u8),
    Remove(u8),
    Clear,
}

#[derive(Arbitrary, Debug)]
struct Input {
    lru: bool,
    capacity: u8,
    initial_capacity: u8,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let policy = if input.lru { EvictionPolicy::AccessOrder } else { EvictionPolicy::InsertionOrder };
    let capacity = usize::from(input.capacity);
    let mut cache = match BoundedCache::with_tuning(policy, capacity, usize::from(input.initial_capacity), 0.75) {
        Ok(c) => c,
        Err(_) => { assert_eq!(capacity, 0); return; }
    };
    for op in input.ops {
        match op {
            Op::Put(k, v) => { cache.put(k, v); }
            Op::Get(k) => { let _ = cache.get(&k); }
            Op::Remove(k) => { cache.remove(&k); }
            Op::Clear => cache.clear(),
        }
        assert!(cache.len() <= capacity);
        assert_eq!(cache.iter().count(), cache.len());
    }
});
