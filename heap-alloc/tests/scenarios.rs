//! End-to-end scenarios exercising the public `Allocator` API as a black
//! box, matching the style of the teacher workspace's `tests/` suites
//! (e.g. `kernel-sync/tests/spin_lock.rs`).

use heap_alloc::{Allocator, FixedCapacityArena};

fn new_allocator() -> Box<Allocator<FixedCapacityArena<8192>>> {
    let mut allocator = Box::new(Allocator::new(FixedCapacityArena::new()));
    allocator.init().expect("fixed arena has room for the initial extension");
    allocator
}

#[test]
fn simple_allocate_then_free_leaves_a_consistent_heap() {
    let mut allocator = new_allocator();
    let ptr = allocator.allocate(100).expect("small allocation must succeed");
    unsafe { ptr.as_ptr().write_bytes(0x42, 100) };
    allocator.check().expect("heap must stay consistent after an allocation");

    unsafe { allocator.free(ptr) };
    allocator.check().expect("heap must stay consistent after a free");
}

#[test]
fn splitting_a_large_free_block_creates_a_usable_leftover() {
    let mut allocator = new_allocator();
    let a = allocator.allocate(16).expect("first small allocation");
    let b = allocator.allocate(16).expect("second allocation should use split leftover");
    assert_ne!(a, b);
    allocator.check().expect("heap consistent after two small allocations");

    unsafe {
        allocator.free(a);
        allocator.free(b);
    }
}

#[test]
fn freeing_a_block_between_two_free_blocks_coalesces_all_three() {
    let mut allocator = new_allocator();
    let a = allocator.allocate(64).unwrap();
    let b = allocator.allocate(64).unwrap();
    let c = allocator.allocate(64).unwrap();

    unsafe {
        allocator.free(a);
        allocator.free(c);
    }
    allocator.check().expect("two disjoint free blocks, still consistent");

    unsafe { allocator.free(b) };
    allocator.check().expect("freeing the middle block must coalesce all three");

    // The coalesced region must be big enough to satisfy a request for
    // roughly the sum of the three original allocations without extending
    // the arena.
    let high_before = allocator.high();
    let reused = allocator.allocate(150).expect("coalesced region should satisfy this");
    assert_eq!(high_before, allocator.high(), "reuse must not require extending the arena");
    unsafe { allocator.free(reused) };
}

#[test]
fn first_fit_walks_the_free_list_in_lifo_order() {
    let mut allocator = new_allocator();
    let a = allocator.allocate(32).unwrap();
    let b = allocator.allocate(32).unwrap();
    let c = allocator.allocate(32).unwrap();

    unsafe {
        allocator.free(a);
        allocator.free(b);
        allocator.free(c);
    }
    // a, b, c are physically adjacent with nothing allocated between them,
    // so freeing all three coalesces them back into one block regardless
    // of free-list order; exercise first-fit order more directly.
    let d = allocator.allocate(200).unwrap();

    unsafe {
        let e = allocator.allocate(16).unwrap();
        let f = allocator.allocate(16).unwrap();
        allocator.free(e);
        allocator.free(f);
        // `f` was freed last, so a first-fit scan starting at the list
        // head should find it (or its coalesced successor) before
        // anything earlier in insertion order.
        let g = allocator.allocate(16).unwrap();
        allocator.free(g);
        allocator.free(d);
    }
    allocator.check().expect("heap must remain consistent throughout");
}

#[test]
fn reallocate_grows_in_place_when_a_free_neighbor_is_big_enough() {
    let mut allocator = new_allocator();
    let a = allocator.allocate(32).unwrap();
    let spacer = allocator.allocate(256).unwrap();
    unsafe {
        a.as_ptr().write_bytes(0x7a, 32);
        allocator.free(spacer);
        let grown = allocator.reallocate(Some(a), 200).expect("free neighbor absorbs growth");
        assert_eq!(grown, a, "growth into a trailing free neighbor keeps the address stable");
        assert_eq!(core::slice::from_raw_parts(grown.as_ptr(), 32), [0x7au8; 32]);
    }
    allocator.check().expect("heap consistent after in-place growth");
}

#[test]
fn reallocate_falls_back_to_allocate_copy_free_when_neighbors_cannot_help() {
    let mut allocator = new_allocator();
    let a = allocator.allocate(32).unwrap();
    let pin = allocator.allocate(32).unwrap();
    unsafe {
        a.as_ptr().write_bytes(0x5a, 32);
        let moved = allocator
            .reallocate(Some(a), 4000)
            .expect("arena can be extended to satisfy the move");
        assert_ne!(moved, a, "no neighbor can satisfy this growth in place");
        assert_eq!(core::slice::from_raw_parts(moved.as_ptr(), 32), [0x5au8; 32]);
        allocator.free(moved);
        allocator.free(pin);
    }
    allocator.check().expect("heap consistent after fallback reallocation");
}
