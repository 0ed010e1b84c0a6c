//! The heap consistency checker.
//!
//! Walks the whole arena once, block by block, then walks the free list
//! once, and reports the first inconsistency found. Intended for use in
//! tests and debug builds around allocator operations, not on a hot path.

use core::ptr::NonNull;

use crate::block::Block;
use crate::config::{ALIGNMENT, TAGS_SIZE};
use crate::free_list::FreeList;

/// A detected heap inconsistency, carrying enough of the offending block's
/// identity to log or assert on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HeapViolation {
    /// A block's recorded size is not a multiple of [`ALIGNMENT`].
    #[error("block at {addr:?} has unaligned size {size}")]
    UnalignedSize { addr: NonNull<u8>, size: usize },

    /// A block's header and footer tags disagree.
    #[error("block at {addr:?} has mismatched header/footer tags")]
    TagMismatch { addr: NonNull<u8> },

    /// A block's extent runs past the current arena break.
    #[error("block at {addr:?} with size {size} extends past the arena bound")]
    OutOfBounds { addr: NonNull<u8>, size: usize },

    /// Two physically adjacent blocks are both free — coalescing missed a
    /// merge.
    #[error("adjacent free blocks at {first:?} and {second:?} were not coalesced")]
    AdjacentFreeBlocks { first: NonNull<u8>, second: NonNull<u8> },

    /// A block reachable from the free list's head is marked allocated.
    #[error("free list node at {addr:?} is marked allocated")]
    FreeListNodeNotFree { addr: NonNull<u8> },

    /// The free list's link count does not match the number of free blocks
    /// found while scanning the arena — the circular list is broken.
    #[error("free list cycle is broken: found {found} linked nodes, expected {expected}")]
    FreeListCycleBroken { found: usize, expected: usize },
}

/// Scans the arena from `low` up to (not including) the epilogue at `high`,
/// then cross-checks the free list, returning the first violation found.
///
/// `low` must be the arena's base (prologue address) and `high` the current
/// break (one byte past the epilogue's footer).
pub fn check(low: NonNull<u8>, high: NonNull<u8>, free_list: FreeList) -> Result<(), HeapViolation> {
    let high_addr = high.as_ptr() as usize;
    let epilogue_addr = high_addr - TAGS_SIZE;

    let prologue = unsafe { Block::at(low) };
    let mut cursor = prologue.next();
    let mut prev_was_free = false;
    let mut free_count = 0usize;

    while (cursor.addr().as_ptr() as usize) < epilogue_addr {
        let addr = cursor.addr();
        let size = cursor.size();

        if size % ALIGNMENT != 0 {
            return Err(HeapViolation::UnalignedSize { addr, size });
        }
        if size != cursor.end_size() || cursor.allocated() != cursor.end_allocated() {
            return Err(HeapViolation::TagMismatch { addr });
        }
        if (addr.as_ptr() as usize) + size > epilogue_addr {
            return Err(HeapViolation::OutOfBounds { addr, size });
        }

        let is_free = !cursor.allocated();
        if is_free {
            free_count += 1;
            if prev_was_free {
                let prev = unsafe { cursor.prev() };
                return Err(HeapViolation::AdjacentFreeBlocks {
                    first: prev.addr(),
                    second: addr,
                });
            }
        }
        prev_was_free = is_free;

        cursor = cursor.next();
    }

    let mut linked = 0usize;
    for block in free_list.iter() {
        if block.allocated() {
            return Err(HeapViolation::FreeListNodeNotFree { addr: block.addr() });
        }
        linked += 1;
        if linked > free_count {
            break;
        }
    }

    if linked != free_count {
        log::error!("heap check: free list has {linked} nodes, arena scan found {free_count}");
        return Err(HeapViolation::FreeListCycleBroken { found: linked, expected: free_count });
    }

    Ok(())
}
