//! Block splitting.
//!
//! Decides, for a free block about to satisfy an allocation request, whether
//! the leftover past `needed_size` is worth carving off as its own free
//! block. Mirrors the original allocator's `split_block`: the allocated bit
//! is touched only on the branch that actually splits, everywhere else the
//! whole block is simply marked allocated as-is.

use crate::config::MIN_BLOCK_SIZE;
use crate::block::Block;
use crate::free_list::FreeList;

/// Marks `block` allocated to satisfy a request for `needed_size` bytes
/// (header+payload+footer, already 8-aligned), splitting off and
/// reinserting a trailing free block when the leftover is large enough to
/// be worth keeping: at least [`MIN_BLOCK_SIZE`] and at least half of
/// `block`'s original size.
///
/// Returns the (now allocated) block servicing the request, at the same
/// address as `block`.
///
/// # Safety
/// `block` must currently be free, a member of `list`, and already removed
/// from `list` by the caller before this is called — `split` only inserts
/// the leftover, it never removes `block` itself.
pub unsafe fn split(list: &mut FreeList, block: Block, needed_size: usize) -> Block {
    unsafe {
        let original_size = block.size();
        debug_assert!(needed_size <= original_size);
        let leftover = original_size - needed_size;

        if leftover >= MIN_BLOCK_SIZE && leftover >= original_size / 2 {
            log::trace!(
                "split: carving {needed_size} bytes out of {original_size} at {:?}, {leftover} left over",
                block.addr()
            );
            block.set_size_and_allocated(needed_size, true);
            let remainder = block.next();
            remainder.set_size_and_allocated(leftover, false);
            list.insert(remainder);
        } else {
            block.set_allocated(true);
        }

        block
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::ptr::NonNull;

    extern crate alloc;

    struct Scratch {
        bytes: alloc::boxed::Box<[u8]>,
    }

    impl Scratch {
        fn new(len: usize) -> Self {
            Self { bytes: alloc::vec![0u8; len].into_boxed_slice() }
        }

        fn free_block_at(&mut self, offset: usize, size: usize) -> Block {
            let block = unsafe {
                Block::at(NonNull::new_unchecked(self.bytes.as_mut_ptr().add(offset)))
            };
            block.set_size_and_allocated(size, false);
            block
        }
    }

    #[test]
    fn splits_when_leftover_is_large_and_at_least_half() {
        let mut scratch = Scratch::new(64);
        let b = scratch.free_block_at(0, 64);
        let mut list = FreeList::new();

        let used = unsafe { split(&mut list, b, 32) };
        assert_eq!(used.addr(), b.addr());
        assert_eq!(used.size(), 32);
        assert!(used.allocated());

        let remainder = list.head().expect("leftover must be reinserted");
        assert_eq!(remainder.size(), 32);
        assert!(!remainder.allocated());
    }

    #[test]
    fn does_not_split_when_leftover_too_small() {
        let mut scratch = Scratch::new(40);
        let b = scratch.free_block_at(0, 40);
        let mut list = FreeList::new();

        // MIN_BLOCK_SIZE is 32 on a 64-bit target; an 8-byte leftover is too
        // small to stand alone.
        let used = unsafe { split(&mut list, b, 32) };
        assert_eq!(used.size(), 40, "whole block kept when leftover is below MIN_BLOCK_SIZE");
        assert!(used.allocated());
        assert!(list.head().is_none());
    }

    #[test]
    fn does_not_split_when_leftover_is_less_than_half() {
        let mut scratch = Scratch::new(96);
        let b = scratch.free_block_at(0, 96);
        let mut list = FreeList::new();

        // leftover would be 32, which clears MIN_BLOCK_SIZE but is less
        // than half of 96.
        let used = unsafe { split(&mut list, b, 64) };
        assert_eq!(used.size(), 96);
        assert!(list.head().is_none());
    }
}
