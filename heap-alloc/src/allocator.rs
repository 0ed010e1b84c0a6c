//! The public allocator: `init`, `allocate`, `free`, `reallocate`, `check`.

use core::ptr::NonNull;

use crate::arena::ArenaProvider;
use crate::block::Block;
use crate::check::{self, HeapViolation};
use crate::coalesce::coalesce;
use crate::config::{align8, EXTENSION_FLOOR, MIN_BLOCK_SIZE, TAGS_SIZE};
use crate::error::AllocError;
use crate::free_list::FreeList;
use crate::split::split;

/// A boundary-tag, explicit-free-list allocator over an [`ArenaProvider`].
///
/// Must be [`Allocator::init`]ialized before any other method is called.
pub struct Allocator<A: ArenaProvider> {
    arena: A,
    free_list: FreeList,
    high: NonNull<u8>,
}

impl<A: ArenaProvider> Allocator<A> {
    /// Wraps `arena`. The result is not usable until [`Allocator::init`]
    /// succeeds.
    #[must_use]
    pub const fn new(arena: A) -> Self {
        let low = unsafe { NonNull::new_unchecked(core::ptr::null_mut::<u8>().wrapping_add(1)) };
        Self { arena, free_list: FreeList::new(), high: low }
    }

    /// Lays down the prologue and epilogue sentinels and extends the arena
    /// by one initial chunk of free space.
    ///
    /// Returns nonzero (an `Err`) on failure, per the allocator's native
    /// "0 on success" convention expressed as a `Result`.
    pub fn init(&mut self) -> Result<(), AllocError> {
        self.free_list = FreeList::new();
        let low = self.arena.low();
        let ptr = self.arena.extend(TAGS_SIZE * 2).ok_or(AllocError::OutOfMemory)?;
        debug_assert_eq!(ptr, low, "arena provider's first extend must start at its own low()");

        let prologue = unsafe { Block::at(ptr) };
        prologue.set_size_and_allocated(TAGS_SIZE, true);
        let epilogue = prologue.next();
        epilogue.set_size_and_allocated(TAGS_SIZE, true);

        self.high = unsafe { NonNull::new_unchecked(ptr.as_ptr().add(TAGS_SIZE * 2)) };
        self.extend_arena(EXTENSION_FLOOR)
    }

    /// The arena's fixed base address.
    #[must_use]
    pub fn low(&self) -> NonNull<u8> {
        self.arena.low()
    }

    /// The current arena break (one byte past the epilogue).
    #[must_use]
    pub fn high(&self) -> NonNull<u8> {
        self.high
    }

    /// Allocates a block of at least `size` bytes, returning a pointer to
    /// its payload. Returns `None` if the arena provider cannot be extended
    /// far enough to satisfy the request.
    pub fn allocate(&mut self, size: usize) -> Option<NonNull<u8>> {
        if size == 0 {
            return None;
        }
        let needed = Self::block_size_for(size);

        if let Some(block) = self.first_fit(needed) {
            return Some(self.take(block, needed));
        }

        self.extend_arena(needed).ok()?;
        let block = self.first_fit(needed)?;
        Some(self.take(block, needed))
    }

    /// Frees a block previously returned by [`Allocator::allocate`] or
    /// [`Allocator::reallocate`], coalescing it with any free neighbors.
    ///
    /// # Safety
    /// `ptr` must be a payload pointer currently allocated by this
    /// allocator, and must not be used again after this call.
    pub unsafe fn free(&mut self, ptr: NonNull<u8>) {
        unsafe {
            let block = Block::from_payload(ptr);
            debug_assert!(block.allocated(), "double free detected");
            block.set_allocated(false);
            let merged = coalesce(&mut self.free_list, block);
            self.free_list.insert(merged);
        }
    }

    /// Resizes the allocation at `ptr` to `new_size` bytes, preserving its
    /// contents up to the smaller of the old and new sizes.
    ///
    /// `ptr == None` behaves like [`Allocator::allocate`]. `new_size == 0`
    /// frees `ptr` and returns it unchanged (the returned pointer is
    /// dangling; this mirrors the allocator's native `realloc(p, 0)`
    /// behavior rather than papering over it). Shrinking or keeping the
    /// same size never moves or reclaims the block — only growth can.
    ///
    /// # Safety
    /// `ptr`, if `Some`, must be a payload pointer currently allocated by
    /// this allocator.
    pub unsafe fn reallocate(
        &mut self,
        ptr: Option<NonNull<u8>>,
        new_size: usize,
    ) -> Option<NonNull<u8>> {
        let Some(ptr) = ptr else {
            return self.allocate(new_size);
        };

        if new_size == 0 {
            unsafe { self.free(ptr) };
            return Some(ptr);
        }

        unsafe {
            let block = Block::from_payload(ptr);
            let needed = Self::block_size_for(new_size);

            if needed <= block.size() {
                return Some(ptr);
            }

            if let Some(grown) = self.grow_in_place(block, needed) {
                return Some(grown);
            }

            let old_payload_size = block.size() - TAGS_SIZE;
            let new_ptr = self.allocate(new_size)?;
            core::ptr::copy_nonoverlapping(
                ptr.as_ptr(),
                new_ptr.as_ptr(),
                old_payload_size.min(new_size),
            );
            self.free(ptr);
            Some(new_ptr)
        }
    }

    /// Runs the consistency checker over the whole arena and free list.
    pub fn check(&self) -> Result<(), HeapViolation> {
        check::check(self.arena.low(), self.high, self.free_list)
    }

    /// Converts a requested payload size into the total block size (header
    /// + aligned payload + footer) that must be found or carved out for it.
    #[inline]
    fn block_size_for(size: usize) -> usize {
        (align8(size) + TAGS_SIZE).max(MIN_BLOCK_SIZE)
    }

    /// First free block whose total size is at least `needed`, scanning the
    /// free list front to back.
    fn first_fit(&self, needed: usize) -> Option<Block> {
        self.free_list.iter().find(|block| block.size() >= needed)
    }

    /// Pulls `block` out of the free list and hands it to [`split`].
    fn take(&mut self, block: Block, needed: usize) -> NonNull<u8> {
        unsafe {
            self.free_list.remove(block);
            let used = split(&mut self.free_list, block, needed);
            used.payload()
        }
    }

    /// Attempts to grow `block` to `needed` bytes in place by absorbing one
    /// or both free neighbors, moving the payload with an overlap-safe copy
    /// if the block's start address shifts. Returns the (possibly new)
    /// payload pointer on success.
    unsafe fn grow_in_place(&mut self, block: Block, needed: usize) -> Option<NonNull<u8>> {
        unsafe {
            let next = block.next();
            // Never called on the prologue: `block` is always a live
            // allocation, so it always has a predecessor.
            let prev = block.prev();
            let prev_free = !prev.allocated();
            let next_free = !next.allocated();
            let old_payload_size = block.size() - TAGS_SIZE;

            // Dispatch strictly on which neighbors are free, matching the
            // original's `available` computation: when both are free, both
            // must be absorbed, or a leftover split would land next to a
            // free block that was never pulled out of the list.
            if next_free && !prev_free && block.size() + next.size() >= needed {
                self.free_list.remove(next);
                block.set_size_and_allocated(block.size() + next.size(), true);
                let used = split(&mut self.free_list, block, needed);
                return Some(used.payload());
            }

            if prev_free && !next_free && prev.size() + block.size() >= needed {
                self.free_list.remove(prev);
                let new_payload = prev.payload();
                core::ptr::copy(block.payload().as_ptr(), new_payload.as_ptr(), old_payload_size);
                prev.set_size_and_allocated(prev.size() + block.size(), true);
                let used = split(&mut self.free_list, prev, needed);
                return Some(used.payload());
            }

            if prev_free && next_free && prev.size() + block.size() + next.size() >= needed {
                self.free_list.remove(prev);
                self.free_list.remove(next);
                let new_payload = prev.payload();
                core::ptr::copy(block.payload().as_ptr(), new_payload.as_ptr(), old_payload_size);
                prev.set_size_and_allocated(prev.size() + block.size() + next.size(), true);
                let used = split(&mut self.free_list, prev, needed);
                return Some(used.payload());
            }

            None
        }
    }

    /// Extends the arena by `max(min_size, EXTENSION_FLOOR)` bytes, folding
    /// the old epilogue into a new free block, placing a fresh epilogue at
    /// the new break, and coalescing with the arena's previous last block
    /// if it was free.
    fn extend_arena(&mut self, min_size: usize) -> Result<(), AllocError> {
        let growth = min_size.max(EXTENSION_FLOOR);
        self.arena.extend(growth).ok_or(AllocError::OutOfMemory)?;
        log::debug!("extending arena by {growth} bytes, new break beyond {:?}", self.high);

        let new_free = unsafe { Block::at(NonNull::new_unchecked(self.high.as_ptr().sub(TAGS_SIZE))) };
        new_free.set_size_and_allocated(growth, false);

        let new_epilogue = new_free.next();
        new_epilogue.set_size_and_allocated(TAGS_SIZE, true);

        self.high = unsafe { NonNull::new_unchecked(self.high.as_ptr().add(growth)) };

        let merged = unsafe { coalesce(&mut self.free_list, new_free) };
        unsafe { self.free_list.insert(merged) };

        Ok(())
    }
}
