//! The arena abstraction the core allocator grows into.
//!
//! The allocator never asks its environment for anything beyond these two
//! primitives — an `sbrk`-style bump (`extend`) and the arena's fixed base
//! address (`low`). Everything else (prologue/epilogue placement, free-list
//! bookkeeping, coalescing) is "in-arena" and lives in this crate.

use core::ptr::NonNull;

/// Supplies raw, growable backing storage to [`crate::allocator::Allocator`].
///
/// Implementors must guarantee that the address returned by [`Self::low`]
/// never changes across the provider's lifetime, and that bytes returned by
/// a successful `extend` remain valid and addressable for as long as the
/// provider lives.
pub trait ArenaProvider {
    /// Grows the arena by `delta` bytes and returns a pointer to the start
    /// of the newly available region (i.e. the break before growing).
    ///
    /// Returns `None` if the provider cannot satisfy the request (e.g. its
    /// backing storage is exhausted).
    fn extend(&mut self, delta: usize) -> Option<NonNull<u8>>;

    /// The fixed base address of the arena.
    fn low(&self) -> NonNull<u8>;
}

/// A `no_std`-friendly [`ArenaProvider`] backed by a fixed-size inline
/// buffer, tracking a monotonically increasing break within it.
///
/// Grounded in the teacher's `kernel-alloc::static_heap` pattern of a
/// statically reserved backing array paired with a break cursor, generalized
/// here so the break advances incrementally on each `extend` call instead of
/// being fixed once at boot.
///
/// The backing buffer is inline in the struct, so `N` bytes of storage move
/// with the value. Callers that need a stable base address across moves
/// (e.g. tests constructing an `Allocator` over one) should place it behind
/// a `Box` once and never move it afterwards.
pub struct FixedCapacityArena<const N: usize> {
    storage: [u8; N],
    brk: usize,
}

impl<const N: usize> FixedCapacityArena<N> {
    /// An arena with nothing extended yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { storage: [0; N], brk: 0 }
    }

    /// Bytes made available so far via `extend`.
    #[inline]
    #[must_use]
    pub const fn used(&self) -> usize {
        self.brk
    }

    /// Total backing capacity.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for FixedCapacityArena<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ArenaProvider for FixedCapacityArena<N> {
    fn extend(&mut self, delta: usize) -> Option<NonNull<u8>> {
        let new_brk = self.brk.checked_add(delta)?;
        if new_brk > N {
            return None;
        }
        let ptr = unsafe { NonNull::new_unchecked(self.storage.as_mut_ptr().add(self.brk)) };
        self.brk = new_brk;
        Some(ptr)
    }

    fn low(&self) -> NonNull<u8> {
        unsafe { NonNull::new_unchecked(self.storage.as_ptr().cast_mut()) }
    }
}
