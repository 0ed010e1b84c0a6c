//! Error types surfaced by the public allocator API.

/// Failure modes of [`crate::allocator::Allocator`]'s entry points.
///
/// Mirrors `kernel-vmem::AddressSpaceError` and `kernel-alloc::vmm::VmmError`
/// in shape: a `thiserror`-derived, `no_std`-compatible enum with one
/// variant per distinguishable failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AllocError {
    /// The arena provider could not supply enough additional bytes to
    /// satisfy the request.
    #[error("arena provider could not extend the heap far enough to satisfy the request")]
    OutOfMemory,
}
