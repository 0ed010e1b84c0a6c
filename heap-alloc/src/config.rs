//! Layout constants for the allocator's in-arena block format.
//!
//! Collapsed here from what would be a dedicated `*-info` crate in a larger
//! workspace (see `kernel-info` in the teacher repository) — this crate is
//! itself roughly the size of one such crate, so the constants live in a
//! module rather than a sibling package.

/// Machine word width in bytes (`W` in the design notes). 8 on a 64-bit
/// target.
pub const WORD_SIZE: usize = size_of::<usize>();

/// Minimum payload alignment, in bytes. Every block's total size is a
/// multiple of this.
pub const ALIGNMENT: usize = 8;

/// Combined size of a block's header and footer tags (`2 * WORD_SIZE`).
pub const TAGS_SIZE: usize = 2 * WORD_SIZE;

/// Smallest legal total block size: header + next-link + prev-link + footer.
pub const MIN_BLOCK_SIZE: usize = 4 * WORD_SIZE;

/// Minimum payload, in bytes, requested from the arena provider on every
/// extension, regardless of the size that triggered it. Amortizes the cost
/// of growing the arena; a tunable knob, not a correctness requirement.
pub const EXTENSION_FLOOR: usize = 640;

/// Rounds `n` up to the nearest multiple of [`ALIGNMENT`].
#[inline]
#[must_use]
pub const fn align8(n: usize) -> usize {
    (n + (ALIGNMENT - 1)) & !(ALIGNMENT - 1)
}
