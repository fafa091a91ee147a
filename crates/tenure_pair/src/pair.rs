use core::ptr::NonNull;

use static_assertions::{assert_eq_size, const_assert, const_assert_eq};

// -----------------------------------------------------------------------------
// CompressedPair

/// A pair of values whose zero-size members contribute no storage.
///
/// The two members are reached through [`first`](Self::first) /
/// [`second`](Self::second) (and their `_mut` counterparts) rather than
/// public fields, so the container presents the same surface whatever the
/// member sizes are. A value read back is always observably the value last
/// stored, whether the member occupies real storage or none at all.
///
/// The intended use is bundling a payload with a stateless companion, for
/// example a raw address with a unit release policy: such a pair is exactly
/// the size of the address.
///
/// # Examples
///
/// ```
/// use tenure_pair::CompressedPair;
///
/// #[derive(Default)]
/// struct Tag; // zero-size
///
/// let mut pair = CompressedPair::new(7u64, Tag);
/// assert_eq!(*pair.first(), 7);
/// *pair.first_mut() = 8;
/// assert_eq!(*pair.first(), 8);
///
/// assert_eq!(size_of::<CompressedPair<u64, Tag>>(), size_of::<u64>());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CompressedPair<A, B> {
    first: A,
    second: B,
}

impl<A, B> CompressedPair<A, B> {
    /// Creates a pair from two caller-supplied values.
    #[inline(always)]
    pub const fn new(first: A, second: B) -> Self {
        CompressedPair { first, second }
    }

    /// Returns a shared reference to the first value.
    #[inline(always)]
    pub const fn first(&self) -> &A {
        &self.first
    }

    /// Returns a mutable reference to the first value.
    #[inline(always)]
    pub const fn first_mut(&mut self) -> &mut A {
        &mut self.first
    }

    /// Returns a shared reference to the second value.
    #[inline(always)]
    pub const fn second(&self) -> &B {
        &self.second
    }

    /// Returns a mutable reference to the second value.
    #[inline(always)]
    pub const fn second_mut(&mut self) -> &mut B {
        &mut self.second
    }

    /// Borrows both values at once.
    #[inline(always)]
    pub const fn as_refs(&self) -> (&A, &B) {
        (&self.first, &self.second)
    }

    /// Mutably borrows both values at once.
    ///
    /// Useful when one half drives a mutation of the other, which two
    /// separate `_mut` calls could not express under the borrow checker.
    #[inline(always)]
    pub const fn as_muts(&mut self) -> (&mut A, &mut B) {
        (&mut self.first, &mut self.second)
    }

    /// Decomposes the pair into its two values.
    #[inline]
    pub fn into_inner(self) -> (A, B) {
        (self.first, self.second)
    }
}

// -----------------------------------------------------------------------------
// Layout guarantees

// Zero-size members must never widen the pair, in any position.
const_assert_eq!(size_of::<CompressedPair<(), ()>>(), 0);
assert_eq_size!(CompressedPair<u64, ()>, u64);
assert_eq_size!(CompressedPair<(), u64>, u64);

// The pointer-plus-unit-policy shape that `tenure_ptr` relies on: the niche
// of `Option<NonNull<T>>` keeps the whole pair at one word.
assert_eq_size!(CompressedPair<Option<NonNull<u8>>, ()>, *mut u8);
const_assert!(align_of::<CompressedPair<u64, ()>>() == align_of::<u64>());

// -----------------------------------------------------------------------------
// Tests
