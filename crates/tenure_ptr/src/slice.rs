use core::ptr::{self, NonNull};

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::policy::{BoxReclaim, Reclaim};
use crate::unique::Unique;

// -----------------------------------------------------------------------------
// UniqueSlice

/// The buffer form of [`Unique`]: a single-owner handle over `[T]`.
///
/// The address is a fat slice pointer, so the element count travels with the
/// handle and [`BoxReclaim`] drops every element before freeing the buffer,
/// matching how a `Box<[T]>` / `Vec<T>` buffer was obtained.
///
/// All of [`Unique`]'s operations apply unchanged; this alias adds indexed
/// element access ([`get_unchecked`](Unique::get_unchecked)) and
/// buffer-specific constructors.
///
/// # Examples
///
/// ```
/// use tenure_ptr::UniqueSlice;
///
/// let mut buffer = UniqueSlice::from_vec(vec![1u32, 2, 3]);
/// assert_eq!(buffer.len(), 3);
///
/// // SAFETY: index 1 is in-bounds and the handle is non-null.
/// unsafe { *buffer.get_unchecked_mut(1) = 20 };
/// assert_eq!(unsafe { buffer.as_ref() }, &[1, 20, 3]);
/// // The whole buffer is freed here, exactly once.
/// ```
pub type UniqueSlice<T, R = BoxReclaim> = Unique<[T], R>;

impl<T> Unique<[T]> {
    /// Takes ownership of a vector's buffer.
    ///
    /// Excess capacity is shed first so the address matches what the
    /// default policy reclaims.
    #[inline]
    pub fn from_vec(vec: Vec<T>) -> Self {
        Self::from_box(vec.into_boxed_slice())
    }
}

impl<T, R> Unique<[T], R>
where
    R: Reclaim<[T]> + Default,
{
    /// Creates a buffer handle from a data pointer and an element count,
    /// with a default-constructed policy.
    ///
    /// A null `data` yields the empty handle whatever `len` says.
    ///
    /// # Safety
    /// - If `data` is non-null, `data..data + len` must be a live buffer
    ///   that the policy knows how to reclaim as a whole.
    /// - No other owner may exist for the buffer.
    #[inline]
    pub unsafe fn from_raw_parts(data: *mut T, len: usize) -> Self {
        // SAFETY: forwarded contract; a null `data` makes a null slice
        // pointer, which `from_raw` turns into the empty state.
        unsafe { Self::from_raw(ptr::slice_from_raw_parts_mut(data, len)) }
    }
}

impl<T, R: Reclaim<[T]>> Unique<[T], R> {
    /// Number of elements in the held buffer, `0` when empty.
    #[inline]
    pub fn len(&self) -> usize {
        match self.get() {
            Some(buffer) => buffer.len(),
            None => 0,
        }
    }

    /// Returns the raw data pointer (the first element's address), null if
    /// the handle is empty.
    #[inline]
    pub fn as_ptr(&self) -> *mut T {
        match self.get() {
            Some(buffer) => buffer.cast::<T>().as_ptr(),
            None => ptr::null_mut(),
        }
    }

    /// Consumes the handle and returns the raw slice pointer without
    /// invoking the policy; null (with length `0`) if empty.
    #[inline]
    pub fn into_raw(self) -> *mut [T] {
        match self.into_non_null() {
            Some(buffer) => buffer.as_ptr(),
            None => ptr::slice_from_raw_parts_mut(ptr::null_mut(), 0),
        }
    }

    /// Indexes the buffer without bounds checks.
    ///
    /// Debug builds still assert the bound, in the same spirit as a
    /// debug-only alignment check: no release-mode cost.
    ///
    /// # Safety
    /// The handle must be non-null and `index` must be in-bounds.
    #[cfg_attr(debug_assertions, track_caller)]
    #[cfg_attr(not(debug_assertions), inline(always))]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        #[cfg(debug_assertions)]
        assert!(
            index < self.len(),
            "tried to index out-of-bounds of an owned buffer"
        );
        // SAFETY: the caller guarantees a held buffer and an in-bounds
        // `index`, so the offset pointer is valid to dereference.
        unsafe { self.get().unwrap_unchecked().cast::<T>().add(index).as_ref() }
    }

    /// Mutably indexes the buffer without bounds checks.
    ///
    /// # Safety
    /// The handle must be non-null and `index` must be in-bounds.
    #[cfg_attr(debug_assertions, track_caller)]
    #[cfg_attr(not(debug_assertions), inline(always))]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        #[cfg(debug_assertions)]
        assert!(
            index < self.len(),
            "tried to index out-of-bounds of an owned buffer"
        );
        // SAFETY: as in `get_unchecked`; `&mut self` makes the access
        // exclusive.
        unsafe { self.get().unwrap_unchecked().cast::<T>().add(index).as_mut() }
    }
}

// -----------------------------------------------------------------------------
// Tests
