use core::ptr::NonNull;

use alloc::boxed::Box;

// -----------------------------------------------------------------------------
// Reclaim

/// A release policy: reclaims the resource at a given address.
///
/// A policy is invoked by [`Unique`](crate::Unique) when a held address is
/// dropped, cleared or replaced. It receives the address exactly once and
/// must make the resource behind it go away, whatever that means for the
/// resource in question (freeing an allocation, returning a slot to a pool,
/// closing a handle table entry).
///
/// Policies travel by value inside the handle that owns them and move with
/// it; a zero-size policy costs the handle no storage at all.
///
/// If a policy panics, the panic propagates out of the operation that
/// triggered it. The handle has already detached the address at that point,
/// so the resource is leaked rather than freed twice.
pub trait Reclaim<T: ?Sized> {
    /// Reclaims the resource at `target`.
    ///
    /// # Safety
    /// - `target` must have been produced in whatever manner this policy
    ///   expects (for [`BoxReclaim`], by `Box::into_raw`).
    /// - `target` must not have been reclaimed before, and must not be
    ///   accessed in any way afterwards.
    unsafe fn reclaim(&mut self, target: NonNull<T>);
}

// -----------------------------------------------------------------------------
// BoxReclaim

/// The default release policy: frees an address created by `Box::into_raw`.
///
/// The single unit type serves both handle forms. For a scalar
/// [`Unique<T>`](crate::Unique) it rebuilds and drops a `Box<T>`; for a
/// [`UniqueSlice<T>`](crate::UniqueSlice) the address is a fat slice pointer
/// and the rebuilt `Box<[T]>` drops every element before releasing the
/// buffer, mirroring how the buffer was obtained.
///
/// `BoxReclaim` is stateless, so it is freely `Copy`; exclusivity of the
/// *resource* is enforced by the handle, never by the policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoxReclaim;

impl<T: ?Sized> Reclaim<T> for BoxReclaim {
    #[inline]
    unsafe fn reclaim(&mut self, target: NonNull<T>) {
        // SAFETY: the caller guarantees `target` came from `Box::into_raw`
        // and is reclaimed only once.
        drop(unsafe { Box::from_raw(target.as_ptr()) });
    }
}

// -----------------------------------------------------------------------------
// ReclaimFn

/// Adapts a closure over one address into a release policy.
///
/// Any `FnMut(NonNull<T>)` qualifies, so ad-hoc policies need no named type:
///
/// ```
/// use core::cell::Cell;
/// use core::ptr::NonNull;
/// use tenure_ptr::{ReclaimFn, Unique};
///
/// let freed = Cell::new(0);
/// let raw = Box::into_raw(Box::new(5u32));
/// let handle = unsafe {
///     // SAFETY: `raw` came from `Box::into_raw` and is owned by no one else.
///     Unique::from_raw_with(raw, ReclaimFn(|p: NonNull<u32>| {
///         freed.set(freed.get() + 1);
///         // SAFETY: the handle hands each address to its policy once.
///         drop(unsafe { Box::from_raw(p.as_ptr()) });
///     }))
/// };
/// drop(handle);
/// assert_eq!(freed.get(), 1);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ReclaimFn<F>(pub F);

impl<T: ?Sized, F: FnMut(NonNull<T>)> Reclaim<T> for ReclaimFn<F> {
    #[inline]
    unsafe fn reclaim(&mut self, target: NonNull<T>) {
        (self.0)(target);
    }
}

// -----------------------------------------------------------------------------
// Tests
