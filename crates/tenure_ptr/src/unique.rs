use core::fmt;
use core::mem::{self, ManuallyDrop};
use core::ptr::{self, NonNull};

use alloc::boxed::Box;
use tenure_pair::CompressedPair;

use crate::policy::{BoxReclaim, Reclaim};

// -----------------------------------------------------------------------------
// Unique

/// A single-owner handle over a raw address.
///
/// `Unique<T, R>` holds an optional address together with a release policy
/// `R` (by default [`BoxReclaim`]). While the handle is non-null it is the
/// sole owner of the resource behind the address; when it is dropped,
/// [`clear`](Self::clear)ed or [`reset`](Self::reset) to another address,
/// the policy reclaims the old resource exactly once.
///
/// Address and policy live in a [`CompressedPair`], so with a zero-size
/// policy the handle is exactly one pointer wide (the empty state uses the
/// null niche of [`NonNull`]).
///
/// # Ownership
///
/// The handle is move-only: ownership transfer is a plain Rust move, after
/// which the source is statically gone. [`release`](Self::release) hands the
/// address back to the caller without invoking the policy; from then on the
/// caller is responsible for the resource.
///
/// Dropping a handle whose policy panics leaks the resource instead of
/// reclaiming it twice: the address is detached before the policy runs.
///
/// # Examples
///
/// ```
/// use tenure_ptr::Unique;
///
/// let mut value = Unique::new(41u32);
/// assert!(!value.is_null());
///
/// // SAFETY: `value` is non-null.
/// unsafe { *value.as_mut() += 1 };
/// assert_eq!(unsafe { *value.as_ref() }, 42);
/// // The boxed u32 is freed here.
/// ```
pub struct Unique<T, R = BoxReclaim>
where
    T: ?Sized,
    R: Reclaim<T>,
{
    pair: CompressedPair<Option<NonNull<T>>, R>,
}

// -----------------------------------------------------------------------------
// Construction

impl<T, R> Unique<T, R>
where
    T: ?Sized,
    R: Reclaim<T>,
{
    /// Creates a handle that owns `ptr` (which may be null) and reclaims it
    /// with `policy`.
    ///
    /// # Safety
    /// - If `ptr` is non-null, it must point to a live resource that
    ///   `policy` knows how to reclaim.
    /// - No other owner may exist for `ptr`: this handle considers itself
    ///   the only one responsible for the resource.
    #[inline]
    pub unsafe fn from_raw_with(ptr: *mut T, policy: R) -> Self {
        Unique {
            pair: CompressedPair::new(NonNull::new(ptr), policy),
        }
    }
}

impl<T, R> Unique<T, R>
where
    T: ?Sized,
    R: Reclaim<T> + Default,
{
    /// Creates a handle that owns `ptr` (which may be null), with a
    /// default-constructed policy.
    ///
    /// # Safety
    /// Same contract as [`from_raw_with`](Self::from_raw_with).
    #[inline]
    pub unsafe fn from_raw(ptr: *mut T) -> Self {
        // SAFETY: forwarded contract.
        unsafe { Self::from_raw_with(ptr, R::default()) }
    }
}

impl<T: ?Sized> Unique<T> {
    /// Takes ownership of a boxed resource.
    ///
    /// Never null. Also accepts unsized pointees, so `Box<[T]>` converts
    /// directly into the buffer form.
    #[inline]
    pub fn from_box(boxed: Box<T>) -> Self {
        // SAFETY: `Box::into_raw` yields a non-null address owned by no one
        // else, and `BoxReclaim` frees exactly such addresses.
        unsafe { Self::from_raw_with(Box::into_raw(boxed), BoxReclaim) }
    }
}

impl<T> Unique<T> {
    /// Allocates `value` and takes ownership of it.
    #[inline]
    pub fn new(value: T) -> Self {
        Self::from_box(Box::new(value))
    }
}

/// The empty handle: no address, default policy, nothing to reclaim on drop.
impl<T, R> Default for Unique<T, R>
where
    T: ?Sized,
    R: Reclaim<T> + Default,
{
    #[inline]
    fn default() -> Self {
        Unique {
            pair: CompressedPair::new(None, R::default()),
        }
    }
}

impl<T: ?Sized> From<Box<T>> for Unique<T> {
    #[inline]
    fn from(boxed: Box<T>) -> Self {
        Self::from_box(boxed)
    }
}

// -----------------------------------------------------------------------------
// Modifiers

impl<T, R> Unique<T, R>
where
    T: ?Sized,
    R: Reclaim<T>,
{
    /// Returns the held address and empties the handle *without* invoking
    /// the policy. Ownership of the resource transfers to the caller.
    ///
    /// # Examples
    ///
    /// ```
    /// use tenure_ptr::Unique;
    ///
    /// let mut handle = Unique::new(3u8);
    /// let raw = handle.release().unwrap();
    /// assert!(handle.is_null());
    ///
    /// // The handle no longer frees anything; we must.
    /// // SAFETY: `release` handed us the sole ownership of the address.
    /// drop(unsafe { Box::from_raw(raw.as_ptr()) });
    /// ```
    #[inline]
    pub fn release(&mut self) -> Option<NonNull<T>> {
        self.pair.first_mut().take()
    }

    /// Releases any held resource and leaves the handle empty.
    ///
    /// Equivalent to assigning the null state; a no-op on an empty handle.
    #[inline]
    pub fn clear(&mut self) {
        let (address, policy) = self.pair.as_muts();
        if let Some(old) = address.take() {
            // SAFETY: `old` was owned by this handle and has just been
            // detached, so it is reclaimed exactly once.
            unsafe { policy.reclaim(old) };
        }
    }

    /// Adopts `ptr` (which may be null), reclaiming any previously held
    /// address first.
    ///
    /// Resetting to the address already held is a no-op: reclaiming it
    /// while continuing to hold it would leave the handle dangling.
    ///
    /// # Safety
    /// Same contract as [`from_raw_with`](Self::from_raw_with) for the
    /// incoming `ptr`.
    pub unsafe fn reset(&mut self, ptr: *mut T) {
        let incoming = NonNull::new(ptr);
        let (address, policy) = self.pair.as_muts();
        if *address == incoming {
            return;
        }
        // The new address is stored before the old one is reclaimed, so a
        // panicking policy cannot leave the handle pointing at freed memory.
        if let Some(old) = mem::replace(address, incoming) {
            // SAFETY: `old` was owned by this handle and is now detached.
            unsafe { policy.reclaim(old) };
        }
    }

    /// Exchanges address and policy with `other`. No reclamation happens.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.pair, &mut other.pair);
    }

    /// Converts the policy type, keeping the held address.
    ///
    /// This is the move-conversion between compatible handle
    /// parameterizations: the source is consumed, its address migrates
    /// untouched (no reclamation), and `f` turns the old policy into the
    /// new one.
    ///
    /// # Examples
    ///
    /// ```
    /// use core::ptr::NonNull;
    /// use tenure_ptr::{ReclaimFn, Unique};
    ///
    /// let handle = Unique::new(7u32);
    /// let raw = handle.as_ptr();
    ///
    /// // Swap the default policy for one that leaks instead of freeing.
    /// let mut leaky = handle.map_policy(|_| ReclaimFn(|_: NonNull<u32>| ()));
    /// assert_eq!(leaky.as_ptr(), raw);
    ///
    /// // Reclaim manually; the leaky policy never will.
    /// // SAFETY: `into_raw` handed us the sole ownership of the address.
    /// drop(unsafe { Box::from_raw(leaky.into_raw()) });
    /// ```
    pub fn map_policy<R2, F>(self, f: F) -> Unique<T, R2>
    where
        R2: Reclaim<T>,
        F: FnOnce(R) -> R2,
    {
        let mut this = ManuallyDrop::new(self);
        let address = this.pair.first_mut().take();
        // SAFETY: `this` is never dropped, so the policy is moved out
        // exactly once and nothing double-frees.
        let policy = unsafe { ptr::read(this.pair.second()) };
        Unique {
            pair: CompressedPair::new(address, f(policy)),
        }
    }

    /// [`map_policy`](Self::map_policy) through `From`.
    #[inline]
    pub fn into_policy<R2>(self) -> Unique<T, R2>
    where
        R2: Reclaim<T> + From<R>,
    {
        self.map_policy(R2::from)
    }

    /// Consumes the handle and returns the held address (if any) without
    /// invoking the policy. The policy itself is dropped normally.
    #[inline]
    pub fn into_non_null(self) -> Option<NonNull<T>> {
        let mut this = ManuallyDrop::new(self);
        let address = this.pair.first_mut().take();
        // SAFETY: `this` is never dropped, so reading the policy out here
        // is the only time it is moved; it drops at the end of this scope.
        drop(unsafe { ptr::read(this.pair.second()) });
        address
    }
}

impl<T, R: Reclaim<T>> Unique<T, R> {
    /// Consumes the handle and returns the raw address, null if empty.
    ///
    /// Like [`release`](Self::release), no reclamation happens; the caller
    /// takes over the resource.
    #[inline]
    pub fn into_raw(self) -> *mut T {
        match self.into_non_null() {
            Some(address) => address.as_ptr(),
            None => ptr::null_mut(),
        }
    }
}

// -----------------------------------------------------------------------------
// Observers

impl<T, R> Unique<T, R>
where
    T: ?Sized,
    R: Reclaim<T>,
{
    /// Returns the held address without transferring ownership.
    #[inline(always)]
    pub fn get(&self) -> Option<NonNull<T>> {
        *self.pair.first()
    }

    /// Whether the handle is empty. An empty handle owns nothing and its
    /// destruction reclaims nothing.
    #[inline(always)]
    pub fn is_null(&self) -> bool {
        self.pair.first().is_none()
    }

    /// Shared access to the release policy.
    #[inline(always)]
    pub fn policy(&self) -> &R {
        self.pair.second()
    }

    /// Mutable access to the release policy.
    #[inline(always)]
    pub fn policy_mut(&mut self) -> &mut R {
        self.pair.second_mut()
    }

    /// Dereferences the handle.
    ///
    /// # Safety
    /// The handle must be non-null.
    #[inline(always)]
    pub unsafe fn as_ref(&self) -> &T {
        // SAFETY: the caller guarantees a held, live address.
        unsafe { self.get().unwrap_unchecked().as_ref() }
    }

    /// Mutably dereferences the handle.
    ///
    /// # Safety
    /// The handle must be non-null.
    #[inline(always)]
    pub unsafe fn as_mut(&mut self) -> &mut T {
        // SAFETY: the caller guarantees a held, live address; `&mut self`
        // makes the access exclusive.
        unsafe { self.get().unwrap_unchecked().as_mut() }
    }
}

impl<T, R: Reclaim<T>> Unique<T, R> {
    /// Returns the raw address, null if the handle is empty.
    #[inline]
    pub fn as_ptr(&self) -> *mut T {
        match self.get() {
            Some(address) => address.as_ptr(),
            None => ptr::null_mut(),
        }
    }
}

// -----------------------------------------------------------------------------
// Drop & formatting

impl<T, R> Drop for Unique<T, R>
where
    T: ?Sized,
    R: Reclaim<T>,
{
    fn drop(&mut self) {
        let (address, policy) = self.pair.as_muts();
        if let Some(held) = address.take() {
            // SAFETY: `held` was owned by this handle; detaching it first
            // keeps the reclamation single-shot even if the policy panics.
            unsafe { policy.reclaim(held) };
        }
    }
}

impl<T, R> fmt::Debug for Unique<T, R>
where
    T: ?Sized,
    R: Reclaim<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unique({:?})", self.pair.first())
    }
}

impl<T, R> fmt::Pointer for Unique<T, R>
where
    T: ?Sized,
    R: Reclaim<T>,
{
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(address) => fmt::Pointer::fmt(&address, f),
            None => f.write_str("0x0"),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    /// Counts reclamations and frees the boxed resource for real.
    struct Counting<'a> {
        hits: &'a Cell<usize>,
    }

    impl<T: ?Sized> Reclaim<T> for Counting<'_> {
        unsafe fn reclaim(&mut self, target: NonNull<T>) {
            self.hits.set(self.hits.get() + 1);
            // SAFETY: the tests always feed `Box::into_raw` addresses.
            drop(unsafe { Box::from_raw(target.as_ptr()) });
        }
    }

    fn counted(value: u32, hits: &Cell<usize>) -> Unique<u32, Counting<'_>> {
        let raw = Box::into_raw(Box::new(value));
        // SAFETY: fresh `Box::into_raw` address with a matching policy.
        unsafe { Unique::from_raw_with(raw, Counting { hits }) }
    }

    #[test]
    fn handle_with_unit_policy_is_pointer_sized() {
        assert_eq!(size_of::<Unique<u32>>(), size_of::<*mut u32>());
    }

    #[test]
    fn drop_reclaims_exactly_once() {
        let hits = Cell::new(0);
        let handle = counted(1, &hits);
        assert_eq!(hits.get(), 0);
        drop(handle);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn release_skips_the_policy() {
        let hits = Cell::new(0);
        let mut handle = counted(5, &hits);
        let before = handle.get().unwrap();

        let released = handle.release().unwrap();
        assert_eq!(released, before);
        assert!(handle.is_null());

        drop(handle);
        assert_eq!(hits.get(), 0, "an empty handle must not reclaim");

        // SAFETY: ownership came back to us via `release`.
        drop(unsafe { Box::from_raw(released.as_ptr()) });
    }

    #[test]
    fn overwriting_move_reclaims_the_old_resource() {
        let hits = Cell::new(0);
        let mut destination = counted(1, &hits);
        let source = counted(2, &hits);
        let incoming = source.get().unwrap();
        assert_ne!(destination.get(), Some(incoming));

        destination = source;
        assert_eq!(hits.get(), 1, "the overwritten resource is reclaimed");
        assert_eq!(destination.get(), Some(incoming));

        drop(destination);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn clear_empties_and_reclaims() {
        let hits = Cell::new(0);
        let mut handle = counted(9, &hits);

        handle.clear();
        assert!(handle.is_null());
        assert_eq!(hits.get(), 1);

        handle.clear();
        assert_eq!(hits.get(), 1, "clearing an empty handle is a no-op");
    }

    #[test]
    fn reset_reclaims_old_then_adopts_new() {
        let hits = Cell::new(0);
        let mut handle = counted(1, &hits);
        let replacement = Box::into_raw(Box::new(2u32));

        // SAFETY: `replacement` is a fresh `Box::into_raw` address.
        unsafe { handle.reset(replacement) };
        assert_eq!(hits.get(), 1);
        assert_eq!(handle.as_ptr(), replacement);

        drop(handle);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn reset_to_the_held_address_is_a_noop() {
        let hits = Cell::new(0);
        let mut handle = counted(3, &hits);
        let held = handle.as_ptr();

        // SAFETY: adopting the address we already own changes nothing.
        unsafe { handle.reset(held) };
        assert_eq!(hits.get(), 0);
        assert_eq!(handle.as_ptr(), held);

        drop(handle);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn reset_to_null_behaves_like_clear() {
        let hits = Cell::new(0);
        let mut handle = counted(4, &hits);

        // SAFETY: null adopts nothing.
        unsafe { handle.reset(ptr::null_mut()) };
        assert!(handle.is_null());
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn swap_exchanges_without_reclaiming() {
        let hits = Cell::new(0);
        let mut left = counted(1, &hits);
        let mut right = counted(2, &hits);
        let (left_addr, right_addr) = (left.get(), right.get());

        left.swap(&mut right);
        assert_eq!(hits.get(), 0);
        assert_eq!(left.get(), right_addr);
        assert_eq!(right.get(), left_addr);
    }

    #[test]
    fn map_policy_moves_the_address_across() {
        let hits = Cell::new(0);
        let handle = Unique::new(11u32);
        let address = handle.get();

        let converted = handle.map_policy(|_| Counting { hits: &hits });
        assert_eq!(converted.get(), address);
        assert_eq!(hits.get(), 0, "conversion itself reclaims nothing");

        drop(converted);
        assert_eq!(hits.get(), 1);
    }

    /// Never reclaims; stands in for a policy type convertible from the
    /// default one.
    #[derive(Default)]
    struct Leak;

    impl<T: ?Sized> Reclaim<T> for Leak {
        unsafe fn reclaim(&mut self, _target: NonNull<T>) {}
    }

    impl From<BoxReclaim> for Leak {
        fn from(_: BoxReclaim) -> Self {
            Leak
        }
    }

    #[test]
    fn into_policy_converts_via_from() {
        let handle = Unique::new(2u32);
        let address = handle.get();

        let leaky: Unique<u32, Leak> = handle.into_policy();
        assert_eq!(leaky.get(), address);

        let raw = leaky.into_raw();
        // SAFETY: `into_raw` handed us the sole ownership of the address.
        drop(unsafe { Box::from_raw(raw) });
    }

    #[test]
    fn into_raw_transfers_ownership() {
        let hits = Cell::new(0);
        let handle = counted(6, &hits);
        let raw = handle.into_raw();

        assert_eq!(hits.get(), 0);
        // SAFETY: `into_raw` handed us the sole ownership of the address.
        drop(unsafe { Box::from_raw(raw) });
    }

    #[test]
    fn empty_handle_drops_quietly() {
        let handle: Unique<u32> = Unique::default();
        assert!(handle.is_null());
        assert_eq!(handle.as_ptr(), ptr::null_mut());
        drop(handle);
    }

    #[test]
    fn dereference_observes_mutation() {
        let mut handle = Unique::new(10u32);
        // SAFETY: `handle` is non-null.
        unsafe {
            *handle.as_mut() += 5;
            assert_eq!(*handle.as_ref(), 15);
        }
    }

    #[test]
    fn policy_accessors_reach_the_stored_policy() {
        let hits = Cell::new(0);
        let mut handle = counted(1, &hits);
        assert_eq!(handle.policy().hits.get(), 0);
        handle.policy_mut().hits.set(7);
        assert_eq!(hits.get(), 7);
        hits.set(0);
    }

    #[test]
    fn debug_formats_the_state() {
        let empty: Unique<u32> = Unique::default();
        assert_eq!(alloc::format!("{empty:?}"), "Unique(None)");
        assert_eq!(alloc::format!("{empty:p}"), "0x0");

        let held = Unique::new(1u32);
        assert!(alloc::format!("{held:?}").starts_with("Unique(Some("));
    }
}
