//! Single-owner handles over raw addresses, with pluggable release policies.
//!
//! The goal is `unique_ptr`-style ownership for resources that only exist as
//! raw pointers: a handle adopts an address, is the sole owner of it while it
//! lives, and runs a release policy on it exactly once when it is dropped,
//! cleared, or overwritten.
//!
//! **Reclaim** and **BoxReclaim**
//!
//! [`Reclaim<T>`] is the release-policy capability: anything that can be
//! invoked once on a [`NonNull<T>`](core::ptr::NonNull) address. [`BoxReclaim`]
//! is the default policy and frees addresses produced by `Box::into_raw`;
//! because it is implemented for unsized pointees too, the same unit type
//! covers both single objects and whole buffers. [`ReclaimFn`] adapts any
//! closure over one address into a policy.
//!
//! **Unique**
//!
//! [`Unique<T, R>`] pairs an optional address with a policy instance inside a
//! [`CompressedPair`](tenure_pair::CompressedPair), so a handle with a
//! zero-size policy is exactly one pointer wide. It is move-only by
//! construction: transferring ownership consumes the source handle.
//!
//! **UniqueSlice**
//!
//! [`UniqueSlice<T, R>`] is `Unique<[T], R>`: the buffer form. The address is
//! a fat slice pointer, so the element count travels with the handle and the
//! default policy reclaims every element. Element access through
//! [`get_unchecked`](Unique::get_unchecked) performs no bounds checks in
//! release builds.
#![expect(unsafe_code, reason = "Owning raw addresses is inherently unsafe.")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// No STD Support

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod policy;
mod slice;
mod unique;

// -----------------------------------------------------------------------------
// Top-level exports

pub use policy::{BoxReclaim, Reclaim, ReclaimFn};
pub use slice::UniqueSlice;
pub use unique::Unique;
