//! A two-value container that stores zero-size members for free.
//!
//! [`CompressedPair<A, B>`] holds two logical values behind a uniform
//! accessor surface. Whenever one of the member types is zero-size (a
//! stateless marker, a unit release policy, an empty allocator), the pair
//! occupies exactly the storage of the other member; when both are
//! zero-size the pair itself is zero-size.
//!
//! Unlike the classic C++ rendition of this container, no empty-base-class
//! machinery is involved: Rust's native layout already gives zero-size
//! fields no storage, so a single definition covers every member
//! combination. The crate pins that guarantee down with compile-time
//! assertions so a regression cannot slip in silently.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

mod pair;

pub use pair::CompressedPair;
