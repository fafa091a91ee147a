#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use tenure_pair as pair;
pub use tenure_ptr as ptr;
