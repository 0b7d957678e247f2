//! # Column Storage
//!
//! Byte-level codecs for the panel column stream.

pub mod rle;

pub use rle::Y_SENTINEL;
