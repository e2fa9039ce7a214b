//! Keep plain values obfuscated in memory.
//!
//! An [`ObfuscatedCell`] stores a single value of a fixed-size type inside a
//! buffer many times larger than the value. The value's bytes are XOR-masked
//! at an address-derived offset and surrounded by random filler, so the value
//! does not show up verbatim in a memory dump. The buffer itself is backed by
//! page-locked memory excluded from core dumps, and is zeroized on drop.
//!
//! The value is only ever decoded transiently: read it with
//! [`ObfuscatedCell::get`], or test it with the comparison helpers
//! ([`ObfuscatedCell::equals`], [`ObfuscatedCell::greater_than`], ...) which
//! hand the decoded value to a callback.
//!
//! This is obfuscation, not encryption. Anyone able to read the process
//! memory and knowing the scheme can recover the value.
//!
//! # Storing records
//!
//! Any type implementing [`Plain`] can be stored. Records derive the
//! `bytemuck` traits and must not contain implicit padding:
//!
//! ```
//! use obfuscated_mem::{bytemuck, ObfuscatedCell};
//!
//! #[repr(C)]
//! #[derive(Clone, Copy, PartialEq, Debug, bytemuck::NoUninit, bytemuck::CheckedBitPattern)]
//! struct Credentials {
//!     pin: u32,
//!     active: bool,
//!     _pad: [u8; 3],
//! }
//!
//! let creds = Credentials { pin: 1234, active: true, _pad: [0; 3] };
//! let cell = ObfuscatedCell::<Credentials>::new(creds)?;
//! assert_eq!(cell.get(), creds);
//! # Ok::<(), obfuscated_mem::Error>(())
//! ```

mod alloc;
mod cell;
mod compare;
mod error;
mod mask;

pub use bytemuck;
pub use cell::{ObfuscatedCell, DEFAULT_PADDING_FACTOR};
pub use compare::Comparison;
pub use error::{Error, Result};

/// Marker trait for values that can live in an [`ObfuscatedCell`].
///
/// A `Plain` value is `Copy`, owns no heap resources and has no padding
/// bytes, so its byte representation can be masked and restored verbatim.
/// It is implemented for every type that is both
/// [`NoUninit`](bytemuck::NoUninit) and
/// [`CheckedBitPattern`](bytemuck::CheckedBitPattern).
pub trait Plain: bytemuck::NoUninit + bytemuck::CheckedBitPattern {}

impl<T: bytemuck::NoUninit + bytemuck::CheckedBitPattern> Plain for T {}
