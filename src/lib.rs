#![no_std]

//! Streaming decoders for measurement record ("shot") data.
//!
//! A shot is a fixed-length vector of bits. Shots arrive on a byte stream in
//! one of several wire formats, each decoded by a small state machine that
//! tracks the bit position within a record, detects record boundaries, and
//! supports single-bit and bulk-byte reads.
//!
//! Most users should begin with the functions in the [`shots`] module, which
//! publish every bit of a stream to a receiver. For finer control, construct a
//! decoder with [`record::make`] and drive it through the
//! [`RecordReader`](record::RecordReader) trait.
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `std`: enable reader-based byte sources (default).

#[cfg(feature = "std")]
extern crate std;

mod error;
mod scan;

pub mod record;
pub mod shots;
pub mod source;

pub use error::Error;
