//! Wire-format building blocks for the MPD text protocol.
//!
//! This crate has no socket of its own — it parses what arrives and encodes
//! what goes out. The connection, task queue and I/O pump live in
//! `mpd-client`.

pub mod accumulator;
pub mod accumulators;
pub mod codec;
pub mod command;
pub mod error;
pub mod version;

pub use accumulator::Accumulator;
pub use error::{AckError, ErrorKind, MpdError};
pub use version::Version;
