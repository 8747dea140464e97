//! The async request/response engine for an MPD connection (C5).
//!
//! A single [`Client`] owns one socket, one FIFO task queue, and drives a
//! reader/writer pump task pair — the architecture
//! `mpv.rs`'s `MpvDriver`/`MpvHandle` split uses for mpv's JSON IPC, adapted
//! to MPD's strictly serialized text protocol (no request-id matching
//! needed: replies arrive in exactly enqueue order).

mod endpoint;
mod engine;
mod task;

pub use endpoint::Endpoint;
pub use engine::{Client, ConnectionState};
pub use mpd_proto::{
    accumulator::Subsystem, accumulators, Accumulator, AckError, ErrorKind, MpdError, Version,
};
pub use task::CancelHandle;
