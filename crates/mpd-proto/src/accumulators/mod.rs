//! Concrete accumulators named in §4.3: void, song, status, stats,
//! replay-gain, idle.

mod idle;
mod replay_gain;
mod song;
mod stats;
mod status;
mod void;

pub use idle::IdleAccumulator;
pub use replay_gain::{ReplayGainAccumulator, ReplayGainMode};
pub use song::SongAccumulator;
pub use stats::StatsAccumulator;
pub use status::{PlaybackState, StatusAccumulator};
pub use void::VoidAccumulator;
