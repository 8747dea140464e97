use crate::accumulator::{impl_accumulator_any, Accumulator};
use crate::version::Version;

/// `gmpd-replay-gain-mode.c`'s four modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplayGainMode {
    #[default]
    Off,
    Track,
    Album,
    Auto,
}

impl ReplayGainMode {
    fn parse(value: &str) -> Self {
        match value {
            "track" => Self::Track,
            "album" => Self::Album,
            "auto" => Self::Auto,
            _ => Self::Off,
        }
    }
}

/// The `replay_gain_status` reply (`gmpd-replay-gain-status.c`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayGainAccumulator {
    pub mode: ReplayGainMode,
}

impl Accumulator for ReplayGainAccumulator {
    fn feed_pair(&mut self, _version: Version, key: &str, value: &str) {
        match key {
            "replay_gain_mode" => self.mode = ReplayGainMode::parse(value),
            _ => tracing::debug!(key, value, "unhandled replay-gain field"),
        }
    }

    impl_accumulator_any!(ReplayGainAccumulator);
}
