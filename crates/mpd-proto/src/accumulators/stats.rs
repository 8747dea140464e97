use crate::accumulator::{impl_accumulator_any, Accumulator};
use crate::version::Version;

/// The `stats` reply (`gmpd-stats.c`).
#[derive(Debug, Clone, Default)]
pub struct StatsAccumulator {
    pub artists: Option<u32>,
    pub albums: Option<u32>,
    pub songs: Option<u32>,
    pub uptime_secs: Option<u64>,
    pub db_playtime_secs: Option<u64>,
    /// Unix timestamp of the last database update.
    pub db_update: Option<u64>,
    pub playtime_secs: Option<u64>,
}

impl Accumulator for StatsAccumulator {
    fn feed_pair(&mut self, _version: Version, key: &str, value: &str) {
        match key {
            "artists" => self.artists = value.parse().ok(),
            "albums" => self.albums = value.parse().ok(),
            "songs" => self.songs = value.parse().ok(),
            "uptime" => self.uptime_secs = value.parse().ok(),
            "db_playtime" => self.db_playtime_secs = value.parse().ok(),
            "db_update" => self.db_update = value.parse().ok(),
            "playtime" => self.playtime_secs = value.parse().ok(),
            _ => tracing::debug!(key, value, "unhandled stats field"),
        }
    }

    impl_accumulator_any!(StatsAccumulator);
}
