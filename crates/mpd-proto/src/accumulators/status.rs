use crate::accumulator::{impl_accumulator_any, Accumulator};
use crate::version::Version;

/// `state: play|pause|stop` (`gmpd-playback-state.c`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl PlaybackState {
    fn parse(value: &str) -> Self {
        match value {
            "play" => Self::Playing,
            "pause" => Self::Paused,
            _ => Self::Stopped,
        }
    }
}

/// The `status` reply — the full field set `gmpd-status.c` tracks, not just
/// the two fields spec.md's S2 exercises.
#[derive(Debug, Clone, Default)]
pub struct StatusAccumulator {
    pub volume: Option<i32>,
    pub repeat: bool,
    pub random: bool,
    pub single: bool,
    pub consume: bool,
    /// The `playlist` key: a monotonically increasing playlist version, not
    /// a name.
    pub playlist_version: Option<u32>,
    pub playlist_length: Option<u32>,
    pub playback: PlaybackState,
    pub song: Option<u32>,
    pub songid: Option<u32>,
    pub next_song: Option<u32>,
    pub next_songid: Option<u32>,
    pub current_elapsed: Option<f64>,
    pub current_duration: Option<f64>,
    pub bitrate: Option<u32>,
    pub xfade: Option<u32>,
    pub mixrampdb: Option<f64>,
    pub mixrampdelay: Option<f64>,
    pub error: Option<String>,
    pub updating_db: Option<u32>,

    /// Set once a `elapsed`/`duration` key has been seen, so a later
    /// legacy `time` key (servers sometimes send both) doesn't clobber the
    /// more precise float value. See spec.md §9's open question on `time`.
    has_elapsed: bool,
    has_duration: bool,
}

fn parse_bool01(value: &str) -> bool {
    value == "1"
}

impl Accumulator for StatusAccumulator {
    fn feed_pair(&mut self, _version: Version, key: &str, value: &str) {
        match key {
            "volume" => self.volume = value.parse().ok(),
            "repeat" => self.repeat = parse_bool01(value),
            "random" => self.random = parse_bool01(value),
            "single" => self.single = parse_bool01(value),
            "consume" => self.consume = parse_bool01(value),
            "playlist" => self.playlist_version = value.parse().ok(),
            "playlistlength" => self.playlist_length = value.parse().ok(),
            "state" => self.playback = PlaybackState::parse(value),
            "song" => self.song = value.parse().ok(),
            "songid" => self.songid = value.parse().ok(),
            "nextsong" => self.next_song = value.parse().ok(),
            "nextsongid" => self.next_songid = value.parse().ok(),
            "elapsed" => {
                self.current_elapsed = value.parse().ok();
                self.has_elapsed = true;
            }
            "duration" => {
                self.current_duration = value.parse().ok();
                self.has_duration = true;
            }
            "time" => {
                if let Some((elapsed, total)) = value.split_once(':') {
                    if !self.has_elapsed {
                        self.current_elapsed = elapsed.parse().ok();
                    }
                    if !self.has_duration {
                        self.current_duration = total.parse().ok();
                    }
                }
            }
            "bitrate" => self.bitrate = value.parse().ok(),
            "xfade" => self.xfade = value.parse().ok(),
            "mixrampdb" => self.mixrampdb = value.parse().ok(),
            "mixrampdelay" => self.mixrampdelay = value.parse().ok(),
            "error" => self.error = Some(value.to_string()),
            "updating_db" => self.updating_db = value.parse().ok(),
            _ => tracing::debug!(key, value, "unhandled status field"),
        }
    }

    impl_accumulator_any!(StatusAccumulator);
}
