use crate::accumulator::{impl_accumulator_any, Accumulator};
use crate::version::Version;
use std::collections::BTreeMap;

/// One song entity, built from a `currentsong`/`playlistinfo`-style reply
/// (`gmpd-song.c`/`gmpd-tag.c`). Tags are multi-valued and order-preserving
/// — a track can carry more than one `Title`, `Artist`, etc. — per §8's S3.
#[derive(Debug, Default, Clone)]
pub struct SongAccumulator {
    pub file: Option<String>,
    pub pos: Option<u32>,
    pub id: Option<u32>,
    /// Legacy `Time: <seconds>` field, superseded by `duration` but still
    /// sent by some servers.
    pub time: Option<f64>,
    pub duration: Option<f64>,
    pub last_modified: Option<String>,
    /// Tag name (as sent on the wire, e.g. `"Title"`) to its ordered values.
    pub tags: BTreeMap<String, Vec<String>>,
}

impl SongAccumulator {
    /// Convenience accessor mirroring `gmpd_song_get_tag_values`.
    pub fn tag_values(&self, name: &str) -> &[String] {
        self.tags.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Accumulator for SongAccumulator {
    fn feed_pair(&mut self, _version: Version, key: &str, value: &str) {
        match key {
            "file" => self.file = Some(value.to_string()),
            "Pos" => self.pos = value.parse().ok(),
            "Id" => self.id = value.parse().ok(),
            "Time" => self.time = value.parse().ok(),
            "duration" => self.duration = value.parse().ok(),
            "Last-Modified" => self.last_modified = Some(value.to_string()),
            _ => self
                .tags
                .entry(key.to_string())
                .or_default()
                .push(value.to_string()),
        }
    }

    impl_accumulator_any!(SongAccumulator);
}
