//! The response accumulator interface (C3, §4.3) and the idle subsystem set.

use crate::error::MpdError;
use crate::version::Version;
use bitflags::bitflags;

bitflags! {
    /// The 14 subsystems the `idle` command can subscribe to (§3).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Subsystem: u16 {
        const DATABASE        = 1 << 0;
        const UPDATE          = 1 << 1;
        const STORED_PLAYLIST = 1 << 2;
        const PLAYLIST        = 1 << 3;
        const PLAYER          = 1 << 4;
        const MIXER           = 1 << 5;
        const OUTPUT          = 1 << 6;
        const OPTIONS         = 1 << 7;
        const PARTITION       = 1 << 8;
        const STICKER         = 1 << 9;
        const SUBSCRIPTION    = 1 << 10;
        const MESSAGE         = 1 << 11;
        const NEIGHBOR        = 1 << 12;
        const MOUNT           = 1 << 13;
    }
}

impl Subsystem {
    /// Maps a `changed: <name>` value (or an `idle <name>` argument) to its
    /// flag. Unknown names map to the empty set, matching the "unknown keys
    /// must not fail the task" rule extended to subsystem names.
    pub fn from_wire_name(name: &str) -> Self {
        match name {
            "database" => Self::DATABASE,
            "update" => Self::UPDATE,
            "stored_playlist" => Self::STORED_PLAYLIST,
            "playlist" => Self::PLAYLIST,
            "player" => Self::PLAYER,
            "mixer" => Self::MIXER,
            "output" => Self::OUTPUT,
            "options" => Self::OPTIONS,
            "partition" => Self::PARTITION,
            "sticker" => Self::STICKER,
            "subscription" => Self::SUBSCRIPTION,
            "message" => Self::MESSAGE,
            "neighbor" => Self::NEIGHBOR,
            "mount" => Self::MOUNT,
            _ => Self::empty(),
        }
    }

    /// The wire name for a single-flag value, used to build `idle <names>`
    /// argument lists. Returns `None` for the empty set or a combination of
    /// more than one flag.
    pub fn name(&self) -> Option<&'static str> {
        Some(match *self {
            Self::DATABASE => "database",
            Self::UPDATE => "update",
            Self::STORED_PLAYLIST => "stored_playlist",
            Self::PLAYLIST => "playlist",
            Self::PLAYER => "player",
            Self::MIXER => "mixer",
            Self::OUTPUT => "output",
            Self::OPTIONS => "options",
            Self::PARTITION => "partition",
            Self::STICKER => "sticker",
            Self::SUBSCRIPTION => "subscription",
            Self::MESSAGE => "message",
            Self::NEIGHBOR => "neighbor",
            Self::MOUNT => "mount",
            _ => return None,
        })
    }
}

/// Consumes the key/value (and optional binary) stream of one reply (C3).
///
/// Default behaviors are no-ops except `feed_binary`, which fails loudly:
/// only an accumulator that has just reported `remaining_binary() > 0`
/// should ever receive a `feed_binary` call, so the default implementation
/// existing at all is a bug guard, not an expected path.
pub trait Accumulator: std::any::Any + Send {
    /// Absorb one textual field. Unknown keys must not fail the task — log
    /// and drop, per §4.3.
    fn feed_pair(&mut self, version: Version, key: &str, value: &str) {
        let _ = version;
        tracing::debug!(key, value, "unhandled response field");
    }

    /// Absorb one chunk of a binary payload.
    fn feed_binary(&mut self, version: Version, bytes: &[u8]) -> Result<(), MpdError> {
        let _ = (version, bytes);
        Err(MpdError::invalid_data(
            "accumulator received binary data it never declared pending",
        ))
    }

    /// Bytes of the current binary payload still expected. `0` means "no
    /// binary pending, read textual lines next" (§4.4 step 1).
    fn remaining_binary(&self) -> u64 {
        0
    }

    /// Lets an engine that stores accumulators behind `Box<dyn Accumulator>`
    /// recover the concrete type once a reply completes.
    fn as_any(&self) -> &dyn std::any::Any;

    fn into_any(self: Box<Self>) -> Box<dyn std::any::Any>;
}

/// Implements the `as_any`/`into_any` boilerplate `Accumulator` requires.
/// Every concrete accumulator in [`crate::accumulators`] uses this.
macro_rules! impl_accumulator_any {
    ($ty:ty) => {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn into_any(self: Box<Self>) -> Box<dyn std::any::Any> {
            self
        }
    };
}
pub(crate) use impl_accumulator_any;
