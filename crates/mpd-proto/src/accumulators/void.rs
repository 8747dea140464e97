use crate::accumulator::{impl_accumulator_any, Accumulator};

/// Discards every field. Used for fire-and-forget commands like `close`,
/// and as the sink a cancelled-but-already-buffered task's response drains
/// into (§5).
#[derive(Debug, Default)]
pub struct VoidAccumulator;

impl Accumulator for VoidAccumulator {
    fn feed_pair(&mut self, _version: crate::version::Version, _key: &str, _value: &str) {}

    impl_accumulator_any!(VoidAccumulator);
}
