use crate::accumulator::{impl_accumulator_any, Accumulator, Subsystem};
use crate::version::Version;

/// Accrues the `changed: <subsystem>` lines of an `idle` reply by OR-ing
/// each one into a running flag set (`gmpd-idle-response.c`).
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleAccumulator {
    pub changed: Subsystem,
}

impl Accumulator for IdleAccumulator {
    fn feed_pair(&mut self, _version: Version, key: &str, value: &str) {
        if key == "changed" {
            self.changed |= Subsystem::from_wire_name(value);
        } else {
            tracing::debug!(key, value, "unhandled idle field");
        }
    }

    impl_accumulator_any!(IdleAccumulator);
}
