//! The Task and task queue of §3.

use mpd_proto::Accumulator;
use mpd_proto::MpdError;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

/// A caller-held cancellation handle for one in-flight [`Task`]. Cloning and
/// handing a clone to the engine, while keeping one for the caller, gives
/// both sides a view onto the same signal (§3, §5).
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(CancellationToken);

impl CancelHandle {
    pub fn new() -> Self {
        Self(CancellationToken::new())
    }

    /// Signals cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.is_cancelled()
    }

    pub(crate) fn token(&self) -> CancellationToken {
        self.0.clone()
    }
}

pub(crate) type TaskOutcome = Result<Box<dyn Accumulator>, MpdError>;

/// One in-flight command: command bytes, accumulator, cancellation handle,
/// and an outcome slot realized as a one-shot channel (§3, and Design
/// Notes' "one-shot completion channel per task, resolved by the pump
/// after releasing the mutex").
pub(crate) struct QueuedTask {
    pub accumulator: Box<dyn Accumulator>,
    pub done: oneshot::Sender<TaskOutcome>,
    pub cancel: CancellationToken,
    /// True for the `idle` command's own task: gates timeout suppression
    /// (§4.5.4).
    pub is_idle: bool,
    /// Set to this idle exchange's epoch for an `idle` task, `None`
    /// otherwise. Lets the reader clear `Inner::idle_pending_noidle` only
    /// when it still names the exchange this task started, not a later
    /// idle enqueued in the meantime (§4.5.3).
    pub idle_token: Option<u64>,
}
