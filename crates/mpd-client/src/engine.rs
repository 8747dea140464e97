//! The connection engine (C5, §4.5): one socket, one FIFO task queue, one
//! spawned reader task draining responses in order.
//!
//! This crate has no non-blocking socket of its own — the `WouldBlock`/
//! readiness-source pump §4.5.2 describes for a hand-rolled reactor
//! collapses into plain `.await` suspension under Tokio, the ambient
//! cooperative scheduler the whole corpus already runs on. What survives
//! unchanged from the source design is the *shape*: one mutex-guarded
//! serialization domain (here, one `tokio::sync::Mutex<Inner>`), FIFO
//! delivery, and per-task one-shot completion channels resolved after the
//! lock is released (§9's "one-shot completion channel per task").

use crate::endpoint::Endpoint;
use crate::task::{CancelHandle, QueuedTask, TaskOutcome};
use mpd_proto::accumulators::{
    IdleAccumulator, ReplayGainAccumulator, SongAccumulator, StatsAccumulator, StatusAccumulator,
    VoidAccumulator,
};
use mpd_proto::{codec, command, Accumulator, MpdError, Version};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpStream, UnixStream};
use tokio::runtime::Runtime;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// `New → Handshaking → Connected → Closed` (§4.5.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    New,
    Handshaking,
    Connected,
    Closed,
}

type BoxedRead = Box<dyn AsyncRead + Unpin + Send>;
type BoxedWrite = Box<dyn AsyncWrite + Unpin + Send>;

struct Inner {
    write_half: Option<BoxedWrite>,
    queue: VecDeque<QueuedTask>,
    state: ConnectionState,
    version: Version,
    /// Epoch of the in-flight idle exchange awaiting either a `noidle`
    /// interjection or the server's own spontaneous reply, `None` when no
    /// idle is outstanding (§4.5.3). The reader task removes a task from
    /// `queue` as soon as it becomes head, so this tracks the exchange
    /// independently of queue membership. Carrying an epoch rather than a
    /// bare flag lets the reader clear it, on the idle task's own
    /// completion, only if a newer idle hasn't already replaced it.
    idle_pending_noidle: Option<u64>,
    /// Source of `idle_pending_noidle` epochs; incremented each time an
    /// `idle` task is enqueued.
    next_idle_token: u64,
}

/// State shared between [`Client`] and its reader task.
struct Shared {
    inner: Mutex<Inner>,
    /// Woken whenever the reader task should re-check the queue: a new
    /// task was enqueued, or the engine closed.
    notify: Notify,
    /// Socket I/O timeout in milliseconds; `0` disables it (§4.5.4).
    timeout_ms: AtomicU64,
    /// An owned duplicate of the TCP socket's descriptor, taken at connect
    /// time before `into_split` — gives `set_keepalive` a safe handle to
    /// toggle `SO_KEEPALIVE` on without reaching for the split halves or
    /// reconstructing a descriptor with `unsafe`. `None` for a Unix-domain
    /// connection.
    #[cfg(unix)]
    keepalive_socket: Option<socket2::Socket>,
}

impl Shared {
    fn current_timeout(&self) -> Option<std::time::Duration> {
        match self.timeout_ms.load(Ordering::Relaxed) {
            0 => None,
            ms => Some(std::time::Duration::from_millis(ms)),
        }
    }
}

/// One connection to an MPD server (C5). Cheap to clone the pieces of, but
/// the type itself is not `Clone`: only one logical owner drives `close`.
pub struct Client {
    shared: Arc<Shared>,
    reader: Mutex<Option<JoinHandle<()>>>,
    /// Present only on a [`Client`] built via [`Client::connect`]; backs
    /// the blocking API with an embedded current-thread runtime, the way
    /// `reqwest::blocking` layers a synchronous surface over one async
    /// core instead of maintaining two I/O stacks.
    blocking_rt: Option<Runtime>,
}

impl Client {
    /// Opens `endpoint`, validates the welcome line, and starts the reader
    /// task (§4.5.1's `connect_async`).
    pub async fn connect_async(endpoint: Endpoint) -> Result<Self, MpdError> {
        #[cfg(unix)]
        let mut keepalive_socket = None;

        let (read_half, write_half): (BoxedRead, BoxedWrite) = match &endpoint {
            Endpoint::Tcp { host, port } => {
                let stream = TcpStream::connect((host.as_str(), *port)).await?;
                #[cfg(unix)]
                {
                    // Dup the descriptor into an owned `socket2::Socket`
                    // rather than stashing the raw fd: the dup has its own
                    // independent lifetime, so no `unsafe` is needed to use
                    // it after `into_split` consumes `stream`.
                    keepalive_socket = Some(socket2::SockRef::from(&stream).try_clone()?);
                }
                let (r, w) = stream.into_split();
                (Box::new(r), Box::new(w))
            }
            Endpoint::Unix(path) => {
                let stream = UnixStream::connect(path).await?;
                let (r, w) = stream.into_split();
                (Box::new(r), Box::new(w))
            }
        };

        let mut reader = BufReader::new(read_half);
        let mut line = String::new();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            return Err(MpdError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "connection closed before welcome line",
            )));
        }
        let version = Version::parse_welcome(&line)?;
        debug!(%version, "connected");

        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner {
                write_half: Some(write_half),
                queue: VecDeque::new(),
                state: ConnectionState::Connected,
                version,
                idle_pending_noidle: None,
                next_idle_token: 0,
            }),
            notify: Notify::new(),
            timeout_ms: AtomicU64::new(0),
            #[cfg(unix)]
            keepalive_socket,
        });

        let reader_shared = shared.clone();
        let handle = tokio::spawn(reader_loop(reader_shared, reader, version));

        Ok(Self {
            shared,
            reader: Mutex::new(Some(handle)),
            blocking_rt: None,
        })
    }

    /// Blocking variant of [`Client::connect_async`] (§4.5.1). Builds a
    /// current-thread runtime and drives the whole connect-plus-handshake
    /// on it, then keeps that runtime alive to back the rest of this
    /// client's blocking methods.
    pub fn connect(endpoint: Endpoint) -> Result<Self, MpdError> {
        let rt = Runtime::new().map_err(MpdError::Io)?;
        let mut client = rt.block_on(Self::connect_async(endpoint))?;
        client.blocking_rt = Some(rt);
        Ok(client)
    }

    /// Submits one command and awaits its outcome (§4.5.1's `run_async`).
    pub async fn run_async(
        &self,
        name: &str,
        args: &[&str],
        accumulator: Box<dyn Accumulator>,
        cancel: CancelHandle,
        is_idle: bool,
    ) -> TaskOutcome {
        let (tx, rx) = tokio::sync::oneshot::channel();
        {
            let mut inner = self.shared.inner.lock().await;
            if inner.state == ConnectionState::Closed {
                let _ = tx.send(Err(MpdError::Closed));
                return rx.await.unwrap_or(Err(MpdError::Closed));
            }
            if inner.write_half.is_none() {
                let _ = tx.send(Err(MpdError::Closed));
                return rx.await.unwrap_or(Err(MpdError::Closed));
            }

            // §4.5.3: interjecting `noidle` happens at enqueue time, as a
            // write only — the idle task already in flight stays the one
            // and only task representing that exchange. If the server
            // already replied to that idle on its own (a subscribed
            // subsystem changed), the reader task has already cleared
            // `idle_pending_noidle` and no interjection happens here.
            if inner.idle_pending_noidle.is_some() {
                let write_half = inner.write_half.as_mut().unwrap();
                if let Err(e) = write_half.write_all(b"noidle\n").await {
                    inner.state = ConnectionState::Closed;
                    fail_all_queued(&mut inner.queue, MpdError::Closed);
                    return Err(MpdError::Io(e));
                }
                inner.idle_pending_noidle = None;
            }

            let bytes = command::encode(name, args);
            let write_half = inner.write_half.as_mut().unwrap();
            if let Err(e) = write_half.write_all(&bytes).await {
                inner.state = ConnectionState::Closed;
                fail_all_queued(&mut inner.queue, MpdError::Closed);
                return Err(MpdError::Io(e));
            }

            let idle_token = if is_idle {
                let token = inner.next_idle_token;
                inner.next_idle_token += 1;
                inner.idle_pending_noidle = Some(token);
                Some(token)
            } else {
                None
            };

            inner.queue.push_back(QueuedTask {
                accumulator,
                done: tx,
                cancel: cancel.token(),
                is_idle,
                idle_token,
            });
        }
        self.shared.notify.notify_one();

        rx.await.unwrap_or(Err(MpdError::Closed))
    }

    /// Blocking variant of [`Client::run_async`].
    pub fn run(
        &self,
        name: &str,
        args: &[&str],
        accumulator: Box<dyn Accumulator>,
        cancel: CancelHandle,
        is_idle: bool,
    ) -> TaskOutcome {
        let rt = self
            .blocking_rt
            .as_ref()
            .expect("Client::run requires a client built via Client::connect");
        rt.block_on(self.run_async(name, args, accumulator, cancel, is_idle))
    }

    /// `status\n` (§8 S2).
    pub async fn status(&self) -> Result<StatusAccumulator, MpdError> {
        self.typed("status", &[], StatusAccumulator::default(), false)
            .await
    }

    /// `currentsong\n` (§8 S3).
    pub async fn currentsong(&self) -> Result<SongAccumulator, MpdError> {
        self.typed("currentsong", &[], SongAccumulator::default(), false)
            .await
    }

    /// `stats\n`.
    pub async fn stats(&self) -> Result<StatsAccumulator, MpdError> {
        self.typed("stats", &[], StatsAccumulator::default(), false)
            .await
    }

    /// `replay_gain_status\n`.
    pub async fn replay_gain_status(&self) -> Result<ReplayGainAccumulator, MpdError> {
        self.typed(
            "replay_gain_status",
            &[],
            ReplayGainAccumulator::default(),
            false,
        )
        .await
    }

    /// `idle [<subsystem>...]\n` (§4.5.3, §8 S5). An empty `subsystems`
    /// subscribes to all fourteen.
    pub async fn idle(
        &self,
        subsystems: mpd_proto::accumulator::Subsystem,
        cancel: CancelHandle,
    ) -> Result<IdleAccumulator, MpdError> {
        let names: Vec<&str> = subsystems.iter().filter_map(|flag| flag.name()).collect();
        let outcome = self
            .run_async(
                "idle",
                &names,
                Box::new(IdleAccumulator::default()),
                cancel,
                true,
            )
            .await?;
        downcast(outcome)
    }

    /// Runs a command whose reply maps onto a known concrete accumulator,
    /// downcasting the trait object the generic core returns back to it.
    async fn typed<A: Accumulator + Default>(
        &self,
        name: &str,
        args: &[&str],
        seed: A,
        is_idle: bool,
    ) -> Result<A, MpdError> {
        let outcome = self
            .run_async(name, args, Box::new(seed), CancelHandle::new(), is_idle)
            .await?;
        downcast(outcome)
    }

    /// Sets the socket I/O timeout; takes effect immediately (§4.5.1,
    /// §4.5.4). `None` disables it.
    pub fn set_timeout(&self, timeout: Option<std::time::Duration>) {
        let ms = timeout.map(|d| d.as_millis() as u64).unwrap_or(0);
        self.shared.timeout_ms.store(ms, Ordering::Relaxed);
    }

    /// Toggles `SO_KEEPALIVE` on the underlying TCP socket; takes effect
    /// immediately (§4.5.1). A no-op (logged) on Unix-domain connections
    /// and on non-Unix targets, where no descriptor is retained.
    pub fn set_keepalive(&self, enabled: bool) {
        #[cfg(unix)]
        {
            match &self.shared.keepalive_socket {
                Some(sock) => {
                    if let Err(e) = sock.set_keepalive(enabled) {
                        warn!(error = %e, "failed to set SO_KEEPALIVE");
                    } else if enabled {
                        let keepalive = socket2::TcpKeepalive::new()
                            .with_time(std::time::Duration::from_secs(60));
                        if let Err(e) = sock.set_tcp_keepalive(&keepalive) {
                            warn!(error = %e, "failed to set keepalive parameters");
                        }
                    }
                }
                None => debug!("set_keepalive ignored: not a TCP connection"),
            }
        }
        #[cfg(not(unix))]
        {
            let _ = enabled;
            debug!("set_keepalive ignored: unsupported on this platform");
        }
    }

    /// Submits `close\n` and tears down the connection (§4.5.1). Idempotent
    /// (§8 property 4): a second call completes with `Closed` rather than
    /// panicking or double-closing the socket.
    pub async fn close_async(&self) -> Result<(), MpdError> {
        let mut inner = self.shared.inner.lock().await;
        if inner.state == ConnectionState::Closed {
            return Err(MpdError::Closed);
        }
        if let Some(mut w) = inner.write_half.take() {
            let _ = w.write_all(&command::encode("close", &[])).await;
            let _ = w.flush().await;
        }
        inner.state = ConnectionState::Closed;
        fail_all_queued(&mut inner.queue, MpdError::Closed);
        drop(inner);

        self.shared.notify.notify_one();
        if let Some(handle) = self.reader.lock().await.take() {
            handle.abort();
        }
        Ok(())
    }

    /// Blocking variant of [`Client::close_async`].
    pub fn close(&self) -> Result<(), MpdError> {
        let rt = self
            .blocking_rt
            .as_ref()
            .expect("Client::close requires a client built via Client::connect");
        rt.block_on(self.close_async())
    }

    pub async fn state(&self) -> ConnectionState {
        self.shared.inner.lock().await.state
    }

    pub async fn version(&self) -> Version {
        self.shared.inner.lock().await.version
    }
}

fn downcast<A: Accumulator>(outcome: Box<dyn Accumulator>) -> Result<A, MpdError> {
    outcome
        .into_any()
        .downcast::<A>()
        .map(|boxed| *boxed)
        .map_err(|_| MpdError::invalid_data("accumulator type mismatch"))
}

/// Completes every queued task with `err`, in FIFO order (§4.5.6, §7's
/// cascade-to-`Closed` rule).
fn fail_all_queued(queue: &mut VecDeque<QueuedTask>, err: MpdError) {
    for task in queue.drain(..) {
        let _ = task.done.send(Err(clone_err(&err)));
    }
}

fn clone_err(err: &MpdError) -> MpdError {
    match err {
        MpdError::Closed => MpdError::Closed,
        MpdError::Cancelled => MpdError::Cancelled,
        MpdError::TimedOut => MpdError::TimedOut,
        MpdError::InvalidData(s) => MpdError::InvalidData(s.clone()),
        MpdError::Protocol(ack) => MpdError::Protocol(ack.clone()),
        MpdError::Io(e) => MpdError::Io(std::io::Error::new(e.kind(), e.to_string())),
    }
}

/// Drives responses for the head of the queue, in order, for the lifetime
/// of the connection — the one spawned task this engine runs, grounded on
/// `mpv.rs`'s `reader_task` but collapsed to a single queue since MPD
/// replies arrive in exact enqueue order (no request-id matching needed).
async fn reader_loop<R>(shared: Arc<Shared>, mut reader: BufReader<R>, version: Version)
where
    R: AsyncRead + Unpin,
{
    loop {
        let mut task = match dequeue(&shared).await {
            Some(t) => t,
            None => break,
        };

        // A task cancelled while it was still behind the head completes
        // immediately; its command bytes are already on the wire (written
        // at enqueue time), so the response must still be drained — into a
        // sentinel accumulator — to keep subsequent parsing in frame (§5).
        let already_cancelled = task.cancel.is_cancelled();

        let timeout = if task.is_idle {
            None
        } else {
            shared.current_timeout()
        };

        let mut sink = VoidAccumulator;
        let acc: &mut dyn Accumulator = if already_cancelled {
            &mut sink
        } else {
            task.accumulator.as_mut()
        };

        // The deadline is per read, not over the whole framed reply: a
        // large reply that keeps arriving in pieces stays alive as long as
        // each individual read makes progress within `timeout` (§4.5.4).
        let read_result: Result<(), MpdError> =
            codec::read_response(&mut reader, version, acc, timeout).await;

        // Protocol errors (server ACKs) are non-fatal — only the head task
        // fails and the rest of the queue keeps going (§7). Everything
        // else is fatal and cascades to `Closed` (§4.5.6, §7).
        let fatal = matches!(read_result, Err(ref e) if !matches!(e, MpdError::Protocol(_)));

        // A cancellation landing while this read was in flight (head-task
        // cancellation, §5) still wins over a successful parse: the task
        // remains head until its response drains, then completes
        // `Cancelled` rather than with real data.
        let outcome: TaskOutcome = if already_cancelled || task.cancel.is_cancelled() {
            Err(MpdError::Cancelled)
        } else {
            read_result.map(|()| task.accumulator as Box<dyn Accumulator>)
        };
        let _ = task.done.send(outcome);

        // The idle task's own reply draining — whether triggered by a
        // `noidle` interjection or the server's own spontaneous
        // `changed`/`OK` — ends the exchange. Clear it so the next enqueue
        // doesn't interject a stray `noidle` against an idle that already
        // completed (§4.5.3, §8 property 5). Guarded by epoch: if a fresh
        // idle was already enqueued in the meantime, its epoch has
        // replaced this one and must not be clobbered.
        if let Some(token) = task.idle_token {
            let mut inner = shared.inner.lock().await;
            if inner.idle_pending_noidle == Some(token) {
                inner.idle_pending_noidle = None;
            }
        }

        if fatal {
            let mut inner = shared.inner.lock().await;
            inner.state = ConnectionState::Closed;
            inner.write_half = None;
            fail_all_queued(&mut inner.queue, MpdError::Closed);
            break;
        }
    }
    debug!("reader task exiting");
}

/// Waits for, then removes, the task at the front of the queue. Returns
/// `None` once the engine has closed and the queue is empty — the reader
/// task's exit condition.
async fn dequeue(shared: &Shared) -> Option<QueuedTask> {
    loop {
        let notified = shared.notify.notified();
        {
            let mut inner = shared.inner.lock().await;
            if let Some(task) = inner.queue.pop_front() {
                return Some(task);
            }
            if inner.state == ConnectionState::Closed {
                return None;
            }
        }
        notified.await;
    }
}
