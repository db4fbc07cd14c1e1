//! Event-stream client state machine.
//!
//! Each client owns a background task that drives one feed subscription
//! through its lifecycle: open the transport, watch the heartbeat,
//! recover with backoff, park in fallback once the retry budget is
//! spent. Callers steer it with [`EventStreamClient::connect`] /
//! [`EventStreamClient::disconnect`] and observe it through
//! [`EventStreamClient::subscribe`] and [`EventStreamClient::status`].
//!
//! All state mutation happens on the task timeline; the public surface
//! only enqueues commands and reads the shared snapshot. Timers never
//! outlive the state that armed them — they are futures owned by the
//! task and are dropped on every transition.

use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::Instant;

use plexwatch_core::descriptor::ServerDescriptor;
use plexwatch_core::error::TransportError;
use plexwatch_core::events::{ClientEvent, EventBus, SessionEvent, Signal};
use plexwatch_core::notification::parse_notifications;
use plexwatch_core::policy::{BackoffConfig, ReconnectPolicy};
use plexwatch_core::state::{ConnectionState, ConnectionStatus};
use plexwatch_core::transport::{EventFrame, EventSource};

/// Configuration for an [`EventStreamClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Maximum silence tolerated before the feed is declared dead. The
    /// same window bounds how long the initial open may take, so a hung
    /// handshake and a silent connection are handled identically.
    pub activity_timeout: Duration,
    /// Reconnect scheduling.
    pub backoff: BackoffConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            activity_timeout: Duration::from_secs(30),
            backoff: BackoffConfig::default(),
        }
    }
}

enum Command {
    Connect,
    Disconnect,
}

struct StatusInner {
    state: ConnectionState,
    connected_at: Option<SystemTime>,
    last_event_at: Option<SystemTime>,
    attempts: u32,
    last_error: Option<String>,
}

/// Client for one monitored server's event feed.
///
/// Maintains a background task that owns the feed connection and handles
/// heartbeat monitoring, reconnect and fallback transparently. Dropping
/// the client stops the task.
pub struct EventStreamClient {
    descriptor: ServerDescriptor,
    cmd_tx: mpsc::UnboundedSender<Command>,
    shared: Arc<Mutex<StatusInner>>,
    bus: EventBus,
}

impl EventStreamClient {
    /// Spawn the driver task for `descriptor` over the given transport.
    ///
    /// The client starts disconnected; call [`connect`](Self::connect) to
    /// bring the feed up.
    pub fn new(
        descriptor: ServerDescriptor,
        source: Arc<dyn EventSource>,
        config: ClientConfig,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Mutex::new(StatusInner {
            state: ConnectionState::Disconnected,
            connected_at: None,
            last_event_at: None,
            attempts: 0,
            last_error: None,
        }));
        let bus = EventBus::new();

        let ctx = TaskCtx {
            descriptor: descriptor.clone(),
            source,
            config,
            shared: Arc::clone(&shared),
            bus: bus.clone(),
        };
        tokio::spawn(client_task(ctx, cmd_rx));

        Self {
            descriptor,
            cmd_tx,
            shared,
            bus,
        }
    }

    /// Begin connecting. No-op while already connected or connecting;
    /// from reconnecting it skips the remaining backoff, from fallback it
    /// revives the client. Never fails: all connection errors surface as
    /// emitted events and state.
    pub fn connect(&self) {
        {
            let inner = self.shared.lock().unwrap();
            if matches!(
                inner.state,
                ConnectionState::Connected | ConnectionState::Connecting
            ) {
                return;
            }
        }
        let _ = self.cmd_tx.send(Command::Connect);
    }

    /// Tear the feed down from any state, cancelling pending reconnects.
    /// The only route to `disconnected`; automatic recovery never runs
    /// from there.
    pub fn disconnect(&self) {
        let _ = self.cmd_tx.send(Command::Disconnect);
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.shared.lock().unwrap().state
    }

    /// Read-only snapshot of the connection.
    pub fn status(&self) -> ConnectionStatus {
        let inner = self.shared.lock().unwrap();
        ConnectionStatus {
            server_id: self.descriptor.id.clone(),
            server_name: self.descriptor.name.clone(),
            state: inner.state,
            connected_at: inner.connected_at,
            last_event_at: inner.last_event_at,
            reconnect_attempts: inner.attempts,
            last_error: inner.last_error.clone(),
        }
    }

    /// Subscribe to every signal this client emits, in emission order.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<ClientEvent> {
        self.bus.subscribe()
    }

    /// Subscribe to a single signal.
    pub fn subscribe_signal(&self, signal: Signal) -> mpsc::UnboundedReceiver<ClientEvent> {
        self.bus.subscribe_signal(signal)
    }

    /// The server this client watches.
    pub fn descriptor(&self) -> &ServerDescriptor {
        &self.descriptor
    }
}

struct TaskCtx {
    descriptor: ServerDescriptor,
    source: Arc<dyn EventSource>,
    config: ClientConfig,
    shared: Arc<Mutex<StatusInner>>,
    bus: EventBus,
}

impl TaskCtx {
    fn state(&self) -> ConnectionState {
        self.shared.lock().unwrap().state
    }

    /// Move to `next`, emitting `connection:state` only on real changes.
    fn transition(&self, next: ConnectionState) {
        let previous = {
            let mut inner = self.shared.lock().unwrap();
            if inner.state == next {
                return;
            }
            let previous = inner.state;
            inner.state = next;
            if next == ConnectionState::Disconnected {
                inner.connected_at = None;
            }
            previous
        };
        tracing::info!(
            server = %self.descriptor.name,
            from = %previous,
            to = %next,
            "connection state changed"
        );
        self.bus.emit(ClientEvent::StateChanged {
            previous,
            current: next,
        });
    }

    fn report_error(&self, error: &TransportError) {
        let message = error.to_string();
        tracing::warn!(server = %self.descriptor.name, error = %message, "event feed error");
        self.shared.lock().unwrap().last_error = Some(message.clone());
        self.bus.emit(ClientEvent::Error { message });
    }

    fn mark_connected(&self) {
        let mut inner = self.shared.lock().unwrap();
        inner.connected_at = Some(SystemTime::now());
        inner.attempts = 0;
        inner.last_error = None;
    }

    fn mark_event(&self) {
        self.shared.lock().unwrap().last_event_at = Some(SystemTime::now());
    }

    fn bump_attempts(&self) -> u32 {
        let mut inner = self.shared.lock().unwrap();
        inner.attempts += 1;
        inner.attempts
    }

    /// Turn one received frame into zero or more session signals.
    fn handle_frame(&self, frame: EventFrame) {
        if frame.is_ping() {
            tracing::trace!(server = %self.descriptor.name, "keepalive");
            return;
        }
        match parse_notifications(&frame.data) {
            Ok(notifications) => {
                for notification in notifications {
                    match SessionEvent::from_notification(notification) {
                        Some(event) => self.bus.emit(ClientEvent::Session(event)),
                        None => tracing::trace!(
                            server = %self.descriptor.name,
                            "dropping notification with unrecognized state"
                        ),
                    }
                }
            }
            // One bad payload must not take the feed down.
            Err(e) => tracing::debug!(
                server = %self.descriptor.name,
                channel = ?frame.channel,
                error = %e,
                "dropping malformed event payload"
            ),
        }
    }
}

/// How one live connection attempt ended.
enum SessionEnd {
    /// Transport or heartbeat failure: run the recovery path.
    Failed,
    /// Explicit disconnect: park until the next connect().
    Disconnected,
    /// Command channel closed: the client handle was dropped.
    Shutdown,
}

async fn client_task(ctx: TaskCtx, mut cmd_rx: mpsc::UnboundedReceiver<Command>) {
    let policy = ReconnectPolicy::new(ctx.config.backoff.clone());

    'idle: loop {
        // Disconnected or fallback: only an external connect() moves us.
        match cmd_rx.recv().await {
            None => return,
            Some(Command::Disconnect) => {
                ctx.transition(ConnectionState::Disconnected);
                continue 'idle;
            }
            Some(Command::Connect) => {}
        }

        'session: loop {
            ctx.transition(ConnectionState::Connecting);
            match run_session(&ctx, &mut cmd_rx).await {
                SessionEnd::Shutdown => return,
                SessionEnd::Disconnected => {
                    ctx.transition(ConnectionState::Disconnected);
                    continue 'idle;
                }
                SessionEnd::Failed => {}
            }

            let attempts = ctx.bump_attempts();
            if policy.is_exhausted(attempts) {
                tracing::error!(
                    server = %ctx.descriptor.name,
                    attempts,
                    "retries exhausted, live updates unavailable"
                );
                ctx.transition(ConnectionState::Fallback);
                continue 'idle;
            }

            let delay = policy.delay(attempts);
            tracing::info!(
                server = %ctx.descriptor.name,
                attempt = attempts,
                delay_ms = delay.as_millis() as u64,
                "reconnect scheduled"
            );
            ctx.transition(ConnectionState::Reconnecting);

            tokio::select! {
                biased;
                cmd = cmd_rx.recv() => match cmd {
                    None => return,
                    Some(Command::Disconnect) => {
                        ctx.transition(ConnectionState::Disconnected);
                        continue 'idle;
                    }
                    // An explicit connect() skips the remaining backoff.
                    Some(Command::Connect) => continue 'session,
                },
                _ = tokio::time::sleep(delay) => {
                    // The fire is a no-op if something disconnected us
                    // while the timer was pending.
                    if ctx.state() == ConnectionState::Disconnected {
                        continue 'idle;
                    }
                    continue 'session;
                }
            }
        }
    }
}

/// Drive a single connection from open to its end.
async fn run_session(ctx: &TaskCtx, cmd_rx: &mut mpsc::UnboundedReceiver<Command>) -> SessionEnd {
    let window = ctx.config.activity_timeout;

    // Open phase, bounded by the activity window.
    let open = tokio::time::timeout(window, ctx.source.open(&ctx.descriptor));
    tokio::pin!(open);
    let mut stream = loop {
        tokio::select! {
            biased;
            cmd = cmd_rx.recv() => match cmd {
                None => return SessionEnd::Shutdown,
                Some(Command::Disconnect) => return SessionEnd::Disconnected,
                // Already connecting; keep waiting on the same open.
                Some(Command::Connect) => continue,
            },
            opened = &mut open => match opened {
                Err(_) => {
                    ctx.report_error(&TransportError::Timeout {
                        ms: window.as_millis() as u64,
                    });
                    return SessionEnd::Failed;
                }
                Ok(Err(e)) => {
                    ctx.report_error(&e);
                    return SessionEnd::Failed;
                }
                Ok(Ok(stream)) => break stream,
            },
        }
    };

    ctx.mark_connected();
    ctx.transition(ConnectionState::Connected);

    // Read loop. Any frame, keepalives included, re-arms the heartbeat;
    // silence for a full window is a dead connection.
    let mut deadline = Instant::now() + window;
    loop {
        tokio::select! {
            biased;
            cmd = cmd_rx.recv() => match cmd {
                None => return SessionEnd::Shutdown,
                Some(Command::Disconnect) => return SessionEnd::Disconnected,
                Some(Command::Connect) => {} // already connected
            },
            frame = stream.next() => match frame {
                Some(Ok(frame)) => {
                    deadline = Instant::now() + window;
                    ctx.mark_event();
                    ctx.handle_frame(frame);
                }
                Some(Err(e)) => {
                    ctx.report_error(&e);
                    return SessionEnd::Failed;
                }
                None => {
                    ctx.report_error(&TransportError::Stream(
                        "event stream closed by server".into(),
                    ));
                    return SessionEnd::Failed;
                }
            },
            _ = tokio::time::sleep_until(deadline) => {
                ctx.report_error(&TransportError::Timeout {
                    ms: window.as_millis() as u64,
                });
                return SessionEnd::Failed;
            }
        }
    }
}
