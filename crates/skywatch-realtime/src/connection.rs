//! Channel connection lifecycle.
//!
//! One [`Connection`] exists per channel domain (location, chat) for the
//! lifetime of the session. The underlying socket is replaced, never
//! mutated: every close destroys it and a reconnect dials a fresh one. An
//! unexpected close hands off to the domain's reconnect policy; a close
//! initiated through [`Connection::disconnect`] is clean and terminal.
//!
//! Sending is best-effort by design: a frame offered while the connection is
//! not open is dropped (and counted), not queued.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use skywatch_auth::TokenStore;
use skywatch_core::backoff::ReconnectConfig;
use skywatch_core::frames::{HandshakeFrame, OutboundFrame};
use skywatch_settings::RealtimeSettings;

use crate::dispatcher::Dispatcher;
use crate::errors::TransportError;
use crate::reconnect::ReconnectPolicy;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Close code the server uses to reject credentials.
const CLOSE_AUTH_REJECTED: u16 = 4001;

/// The two independent realtime contexts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelDomain {
    /// Continuous position broadcast.
    Location,
    /// Chat messaging.
    Chat,
}

impl fmt::Display for ChannelDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Location => f.write_str("location"),
            Self::Chat => f.write_str("chat"),
        }
    }
}

/// Connection lifecycle state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Lifecycle {
    /// No socket, nothing scheduled.
    #[default]
    Idle,
    /// Dialing and handshaking.
    Connecting,
    /// Socket up, frames flowing.
    Open,
    /// Unexpected close seen, next attempt scheduled.
    Reconnecting,
    /// Reconnect attempts exhausted; silent until a fresh connect call.
    Closed,
}

/// Static parameters for one connection.
#[derive(Clone, Debug)]
pub struct ConnectionConfig {
    /// WebSocket endpoint for this domain.
    pub url: String,
    /// Reconnect policy parameters.
    pub reconnect: ReconnectConfig,
    /// Outbound queue depth between `send` and the socket write task.
    pub send_queue_depth: usize,
}

impl ConnectionConfig {
    /// Build a config for `domain` from the realtime settings section.
    #[must_use]
    pub fn from_settings(domain: ChannelDomain, settings: &RealtimeSettings) -> Self {
        let url = match domain {
            ChannelDomain::Location => settings.location_url.clone(),
            ChannelDomain::Chat => settings.chat_url.clone(),
        };
        Self {
            url,
            reconnect: settings.reconnect.clone(),
            send_queue_depth: settings.send_queue_depth.max(1),
        }
    }
}

/// State owned by the event loop, swapped wholesale on every (re)connect.
#[derive(Default)]
struct Inner {
    lifecycle: Lifecycle,
    /// Bumped on every connect/disconnect; tasks from an older socket check
    /// it before touching state, so a late close callback cannot clobber a
    /// newer connection.
    epoch: u64,
    tx: Option<mpsc::Sender<String>>,
    socket_cancel: Option<CancellationToken>,
    reconnect_cancel: Option<CancellationToken>,
}

struct Shared {
    domain: ChannelDomain,
    config: ConnectionConfig,
    tokens: Arc<TokenStore>,
    dispatcher: Arc<Dispatcher>,
    policy: Mutex<ReconnectPolicy>,
    inner: Mutex<Inner>,
    dropped_frames: AtomicU64,
}

/// Handle to one channel domain's connection.
///
/// Cheap to clone; all clones drive the same underlying socket and state.
#[derive(Clone)]
pub struct Connection {
    shared: Arc<Shared>,
}

impl Connection {
    /// Create a connection for `domain`. No socket is dialed until
    /// [`connect`](Self::connect).
    #[must_use]
    pub fn new(domain: ChannelDomain, config: ConnectionConfig, tokens: Arc<TokenStore>) -> Self {
        Self {
            shared: Arc::new(Shared {
                domain,
                policy: Mutex::new(ReconnectPolicy::new(config.reconnect.clone())),
                config,
                tokens,
                dispatcher: Arc::new(Dispatcher::new()),
                inner: Mutex::new(Inner::default()),
                dropped_frames: AtomicU64::new(0),
            }),
        }
    }

    /// Create a connection for `domain` configured from settings.
    #[must_use]
    pub fn from_settings(
        domain: ChannelDomain,
        settings: &RealtimeSettings,
        tokens: Arc<TokenStore>,
    ) -> Self {
        Self::new(
            domain,
            ConnectionConfig::from_settings(domain, settings),
            tokens,
        )
    }

    /// This connection's channel domain.
    #[must_use]
    pub fn domain(&self) -> ChannelDomain {
        self.shared.domain
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.shared.inner.lock().lifecycle
    }

    /// The dispatcher inbound frames on this connection are routed through.
    #[must_use]
    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.shared.dispatcher)
    }

    /// Total outbound frames dropped (sent while not open, or queue full).
    #[must_use]
    pub fn dropped_frames(&self) -> u64 {
        self.shared.dropped_frames.load(Ordering::Relaxed)
    }

    /// Open the connection. Idempotent: a no-op while connecting or open.
    ///
    /// Requires a non-empty bearer token from the token store; without one
    /// this logs and returns — there is nothing productive to retry. Being a
    /// fresh top-level call, it also resets the reconnect counter.
    pub async fn connect(&self) {
        self.shared.policy.lock().reset();
        Shared::establish(Arc::clone(&self.shared)).await;
    }

    /// Tear down any current socket and dial a fresh one.
    pub async fn reconnect(&self) {
        self.teardown();
        self.shared.policy.lock().reset();
        Shared::establish(Arc::clone(&self.shared)).await;
    }

    /// Close the connection cleanly. Never triggers the reconnect policy.
    /// Idempotent.
    pub fn disconnect(&self) {
        self.teardown();
        self.shared.policy.lock().reset();
        debug!(domain = %self.shared.domain, "disconnected");
    }

    /// Send a frame, best-effort.
    ///
    /// Returns `false` — without error or queuing for later — when the
    /// connection is not open or the outbound queue is full.
    pub fn send(&self, frame: &OutboundFrame) -> bool {
        let json = match serde_json::to_string(frame) {
            Ok(json) => json,
            Err(e) => {
                warn!(domain = %self.shared.domain, error = %e, "failed to encode outbound frame");
                return false;
            }
        };
        let inner = self.shared.inner.lock();
        let delivered = inner.lifecycle == Lifecycle::Open
            && inner
                .tx
                .as_ref()
                .is_some_and(|tx| tx.try_send(json).is_ok());
        drop(inner);
        if !delivered {
            let _ = self.shared.dropped_frames.fetch_add(1, Ordering::Relaxed);
            debug!(domain = %self.shared.domain, "dropping frame, connection not open");
        }
        delivered
    }

    /// Cancel socket tasks and any pending reconnect, settling to Idle.
    fn teardown(&self) {
        let mut inner = self.shared.inner.lock();
        inner.epoch += 1;
        if let Some(cancel) = inner.reconnect_cancel.take() {
            cancel.cancel();
        }
        if let Some(cancel) = inner.socket_cancel.take() {
            cancel.cancel();
        }
        inner.tx = None;
        inner.lifecycle = Lifecycle::Idle;
    }
}

impl Shared {
    /// Dial the socket and send the handshake as the first frame.
    async fn dial(&self) -> Result<WsStream, TransportError> {
        let token = self
            .tokens
            .current_token()
            .ok_or(TransportError::MissingCredentials)?;
        let (mut stream, _response) = connect_async(self.config.url.as_str()).await?;

        // The server accepts nothing before the token frame; a rejection
        // shows up only as a close (4001), never as an in-band message.
        let handshake = serde_json::to_string(&HandshakeFrame::new(token))?;
        stream.send(Message::Text(handshake.into())).await?;
        Ok(stream)
    }

    /// Connect attempt shared by top-level connects and scheduled retries.
    async fn establish(this: Arc<Self>) {
        let epoch = {
            let mut inner = this.inner.lock();
            if matches!(inner.lifecycle, Lifecycle::Connecting | Lifecycle::Open) {
                debug!(domain = %this.domain, "connect is a no-op, already {:?}", inner.lifecycle);
                return;
            }
            inner.lifecycle = Lifecycle::Connecting;
            inner.epoch += 1;
            inner.reconnect_cancel = None;
            inner.epoch
        };

        let stream = match this.dial().await {
            Ok(stream) => stream,
            Err(e) => {
                warn!(domain = %this.domain, error = %e, "connect failed");
                if e.is_retryable() {
                    Self::on_socket_closed(&this, epoch, false);
                } else {
                    // Nothing to retry without credentials; settle back to Idle.
                    let mut inner = this.inner.lock();
                    if inner.epoch == epoch {
                        inner.lifecycle = Lifecycle::Idle;
                    }
                }
                return;
            }
        };

        let (sink, source) = stream.split();
        let (tx, rx) = mpsc::channel::<String>(this.config.send_queue_depth.max(1));
        let cancel = CancellationToken::new();
        {
            let mut inner = this.inner.lock();
            if inner.epoch != epoch {
                // disconnect() won while we were dialing; let the socket drop.
                return;
            }
            inner.lifecycle = Lifecycle::Open;
            inner.tx = Some(tx);
            inner.socket_cancel = Some(cancel.clone());
        }
        this.policy.lock().on_open();
        info!(domain = %this.domain, url = %this.config.url, "channel connected");

        let writer = tokio::spawn(Self::write_loop(sink, rx, cancel.clone()));
        let conn = Arc::clone(&this);
        drop(tokio::spawn(async move {
            let clean = Self::read_loop(source, &conn, &cancel).await;
            writer.abort();
            Self::on_socket_closed(&conn, epoch, clean);
        }));
    }

    /// Forward queued outbound frames; send a Close frame when cancelled.
    async fn write_loop(
        mut sink: SplitSink<WsStream, Message>,
        mut rx: mpsc::Receiver<String>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                msg = rx.recv() => match msg {
                    Some(text) => {
                        if sink.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                },
                () = cancel.cancelled() => {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    }

    /// Drive inbound frames through the dispatcher until the socket ends.
    ///
    /// Returns whether the close was locally initiated (clean).
    async fn read_loop(
        mut source: SplitStream<WsStream>,
        conn: &Arc<Self>,
        cancel: &CancellationToken,
    ) -> bool {
        loop {
            tokio::select! {
                msg = source.next() => match msg {
                    Some(Ok(Message::Text(text))) => conn.dispatcher.dispatch(text.as_str()),
                    Some(Ok(Message::Binary(data))) => {
                        match std::str::from_utf8(&data) {
                            Ok(text) => conn.dispatcher.dispatch(text),
                            Err(_) => {
                                debug!(domain = %conn.domain, len = data.len(), "ignoring non-UTF8 binary frame");
                            }
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        if frame
                            .as_ref()
                            .is_some_and(|f| u16::from(f.code) == CLOSE_AUTH_REJECTED)
                        {
                            warn!(domain = %conn.domain, "server rejected credentials (close 4001)");
                        } else {
                            info!(domain = %conn.domain, "server closed connection");
                        }
                        return cancel.is_cancelled();
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(domain = %conn.domain, error = %e, "socket error");
                        return cancel.is_cancelled();
                    }
                    None => return cancel.is_cancelled(),
                },
                () = cancel.cancelled() => return true,
            }
        }
    }

    /// Handle the end of a socket: clean closes settle to Idle, unexpected
    /// ones go to the reconnect policy for this domain only.
    fn on_socket_closed(this: &Arc<Self>, epoch: u64, clean: bool) {
        {
            let mut inner = this.inner.lock();
            if inner.epoch != epoch {
                return; // superseded by a newer connect/disconnect
            }
            inner.tx = None;
            inner.socket_cancel = None;
            if clean {
                inner.lifecycle = Lifecycle::Idle;
                return;
            }
        }
        Self::schedule_reconnect(this, epoch);
    }

    /// Schedule a single reconnect attempt after the policy's next delay.
    fn schedule_reconnect(this: &Arc<Self>, epoch: u64) {
        let next = this.policy.lock().next_attempt();
        let Some(delay) = next else {
            let attempts = this.policy.lock().attempts();
            warn!(domain = %this.domain, attempts, "reconnect attempts exhausted, channel going silent");
            let mut inner = this.inner.lock();
            if inner.epoch == epoch {
                inner.lifecycle = Lifecycle::Closed;
            }
            return;
        };

        let cancel = CancellationToken::new();
        {
            let mut inner = this.inner.lock();
            if inner.epoch != epoch {
                return;
            }
            inner.lifecycle = Lifecycle::Reconnecting;
            inner.reconnect_cancel = Some(cancel.clone());
        }
        let attempt = this.policy.lock().attempts();
        info!(
            domain = %this.domain,
            attempt,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "scheduling reconnect"
        );

        let conn = Arc::clone(this);
        drop(tokio::spawn(async move {
            tokio::select! {
                () = tokio::time::sleep(delay) => Self::establish(conn).await,
                () = cancel.cancelled() => {}
            }
        }));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
