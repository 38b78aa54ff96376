use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::net::TcpStream;
use tokio::sync::{oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async_tls_with_config, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn, Instrument};

use super::config::ClientConfig;
use super::envelope::{decode_frame, encode_envelope, Envelope};
use super::registry::{ErrorHandlerList, HandlerRegistry, HandlerResult};
use super::state::ConnectionState;
use super::tls::connector_for;
use crate::error::ClientError;
use crate::ids::ConnectionId;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsReader = SplitStream<WsStream>;

/// Bound on reclaiming the write half and sending the close frame in
/// [`WsClient::disconnect`].
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

struct Shared {
    id: ConnectionId,
    url: String,
    config: ClientConfig,
    sink: Mutex<Option<WsSink>>,
    handlers: HandlerRegistry,
    error_handlers: ErrorHandlerList,
    state: watch::Sender<ConnectionState>,
    auto_reconnect: AtomicBool,
}

impl Shared {
    fn set_state(&self, next: ConnectionState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            debug!(connection_id = %self.id, from = %previous, to = %next, "connection state changed");
        }
    }

    /// Whether another attempt may follow `attempts` reconnection attempts
    /// made since the last successful connection.
    fn may_reconnect(&self, attempts: u32) -> bool {
        self.auto_reconnect.load(Ordering::SeqCst)
            && self
                .config
                .max_reconnect_attempts
                .is_none_or(|max| attempts < max)
    }

    fn report_connection_failure(&self, reason: String) {
        let failure = ClientError::ConnectionFailure {
            connection_id: self.id,
            url: self.url.clone(),
            reason,
        };
        warn!(connection_id = %self.id, error = %failure, "connection failure");
        self.error_handlers.notify(&failure);
    }

    fn handle_text(&self, text: &str) {
        match decode_frame(text) {
            Ok(Some(envelope)) => {
                let outcome = self.handlers.dispatch(&envelope);
                debug!(
                    connection_id = %self.id,
                    message_type = %envelope.message_type,
                    invoked = outcome.invoked,
                    failed = outcome.failed,
                    "dispatched message"
                );
            }
            Ok(None) => {
                debug!(connection_id = %self.id, "discarding frame without a string `type` field")
            }
            Err(err) => warn!(connection_id = %self.id, error = %err, "discarding frame"),
        }
    }
}

/// A WebSocket connection speaking the `{type, payload}` envelope protocol.
///
/// Owns the endpoint URL, the write half of the transport, the handler
/// registries, the connection state and the auto-reconnect flag. Reading
/// happens on a background tokio task started by [`connect`](Self::connect);
/// handlers run on that task, one frame at a time.
///
/// ```rust,no_run
/// use asyncapi_wsgen::runtime::{ClientConfig, WsClient};
///
/// # async fn demo() {
/// let client = WsClient::with_message_slots(
///     "ws://localhost:8765",
///     ClientConfig::default(),
///     &["GpioMessage"],
/// );
/// client.register_message_handler("GpioMessage", |envelope| {
///     println!("{}", envelope.payload);
///     Ok(())
/// });
/// if client.connect(true).await {
///     client.send_envelope("GpioMessage", &serde_json::json!({ "status": "high" })).await;
/// }
/// client.disconnect().await;
/// # }
/// ```
pub struct WsClient {
    shared: Arc<Shared>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for WsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsClient")
            .field("id", &self.shared.id)
            .field("url", &self.shared.url)
            .field("state", &self.state())
            .field("handlers", &self.shared.handlers)
            .finish()
    }
}

impl WsClient {
    pub fn new(url: impl Into<String>, config: ClientConfig) -> Self {
        Self::from_registry(url.into(), config, HandlerRegistry::new())
    }

    /// Client whose handler registry has a slot for each of `message_names`.
    pub fn with_message_slots(
        url: impl Into<String>,
        config: ClientConfig,
        message_names: &[&str],
    ) -> Self {
        let registry = HandlerRegistry::with_slots(message_names.iter().copied());
        Self::from_registry(url.into(), config, registry)
    }

    fn from_registry(url: String, config: ClientConfig, handlers: HandlerRegistry) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            shared: Arc::new(Shared {
                id: ConnectionId::new(),
                url,
                config,
                sink: Mutex::new(None),
                handlers,
                error_handlers: ErrorHandlerList::new(),
                state,
                auto_reconnect: AtomicBool::new(false),
            }),
            task: Mutex::new(None),
        }
    }

    pub fn url(&self) -> &str {
        &self.shared.url
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.shared.id
    }

    pub fn config(&self) -> &ClientConfig {
        &self.shared.config
    }

    pub fn state(&self) -> ConnectionState {
        *self.shared.state.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.shared.handlers
    }

    /// Open the connection and start the background read task.
    ///
    /// Returns `true` once the handshake completes within
    /// [`ClientConfig::handshake_timeout`], and right away when already
    /// connected. On `false` with `auto_reconnect` set, the background task
    /// keeps retrying.
    pub async fn connect(&self, auto_reconnect: bool) -> bool {
        let mut task = self.task.lock().await;
        self.shared
            .auto_reconnect
            .store(auto_reconnect, Ordering::SeqCst);
        if self.is_connected() {
            return true;
        }
        if let Some(stale) = task.take() {
            stale.abort();
            join_task(stale, self.shared.id).await;
        }

        self.shared.set_state(ConnectionState::Connecting);
        info!(connection_id = %self.shared.id, url = %self.shared.url, auto_reconnect, "connecting");

        let (ready_tx, ready_rx) = oneshot::channel();
        let span = tracing::info_span!("ws_connection", connection_id = %self.shared.id);
        *task = Some(tokio::spawn(
            run_connection(Arc::clone(&self.shared), ready_tx).instrument(span),
        ));
        drop(task);

        match tokio::time::timeout(self.shared.config.handshake_timeout, ready_rx).await {
            Ok(Ok(connected)) => connected,
            Ok(Err(_)) => false,
            Err(_) => {
                warn!(
                    connection_id = %self.shared.id,
                    timeout_ms = self.shared.config.handshake_timeout.as_millis() as u64,
                    "handshake did not complete in time"
                );
                false
            }
        }
    }

    /// Close the connection and stop the background task.
    ///
    /// Clears the auto-reconnect flag first, so no reconnection follows, even
    /// when called while the task is waiting to reconnect. Always ends in
    /// [`ConnectionState::Disconnected`]: a send stalled on a peer that stopped
    /// reading only costs a one-second wait, and the close frame is skipped.
    pub async fn disconnect(&self) {
        self.shared.auto_reconnect.store(false, Ordering::SeqCst);
        let mut task = self.task.lock().await;
        if let Some(handle) = task.take() {
            handle.abort();
            join_task(handle, self.shared.id).await;
        }

        let sink = match tokio::time::timeout(CLOSE_TIMEOUT, self.shared.sink.lock()).await {
            Ok(mut guard) => guard.take(),
            Err(_) => {
                warn!(connection_id = %self.shared.id, "write half busy, skipping close frame");
                None
            }
        };
        if let Some(mut sink) = sink {
            match tokio::time::timeout(CLOSE_TIMEOUT, sink.close()).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => debug!(connection_id = %self.shared.id, error = %err, "close failed"),
                Err(_) => debug!(connection_id = %self.shared.id, "close timed out"),
            }
        }

        self.shared.set_state(ConnectionState::Disconnected);
        info!(connection_id = %self.shared.id, "disconnected");
    }

    /// Resolve once the client is in [`ConnectionState::Disconnected`]:
    /// after [`disconnect`](Self::disconnect), after a close with
    /// auto-reconnect off, or when reconnection gives up. Resolves at once if
    /// the client never connected.
    pub async fn wait_for_disconnect(&self) {
        let mut state = self.shared.state.subscribe();
        let result = state
            .wait_for(|s| *s == ConnectionState::Disconnected)
            .await
            .map(|_| ());
        if let Err(err) = result {
            debug!(connection_id = %self.shared.id, error = %err, "state channel closed");
        }
    }

    /// Serialize `data` to JSON and send it as one text frame.
    ///
    /// Returns `false` when not connected or when serializing or writing
    /// fails; the failure is logged.
    pub async fn send<T: Serialize + ?Sized>(&self, data: &T) -> bool {
        match serde_json::to_string(data) {
            Ok(text) => self.write_text(text).await,
            Err(err) => {
                self.report_send_failure(err.to_string());
                false
            }
        }
    }

    /// Send `payload` wrapped as `{"type": message_type, "payload": payload}`.
    pub async fn send_envelope<T: Serialize + ?Sized>(&self, message_type: &str, payload: &T) -> bool {
        match encode_envelope(message_type, payload) {
            Ok(text) => self.write_text(text).await,
            Err(err) => {
                warn!(connection_id = %self.shared.id, message_type, error = %err, "dropping outbound message");
                false
            }
        }
    }

    /// Send `text` verbatim.
    pub async fn send_raw(&self, text: &str) -> bool {
        self.write_text(text.to_string()).await
    }

    async fn write_text(&self, text: String) -> bool {
        let mut sink = self.shared.sink.lock().await;
        let Some(sink) = sink.as_mut() else {
            warn!(connection_id = %self.shared.id, error = %ClientError::NotConnected, "dropping outbound message");
            return false;
        };
        match sink.send(Message::Text(text.into())).await {
            Ok(()) => true,
            Err(err) => {
                self.report_send_failure(err.to_string());
                false
            }
        }
    }

    fn report_send_failure(&self, reason: String) {
        let failure = ClientError::SendFailure { reason };
        warn!(connection_id = %self.shared.id, error = %failure, "send failed");
    }

    /// Append `handler` to the handlers for `message_type`.
    pub fn register_message_handler<F>(&self, message_type: &str, handler: F)
    where
        F: Fn(&Envelope) -> HandlerResult + Send + Sync + 'static,
    {
        self.shared.handlers.register(message_type, Arc::new(handler));
    }

    /// Like [`register_message_handler`](Self::register_message_handler), but
    /// decodes the payload as `P` first. A payload that does not decode fails
    /// this handler only.
    pub fn register_typed_handler<P, F>(&self, message_type: &str, handler: F)
    where
        P: DeserializeOwned + 'static,
        F: Fn(P) -> HandlerResult + Send + Sync + 'static,
    {
        let expected = std::any::type_name::<P>();
        self.register_message_handler(message_type, move |envelope: &Envelope| {
            let payload = P::deserialize(&envelope.payload).with_context(|| {
                format!(
                    "payload of '{}' is not a valid {expected}",
                    envelope.message_type
                )
            })?;
            handler(payload)
        });
    }

    /// Append `handler` to the handlers told about connection failures.
    pub fn register_error_handler<F>(&self, handler: F)
    where
        F: Fn(&ClientError) + Send + Sync + 'static,
    {
        self.shared.error_handlers.register(Arc::new(handler));
    }
}

impl Drop for WsClient {
    fn drop(&mut self) {
        self.shared.auto_reconnect.store(false, Ordering::SeqCst);
        if let Some(handle) = self.task.get_mut().take() {
            handle.abort();
        }
    }
}

async fn join_task(handle: JoinHandle<()>, id: ConnectionId) {
    if let Err(err) = handle.await {
        if err.is_panic() {
            error!(connection_id = %id, error = %err, "connection task panicked");
        }
    }
}

/// Connect, read until the connection ends, and reconnect while allowed.
///
/// `ready` is resolved by the first attempt only.
async fn run_connection(shared: Arc<Shared>, ready: oneshot::Sender<bool>) {
    let mut ready = Some(ready);
    let mut attempts: u32 = 0;

    let connector = match connector_for(&shared.config) {
        Ok(connector) => connector,
        Err(err) => {
            shared.report_connection_failure(format!("TLS setup failed: {err}"));
            if let Some(tx) = ready.take() {
                signal_ready(tx, false);
            }
            shared.set_state(ConnectionState::Disconnected);
            return;
        }
    };

    loop {
        let handshake =
            connect_async_tls_with_config(shared.url.as_str(), None, false, connector.clone());
        match handshake.await {
            Ok((stream, _response)) => {
                attempts = 0;
                let (sink, reader) = stream.split();
                *shared.sink.lock().await = Some(sink);
                shared.set_state(ConnectionState::Connected);
                info!(url = %shared.url, "connected");
                if let Some(tx) = ready.take() {
                    signal_ready(tx, true);
                }

                read_loop(&shared, reader).await;
                *shared.sink.lock().await = None;
                info!(url = %shared.url, "connection closed");
            }
            Err(err) => {
                shared.report_connection_failure(err.to_string());
                if let Some(tx) = ready.take() {
                    signal_ready(tx, false);
                }
            }
        }

        if !shared.may_reconnect(attempts) {
            break;
        }
        attempts += 1;
        shared.set_state(ConnectionState::Reconnecting);
        info!(
            attempt = attempts,
            delay_ms = shared.config.reconnect_delay.as_millis() as u64,
            "reconnecting"
        );
        tokio::time::sleep(shared.config.reconnect_delay).await;
        if !shared.auto_reconnect.load(Ordering::SeqCst) {
            break;
        }
        shared.set_state(ConnectionState::Connecting);
    }

    shared.set_state(ConnectionState::Disconnected);
}

fn signal_ready(tx: oneshot::Sender<bool>, connected: bool) {
    if tx.send(connected).is_err() {
        debug!("connect() stopped waiting before the handshake finished");
    }
}

async fn read_loop(shared: &Shared, mut reader: WsReader) {
    while let Some(frame) = reader.next().await {
        match frame {
            Ok(Message::Text(text)) => shared.handle_text(text.as_str()),
            Ok(Message::Binary(bytes)) => match std::str::from_utf8(&bytes) {
                Ok(text) => shared.handle_text(text),
                Err(err) => {
                    let failure = ClientError::DecodeFailure {
                        reason: err.to_string(),
                    };
                    warn!(error = %failure, "discarding binary frame");
                }
            },
            Ok(Message::Close(frame)) => {
                debug!(?frame, "server closed the connection");
                break;
            }
            Ok(_) => {}
            Err(err) => {
                shared.report_connection_failure(err.to_string());
                break;
            }
        }
    }
}
