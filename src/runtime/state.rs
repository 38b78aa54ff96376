use std::fmt;

/// Lifecycle state of a [`WsClient`](super::WsClient).
///
/// ```text
/// Disconnected → Connecting → Connected ─┬→ Disconnected   (disconnect)
///                    ↑                    └→ Reconnecting   (unexpected close, auto-reconnect on)
///                    └──────── Reconnecting (after the reconnect delay)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting => "reconnecting",
        };
        f.write_str(s)
    }
}
