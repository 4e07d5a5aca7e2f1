//! Duplex connection to the authority.
//!
//! A background task owns the WebSocket. The client only ever touches two
//! queues (text frames out, text frames in) and a watch on the connection
//! state, so all game state stays on the task that owns the client.
//!
//! Lifecycle is `Connecting -> Open -> Closed`. `Closed` is terminal; there is
//! no reconnect.

use futures::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Open,
    Closed,
}

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("channel is not open (state: {0:?})")]
    NotReady(ChannelState),

    #[error("channel closed")]
    Closed,
}

pub struct NetworkChannel {
    url: String,
    state: watch::Receiver<ChannelState>,
    outbound: mpsc::UnboundedSender<String>,
    inbound: mpsc::UnboundedReceiver<String>,
}

impl NetworkChannel {
    /// Starts connecting to `url` in the background and returns immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect(url: impl Into<String>) -> Self {
        let url = url.into();
        let (state_tx, state) = watch::channel(ChannelState::Connecting);
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound) = mpsc::unbounded_channel();

        info!(url = %url, "Connecting to authority");
        tokio::spawn(run_socket(url.clone(), state_tx, outbound_rx, inbound_tx));

        Self {
            url,
            state,
            outbound,
            inbound,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> ChannelState {
        *self.state.borrow()
    }

    /// Queues one text frame. Fails without side effects unless open.
    pub fn send(&self, text: String) -> Result<(), ChannelError> {
        let state = self.state();
        if state != ChannelState::Open {
            return Err(ChannelError::NotReady(state));
        }
        self.outbound.send(text).map_err(|_| ChannelError::Closed)
    }

    /// Next inbound frame if one is already queued.
    pub fn try_recv(&mut self) -> Option<String> {
        self.inbound.try_recv().ok()
    }

    /// Waits for the next inbound frame. Frames received before closure are
    /// still delivered; after that this returns `None`. Cancel safe.
    pub async fn recv(&mut self) -> Option<String> {
        self.inbound.recv().await
    }
}

async fn run_socket(
    url: String,
    state: watch::Sender<ChannelState>,
    mut outbound: mpsc::UnboundedReceiver<String>,
    inbound: mpsc::UnboundedSender<String>,
) {
    let ws = match connect_async(url.as_str()).await {
        Ok((ws, _response)) => ws,
        Err(e) => {
            warn!(url = %url, error = %e, "Connection to authority failed");
            state.send_replace(ChannelState::Closed);
            return;
        }
    };
    info!(url = %url, "Connection to authority established");
    state.send_replace(ChannelState::Open);

    let (mut sink, mut stream) = ws.split();
    loop {
        tokio::select! {
            out = outbound.recv() => match out {
                Some(text) => {
                    if let Err(e) = sink.send(Message::Text(text)).await {
                        warn!(error = %e, "Write to authority failed");
                        break;
                    }
                }
                None => {
                    // Client dropped its handle.
                    let _ = sink.close().await;
                    break;
                }
            },
            msg = stream.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    if inbound.send(text).is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    debug!(?frame, "Authority sent close");
                    break;
                }
                Some(Ok(other)) => {
                    debug!(kind = message_kind(&other), "Ignoring non-text frame");
                }
                Some(Err(e)) => {
                    warn!(error = %e, "Read from authority failed");
                    break;
                }
                None => break,
            },
        }
    }

    info!(url = %url, "Connection to authority closed");
    state.send_replace(ChannelState::Closed);
}

fn message_kind(msg: &Message) -> &'static str {
    match msg {
        Message::Text(_) => "text",
        Message::Binary(_) => "binary",
        Message::Ping(_) => "ping",
        Message::Pong(_) => "pong",
        Message::Close(_) => "close",
        Message::Frame(_) => "frame",
    }
}
