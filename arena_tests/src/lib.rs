//! Test harness for the arena client.
//!
//! [`StubAuthority`] accepts one WebSocket client and answers every intent
//! with a snapshot, the same read-then-reply rhythm the real authority has.
//! It keeps just enough world to echo positions and bullets back; there is no
//! simulation. Tests steer it through a control queue.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use arena_shared::net::{
    decode, encode, GameSnapshot, OutboundIntent, PlayerAddr, PlayerState, WorldState,
};
use futures::{SinkExt, StreamExt};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::mpsc,
    task::JoinHandle,
};
use tokio_tungstenite::{accept_async, tungstenite::Message, WebSocketStream};
use tracing::debug;

/// How long harness helpers wait before declaring a test stuck.
pub const STEP_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug)]
enum Control {
    /// Move the client's authoritative record and push a snapshot.
    Teleport { x: f32, y: f32 },
    /// Push an arbitrary text frame.
    Raw(String),
    Close,
}

pub struct StubAuthority {
    addr: SocketAddr,
    control: mpsc::UnboundedSender<Control>,
    intents: mpsc::UnboundedReceiver<OutboundIntent>,
    task: JoinHandle<anyhow::Result<()>>,
}

impl StubAuthority {
    /// Binds an ephemeral port and serves one client in the background.
    pub async fn spawn() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind stub authority")?;
        let addr = listener.local_addr()?;
        let (control, control_rx) = mpsc::unbounded_channel();
        let (intents_tx, intents) = mpsc::unbounded_channel();
        let task = tokio::spawn(serve_one(listener, control_rx, intents_tx));
        Ok(Self {
            addr,
            control,
            intents,
            task,
        })
    }

    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    pub fn teleport(&self, x: f32, y: f32) -> anyhow::Result<()> {
        self.control
            .send(Control::Teleport { x, y })
            .context("stub authority gone")
    }

    pub fn send_raw(&self, text: impl Into<String>) -> anyhow::Result<()> {
        self.control
            .send(Control::Raw(text.into()))
            .context("stub authority gone")
    }

    pub fn close(&self) -> anyhow::Result<()> {
        self.control.send(Control::Close).context("stub authority gone")
    }

    /// Next intent the client sent.
    pub async fn next_intent(&mut self) -> anyhow::Result<OutboundIntent> {
        tokio::time::timeout(STEP_TIMEOUT, self.intents.recv())
            .await
            .context("timed out waiting for intent")?
            .context("stub authority gone")
    }

    /// Waits for the serving task to finish and surfaces its error, if any.
    pub async fn join(self) -> anyhow::Result<()> {
        self.task.await.context("stub authority panicked")?
    }
}

async fn serve_one(
    listener: TcpListener,
    mut control: mpsc::UnboundedReceiver<Control>,
    intents: mpsc::UnboundedSender<OutboundIntent>,
) -> anyhow::Result<()> {
    let (stream, peer) = listener.accept().await.context("accept")?;
    let mut ws = accept_async(stream).await.context("websocket handshake")?;

    let recipient = PlayerAddr::new(peer.to_string());
    let mut world = WorldState::default();
    world
        .players
        .insert(recipient.clone(), PlayerState::default());
    debug!(%recipient, "Stub authority accepted client");

    loop {
        tokio::select! {
            ctl = control.recv() => match ctl {
                Some(Control::Teleport { x, y }) => {
                    if let Some(p) = world.players.get_mut(&recipient) {
                        p.x = x;
                        p.y = y;
                    }
                    push_snapshot(&mut ws, &recipient, &world).await?;
                }
                Some(Control::Raw(text)) => {
                    ws.send(Message::Text(text)).await.context("send raw")?;
                }
                Some(Control::Close) | None => {
                    let _ = ws.close(None).await;
                    return Ok(());
                }
            },
            msg = ws.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    let intent: OutboundIntent = decode(&text).context("decode intent")?;
                    if let Some(p) = world.players.get_mut(&recipient) {
                        p.x = intent.player.x;
                        p.y = intent.player.y;
                    }
                    world.bullets.extend(intent.new_bullets.iter().cloned());
                    let _ = intents.send(intent);
                    push_snapshot(&mut ws, &recipient, &world).await?;
                }
                Some(Ok(Message::Close(_))) | None => return Ok(()),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e).context("read from client"),
            },
        }
    }
}

async fn push_snapshot(
    ws: &mut WebSocketStream<TcpStream>,
    recipient: &PlayerAddr,
    world: &WorldState,
) -> anyhow::Result<()> {
    let snap = GameSnapshot {
        recipient: recipient.clone(),
        game_state: world.clone(),
        seq: None,
    };
    let text = encode(&snap)?;
    ws.send(Message::Text(text)).await.context("send snapshot")?;
    Ok(())
}
