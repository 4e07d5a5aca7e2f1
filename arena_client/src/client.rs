//! Client implementation.
//!
//! [`GameClient`] is the single scheduler for one session. It owns:
//! - the game state container
//! - the input sampler and local simulator (prediction)
//! - the reconciliation engine
//! - the network channel to the authority
//!
//! The driver calls three entry points, never concurrently:
//! [`GameClient::frame`] to simulate, [`GameClient::send_tick`] to ship the
//! local intent, and [`GameClient::apply_frame`] / [`GameClient::pump_inbound`]
//! to reconcile authority snapshots in arrival order.

use std::time::{Duration, Instant};

use anyhow::Context;
use arena_shared::{
    config::ClientConfig,
    net::{decode_snapshot, encode, OutboundIntent},
};
use tracing::{debug, warn};

use crate::{
    channel::{ChannelError, ChannelState, NetworkChannel},
    input::{InputEvent, InputSampler},
    reconcile::{Outcome, ReconciliationEngine},
    render::{self, FrameView, RenderSurface},
    sim::LocalSimulator,
    state::GameState,
};

/// Result of one send-timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Minimum send interval has not elapsed.
    Throttled,
    /// Channel is not open; nothing was sent or drained.
    NotReady(ChannelState),
    /// Intent could not be encoded; its bullets are lost.
    Failed,
    /// Intent sent carrying `bullets` new bullets.
    Sent { bullets: usize },
}

/// Session counters, reported by `status`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientStats {
    pub intents_sent: u64,
    pub sends_skipped: u64,
    pub snapshots_applied: u64,
    pub snapshots_stale: u64,
    pub snapshots_malformed: u64,
    pub snaps: u64,
}

/// High-level game client.
pub struct GameClient {
    pub state: GameState,
    pub input: InputSampler,
    pub stats: ClientStats,

    sim: LocalSimulator,
    reconciler: ReconciliationEngine,
    channel: NetworkChannel,

    last_frame: Instant,
    last_send: Instant,
    min_send_interval: Duration,
}

impl GameClient {
    /// Resolves the authority endpoint from `cfg` and starts connecting.
    ///
    /// Returns as soon as the connection attempt is under way; sends are
    /// skipped until it opens.
    pub fn connect(cfg: &ClientConfig) -> anyhow::Result<Self> {
        let url = cfg.authority_url().context("resolve authority url")?;
        let channel = NetworkChannel::connect(url);
        Ok(Self::with_channel(cfg, channel, Instant::now()))
    }

    /// Builds a client around an existing channel. `epoch` is the session
    /// start for frame timing and the fire limiter.
    pub fn with_channel(cfg: &ClientConfig, channel: NetworkChannel, epoch: Instant) -> Self {
        Self {
            state: GameState::new(cfg.spawn),
            input: InputSampler::new(cfg.bindings.clone()),
            stats: ClientStats::default(),
            sim: LocalSimulator::new(cfg.tuning, epoch),
            reconciler: ReconciliationEngine::new(cfg.tuning.correction_threshold),
            channel,
            last_frame: epoch,
            last_send: epoch,
            min_send_interval: cfg.min_send_interval(),
        }
    }

    pub fn channel_state(&self) -> ChannelState {
        self.channel.state()
    }

    /// Forwards a device event to the sampler. Returns true if the platform
    /// default should be suppressed.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        self.input.handle(event)
    }

    /// Advances prediction to `now`.
    pub fn frame(&mut self, now: Instant) {
        let dt = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.sim.step(&mut self.state, &self.input, dt, now);
    }

    /// Draws the current state.
    pub fn draw(&self, surface: &mut dyn RenderSurface) {
        render::draw(surface, &FrameView::from_state(&self.state));
    }

    /// One tick of the send timer.
    ///
    /// Past the minimum interval, ships `{player, new_bullets}` if the
    /// channel is open and restarts the interval either way. Until identity
    /// is resolved only the position is sent and unfired bullets stay queued.
    pub fn send_tick(&mut self, now: Instant) -> SendOutcome {
        if now.saturating_duration_since(self.last_send) <= self.min_send_interval {
            return SendOutcome::Throttled;
        }
        self.last_send = now;

        let state = self.channel.state();
        if state != ChannelState::Open {
            debug!(?state, "Channel not open, skipping send");
            self.stats.sends_skipped += 1;
            return SendOutcome::NotReady(state);
        }

        let new_bullets = if self.state.identity.is_resolved() {
            self.state.bullets.drain_unfired()
        } else {
            Vec::new()
        };
        let intent = OutboundIntent {
            player: self.state.player.position().into(),
            new_bullets,
        };
        let bullets = intent.new_bullets.len();

        let text = match encode(&intent) {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Failed to encode intent");
                return SendOutcome::Failed;
            }
        };
        match self.channel.send(text) {
            Ok(()) => {
                self.stats.intents_sent += 1;
                SendOutcome::Sent { bullets }
            }
            Err(ChannelError::NotReady(state)) => {
                self.stats.sends_skipped += 1;
                SendOutcome::NotReady(state)
            }
            Err(ChannelError::Closed) => {
                self.stats.sends_skipped += 1;
                SendOutcome::NotReady(ChannelState::Closed)
            }
        }
    }

    /// Parses and reconciles one inbound text frame. Malformed frames are
    /// logged and dropped without touching state.
    pub fn apply_frame(&mut self, text: &str) -> Option<Outcome> {
        let snap = match decode_snapshot(text) {
            Ok(snap) => snap,
            Err(e) => {
                warn!(error = %e, "Dropping malformed snapshot");
                self.stats.snapshots_malformed += 1;
                return None;
            }
        };

        let outcome = self.reconciler.apply(&mut self.state, snap);
        match outcome {
            Outcome::Stale => self.stats.snapshots_stale += 1,
            Outcome::Snapped { .. } => {
                self.stats.snapshots_applied += 1;
                self.stats.snaps += 1;
            }
            Outcome::Kept { .. } | Outcome::LocalMissing => self.stats.snapshots_applied += 1,
        }
        Some(outcome)
    }

    /// Reconciles every frame already queued on the channel. Returns how many
    /// frames were consumed.
    pub fn pump_inbound(&mut self) -> usize {
        let mut n = 0;
        while let Some(text) = self.channel.try_recv() {
            self.apply_frame(&text);
            n += 1;
        }
        n
    }

    /// Waits for the next inbound frame; `None` once the channel has closed.
    pub async fn recv_frame(&mut self) -> Option<String> {
        self.channel.recv().await
    }

    /// Human-readable status lines.
    pub fn status(&self) -> Vec<String> {
        let p = &self.state.player;
        let identity = match self.state.my_address() {
            Some(addr) => addr.to_string(),
            None => "unresolved".to_string(),
        };
        vec![
            format!("Authority: {} ({:?})", self.channel.url(), self.channel.state()),
            format!("Identity: {identity}"),
            format!("Player: ({:.1}, {:.1}) hp {:.0}", p.x, p.y, p.hp),
            format!("Players known: {}", self.state.all_players.len()),
            format!(
                "Bullets: {} confirmed, {} unfired",
                self.state.bullets.confirmed().len(),
                self.state.bullets.unfired().len()
            ),
            format!(
                "Intents sent: {} (skipped {}), snapshots applied: {} (stale {}, malformed {}), snaps: {}",
                self.stats.intents_sent,
                self.stats.sends_skipped,
                self.stats.snapshots_applied,
                self.stats.snapshots_stale,
                self.stats.snapshots_malformed,
                self.stats.snaps
            ),
        ]
    }
}
