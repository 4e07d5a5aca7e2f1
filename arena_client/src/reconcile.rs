//! Authority reconciliation.
//!
//! Every snapshot is applied as the newest truth: identity, the player map
//! and the confirmed bullets are replaced wholesale. The predicted local
//! player is left alone unless it has drifted further than the correction
//! threshold, in which case it snaps to the authority's record. There is no
//! interpolation; small drift is tolerated to avoid jitter.

use arena_shared::net::{GameSnapshot, PlayerState};
use tracing::debug;

use crate::state::{GameState, Identity};

/// What applying one snapshot did to the local player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// Snapshot carried a `seq` not newer than one already applied.
    Stale,
    /// Our address is missing from the snapshot's player map.
    LocalMissing,
    /// Prediction is within the threshold and was kept.
    Kept { distance: f32 },
    /// Prediction was replaced by the authority's record.
    Snapped { distance: f32 },
}

#[derive(Debug, Clone, Copy)]
pub struct ReconciliationEngine {
    threshold: f32,
}

impl ReconciliationEngine {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// Merges one authoritative snapshot into `state`.
    pub fn apply(&self, state: &mut GameState, snap: GameSnapshot) -> Outcome {
        if let (Some(seq), Some(last)) = (snap.seq, state.last_seq) {
            if seq <= last {
                debug!(seq, last, "Dropping stale snapshot");
                return Outcome::Stale;
            }
        }
        if snap.seq.is_some() {
            state.last_seq = snap.seq;
        }

        let GameSnapshot {
            recipient,
            game_state,
            ..
        } = snap;

        if state.identity.addr() != Some(&recipient) {
            debug!(addr = %recipient, "Local identity assigned");
        }
        state.identity = Identity::Resolved(recipient.clone());
        state.all_players = game_state.players;
        state.bullets.replace_confirmed(game_state.bullets);

        let Some(authoritative) = state.all_players.get(&recipient).copied() else {
            debug!(addr = %recipient, "Snapshot has no record for the local player");
            return Outcome::LocalMissing;
        };
        self.correct(&mut state.player, authoritative)
    }

    fn correct(&self, predicted: &mut PlayerState, authoritative: PlayerState) -> Outcome {
        let distance = predicted.position().distance(authoritative.position());
        if distance > self.threshold {
            debug!(
                distance,
                x = authoritative.x,
                y = authoritative.y,
                "Snapping local player to authority"
            );
            *predicted = authoritative;
            Outcome::Snapped { distance }
        } else {
            Outcome::Kept { distance }
        }
    }
}
