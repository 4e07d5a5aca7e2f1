//! Client-side game state.
//!
//! One container, owned by [`crate::GameClient`] and lent to each system at its
//! entry point. Everything that reads or writes the world goes through here.

use std::collections::BTreeMap;

use arena_shared::net::{PlayerAddr, PlayerState};

use crate::bullets::BulletLedger;

/// Which player this client controls.
///
/// Unknown until the authority names us in the first snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Identity {
    #[default]
    Unresolved,
    Resolved(PlayerAddr),
}

impl Identity {
    pub fn addr(&self) -> Option<&PlayerAddr> {
        match self {
            Identity::Unresolved => None,
            Identity::Resolved(addr) => Some(addr),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Identity::Resolved(_))
    }
}

#[derive(Debug, Clone)]
pub struct GameState {
    /// Predicted local player.
    pub player: PlayerState,
    /// Every player in the last snapshot, the local one included.
    pub all_players: BTreeMap<PlayerAddr, PlayerState>,
    pub bullets: BulletLedger,
    pub identity: Identity,
    /// Highest snapshot `seq` applied so far, for authorities that send one.
    pub last_seq: Option<u64>,
}

impl GameState {
    /// Fresh session: provisional local player, nobody else known yet.
    pub fn new(spawn: PlayerState) -> Self {
        Self {
            player: spawn,
            all_players: BTreeMap::new(),
            bullets: BulletLedger::new(),
            identity: Identity::Unresolved,
            last_seq: None,
        }
    }

    pub fn my_address(&self) -> Option<&PlayerAddr> {
        self.identity.addr()
    }

    /// Players other than the local one, in address order.
    pub fn remote_players(&self) -> impl Iterator<Item = (&PlayerAddr, &PlayerState)> {
        let me = self.identity.addr();
        self.all_players
            .iter()
            .filter(move |(addr, _)| Some(*addr) != me)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unresolved_with_spawn() {
        let state = GameState::new(PlayerState::new(1.0, 2.0, 100.0));
        assert_eq!(state.identity, Identity::Unresolved);
        assert_eq!(state.my_address(), None);
        assert_eq!(state.player, PlayerState::new(1.0, 2.0, 100.0));
        assert!(state.all_players.is_empty());
    }

    #[test]
    fn remote_players_skip_self() {
        let mut state = GameState::new(PlayerState::default());
        state
            .all_players
            .insert(PlayerAddr::new("A"), PlayerState::default());
        state
            .all_players
            .insert(PlayerAddr::new("B"), PlayerState::default());
        assert_eq!(state.remote_players().count(), 2);

        state.identity = Identity::Resolved(PlayerAddr::new("A"));
        let remote: Vec<_> = state.remote_players().map(|(a, _)| a.as_str()).collect();
        assert_eq!(remote, vec!["B"]);
    }
}
