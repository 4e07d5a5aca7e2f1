//! Wire protocol.
//!
//! JSON text frames over a persistent WebSocket:
//! - client -> authority: [`OutboundIntent`], sent on the client's send cadence
//! - authority -> client: [`GameSnapshot`], one per message
//!
//! There is no envelope or message tag; each direction carries exactly one
//! shape. Field names are part of the protocol and must not be renamed.

use std::collections::BTreeMap;
use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::math::Vec2;

/// Upper bound of a player's hit points.
pub const MAX_HP: f32 = 100.0;

/// Network address string the authority assigns to each connection.
///
/// This is the only player identity in the protocol.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerAddr(pub String);

impl PlayerAddr {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A player record as the authority reports it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub x: f32,
    pub y: f32,
    pub hp: f32,
}

impl PlayerState {
    pub fn new(x: f32, y: f32, hp: f32) -> Self {
        Self { x, y, hp }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn set_position(&mut self, pos: Vec2) {
        self.x = pos.x;
        self.y = pos.y;
    }

    /// Returns true if `hp` lies in `[0, MAX_HP]`.
    pub fn is_valid(&self) -> bool {
        (0.0..=MAX_HP).contains(&self.hp)
    }

    /// Health bar fill, in `[0, 1]` for valid records.
    pub fn hp_fraction(&self) -> f32 {
        self.hp / MAX_HP
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            hp: MAX_HP,
        }
    }
}

/// A projectile.
///
/// `life` is carried through untouched; the client never decays it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletState {
    pub x: f32,
    pub y: f32,
    pub velx: f32,
    pub vely: f32,
    pub life: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<PlayerAddr>,
}

impl BulletState {
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Position-only view of the local player sent to the authority.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerPosition {
    pub x: f32,
    pub y: f32,
}

impl From<Vec2> for PlayerPosition {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

/// Client -> authority: the local player's position plus bullets fired since
/// the previous send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundIntent {
    pub player: PlayerPosition,
    pub new_bullets: Vec<BulletState>,
}

/// The authority's world: every player keyed by address, plus live bullets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    pub players: BTreeMap<PlayerAddr, PlayerState>,
    #[serde(default)]
    pub bullets: Vec<BulletState>,
}

/// Authority -> client snapshot.
///
/// `recipient` names the player the receiving client controls. `seq` is an
/// optional ordering extension; authorities that omit it get
/// newest-on-arrival semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub recipient: PlayerAddr,
    pub game_state: WorldState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
}

impl GameSnapshot {
    /// Rejects snapshots carrying player records outside the hp range.
    pub fn validate(&self) -> Result<(), WireError> {
        for (addr, player) in &self.game_state.players {
            if !player.is_valid() {
                return Err(WireError::InvalidPlayer {
                    addr: addr.clone(),
                    hp: player.hp,
                });
            }
        }
        Ok(())
    }
}

/// Protocol decode/encode failures.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    #[error("player {addr} has hp {hp} outside [0, 100]")]
    InvalidPlayer { addr: PlayerAddr, hp: f32 },
}

/// Serializes any protocol message to a text frame.
pub fn encode<T: Serialize>(msg: &T) -> Result<String, WireError> {
    Ok(serde_json::to_string(msg)?)
}

/// Parses any protocol message from a text frame.
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T, WireError> {
    Ok(serde_json::from_str(text)?)
}

/// Parses and validates an inbound snapshot.
pub fn decode_snapshot(text: &str) -> Result<GameSnapshot, WireError> {
    let snap: GameSnapshot = decode(text)?;
    snap.validate()?;
    Ok(snap)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bullet(owner: Option<&str>) -> BulletState {
        BulletState {
            x: 100.0,
            y: 100.0,
            velx: 500.0,
            vely: 0.0,
            life: 1.0,
            owner: owner.map(PlayerAddr::new),
        }
    }

    #[test]
    fn intent_roundtrip_keeps_fields() {
        let intent = OutboundIntent {
            player: PlayerPosition { x: 12.5, y: -3.25 },
            new_bullets: vec![bullet(Some("127.0.0.1:50000")), bullet(None)],
        };
        let text = encode(&intent).unwrap();
        let back: OutboundIntent = decode(&text).unwrap();
        assert_eq!(intent, back);
    }

    #[test]
    fn intent_uses_wire_field_names() {
        let intent = OutboundIntent {
            player: PlayerPosition { x: 1.0, y: 2.0 },
            new_bullets: vec![bullet(Some("A"))],
        };
        let value: serde_json::Value = serde_json::from_str(&encode(&intent).unwrap()).unwrap();
        assert_eq!(value["player"]["x"], 1.0);
        assert_eq!(value["new_bullets"][0]["velx"], 500.0);
        assert_eq!(value["new_bullets"][0]["owner"], "A");
    }

    #[test]
    fn missing_owner_is_omitted_and_accepted() {
        let text = encode(&bullet(None)).unwrap();
        assert!(!text.contains("owner"));
        let back: BulletState = decode(r#"{"x":1,"y":2,"velx":3,"vely":4,"life":1,"owner":null}"#).unwrap();
        assert_eq!(back.owner, None);
    }

    #[test]
    fn decodes_authority_snapshot() {
        let text = r#"{
            "recipient": "127.0.0.1:50000",
            "game_state": {
                "players": { "127.0.0.1:50000": { "x": 10.0, "y": 20.0, "hp": 90.0 } },
                "bullets": [ { "x": 1.0, "y": 2.0, "velx": 3.0, "vely": 4.0, "life": 0.5, "owner": "127.0.0.1:50001" } ]
            }
        }"#;
        let snap = decode_snapshot(text).unwrap();
        assert_eq!(snap.recipient, PlayerAddr::new("127.0.0.1:50000"));
        assert_eq!(snap.seq, None);
        assert_eq!(
            snap.game_state.players[&snap.recipient],
            PlayerState::new(10.0, 20.0, 90.0)
        );
        assert_eq!(snap.game_state.bullets[0].life, 0.5);
    }

    #[test]
    fn decodes_sequence_number_when_present() {
        let snap = decode_snapshot(
            r#"{"recipient":"A","game_state":{"players":{"A":{"x":1,"y":2,"hp":100}}},"seq":3}"#,
        )
        .unwrap();
        assert_eq!(snap.seq, Some(3));
        assert_eq!(snap.game_state.players[&snap.recipient].position(), Vec2::new(1.0, 2.0));
    }

    #[test]
    fn snapshot_without_bullets_defaults_to_empty() {
        let snap = decode_snapshot(r#"{"recipient":"A","game_state":{"players":{}}}"#).unwrap();
        assert!(snap.game_state.bullets.is_empty());
    }

    #[test]
    fn rejects_out_of_range_hp() {
        let err = decode_snapshot(
            r#"{"recipient":"A","game_state":{"players":{"A":{"x":0,"y":0,"hp":150}},"bullets":[]}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, WireError::InvalidPlayer { .. }));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            decode_snapshot("{\"recipient\":"),
            Err(WireError::Json(_))
        ));
    }
}
