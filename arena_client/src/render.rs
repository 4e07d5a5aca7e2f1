//! Rendering abstraction.
//!
//! The client does not depend on a graphics backend. A surface receives a
//! read-only [`FrameView`] of the game state each frame and writes nothing
//! back.

use arena_shared::{
    math::Vec2,
    net::{BulletState, PlayerAddr, PlayerState},
};
use tracing::info;

use crate::state::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerKind {
    Local,
    Remote,
}

/// One player as a surface should draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSprite<'a> {
    pub addr: &'a PlayerAddr,
    pub kind: PlayerKind,
    pub position: Vec2,
    /// Health bar fill.
    pub hp_fraction: f32,
}

/// Everything drawable in one frame.
#[derive(Debug, Clone)]
pub struct FrameView<'a> {
    pub players: Vec<PlayerSprite<'a>>,
    pub bullets: &'a [BulletState],
}

impl<'a> FrameView<'a> {
    /// Remote players in address order, then the local player at its
    /// predicted position once identity is known. Only confirmed bullets are
    /// drawn.
    pub fn from_state(state: &'a GameState) -> Self {
        let mut players: Vec<PlayerSprite<'a>> = state
            .remote_players()
            .map(|(addr, p)| sprite(addr, PlayerKind::Remote, p))
            .collect();
        if let Some(me) = state.my_address() {
            players.push(sprite(me, PlayerKind::Local, &state.player));
        }
        Self {
            players,
            bullets: state.bullets.confirmed(),
        }
    }

    pub fn local(&self) -> Option<&PlayerSprite<'a>> {
        self.players.iter().find(|p| p.kind == PlayerKind::Local)
    }
}

fn sprite<'a>(addr: &'a PlayerAddr, kind: PlayerKind, p: &PlayerState) -> PlayerSprite<'a> {
    PlayerSprite {
        addr,
        kind,
        position: p.position(),
        hp_fraction: p.hp_fraction(),
    }
}

pub trait RenderSurface {
    fn begin_frame(&mut self);
    fn draw_player(&mut self, player: &PlayerSprite<'_>);
    fn draw_bullet(&mut self, bullet: &BulletState);
    fn end_frame(&mut self);
}

/// Draws one frame onto `surface`.
pub fn draw(surface: &mut dyn RenderSurface, view: &FrameView<'_>) {
    surface.begin_frame();
    for player in &view.players {
        surface.draw_player(player);
    }
    for bullet in view.bullets {
        surface.draw_bullet(bullet);
    }
    surface.end_frame();
}

/// A no-op surface useful for headless tests.
#[derive(Default)]
pub struct NullSurface;

impl RenderSurface for NullSurface {
    fn begin_frame(&mut self) {}
    fn draw_player(&mut self, _player: &PlayerSprite<'_>) {}
    fn draw_bullet(&mut self, _bullet: &BulletState) {}
    fn end_frame(&mut self) {}
}

/// Logs a frame summary every `every` frames.
pub struct TraceSurface {
    every: u64,
    frame: u64,
    players: usize,
    bullets: usize,
    local: Option<Vec2>,
}

impl TraceSurface {
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
            frame: 0,
            players: 0,
            bullets: 0,
            local: None,
        }
    }
}

impl RenderSurface for TraceSurface {
    fn begin_frame(&mut self) {
        self.players = 0;
        self.bullets = 0;
        self.local = None;
    }

    fn draw_player(&mut self, player: &PlayerSprite<'_>) {
        self.players += 1;
        if player.kind == PlayerKind::Local {
            self.local = Some(player.position);
        }
    }

    fn draw_bullet(&mut self, _bullet: &BulletState) {
        self.bullets += 1;
    }

    fn end_frame(&mut self) {
        if self.frame % self.every == 0 {
            info!(
                frame = self.frame,
                players = self.players,
                bullets = self.bullets,
                local = ?self.local,
                "Frame"
            );
        }
        self.frame += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Identity;

    #[derive(Default)]
    struct Recorder {
        players: Vec<(String, PlayerKind, Vec2, f32)>,
        bullets: usize,
        frames: usize,
    }

    impl RenderSurface for Recorder {
        fn begin_frame(&mut self) {
            self.players.clear();
            self.bullets = 0;
        }
        fn draw_player(&mut self, p: &PlayerSprite<'_>) {
            self.players
                .push((p.addr.to_string(), p.kind, p.position, p.hp_fraction));
        }
        fn draw_bullet(&mut self, _bullet: &BulletState) {
            self.bullets += 1;
        }
        fn end_frame(&mut self) {
            self.frames += 1;
        }
    }

    fn populated() -> GameState {
        let mut state = GameState::new(PlayerState::new(5.0, 5.0, 100.0));
        state
            .all_players
            .insert(PlayerAddr::new("B"), PlayerState::new(1.0, 2.0, 50.0));
        state
            .all_players
            .insert(PlayerAddr::new("A"), PlayerState::new(9.0, 9.0, 25.0));
        state
    }

    #[test]
    fn local_player_hidden_until_identity_known() {
        let state = populated();
        let view = FrameView::from_state(&state);
        assert!(view.local().is_none());
        assert_eq!(view.players.len(), 2);
    }

    #[test]
    fn local_player_drawn_at_prediction() {
        let mut state = populated();
        state.identity = Identity::Resolved(PlayerAddr::new("A"));

        let mut surface = Recorder::default();
        draw(&mut surface, &FrameView::from_state(&state));

        assert_eq!(surface.frames, 1);
        assert_eq!(
            surface.players,
            vec![
                ("B".to_string(), PlayerKind::Remote, Vec2::new(1.0, 2.0), 0.5),
                ("A".to_string(), PlayerKind::Local, Vec2::new(5.0, 5.0), 1.0),
            ]
        );
    }

    #[test]
    fn only_confirmed_bullets_are_drawn() {
        let mut state = populated();
        let b = BulletState {
            x: 0.0,
            y: 0.0,
            velx: 1.0,
            vely: 1.0,
            life: 1.0,
            owner: None,
        };
        state.bullets.push_unfired(b.clone());
        state.bullets.replace_confirmed(vec![b.clone(), b]);

        let mut surface = Recorder::default();
        draw(&mut surface, &FrameView::from_state(&state));
        assert_eq!(surface.bullets, 2);
    }
}
