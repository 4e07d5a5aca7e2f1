//! Projectile bookkeeping.
//!
//! Two populations that never mix:
//! - unfired: created locally, waiting for exactly one outbound send
//! - confirmed: the authority's latest bullet list, used for drawing
//!
//! A locally fired bullet only becomes visible once it comes back in a
//! snapshot. The client never moves confirmed bullets itself.

use arena_shared::net::BulletState;

#[derive(Debug, Clone, Default)]
pub struct BulletLedger {
    unfired: Vec<BulletState>,
    confirmed: Vec<BulletState>,
}

impl BulletLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a locally created bullet for the next send.
    pub fn push_unfired(&mut self, bullet: BulletState) {
        self.unfired.push(bullet);
    }

    /// Returns the unfired queue in creation order and leaves it empty.
    pub fn drain_unfired(&mut self) -> Vec<BulletState> {
        std::mem::take(&mut self.unfired)
    }

    /// Replaces the confirmed set with the authority's list.
    pub fn replace_confirmed(&mut self, bullets: Vec<BulletState>) {
        self.confirmed = bullets;
    }

    pub fn unfired(&self) -> &[BulletState] {
        &self.unfired
    }

    pub fn confirmed(&self) -> &[BulletState] {
        &self.confirmed
    }
}
