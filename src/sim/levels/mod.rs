//! Per-level behaviour behind one contract
//!
//! The core engine never branches on the level number; it asks the layout for
//! the active [`LevelController`] and delegates.

mod level1;
mod level2;

pub use level1::Level1;
pub use level2::Level2;

use glam::Vec2;

use super::geom::Rect;
use super::rng::RandomSource;
use super::state::GameState;

/// Level-specific part of a tick
pub trait LevelController {
    /// Animations, puzzle effects and combat for one tick
    fn advance_per_tick(&self, state: &mut GameState, elapsed_ms: f32, rng: &mut dyn RandomSource);

    /// Constrain the player's unconstrained move from `prev` to `next`
    fn resolve_colliders(&self, state: &GameState, prev: Vec2, next: Vec2) -> Vec2;

    /// True when the player standing at `pos` has finished the level
    fn check_exit(&self, state: &GameState, pos: Vec2) -> bool;

    /// The level's terminal
    fn terminal(&self) -> Rect;

    /// The level's exit door
    fn exit(&self) -> Rect;
}

/// Player center strictly inside the exit door
pub(crate) fn center_in_exit(exit: &Rect, pos: Vec2) -> bool {
    let center = super::world::WorldLayout::player_rect(pos).center();
    exit.contains_strict(center)
}
