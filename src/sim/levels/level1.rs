//! Level 1: a guard robot blocks the corridor until the terminal disables it

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{LevelController, center_in_exit};
use crate::consts::PLAYER_WIDTH;
use crate::sim::geom::Rect;
use crate::sim::rng::RandomSource;
use crate::sim::robot::GUARD_ROBOT;
use crate::sim::state::GameState;
use crate::sim::world::WorldLayout;

/// Level 1 layout and rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level1 {
    pub robot: Rect,
    pub terminal: Rect,
    pub exit: Rect,
}

impl LevelController for Level1 {
    fn advance_per_tick(&self, state: &mut GameState, elapsed_ms: f32, rng: &mut dyn RandomSource) {
        let level1 = &mut state.level1;
        if level1.robot.advance(&GUARD_ROBOT, self.robot, elapsed_ms, rng) {
            level1.robot_collider_active = false;
            log::info!("Guard robot collapsed, corridor open");
        }
    }

    fn resolve_colliders(&self, state: &GameState, prev: Vec2, next: Vec2) -> Vec2 {
        if !state.level1.robot_collider_active {
            return next;
        }
        if !WorldLayout::player_rect(next).overlaps(&self.robot) {
            return next;
        }
        // Push back out on the side the player came from
        let x = if prev.x < self.robot.left() {
            self.robot.left() - PLAYER_WIDTH
        } else {
            self.robot.right()
        };
        Vec2::new(x, next.y)
    }

    fn check_exit(&self, state: &GameState, pos: Vec2) -> bool {
        !state.level1.robot_collider_active && center_in_exit(&self.exit, pos)
    }

    fn terminal(&self) -> Rect {
        self.terminal
    }

    fn exit(&self) -> Rect {
        self.exit
    }
}
