//! Static per-level entity layout
//!
//! Computed once from the layout constants and the canvas/ground geometry. The
//! simulation reads it every tick but never mutates it.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::geom::Rect;
use super::levels::{Level1, Level2, LevelController};
use super::state::Level;
use crate::consts::*;

/// Layout that cannot host the game
#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("canvas {width}x{height} is too small")]
    CanvasTooSmall { width: f32, height: f32 },
    #[error("{0} does not fit on the canvas")]
    OutOfBounds(&'static str),
    #[error("{0} overlaps {1}")]
    Overlap(&'static str, &'static str),
    #[error("barrier at x={0} must sit between the level 2 terminal and the combat robot")]
    BarrierPlacement(f32),
}

/// A wire drawn as a polyline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WirePath {
    pub points: Vec<Vec2>,
}

impl WirePath {
    pub fn new(points: Vec<Vec2>) -> Self {
        Self { points }
    }

    /// Total length of all segments
    pub fn length(&self) -> f32 {
        self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }

    /// Point at fraction `t` (clamped to 0-1) of the total length
    pub fn point_at(&self, t: f32) -> Vec2 {
        let Some(&first) = self.points.first() else {
            return Vec2::ZERO;
        };
        let total = self.length();
        if total <= 0.0 {
            return first;
        }

        let mut remaining = total * t.clamp(0.0, 1.0);
        for w in self.points.windows(2) {
            let segment = w[0].distance(w[1]);
            if remaining <= segment {
                if segment <= 0.0 {
                    return w[0];
                }
                return w[0].lerp(w[1], remaining / segment);
            }
            remaining -= segment;
        }
        self.points.last().copied().unwrap_or(first)
    }
}

/// Where everything sits on both levels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldLayout {
    pub canvas: Vec2,
    pub ground_y: f32,
    pub level1: Level1,
    pub level2: Level2,
}

impl WorldLayout {
    /// Layout for the standard 1400x900 canvas
    pub fn standard() -> Self {
        Self::build(CANVAS_WIDTH, CANVAS_HEIGHT)
    }

    /// Layout for a custom canvas, rejected if the entities do not fit
    pub fn new(width: f32, height: f32) -> Result<Self, LayoutError> {
        if !(width.is_finite() && height.is_finite()) || height <= GROUND_HEIGHT + COMBAT_ROBOT_HEIGHT {
            return Err(LayoutError::CanvasTooSmall { width, height });
        }
        let layout = Self::build(width, height);
        layout.check()?;
        Ok(layout)
    }

    fn build(width: f32, height: f32) -> Self {
        let ground_y = height - GROUND_HEIGHT;

        let robot = Rect::new(ROBOT_X, ground_y - ROBOT_HEIGHT, ROBOT_WIDTH, ROBOT_HEIGHT);
        let exit = Rect::new(
            width - EXIT_WIDTH - EXIT_MARGIN,
            ground_y - EXIT_HEIGHT,
            EXIT_WIDTH,
            EXIT_HEIGHT,
        );
        let level1 = Level1 {
            robot,
            terminal: Rect::new(LEVEL1_TERMINAL_X, ground_y - TERMINAL_HEIGHT, TERMINAL_WIDTH, TERMINAL_HEIGHT),
            exit,
        };

        let combat_robot = Rect::new(
            COMBAT_ROBOT_X,
            ground_y - COMBAT_ROBOT_HEIGHT,
            COMBAT_ROBOT_WIDTH,
            COMBAT_ROBOT_HEIGHT,
        );
        let generator = Rect::new(
            width - GENERATOR_INSET,
            ground_y - GENERATOR_HEIGHT,
            GENERATOR_WIDTH,
            GENERATOR_HEIGHT,
        );
        let red_x = generator.left() + 37.0;
        let blue_x = generator.left() + 102.0;
        let red_wire = WirePath::new(vec![
            Vec2::new(red_x, generator.bottom()),
            Vec2::new(red_x, ground_y - 20.0),
            Vec2::new(combat_robot.center().x, ground_y - 20.0),
            Vec2::new(combat_robot.center().x, combat_robot.bottom()),
        ]);
        let blue_wire = WirePath::new(vec![
            Vec2::new(blue_x, generator.bottom()),
            Vec2::new(blue_x, ground_y - 40.0),
            Vec2::new(BARRIER_X + 10.0, ground_y - 40.0),
            Vec2::new(BARRIER_X + 10.0, ground_y),
        ]);
        let level2 = Level2 {
            combat_robot,
            terminal: Rect::new(LEVEL2_TERMINAL_X, ground_y - TERMINAL_HEIGHT, TERMINAL_WIDTH, TERMINAL_HEIGHT),
            exit,
            generator,
            barrier_x: BARRIER_X,
            red_wire,
            blue_wire,
        };

        Self {
            canvas: Vec2::new(width, height),
            ground_y,
            level1,
            level2,
        }
    }

    fn check(&self) -> Result<(), LayoutError> {
        let (w, h) = (self.canvas.x, self.canvas.y);
        let named = [
            ("robot", self.level1.robot),
            ("level 1 terminal", self.level1.terminal),
            ("exit", self.level1.exit),
            ("combat robot", self.level2.combat_robot),
            ("level 2 terminal", self.level2.terminal),
            ("generator", self.level2.generator),
        ];
        for (name, rect) in named {
            if !rect.fits_within(w, h) {
                return Err(LayoutError::OutOfBounds(name));
            }
        }

        if self.level1.robot.overlaps(&self.level1.exit) {
            return Err(LayoutError::Overlap("robot", "exit"));
        }
        if self.level2.combat_robot.overlaps(&self.level2.generator) {
            return Err(LayoutError::Overlap("combat robot", "generator"));
        }

        let barrier = self.level2.barrier_x;
        if barrier <= self.level2.terminal.right() || barrier + BARRIER_FAR_BUFFER >= self.level2.combat_robot.left() {
            return Err(LayoutError::BarrierPlacement(barrier));
        }
        Ok(())
    }

    /// Controller for `level`
    pub fn controller(&self, level: Level) -> &dyn LevelController {
        match level {
            Level::One => &self.level1,
            Level::Two => &self.level2,
        }
    }

    /// Bounding box of the player at `pos`
    pub fn player_rect(pos: Vec2) -> Rect {
        Rect::at(pos, Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT))
    }
}

impl Default for WorldLayout {
    fn default() -> Self {
        Self::standard()
    }
}
