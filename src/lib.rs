//! Binary Bots - a two-level platformer about binary numbers
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, robots, puzzle, game state)
//! - `game`: Frame driver that owns the state between frames
//! - `input`: Key bindings and held-key tracking
//! - `settings`: Player/host configuration

pub mod game;
pub mod input;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use game::{Command, Game};
pub use input::KeyTracker;
pub use settings::Settings;

/// Game configuration constants
///
/// Distances are canvas pixels. Speeds and accelerations are expressed per
/// reference frame (1/60 s) and scaled by [`frame_factor`].
pub mod consts {
    /// Canvas dimensions
    pub const CANVAS_WIDTH: f32 = 1400.0;
    pub const CANVAS_HEIGHT: f32 = 900.0;
    pub const GROUND_HEIGHT: f32 = 80.0;

    /// Length of the reference frame all per-frame rates are tuned for
    pub const REFERENCE_FRAME_MS: f32 = 1000.0 / 60.0;
    /// Largest step the driver feeds the simulation
    pub const MAX_FRAME_MS: f32 = 50.0;

    /// Player
    pub const PLAYER_WIDTH: f32 = 36.0;
    pub const PLAYER_HEIGHT: f32 = 52.0;
    pub const PLAYER_SPAWN_X: f32 = 80.0;
    pub const PLAYER_SPEED: f32 = 1.0;
    pub const JUMP_FORCE: f32 = 8.0;
    pub const GRAVITY: f32 = 0.6;

    /// Spawn intro
    pub const SPAWN_BEAM_MS: f32 = 800.0;
    pub const SPAWN_MATERIALIZE_MS: f32 = 600.0;
    pub const SPAWN_PARTICLE_COUNT: usize = 20;
    pub const SPAWN_PARTICLE_LIFETIME_MS: f32 = 1000.0;

    /// Level 1 entities
    pub const ROBOT_WIDTH: f32 = 60.0;
    pub const ROBOT_HEIGHT: f32 = 80.0;
    pub const ROBOT_X: f32 = 550.0;
    pub const TERMINAL_WIDTH: f32 = 50.0;
    pub const TERMINAL_HEIGHT: f32 = 60.0;
    pub const LEVEL1_TERMINAL_X: f32 = 430.0;
    pub const EXIT_WIDTH: f32 = 60.0;
    pub const EXIT_HEIGHT: f32 = 90.0;
    /// Gap between the exit door and the right canvas edge
    pub const EXIT_MARGIN: f32 = 30.0;
    pub const INTERACTION_DISTANCE: f32 = 70.0;

    /// Level 2 entities
    pub const COMBAT_ROBOT_WIDTH: f32 = 80.0;
    pub const COMBAT_ROBOT_HEIGHT: f32 = 100.0;
    pub const COMBAT_ROBOT_X: f32 = 500.0;
    pub const LEVEL2_TERMINAL_X: f32 = 200.0;
    pub const GENERATOR_WIDTH: f32 = 140.0;
    pub const GENERATOR_HEIGHT: f32 = 120.0;
    /// Generator's left edge, measured from the right canvas edge
    pub const GENERATOR_INSET: f32 = 180.0;
    pub const BARRIER_X: f32 = 380.0;
    /// Barrier blocking zone: buffer on the near (left) side and far (right) side
    pub const BARRIER_NEAR_BUFFER: f32 = 10.0;
    pub const BARRIER_FAR_BUFFER: f32 = 30.0;
    pub const BARRIER_MAX_TIME_MS: f32 = 15000.0;
    /// Visual fade after the barrier is switched off
    pub const BARRIER_DISABLE_MS: f32 = 500.0;

    /// Combat robot weapon
    pub const BULLET_SPEED: f32 = 4.0;
    pub const BULLET_WIDTH: f32 = 20.0;
    pub const BULLET_HEIGHT: f32 = 8.0;
    pub const SHOOT_INTERVAL_MS: f32 = 1200.0;

    /// Robot disable animation
    pub const FLASH_INTERVAL_MS: f32 = 100.0;
    pub const FLASH_TICKS: f32 = 6.0;
    pub const SPARK_LIFETIME_MS: f32 = 500.0;
    pub const SPARK_GRAVITY: f32 = 0.3;

    /// Wire animation
    pub const WIRE_ANIMATION_MS: f32 = 1000.0;
    pub const WIRE_PARTICLE_CHANCE: f32 = 0.3;
    pub const WIRE_PARTICLE_LAG: f32 = 0.1;

    /// Level complete overlay
    pub const COMPLETE_FADE_IN_MS: f32 = 250.0;
    pub const COMPLETE_HOLD_MS: f32 = 1200.0;
    pub const COMPLETE_FADE_OUT_MS: f32 = 500.0;

    /// Messages
    pub const ERROR_MESSAGE_MS: f32 = 1500.0;
    pub const INTRO_NARRATOR_MS: f32 = 5000.0;
    pub const ROBOT_DOWN_NARRATOR_MS: f32 = 3000.0;
    pub const PATH_CLEAR_NARRATOR_MS: f32 = 2500.0;

    /// Range of the decimal numbers the player converts
    pub const NUMBER_MIN: u32 = 5;
    pub const NUMBER_MAX: u32 = 31;
}

/// Number of reference frames covered by `elapsed_ms`
#[inline]
pub fn frame_factor(elapsed_ms: f32) -> f32 {
    elapsed_ms / consts::REFERENCE_FRAME_MS
}

/// Clamp a raw frame delta to the simulation's step bounds
///
/// A NaN delta, or a bound that is not positive, yields no step at all.
#[inline]
pub fn clamp_frame_delta(elapsed_ms: f32, max_ms: f32) -> f32 {
    if elapsed_ms.is_nan() || max_ms.is_nan() || max_ms <= 0.0 {
        return 0.0;
    }
    elapsed_ms.clamp(0.0, max_ms)
}

/// Y coordinate of the ground surface
#[inline]
pub fn ground_y() -> f32 {
    consts::CANVAS_HEIGHT - consts::GROUND_HEIGHT
}
