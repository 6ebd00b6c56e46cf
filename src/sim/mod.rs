//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Variable timestep supplied by the caller, never a clock read
//! - Seeded RNG only
//! - Every transition is a value-to-value function over `GameState`
//! - No rendering or platform dependencies

pub mod geom;
pub mod levels;
pub mod robot;
pub mod rng;
pub mod state;
pub mod terminal;
pub mod text;
pub mod tick;
pub mod world;

pub use geom::Rect;
pub use levels::{Level1, Level2, LevelController};
pub use rng::{RandomSource, ScriptedRandom};
pub use state::{
    BarrierAnimPhase, CompletePhase, GameState, Level, MessageKind, RobotPhase, SpawnPhase, StateError,
    TerminalTarget, WireTarget,
};
pub use terminal::{
    can_open_terminal, close_terminal, open_terminal, parse_binary, set_terminal_input, submit_terminal,
    toggle_task_panel,
};
pub use tick::{InputState, advance, advance_with};
pub use world::{LayoutError, WirePath, WorldLayout};
