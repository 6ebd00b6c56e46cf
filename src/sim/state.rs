//! Game state and core simulation types
//!
//! Everything the renderer and UI read lives here as plain data. Behaviour is
//! in `tick`, `levels`, `robot` and `terminal`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::rng::RandomSource;
use super::text;
use crate::consts::*;
use crate::ground_y;

/// Which of the two levels is being played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    One,
    Two,
}

impl Level {
    pub fn number(self) -> u8 {
        match self {
            Level::One => 1,
            Level::Two => 2,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Level::One),
            2 => Some(Level::Two),
            _ => None,
        }
    }
}

/// Closed phase enumeration with an explicit allowed-transition table
pub trait Phase: Copy + PartialEq + std::fmt::Debug {
    fn can_transition_to(self, next: Self) -> bool;
}

/// Move `current` to `next`, which must be an allowed transition
pub fn enter_phase<P: Phase>(current: &mut P, next: P) {
    debug_assert!(
        current.can_transition_to(next),
        "illegal phase transition {:?} -> {:?}",
        current,
        next
    );
    log::debug!("phase {:?} -> {:?}", current, next);
    *current = next;
}

/// Player entry animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnPhase {
    /// Teleport beam with rising particles
    Beam,
    /// Player fades in
    Materialize,
    /// Gameplay unlocked
    Ready,
}

impl Phase for SpawnPhase {
    fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (SpawnPhase::Beam, SpawnPhase::Materialize) | (SpawnPhase::Materialize, SpawnPhase::Ready)
        )
    }
}

/// Robot shutdown animation (shared by both robots)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RobotPhase {
    None,
    Flashing,
    Sparks,
    Collapse,
    Done,
}

impl Phase for RobotPhase {
    fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (RobotPhase::None, RobotPhase::Flashing)
                | (RobotPhase::Flashing, RobotPhase::Sparks)
                | (RobotPhase::Sparks, RobotPhase::Collapse)
                | (RobotPhase::Collapse, RobotPhase::Done)
        )
    }
}

/// Level complete overlay sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletePhase {
    None,
    FadeIn,
    Hold,
    FadeOut,
    /// Level 2 finished: offer "play again"
    ShowButton,
    /// Level 1 finished: offer "next level"
    Transition,
}

impl Phase for CompletePhase {
    fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (CompletePhase::None, CompletePhase::FadeIn)
                | (CompletePhase::FadeIn, CompletePhase::Hold)
                | (CompletePhase::Hold, CompletePhase::FadeOut)
                | (CompletePhase::FadeOut, CompletePhase::ShowButton)
                | (CompletePhase::FadeOut, CompletePhase::Transition)
        )
    }
}

/// Barrier switch-off visual
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarrierAnimPhase {
    None,
    Disabling,
    Done,
}

impl Phase for BarrierAnimPhase {
    fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (BarrierAnimPhase::None, BarrierAnimPhase::Disabling)
                | (BarrierAnimPhase::Disabling, BarrierAnimPhase::Done)
        )
    }
}

/// Which wire current is flowing through, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireTarget {
    None,
    /// Red wire, generator -> combat robot
    Robot,
    /// Blue wire, generator -> barrier
    Barrier,
}

impl Phase for WireTarget {
    fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (WireTarget::None, WireTarget::Robot | WireTarget::Barrier) => true,
            (WireTarget::Robot | WireTarget::Barrier, WireTarget::None) => true,
            // A fresh submit restarts the animation on either wire
            (WireTarget::Robot | WireTarget::Barrier, WireTarget::Robot | WireTarget::Barrier) => {
                true
            }
            (WireTarget::None, WireTarget::None) => false,
        }
    }
}

/// Device the open level-2 terminal is addressing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminalTarget {
    Robot,
    Barrier,
}

/// Kind of the terminal feedback line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MessageKind {
    #[default]
    None,
    Error,
    Success,
}

/// Spawn particle colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleTint {
    Blue,
    Green,
}

/// A particle of the teleport beam
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnParticle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 0-1, decreases over time
    pub life: f32,
    pub size: f32,
    pub tint: ParticleTint,
}

/// A spark thrown off a failing robot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spark {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
}

/// A combat robot bullet (moves horizontally only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    /// Top-left corner
    pub pos: Vec2,
    /// Pixels per reference frame
    pub vx: f32,
}

/// A blob of current travelling along a wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireParticle {
    /// 0-1 along the wire
    pub progress: f32,
    /// Canvas position resolved from the wire path
    pub pos: Vec2,
    pub target: WireTarget,
}

/// Timed narrator line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarratorMessage {
    pub text: String,
    pub duration_ms: f32,
    pub timer_ms: f32,
}

impl NarratorMessage {
    pub fn new(text: &str, duration_ms: f32) -> Self {
        Self {
            text: text.to_string(),
            duration_ms,
            timer_ms: duration_ms,
        }
    }
}

/// The player avatar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    /// Pixels per reference frame, positive is down
    pub velocity_y: f32,
    pub grounded: bool,
    pub moving: bool,
    pub facing_right: bool,
    /// Walk-cycle clock (ms)
    pub animation_time: f32,
}

impl Player {
    pub fn at_spawn() -> Self {
        Self {
            pos: Vec2::new(PLAYER_SPAWN_X, ground_y() - PLAYER_HEIGHT),
            velocity_y: 0.0,
            grounded: true,
            moving: false,
            facing_right: true,
            animation_time: 0.0,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT) * 0.5
    }
}

/// Spawn intro progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnState {
    pub phase: SpawnPhase,
    /// 0-1 within the current phase
    pub progress: f32,
    pub particles: Vec<SpawnParticle>,
}

impl SpawnState {
    pub fn is_ready(&self) -> bool {
        self.phase == SpawnPhase::Ready
    }
}

/// Shutdown animation of one robot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotDisable {
    pub phase: RobotPhase,
    /// Flash ticks elapsed (fractional)
    pub flash_count: f32,
    pub flash_on: bool,
    /// How far the robot has sunk into the ground
    pub collapse_offset: f32,
    pub sparks: Vec<Spark>,
}

impl Default for RobotDisable {
    fn default() -> Self {
        Self {
            phase: RobotPhase::None,
            flash_count: 0.0,
            flash_on: false,
            collapse_offset: 0.0,
            sparks: Vec::new(),
        }
    }
}

/// Level 1: guard robot and terminal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level1State {
    /// Set once by the correct terminal answer
    pub robot_disabled: bool,
    /// Robot blocks movement until its shutdown animation completes
    pub robot_collider_active: bool,
    /// Decimal number the player has to enter in binary
    pub target_number: u32,
    pub robot: RobotDisable,
}

/// Current flowing along a wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireAnimation {
    pub active: WireTarget,
    /// 0-1
    pub progress: f32,
    pub particles: Vec<WireParticle>,
}

impl Default for WireAnimation {
    fn default() -> Self {
        Self {
            active: WireTarget::None,
            progress: 0.0,
            particles: Vec::new(),
        }
    }
}

/// Level 2: combat robot, barrier and wiring puzzle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level2State {
    pub combat_robot_disabled: bool,
    pub combat_robot: RobotDisable,
    pub barrier_active: bool,
    pub barrier_anim: BarrierAnimPhase,
    /// Time spent in `BarrierAnimPhase::Disabling`
    pub barrier_anim_ms: f32,
    pub barrier_time_left: f32,
    pub bullets: Vec<Bullet>,
    pub shoot_timer: f32,
    /// Red display, the robot's code
    pub display_number1: u32,
    /// Blue display, the barrier's code
    pub display_number2: u32,
    pub player_dead: bool,
    pub death_reason: String,
    pub narrator: Option<NarratorMessage>,
    pub terminal_target: Option<TerminalTarget>,
    pub wire: WireAnimation,
}

/// Terminal modal
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TerminalState {
    pub open: bool,
    /// Only '0' and '1'
    pub input: String,
    pub message: String,
    pub message_kind: MessageKind,
    /// Remaining display time of `message` (ms)
    pub message_timer: f32,
}

impl TerminalState {
    pub fn clear_message(&mut self) {
        self.message.clear();
        self.message_kind = MessageKind::None;
    }
}

/// Level complete overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelCompleteState {
    pub complete: bool,
    pub phase: CompletePhase,
    /// 0-1
    pub opacity: f32,
    /// Time spent in `CompletePhase::Hold`
    pub hold_ms: f32,
}

impl Default for LevelCompleteState {
    fn default() -> Self {
        Self {
            complete: false,
            phase: CompletePhase::None,
            opacity: 0.0,
            hold_ms: 0.0,
        }
    }
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub level: Level,
    pub player: Player,
    pub spawn: SpawnState,
    pub level1: Level1State,
    pub level2: Level2State,
    pub terminal: TerminalState,
    pub complete: LevelCompleteState,
    /// Objective shown in the task panel
    pub current_goal: String,
    pub task_panel_expanded: bool,
    /// In-flight randomness (sparks, wire current)
    pub rng: Pcg32,
}

/// Snapshot rejected by [`GameState::validate`] or [`GameState::from_json`]
#[derive(Debug, Error)]
pub enum StateError {
    #[error("display numbers must differ (both are {0})")]
    DuplicateDisplayNumbers(u32),
    #[error("number {0} outside the puzzle range 5..=31")]
    NumberOutOfRange(u32),
    #[error("barrier time {0} outside 0..=15000 ms")]
    BarrierTime(f32),
    #[error("{field} = {value} outside 0..=1")]
    Fraction { field: &'static str, value: f32 },
    #[error("terminal input {0:?} contains characters other than 0 and 1")]
    TerminalInput(String),
    #[error("inconsistent state: {0}")]
    Inconsistent(&'static str),
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

impl GameState {
    /// Fresh state for `level`; all randomness comes from `seed`
    pub fn new(level: Level, seed: u64) -> Self {
        let mut source = Pcg32::seed_from_u64(seed);
        let rng = Pcg32::seed_from_u64(seed.wrapping_add(1));
        Self::with_source(level, &mut source, rng)
    }

    /// Fresh state drawing construction-time randomness from `source`
    ///
    /// `rng` is kept in the state for draws made while the level runs.
    pub fn with_source(level: Level, source: &mut impl RandomSource, rng: Pcg32) -> Self {
        let spawn_center = Vec2::new(PLAYER_SPAWN_X + PLAYER_WIDTH / 2.0, ground_y() - PLAYER_HEIGHT / 2.0);
        let particles = (0..SPAWN_PARTICLE_COUNT)
            .map(|_| SpawnParticle {
                pos: spawn_center + Vec2::new(source.centered() * 60.0, source.centered() * 80.0),
                vel: Vec2::new(source.centered() * 3.0, source.centered() * 3.0),
                life: 1.0,
                size: source.unit() * 4.0 + 2.0,
                tint: if source.unit() > 0.5 {
                    ParticleTint::Blue
                } else {
                    ParticleTint::Green
                },
            })
            .collect();

        let display_number1 = source.int_inclusive(NUMBER_MIN, NUMBER_MAX);
        let mut display_number2 = source.int_inclusive(NUMBER_MIN, NUMBER_MAX);
        let mut rerolls = 0;
        while display_number2 == display_number1 {
            rerolls += 1;
            display_number2 = if rerolls < 64 {
                source.int_inclusive(NUMBER_MIN, NUMBER_MAX)
            } else {
                // A degenerate source could repeat forever; step to the neighbour instead
                if display_number1 < NUMBER_MAX {
                    display_number1 + 1
                } else {
                    NUMBER_MIN
                }
            };
        }
        let target_number = source.int_inclusive(NUMBER_MIN, NUMBER_MAX);

        let is_level1 = level == Level::One;
        log::info!("Starting level {}", level.number());

        Self {
            level,
            player: Player::at_spawn(),
            spawn: SpawnState {
                phase: SpawnPhase::Beam,
                progress: 0.0,
                particles,
            },
            level1: Level1State {
                robot_disabled: !is_level1,
                robot_collider_active: is_level1,
                target_number,
                robot: RobotDisable::default(),
            },
            level2: Level2State {
                combat_robot_disabled: false,
                combat_robot: RobotDisable::default(),
                barrier_active: !is_level1,
                barrier_anim: BarrierAnimPhase::None,
                barrier_anim_ms: 0.0,
                barrier_time_left: BARRIER_MAX_TIME_MS,
                bullets: Vec::new(),
                shoot_timer: 0.0,
                display_number1,
                display_number2,
                player_dead: false,
                death_reason: String::new(),
                narrator: if is_level1 {
                    None
                } else {
                    Some(NarratorMessage::new(text::NARRATOR_INTRO, INTRO_NARRATOR_MS))
                },
                terminal_target: None,
                wire: WireAnimation::default(),
            },
            terminal: TerminalState::default(),
            complete: LevelCompleteState::default(),
            current_goal: if is_level1 {
                text::GOAL_LEVEL1_START
            } else {
                text::GOAL_LEVEL2_START
            }
            .to_string(),
            task_panel_expanded: true,
            rng,
        }
    }

    /// True once the player can no longer act in this level instance
    pub fn is_frozen(&self) -> bool {
        self.complete.complete || self.level2.player_dead
    }

    /// Decimal value currently shown to the player for conversion
    pub fn terminal_number(&self) -> Option<u32> {
        match self.level {
            Level::One => Some(self.level1.target_number),
            Level::Two => match self.level2.terminal_target {
                Some(TerminalTarget::Robot) => Some(self.level2.display_number1),
                Some(TerminalTarget::Barrier) => Some(self.level2.display_number2),
                None => None,
            },
        }
    }

    /// Check the invariants a well-formed state always satisfies
    pub fn validate(&self) -> Result<(), StateError> {
        let l1 = &self.level1;
        let l2 = &self.level2;

        for n in [l1.target_number, l2.display_number1, l2.display_number2] {
            if !(NUMBER_MIN..=NUMBER_MAX).contains(&n) {
                return Err(StateError::NumberOutOfRange(n));
            }
        }
        if l2.display_number1 == l2.display_number2 {
            return Err(StateError::DuplicateDisplayNumbers(l2.display_number1));
        }
        if !(0.0..=BARRIER_MAX_TIME_MS).contains(&l2.barrier_time_left) {
            return Err(StateError::BarrierTime(l2.barrier_time_left));
        }
        for (field, value) in [
            ("spawn.progress", self.spawn.progress),
            ("complete.opacity", self.complete.opacity),
            ("wire.progress", l2.wire.progress),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(StateError::Fraction { field, value });
            }
        }
        if !self.terminal.input.chars().all(|c| c == '0' || c == '1') {
            return Err(StateError::TerminalInput(self.terminal.input.clone()));
        }
        if l1.robot_collider_active && l1.robot.is_done() {
            return Err(StateError::Inconsistent("robot collider active after collapse"));
        }
        if l1.robot.phase != RobotPhase::None && !l1.robot_disabled {
            return Err(StateError::Inconsistent("robot animating while not disabled"));
        }
        if l2.combat_robot.phase != RobotPhase::None && !l2.combat_robot_disabled {
            return Err(StateError::Inconsistent("combat robot animating while not disabled"));
        }
        if self.complete.complete == (self.complete.phase == CompletePhase::None) {
            return Err(StateError::Inconsistent("level complete flag and phase disagree"));
        }
        if self.level == Level::One && l2.terminal_target.is_some() {
            return Err(StateError::Inconsistent("terminal target set on level 1"));
        }
        Ok(())
    }

    /// Serialize a snapshot
    pub fn to_json(&self) -> Result<String, StateError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restore and validate a snapshot
    pub fn from_json(json: &str) -> Result<Self, StateError> {
        let state: GameState = serde_json::from_str(json)?;
        state.validate()?;
        Ok(state)
    }
}
