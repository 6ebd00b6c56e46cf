//! Frame driver
//!
//! Owns the one live `GameState` between frames. Each host frame turns a
//! timestamp into a clamped delta and replaces the state with exactly one
//! `advance`; UI commands are applied between frames.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::clamp_frame_delta;
use crate::settings::{Settings, SettingsError};
use crate::sim::{
    CompletePhase, GameState, InputState, Level, StateError, WorldLayout, advance, close_terminal, open_terminal,
    set_terminal_input, submit_terminal, toggle_task_panel,
};

/// Discrete actions requested by the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Use the terminal the player stands next to
    Interact,
    Submit,
    /// Close the terminal without submitting
    Cancel,
    TogglePanel,
    /// Rebuild the current level from scratch
    Restart,
    /// Continue to level 2 once level 1 is finished
    NextLevel,
    /// Start over from level 1 once level 2 is finished
    PlayAgain,
    /// Replace the terminal input
    Input(String),
}

pub struct Game {
    state: GameState,
    world: WorldLayout,
    settings: Settings,
    /// Seeds every level instance, so a fixed seed replays the same session
    seeder: Pcg32,
    last_time: Option<f64>,
}

impl Game {
    /// Start a session on the configured level
    ///
    /// Settings are validated here, so a running game never sees a bad
    /// frame clamp or start level.
    pub fn new(settings: Settings, seed: u64) -> Result<Self, SettingsError> {
        settings.validate()?;
        let level = settings.level()?;
        let mut seeder = Pcg32::seed_from_u64(seed);
        let state = Self::fresh_state(&settings, &mut seeder, level);
        log::info!("Game initialized with seed: {}", seed);
        Ok(Self {
            state,
            world: WorldLayout::standard(),
            settings,
            seeder,
            last_time: None,
        })
    }

    fn fresh_state(settings: &Settings, seeder: &mut Pcg32, level: Level) -> GameState {
        let mut state = GameState::new(level, seeder.random());
        state.task_panel_expanded = settings.task_panel_expanded;
        state
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn world(&self) -> &WorldLayout {
        &self.world
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run one frame at host time `now_ms`
    ///
    /// The first frame only records the timestamp. Later frames advance by the
    /// time since the previous one, clamped to `max_frame_ms`.
    pub fn frame(&mut self, now_ms: f64, input: &InputState) {
        let elapsed = match self.last_time {
            Some(last) => (now_ms - last) as f32,
            None => 0.0,
        };
        self.last_time = Some(now_ms);
        self.step(elapsed, input);
    }

    /// Advance by an explicit delta (clamped like a host frame)
    pub fn step(&mut self, elapsed_ms: f32, input: &InputState) {
        let dt = clamp_frame_delta(elapsed_ms, self.settings.max_frame_ms);
        self.state = advance(&self.state, input, dt, &self.world);
    }

    pub fn command(&mut self, command: Command) {
        let next = match command {
            Command::Interact => open_terminal(&self.state, &self.world),
            Command::Submit => submit_terminal(&self.state),
            Command::Cancel => close_terminal(&self.state),
            Command::TogglePanel => toggle_task_panel(&self.state),
            Command::Input(raw) => set_terminal_input(&self.state, &raw),
            Command::Restart => {
                log::info!("Restarting level {}", self.state.level.number());
                self.new_level(self.state.level)
            }
            Command::NextLevel => {
                if self.state.level != Level::One || self.state.complete.phase != CompletePhase::Transition {
                    log::debug!("Next level requested before level 1 was finished");
                    return;
                }
                self.new_level(Level::Two)
            }
            Command::PlayAgain => {
                if self.state.level != Level::Two || self.state.complete.phase != CompletePhase::ShowButton {
                    log::debug!("Play again requested before level 2 was finished");
                    return;
                }
                self.new_level(Level::One)
            }
        };
        self.state = next;
    }

    fn new_level(&mut self, level: Level) -> GameState {
        Self::fresh_state(&self.settings, &mut self.seeder, level)
    }

    /// Serialize the live state
    pub fn snapshot_json(&self) -> Result<String, StateError> {
        self.state.to_json()
    }

    /// Replace the live state with a validated snapshot
    ///
    /// On error the current state is kept.
    pub fn restore(&mut self, json: &str) -> Result<(), StateError> {
        self.state = GameState::from_json(json)?;
        self.last_time = None;
        log::info!("Restored level {} from snapshot", self.state.level.number());
        Ok(())
    }
}
