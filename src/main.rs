//! Binary Bots entry point
//!
//! The web build is driven from JavaScript through `binary_bots::wasm`. The
//! native binary runs a headless autopilot through both levels and logs how
//! it went, which doubles as a smoke test of the whole game flow.

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use binary_bots::consts::*;
    use binary_bots::sim::{
        CompletePhase, GameState, InputState, Level, WireTarget, WorldLayout, can_open_terminal,
    };
    use binary_bots::{Command, Game};

    /// Give up on a level after this much simulated time
    const LEVEL_TIMEOUT_MS: f32 = 60_000.0;
    const MAX_ATTEMPTS: u32 = 3;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Outcome {
        Finished,
        Died,
        TimedOut,
    }

    /// What the pilot does this frame
    enum Plan {
        Wait,
        Walk(f32),
        Enter(u32),
    }

    pub fn play(game: &mut Game) -> Outcome {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let outcome = play_level(game);
            log::info!(
                "Level {} attempt {}: {:?}",
                game.state().level.number(),
                attempts,
                outcome
            );
            match outcome {
                Outcome::Finished if game.state().level == Level::One => {
                    game.command(Command::NextLevel);
                    attempts = 0;
                }
                Outcome::Finished => return Outcome::Finished,
                _ if attempts >= MAX_ATTEMPTS => return outcome,
                _ => game.command(Command::Restart),
            }
        }
    }

    fn play_level(game: &mut Game) -> Outcome {
        let mut elapsed = 0.0;
        while elapsed < LEVEL_TIMEOUT_MS {
            let state = game.state();
            match state.complete.phase {
                CompletePhase::Transition | CompletePhase::ShowButton => return Outcome::Finished,
                _ => {}
            }
            if state.level2.player_dead {
                log::warn!("{}", state.level2.death_reason);
                return Outcome::Died;
            }

            let input = match plan(state, game.world()) {
                Plan::Wait => InputState::default(),
                Plan::Walk(x) => walk_toward(state, x),
                Plan::Enter(code) => {
                    game.command(Command::Interact);
                    game.command(Command::Input(format!("{:b}", code)));
                    log::info!("Entering {:b} ({})", code, code);
                    game.command(Command::Submit);
                    InputState::default()
                }
            };
            game.step(REFERENCE_FRAME_MS, &input);
            elapsed += REFERENCE_FRAME_MS;
        }
        Outcome::TimedOut
    }

    fn plan(state: &GameState, world: &WorldLayout) -> Plan {
        if !state.spawn.is_ready() || state.complete.complete {
            return Plan::Wait;
        }
        let terminal_x = world.controller(state.level).terminal().center().x;
        let exit_x = world.controller(state.level).exit().center().x;

        let code = match state.level {
            Level::One if !state.level1.robot_disabled => Some(state.level1.target_number),
            Level::One => None,
            Level::Two => {
                let level2 = &state.level2;
                if level2.wire.active != WireTarget::None {
                    return Plan::Wait;
                }
                if !level2.combat_robot_disabled {
                    Some(level2.display_number1)
                } else if level2.barrier_active {
                    Some(level2.display_number2)
                } else {
                    None
                }
            }
        };

        match code {
            Some(code) if can_open_terminal(state, world) => Plan::Enter(code),
            Some(_) => Plan::Walk(terminal_x),
            None => Plan::Walk(exit_x),
        }
    }

    fn walk_toward(state: &GameState, x: f32) -> InputState {
        let center = state.player.center().x;
        InputState {
            left: center > x + 1.0,
            right: center < x - 1.0,
            jump: false,
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use binary_bots::{Game, Settings};

    env_logger::init();
    log::info!("Binary Bots (native) starting...");
    log::info!("Native mode runs the autopilot - build for wasm32 to play in a browser");

    let settings = Settings::load();
    let seed = settings.seed.unwrap_or_else(rand::random);
    let mut game = match Game::new(settings, seed) {
        Ok(game) => game,
        Err(e) => {
            log::error!("Cannot start: {}", e);
            std::process::exit(1);
        }
    };

    let outcome = autopilot::play(&mut game);
    let state = game.state();
    log::info!(
        "Autopilot finished on level {} with {:?} (goal: {})",
        state.level.number(),
        outcome,
        state.current_goal
    );
    if outcome != autopilot::Outcome::Finished {
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is binary_bots::wasm::wasm_main, this is just to satisfy the compiler
}
