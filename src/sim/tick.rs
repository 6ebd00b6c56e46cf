//! Variable timestep simulation tick
//!
//! Core game loop that advances the state by one frame's elapsed time. The
//! caller clamps the delta (see [`crate::clamp_frame_delta`]); this module
//! never reads a clock.

use serde::{Deserialize, Serialize};

use super::levels::LevelController;
use super::rng::RandomSource;
use super::state::{CompletePhase, GameState, Level, SpawnPhase, enter_phase};
use super::world::WorldLayout;
use crate::consts::*;
use crate::frame_factor;

/// Held movement keys for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

/// Advance the game by `elapsed_ms`, drawing randomness from the state's own RNG
pub fn advance(prev: &GameState, input: &InputState, elapsed_ms: f32, world: &WorldLayout) -> GameState {
    let mut rng = prev.rng.clone();
    let mut next = advance_with(prev, input, elapsed_ms, world, &mut rng);
    next.rng = rng;
    next
}

/// Advance the game by `elapsed_ms` with an injected random source
pub fn advance_with(
    prev: &GameState,
    input: &InputState,
    elapsed_ms: f32,
    world: &WorldLayout,
    rng: &mut dyn RandomSource,
) -> GameState {
    // The terminal is modal, and a zero-length step advances nothing
    if prev.terminal.open || elapsed_ms.is_nan() || elapsed_ms <= 0.0 {
        return prev.clone();
    }

    let mut state = prev.clone();
    let controller = world.controller(state.level);

    advance_spawn(&mut state, elapsed_ms);
    advance_message_timers(&mut state, elapsed_ms);
    controller.advance_per_tick(&mut state, elapsed_ms, rng);
    advance_level_complete(&mut state, elapsed_ms);

    if state.is_frozen() || !state.spawn.is_ready() {
        return state;
    }

    integrate_player(&mut state, input, elapsed_ms, world, controller);
    state
}

fn advance_spawn(state: &mut GameState, elapsed_ms: f32) {
    let spawn = &mut state.spawn;
    match spawn.phase {
        SpawnPhase::Beam => {
            spawn.progress += elapsed_ms / SPAWN_BEAM_MS;
            let f = frame_factor(elapsed_ms);
            for p in spawn.particles.iter_mut() {
                // Drift with half velocity while rising one pixel per frame
                p.pos.x += p.vel.x * 0.5 * f;
                p.pos.y += (p.vel.y * 0.5 - 1.0) * f;
                p.life -= elapsed_ms / SPAWN_PARTICLE_LIFETIME_MS;
            }
            spawn.particles.retain(|p| p.life > 0.0);

            if spawn.progress >= 1.0 {
                enter_phase(&mut spawn.phase, SpawnPhase::Materialize);
                spawn.progress = 0.0;
            }
        }
        SpawnPhase::Materialize => {
            spawn.progress += elapsed_ms / SPAWN_MATERIALIZE_MS;
            if spawn.progress >= 1.0 {
                enter_phase(&mut spawn.phase, SpawnPhase::Ready);
                spawn.progress = 1.0;
            }
        }
        SpawnPhase::Ready => {}
    }
}

fn advance_message_timers(state: &mut GameState, elapsed_ms: f32) {
    let terminal = &mut state.terminal;
    if terminal.message_timer > 0.0 {
        terminal.message_timer -= elapsed_ms;
        if terminal.message_timer <= 0.0 {
            terminal.message_timer = 0.0;
            terminal.clear_message();
        }
    }

    if let Some(narrator) = state.level2.narrator.as_mut() {
        narrator.timer_ms -= elapsed_ms;
        if narrator.timer_ms <= 0.0 {
            state.level2.narrator = None;
        }
    }
}

fn advance_level_complete(state: &mut GameState, elapsed_ms: f32) {
    let complete = &mut state.complete;
    match complete.phase {
        CompletePhase::FadeIn => {
            complete.opacity += elapsed_ms / COMPLETE_FADE_IN_MS;
            if complete.opacity >= 1.0 {
                complete.opacity = 1.0;
                enter_phase(&mut complete.phase, CompletePhase::Hold);
            }
        }
        CompletePhase::Hold => {
            complete.hold_ms += elapsed_ms;
            if complete.hold_ms >= COMPLETE_HOLD_MS {
                complete.hold_ms = 0.0;
                enter_phase(&mut complete.phase, CompletePhase::FadeOut);
            }
        }
        CompletePhase::FadeOut => {
            complete.opacity -= elapsed_ms / COMPLETE_FADE_OUT_MS;
            if complete.opacity <= 0.0 {
                complete.opacity = 0.0;
                let last = match state.level {
                    Level::One => CompletePhase::Transition,
                    Level::Two => CompletePhase::ShowButton,
                };
                enter_phase(&mut complete.phase, last);
            }
        }
        CompletePhase::None | CompletePhase::ShowButton | CompletePhase::Transition => {}
    }
}

fn integrate_player(
    state: &mut GameState,
    input: &InputState,
    elapsed_ms: f32,
    world: &WorldLayout,
    controller: &dyn LevelController,
) {
    let f = frame_factor(elapsed_ms);
    let player = &state.player;
    let prev = player.pos;
    let mut next = prev;
    let mut velocity_y = player.velocity_y;
    let mut facing_right = player.facing_right;
    let mut moving = false;

    // Right is applied last, so it wins facing when both are held
    if input.left {
        next.x -= PLAYER_SPEED * f;
        moving = true;
        facing_right = false;
    }
    if input.right {
        next.x += PLAYER_SPEED * f;
        moving = true;
        facing_right = true;
    }

    if input.jump && player.grounded {
        velocity_y = -JUMP_FORCE;
    }
    velocity_y += GRAVITY * f;
    next.y += velocity_y * f;

    let feet_floor = world.ground_y - PLAYER_HEIGHT;
    let grounded = next.y >= feet_floor;
    if grounded {
        next.y = feet_floor;
        velocity_y = 0.0;
    }
    next.x = next.x.clamp(0.0, world.canvas.x - PLAYER_WIDTH);

    let next = controller.resolve_colliders(state, prev, next);
    let reached_exit = controller.check_exit(state, next);

    let player = &mut state.player;
    player.animation_time += elapsed_ms;
    player.pos = next;
    player.velocity_y = velocity_y;
    player.grounded = grounded;
    player.moving = moving;
    player.facing_right = facing_right;

    if reached_exit {
        start_level_complete(state);
    }
}

fn start_level_complete(state: &mut GameState) {
    let complete = &mut state.complete;
    complete.complete = true;
    enter_phase(&mut complete.phase, CompletePhase::FadeIn);
    complete.opacity = 0.0;
    complete.hold_ms = 0.0;
    log::info!("Level {} complete", state.level.number());
}

/// Top-left position that puts the player's feet on the ground at `x`
#[cfg(test)]
pub(crate) fn standing_at(world: &WorldLayout, x: f32) -> glam::Vec2 {
    glam::Vec2::new(x, world.ground_y - PLAYER_HEIGHT)
}
