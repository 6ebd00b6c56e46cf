//! Level 2: combat robot, energy barrier and the generator wiring puzzle

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{LevelController, center_in_exit};
use crate::consts::*;
use crate::frame_factor;
use crate::sim::geom::Rect;
use crate::sim::rng::RandomSource;
use crate::sim::robot::COMBAT_ROBOT;
use crate::sim::state::{
    BarrierAnimPhase, Bullet, GameState, NarratorMessage, WireParticle, WireTarget, enter_phase,
};
use crate::sim::text;
use crate::sim::world::{WirePath, WorldLayout};

/// Level 2 layout and rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level2 {
    pub combat_robot: Rect,
    pub terminal: Rect,
    pub exit: Rect,
    pub generator: Rect,
    pub barrier_x: f32,
    /// Generator -> combat robot
    pub red_wire: WirePath,
    /// Generator -> barrier
    pub blue_wire: WirePath,
}

impl Level2 {
    pub fn wire(&self, target: WireTarget) -> Option<&WirePath> {
        match target {
            WireTarget::Robot => Some(&self.red_wire),
            WireTarget::Barrier => Some(&self.blue_wire),
            WireTarget::None => None,
        }
    }

    /// Where the robot's gun fires from (bullet top-left)
    pub fn muzzle(&self) -> Vec2 {
        Vec2::new(
            self.combat_robot.left() - BULLET_WIDTH,
            self.combat_robot.top() + COMBAT_ROBOT_HEIGHT / 2.0 - BULLET_HEIGHT / 2.0,
        )
    }

    fn advance_wire(&self, state: &mut GameState, elapsed_ms: f32, rng: &mut dyn RandomSource) {
        let target = state.level2.wire.active;
        let Some(path) = self.wire(target) else {
            return;
        };

        let wire = &mut state.level2.wire;
        wire.progress += elapsed_ms / WIRE_ANIMATION_MS;
        if rng.chance(WIRE_PARTICLE_CHANCE) {
            let progress = wire.progress - rng.unit() * WIRE_PARTICLE_LAG;
            wire.particles.push(WireParticle {
                progress,
                pos: path.point_at(progress),
                target,
            });
        }
        let head = wire.progress;
        wire.particles.retain(|p| p.progress < head + WIRE_PARTICLE_LAG);

        if wire.progress < 1.0 {
            return;
        }

        let level2 = &mut state.level2;
        match target {
            WireTarget::Robot => {
                level2.combat_robot_disabled = true;
                level2.combat_robot.start();
                state.current_goal = text::GOAL_DISABLE_BARRIER.to_string();
                level2.narrator = Some(NarratorMessage::new(text::NARRATOR_ROBOT_DOWN, ROBOT_DOWN_NARRATOR_MS));
                log::info!("Current reached the combat robot");
            }
            WireTarget::Barrier => {
                level2.barrier_active = false;
                if level2.barrier_anim == BarrierAnimPhase::None {
                    enter_phase(&mut level2.barrier_anim, BarrierAnimPhase::Disabling);
                }
                if level2.combat_robot_disabled {
                    state.current_goal = text::GOAL_LEVEL2_EXIT.to_string();
                    level2.narrator = Some(NarratorMessage::new(text::NARRATOR_PATH_CLEAR, PATH_CLEAR_NARRATOR_MS));
                    log::info!("Barrier down, exit reachable");
                } else {
                    log::info!("Barrier down while the combat robot is still armed");
                }
            }
            WireTarget::None => {}
        }

        let wire = &mut level2.wire;
        enter_phase(&mut wire.active, WireTarget::None);
        wire.progress = 0.0;
        wire.particles.clear();
    }

    fn advance_barrier_fade(&self, state: &mut GameState, elapsed_ms: f32) {
        let level2 = &mut state.level2;
        if level2.barrier_anim != BarrierAnimPhase::Disabling {
            return;
        }
        level2.barrier_anim_ms += elapsed_ms;
        if level2.barrier_anim_ms >= BARRIER_DISABLE_MS {
            level2.barrier_anim_ms = BARRIER_DISABLE_MS;
            enter_phase(&mut level2.barrier_anim, BarrierAnimPhase::Done);
        }
    }

    fn advance_shooting(&self, state: &mut GameState, elapsed_ms: f32) {
        let armed = !state.level2.combat_robot_disabled && state.spawn.is_ready() && !state.level2.player_dead;
        if !armed {
            return;
        }
        let level2 = &mut state.level2;
        level2.shoot_timer += elapsed_ms;
        if level2.shoot_timer >= SHOOT_INTERVAL_MS {
            level2.shoot_timer = 0.0;
            level2.bullets.push(Bullet {
                pos: self.muzzle(),
                vx: -BULLET_SPEED,
            });
        }
    }

    fn advance_bullets(&self, state: &mut GameState, elapsed_ms: f32) {
        let f = frame_factor(elapsed_ms);
        let player = WorldLayout::player_rect(state.player.pos);
        let level2 = &mut state.level2;

        for bullet in level2.bullets.iter_mut() {
            bullet.pos.x += bullet.vx * f;
        }
        level2.bullets.retain(|b| b.pos.x > -BULLET_WIDTH);

        if level2.barrier_active {
            // The barrier swallows everything that reaches it
            let barrier_x = self.barrier_x;
            level2.bullets.retain(|b| b.pos.x > barrier_x);
        } else if !level2.player_dead {
            let size = Vec2::new(BULLET_WIDTH, BULLET_HEIGHT);
            if level2.bullets.iter().any(|b| Rect::at(b.pos, size).overlaps(&player)) {
                level2.player_dead = true;
                level2.death_reason = text::DEATH_BULLET.to_string();
                log::info!("Player hit by a bullet");
            }
        }
    }

    fn advance_barrier_timer(&self, state: &mut GameState, elapsed_ms: f32) {
        let level2 = &mut state.level2;
        if !level2.barrier_active || level2.combat_robot_disabled {
            return;
        }
        level2.barrier_time_left -= elapsed_ms;
        if level2.barrier_time_left <= 0.0 {
            level2.barrier_time_left = 0.0;
            level2.barrier_active = false;
            log::info!("Barrier ran out of power");
        }
    }
}

impl LevelController for Level2 {
    fn advance_per_tick(&self, state: &mut GameState, elapsed_ms: f32, rng: &mut dyn RandomSource) {
        self.advance_wire(state, elapsed_ms, rng);
        state
            .level2
            .combat_robot
            .advance(&COMBAT_ROBOT, self.combat_robot, elapsed_ms, rng);
        self.advance_barrier_fade(state, elapsed_ms);
        self.advance_shooting(state, elapsed_ms);
        self.advance_bullets(state, elapsed_ms);
        self.advance_barrier_timer(state, elapsed_ms);
    }

    fn resolve_colliders(&self, state: &GameState, prev: Vec2, next: Vec2) -> Vec2 {
        if !state.level2.barrier_active {
            return next;
        }
        let near = self.barrier_x - BARRIER_NEAR_BUFFER;
        let far = self.barrier_x + BARRIER_FAR_BUFFER;
        if next.x + PLAYER_WIDTH > near && prev.x + PLAYER_WIDTH <= near {
            return Vec2::new(near - PLAYER_WIDTH, next.y);
        }
        if next.x < far && prev.x >= far {
            return Vec2::new(far, next.y);
        }
        next
    }

    fn check_exit(&self, state: &GameState, pos: Vec2) -> bool {
        state.level2.combat_robot_disabled && !state.level2.barrier_active && center_in_exit(&self.exit, pos)
    }

    fn terminal(&self) -> Rect {
        self.terminal
    }

    fn exit(&self) -> Rect {
        self.exit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::ScriptedRandom;
    use crate::sim::state::{Level, RobotPhase, SpawnPhase};

    fn setup() -> (WorldLayout, GameState) {
        let mut state = GameState::new(Level::Two, 11);
        state.spawn.phase = SpawnPhase::Ready;
        state.spawn.progress = 1.0;
        (WorldLayout::standard(), state)
    }

    fn tick(world: &WorldLayout, state: &mut GameState, ms: f32) {
        let mut rng = ScriptedRandom::new(vec![0.1, 0.6, 0.35, 0.8]);
        world.level2.advance_per_tick(state, ms, &mut rng);
    }

    #[test]
    fn test_shoots_every_interval() {
        let (world, mut state) = setup();
        for _ in 0..23 {
            tick(&world, &mut state, 50.0);
        }
        assert!(state.level2.bullets.is_empty());
        tick(&world, &mut state, 50.0);
        assert_eq!(state.level2.bullets.len(), 1);
        assert_eq!(state.level2.shoot_timer, 0.0);
        assert_eq!(state.level2.bullets[0].vx, -BULLET_SPEED);
    }

    #[test]
    fn test_no_shooting_at_dead_player() {
        let (world, mut state) = setup();
        state.level2.player_dead = true;
        for _ in 0..40 {
            tick(&world, &mut state, 50.0);
        }
        assert!(state.level2.bullets.is_empty());
        assert_eq!(state.level2.shoot_timer, 0.0);
    }

    #[test]
    fn test_no_shooting_during_intro() {
        let (world, mut state) = setup();
        state.spawn.phase = SpawnPhase::Beam;
        for _ in 0..100 {
            tick(&world, &mut state, 50.0);
        }
        assert!(state.level2.bullets.is_empty());
        assert_eq!(state.level2.shoot_timer, 0.0);
    }

    #[test]
    fn test_barrier_swallows_bullets_at_or_past_it() {
        let (world, mut state) = setup();
        state.level2.bullets = vec![
            Bullet { pos: Vec2::new(world.level2.barrier_x, 700.0), vx: 0.0 },
            Bullet { pos: Vec2::new(world.level2.barrier_x - 50.0, 700.0), vx: 0.0 },
            Bullet { pos: Vec2::new(world.level2.barrier_x + 1.0, 700.0), vx: 0.0 },
        ];
        tick(&world, &mut state, 16.0);
        assert_eq!(state.level2.bullets.len(), 1);
        assert_eq!(state.level2.bullets[0].pos.x, world.level2.barrier_x + 1.0);
    }

    #[test]
    fn test_bullet_kills_without_barrier() {
        let (world, mut state) = setup();
        state.level2.barrier_active = false;
        let player = state.player.pos;
        state.level2.bullets.push(Bullet {
            pos: Vec2::new(player.x + 10.0, player.y + 10.0),
            vx: 0.0,
        });
        tick(&world, &mut state, 16.0);
        assert!(state.level2.player_dead);
        assert_eq!(state.level2.death_reason, text::DEATH_BULLET);
    }

    #[test]
    fn test_fired_bullets_keep_flying_after_robot_disabled() {
        let (world, mut state) = setup();
        state.level2.barrier_active = false;
        state.level2.combat_robot_disabled = true;
        state.level2.bullets.push(Bullet { pos: Vec2::new(450.0, 700.0), vx: -BULLET_SPEED });
        tick(&world, &mut state, REFERENCE_FRAME_MS);
        assert_eq!(state.level2.bullets[0].pos.x, 446.0);
        assert_eq!(state.level2.shoot_timer, 0.0);
    }

    #[test]
    fn test_barrier_countdown_clamps() {
        let (world, mut state) = setup();
        for _ in 0..299 {
            tick(&world, &mut state, 50.0);
        }
        assert!(state.level2.barrier_active);
        assert_eq!(state.level2.barrier_time_left, 50.0);
        tick(&world, &mut state, 50.0);
        assert!(!state.level2.barrier_active);
        assert_eq!(state.level2.barrier_time_left, 0.0);
        tick(&world, &mut state, 50.0);
        assert_eq!(state.level2.barrier_time_left, 0.0);
    }

    #[test]
    fn test_barrier_timer_pauses_once_robot_disabled() {
        let (world, mut state) = setup();
        state.level2.combat_robot_disabled = true;
        for _ in 0..10 {
            tick(&world, &mut state, 50.0);
        }
        assert_eq!(state.level2.barrier_time_left, BARRIER_MAX_TIME_MS);
    }

    #[test]
    fn test_robot_wire_disables_robot() {
        let (world, mut state) = setup();
        state.level2.wire.active = WireTarget::Robot;
        // 62.5 ms steps keep the progress sum exact
        for _ in 0..15 {
            tick(&world, &mut state, 62.5);
        }
        assert!(!state.level2.combat_robot_disabled);
        assert!(state.level2.wire.progress > 0.9);
        for p in &state.level2.wire.particles {
            assert_eq!(p.target, WireTarget::Robot);
            assert!(p.progress < state.level2.wire.progress + WIRE_PARTICLE_LAG);
        }

        tick(&world, &mut state, 62.5);
        assert!(state.level2.combat_robot_disabled);
        assert_eq!(state.level2.combat_robot.phase, RobotPhase::Flashing);
        assert_eq!(state.current_goal, text::GOAL_DISABLE_BARRIER);
        assert!(state.level2.narrator.is_some());
        assert_eq!(state.level2.wire.active, WireTarget::None);
        assert_eq!(state.level2.wire.progress, 0.0);
        assert!(state.level2.wire.particles.is_empty());
    }

    #[test]
    fn test_barrier_wire_before_robot_leaves_player_exposed() {
        let (world, mut state) = setup();
        state.level2.narrator = None;
        state.level2.wire.active = WireTarget::Barrier;
        for _ in 0..16 {
            tick(&world, &mut state, 62.5);
        }
        assert!(!state.level2.barrier_active);
        assert_eq!(state.level2.barrier_anim, BarrierAnimPhase::Disabling);
        assert_eq!(state.current_goal, text::GOAL_LEVEL2_START);
        assert!(state.level2.narrator.is_none());

        for _ in 0..10 {
            tick(&world, &mut state, 62.5);
        }
        assert_eq!(state.level2.barrier_anim, BarrierAnimPhase::Done);
    }

    #[test]
    fn test_barrier_wire_after_robot_opens_path() {
        let (world, mut state) = setup();
        state.level2.combat_robot_disabled = true;
        state.level2.wire.active = WireTarget::Barrier;
        for _ in 0..16 {
            tick(&world, &mut state, 62.5);
        }
        assert!(!state.level2.barrier_active);
        assert_eq!(state.current_goal, text::GOAL_LEVEL2_EXIT);
        let narrator = state.level2.narrator.as_ref().unwrap();
        assert_eq!(narrator.text, text::NARRATOR_PATH_CLEAR);
    }

    #[test]
    fn test_barrier_blocks_both_directions() {
        let (world, state) = setup();
        let y = world.ground_y - PLAYER_HEIGHT;
        let near = world.level2.barrier_x - BARRIER_NEAR_BUFFER;
        let far = world.level2.barrier_x + BARRIER_FAR_BUFFER;

        let from_left = world.level2.resolve_colliders(
            &state,
            Vec2::new(near - PLAYER_WIDTH, y),
            Vec2::new(near - PLAYER_WIDTH + 1.0, y),
        );
        assert_eq!(from_left.x, near - PLAYER_WIDTH);

        let from_right =
            world.level2.resolve_colliders(&state, Vec2::new(far, y), Vec2::new(far - 1.0, y));
        assert_eq!(from_right.x, far);

        let mut open = state.clone();
        open.level2.barrier_active = false;
        let next = Vec2::new(near - PLAYER_WIDTH + 1.0, y);
        assert_eq!(world.level2.resolve_colliders(&open, Vec2::new(near - PLAYER_WIDTH, y), next), next);
    }

    #[test]
    fn test_exit_needs_robot_and_barrier_down() {
        let (world, mut state) = setup();
        let at_door = Vec2::new(world.level2.exit.left() + 10.0, world.ground_y - PLAYER_HEIGHT);
        assert!(!world.level2.check_exit(&state, at_door));
        state.level2.combat_robot_disabled = true;
        assert!(!world.level2.check_exit(&state, at_door));
        state.level2.barrier_active = false;
        assert!(world.level2.check_exit(&state, at_door));
    }
}
