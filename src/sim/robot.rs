//! Robot shutdown animation: flashing -> sparks -> collapse -> done
//!
//! Both robots run the same machine; only the spark burst and the collapse
//! depth differ.

use glam::Vec2;

use super::geom::Rect;
use super::rng::RandomSource;
use super::state::{RobotDisable, RobotPhase, Spark, enter_phase};
use crate::consts::*;
use crate::frame_factor;

/// Per-robot tuning of the shutdown animation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShutdownStyle {
    pub spark_count: usize,
    /// Horizontal spread of spark origins around the robot's center
    pub spark_spread: f32,
    /// Spark origins start this far below the robot's top...
    pub spark_top: f32,
    /// ...and extend this much further down
    pub spark_depth: f32,
    /// Full width of the horizontal velocity range (per reference frame)
    pub spark_vx: f32,
    /// Random part of the upward launch speed (per reference frame)
    pub spark_lift: f32,
    /// Sink speed in pixels per ms
    pub collapse_rate: f32,
    pub collapse_max: f32,
}

/// Level 1 guard robot
pub const GUARD_ROBOT: ShutdownStyle = ShutdownStyle {
    spark_count: 12,
    spark_spread: 40.0,
    spark_top: 20.0,
    spark_depth: 30.0,
    spark_vx: 8.0,
    spark_lift: 6.0,
    collapse_rate: 0.05,
    collapse_max: 15.0,
};

/// Level 2 combat robot
pub const COMBAT_ROBOT: ShutdownStyle = ShutdownStyle {
    spark_count: 15,
    spark_spread: 50.0,
    spark_top: 30.0,
    spark_depth: 40.0,
    spark_vx: 10.0,
    spark_lift: 8.0,
    collapse_rate: 0.04,
    collapse_max: 25.0,
};

/// Minimum upward speed of a fresh spark
const SPARK_MIN_LIFT: f32 = 2.0;

impl RobotDisable {
    /// Kick off the animation; a robot only ever shuts down once
    pub fn start(&mut self) {
        if self.phase != RobotPhase::None {
            return;
        }
        enter_phase(&mut self.phase, RobotPhase::Flashing);
        self.flash_count = 0.0;
        self.flash_on = true;
    }

    pub fn is_done(&self) -> bool {
        self.phase == RobotPhase::Done
    }

    /// Advance one tick. Returns true on the tick the robot finishes collapsing.
    pub fn advance(
        &mut self,
        style: &ShutdownStyle,
        body: Rect,
        elapsed_ms: f32,
        rng: &mut dyn RandomSource,
    ) -> bool {
        match self.phase {
            RobotPhase::Flashing => {
                self.flash_count += elapsed_ms / FLASH_INTERVAL_MS;
                self.flash_on = (self.flash_count.floor() as u32).is_multiple_of(2);
                if self.flash_count >= FLASH_TICKS {
                    enter_phase(&mut self.phase, RobotPhase::Sparks);
                    self.flash_on = false;
                    self.sparks = burst(style, body, rng);
                }
                false
            }
            RobotPhase::Sparks => {
                let f = frame_factor(elapsed_ms);
                for spark in self.sparks.iter_mut() {
                    spark.pos += spark.vel * f;
                    spark.vel.y += SPARK_GRAVITY * f;
                    spark.life -= elapsed_ms / SPARK_LIFETIME_MS;
                }
                self.sparks.retain(|s| s.life > 0.0);
                if self.sparks.is_empty() {
                    enter_phase(&mut self.phase, RobotPhase::Collapse);
                }
                false
            }
            RobotPhase::Collapse => {
                self.collapse_offset += elapsed_ms * style.collapse_rate;
                if self.collapse_offset >= style.collapse_max {
                    self.collapse_offset = style.collapse_max;
                    enter_phase(&mut self.phase, RobotPhase::Done);
                    return true;
                }
                false
            }
            RobotPhase::None | RobotPhase::Done => false,
        }
    }
}

fn burst(style: &ShutdownStyle, body: Rect, rng: &mut dyn RandomSource) -> Vec<Spark> {
    (0..style.spark_count)
        .map(|_| {
            let x = body.center().x + rng.centered() * style.spark_spread;
            let y = body.top() + style.spark_top + rng.unit() * style.spark_depth;
            let vx = rng.centered() * style.spark_vx;
            let vy = -rng.unit() * style.spark_lift - SPARK_MIN_LIFT;
            Spark {
                pos: Vec2::new(x, y),
                vel: Vec2::new(vx, vy),
                life: 1.0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::ScriptedRandom;

    fn body() -> Rect {
        Rect::new(550.0, 740.0, 60.0, 80.0)
    }

    fn run(anim: &mut RobotDisable, style: &ShutdownStyle, ms: f32, step: f32) -> bool {
        let mut rng = ScriptedRandom::new(vec![0.2, 0.7, 0.4, 0.9]);
        let mut finished = false;
        let mut t = 0.0;
        while t < ms {
            finished |= anim.advance(style, body(), step, &mut rng);
            t += step;
        }
        finished
    }

    #[test]
    fn test_flashing_to_sparks_after_six_flashes() {
        let mut anim = RobotDisable::default();
        anim.start();
        assert_eq!(anim.phase, RobotPhase::Flashing);
        assert!(anim.flash_on);

        run(&mut anim, &GUARD_ROBOT, 550.0, 50.0);
        assert_eq!(anim.phase, RobotPhase::Flashing);

        run(&mut anim, &GUARD_ROBOT, 50.0, 50.0);
        assert_eq!(anim.phase, RobotPhase::Sparks);
        assert_eq!(anim.sparks.len(), 12);
        assert!(!anim.flash_on);
    }

    #[test]
    fn test_combat_robot_bursts_fifteen_sparks() {
        let mut anim = RobotDisable::default();
        anim.start();
        run(&mut anim, &COMBAT_ROBOT, 600.0, 50.0);
        assert_eq!(anim.phase, RobotPhase::Sparks);
        assert_eq!(anim.sparks.len(), 15);
    }

    #[test]
    fn test_sparks_fly_up_and_stay_near_robot() {
        let mut anim = RobotDisable::default();
        anim.start();
        run(&mut anim, &GUARD_ROBOT, 600.0, 50.0);
        for spark in &anim.sparks {
            assert!(spark.vel.y <= -SPARK_MIN_LIFT);
            assert!((spark.pos.x - 580.0).abs() <= 20.0);
            assert!(spark.pos.y >= 760.0 && spark.pos.y <= 790.0);
            assert_eq!(spark.life, 1.0);
        }
    }

    #[test]
    fn test_full_sequence_reaches_done_once() {
        let mut anim = RobotDisable::default();
        anim.start();
        // 600 ms flashing, 500 ms sparks, 300 ms collapse, with slack
        let finished = run(&mut anim, &GUARD_ROBOT, 2000.0, 16.0);
        assert!(finished);
        assert!(anim.is_done());
        assert_eq!(anim.collapse_offset, GUARD_ROBOT.collapse_max);
        assert!(anim.sparks.is_empty());

        // Further ticks are inert
        assert!(!run(&mut anim, &GUARD_ROBOT, 100.0, 16.0));
        assert_eq!(anim.phase, RobotPhase::Done);
    }

    #[test]
    fn test_start_is_one_shot() {
        let mut anim = RobotDisable::default();
        anim.start();
        run(&mut anim, &GUARD_ROBOT, 700.0, 50.0);
        let phase = anim.phase;
        anim.start();
        assert_eq!(anim.phase, phase);
    }

    #[test]
    fn test_idle_robot_does_nothing() {
        let mut anim = RobotDisable::default();
        assert!(!run(&mut anim, &COMBAT_ROBOT, 1000.0, 50.0));
        assert_eq!(anim, RobotDisable::default());
    }
}
