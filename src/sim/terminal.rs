//! Terminal puzzle: binary input, per-level answer checks, modal open/close
//!
//! These are discrete transitions driven by UI events, never by the frame
//! loop. Each takes the current state and returns the next one.

use super::geom::distance;
use super::state::{GameState, Level, MessageKind, TerminalTarget, WireTarget, enter_phase};
use super::text;
use super::world::WorldLayout;
use crate::consts::*;

/// Parse a string of '0'/'1' digits as an unsigned binary number
///
/// Empty input, any other character, or a value too large for `u32` is
/// rejected with `None`.
pub fn parse_binary(input: &str) -> Option<u32> {
    if input.is_empty() || !input.bytes().all(|b| b == b'0' || b == b'1') {
        return None;
    }
    u32::from_str_radix(input, 2).ok()
}

/// Replace the terminal input, keeping only binary digits
pub fn set_terminal_input(prev: &GameState, raw: &str) -> GameState {
    let mut state = prev.clone();
    state.terminal.input = raw.chars().filter(|c| matches!(c, '0' | '1')).collect();
    state
}

/// True when the player stands close enough to the active level's terminal
pub fn is_near_terminal(state: &GameState, world: &WorldLayout) -> bool {
    let terminal = world.controller(state.level).terminal();
    distance(state.player.center(), terminal.center()) < INTERACTION_DISTANCE
}

/// What the terminal would address if opened now, or `None` if it stays shut
pub fn terminal_target_for(state: &GameState, world: &WorldLayout) -> Option<Option<TerminalTarget>> {
    if state.terminal.open || !state.spawn.is_ready() || !is_near_terminal(state, world) {
        return None;
    }
    match state.level {
        Level::One => (!state.level1.robot_disabled).then_some(None),
        Level::Two => {
            let level2 = &state.level2;
            if level2.player_dead {
                None
            } else if !level2.combat_robot_disabled {
                Some(Some(TerminalTarget::Robot))
            } else if level2.barrier_active {
                Some(Some(TerminalTarget::Barrier))
            } else {
                None
            }
        }
    }
}

pub fn can_open_terminal(state: &GameState, world: &WorldLayout) -> bool {
    terminal_target_for(state, world).is_some()
}

/// Open the terminal if the player is allowed to use it
pub fn open_terminal(prev: &GameState, world: &WorldLayout) -> GameState {
    let Some(target) = terminal_target_for(prev, world) else {
        return prev.clone();
    };
    let mut state = prev.clone();
    state.terminal.open = true;
    state.terminal.clear_message();
    if state.level == Level::Two {
        state.level2.terminal_target = target;
    }
    log::debug!("Terminal opened, target {:?}", target);
    state
}

/// Close the terminal and discard whatever was typed
pub fn close_terminal(prev: &GameState) -> GameState {
    let mut state = prev.clone();
    state.terminal.open = false;
    state.terminal.input.clear();
    state.terminal.clear_message();
    state
}

pub fn toggle_task_panel(prev: &GameState) -> GameState {
    let mut state = prev.clone();
    state.task_panel_expanded = !state.task_panel_expanded;
    state
}

/// Check the typed code against the current puzzle
pub fn submit_terminal(prev: &GameState) -> GameState {
    let input = prev.terminal.input.trim();
    if input.is_empty() {
        return prev.clone();
    }
    let entered = parse_binary(input);

    match prev.level {
        Level::One => submit_level1(prev, entered),
        Level::Two => match prev.level2.terminal_target {
            Some(target) => submit_level2(prev, target, entered),
            None => prev.clone(),
        },
    }
}

fn submit_level1(prev: &GameState, entered: Option<u32>) -> GameState {
    if entered != Some(prev.level1.target_number) {
        return reject(prev, text::TERMINAL_WRONG);
    }
    let mut state = close_terminal(prev);
    state.level1.robot_disabled = true;
    state.level1.robot.start();
    state.current_goal = text::GOAL_REACH_EXIT.to_string();
    log::info!("Guard robot disabled with code {}", prev.terminal.input);
    state
}

fn submit_level2(prev: &GameState, target: TerminalTarget, entered: Option<u32>) -> GameState {
    let robot_code = Some(prev.level2.display_number1);
    let barrier_code = Some(prev.level2.display_number2);

    match target {
        TerminalTarget::Robot if entered == robot_code => start_wire(prev, WireTarget::Robot),
        // The barrier's code is accepted here too, dropping the shield early
        TerminalTarget::Robot if entered == barrier_code => start_wire(prev, WireTarget::Barrier),
        TerminalTarget::Barrier if entered == barrier_code => start_wire(prev, WireTarget::Barrier),
        TerminalTarget::Barrier if entered == robot_code => reject(prev, text::TERMINAL_ROBOT_CODE),
        _ => reject(prev, text::TERMINAL_INVALID_CODE),
    }
}

fn start_wire(prev: &GameState, target: WireTarget) -> GameState {
    let mut state = close_terminal(prev);
    let level2 = &mut state.level2;
    level2.terminal_target = None;
    if level2.wire.active != target {
        enter_phase(&mut level2.wire.active, target);
    }
    level2.wire.progress = 0.0;
    level2.wire.particles.clear();
    log::info!("Current sent down the {:?} wire", target);
    state
}

fn reject(prev: &GameState, message: &str) -> GameState {
    let mut state = prev.clone();
    state.terminal.message = message.to_string();
    state.terminal.message_kind = MessageKind::Error;
    state.terminal.message_timer = ERROR_MESSAGE_MS;
    log::debug!("Terminal rejected {:?}", prev.terminal.input);
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{RobotPhase, SpawnPhase};
    use crate::sim::tick::standing_at;
    use glam::Vec2;

    fn ready(level: Level) -> GameState {
        let mut state = GameState::new(level, 21);
        state.spawn.phase = SpawnPhase::Ready;
        state.spawn.progress = 1.0;
        state
    }

    fn typed(state: &GameState, input: &str) -> GameState {
        let mut state = state.clone();
        state.terminal.open = true;
        state.terminal.input = input.to_string();
        state
    }

    fn level2_with(target: TerminalTarget) -> GameState {
        let mut state = ready(Level::Two);
        state.level2.display_number1 = 9;
        state.level2.display_number2 = 17;
        state.level2.terminal_target = Some(target);
        state
    }

    #[test]
    fn test_parse_binary() {
        assert_eq!(parse_binary("0"), Some(0));
        assert_eq!(parse_binary("1101"), Some(13));
        assert_eq!(parse_binary("11111"), Some(31));
        assert_eq!(parse_binary("000101"), Some(5));
        assert_eq!(parse_binary(""), None);
        assert_eq!(parse_binary("102"), None);
        assert_eq!(parse_binary("+1"), None);
        assert_eq!(parse_binary(" 1"), None);
        assert_eq!(parse_binary(&"1".repeat(33)), None);
    }

    #[test]
    fn test_input_filtered_to_binary() {
        let state = set_terminal_input(&ready(Level::One), "1a0 2-1");
        assert_eq!(state.terminal.input, "101");
    }

    #[test]
    fn test_level1_correct_code() {
        let mut state = ready(Level::One);
        state.level1.target_number = 13;
        let next = submit_terminal(&typed(&state, "1101"));

        assert!(next.level1.robot_disabled);
        assert_eq!(next.level1.robot.phase, RobotPhase::Flashing);
        assert_eq!(next.level1.robot.flash_count, 0.0);
        assert!(next.level1.robot.flash_on);
        assert!(!next.terminal.open);
        assert!(next.terminal.input.is_empty());
        assert_eq!(next.current_goal, text::GOAL_REACH_EXIT);
        // Disabled, but still in the way until the collapse finishes
        assert!(next.level1.robot_collider_active);
    }

    #[test]
    fn test_level1_wrong_code() {
        let mut state = ready(Level::One);
        state.level1.target_number = 13;
        let before = typed(&state, "1100");
        let next = submit_terminal(&before);

        assert!(next.terminal.open);
        assert_eq!(next.terminal.message_kind, MessageKind::Error);
        assert_eq!(next.terminal.message, text::TERMINAL_WRONG);
        assert_eq!(next.terminal.message_timer, ERROR_MESSAGE_MS);
        assert!(!next.level1.robot_disabled);
        assert_eq!(next.level1.robot.phase, RobotPhase::None);
        assert_eq!(next.terminal.input, "1100");
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let state = typed(&ready(Level::One), "");
        assert_eq!(submit_terminal(&state), state);
    }

    #[test]
    fn test_level2_robot_code() {
        let next = submit_terminal(&typed(&level2_with(TerminalTarget::Robot), "1001"));
        assert_eq!(next.level2.wire.active, WireTarget::Robot);
        assert_eq!(next.level2.wire.progress, 0.0);
        assert!(next.level2.terminal_target.is_none());
        assert!(!next.terminal.open);
        // Nothing is disabled until the current arrives
        assert!(!next.level2.combat_robot_disabled);
    }

    #[test]
    fn test_level2_barrier_code_while_targeting_robot() {
        let next = submit_terminal(&typed(&level2_with(TerminalTarget::Robot), "10001"));
        assert_eq!(next.level2.wire.active, WireTarget::Barrier);
        assert!(!next.terminal.open);
        assert_eq!(next.terminal.message_kind, MessageKind::None);
    }

    #[test]
    fn test_level2_robot_code_while_targeting_barrier() {
        let mut state = level2_with(TerminalTarget::Barrier);
        state.level2.combat_robot_disabled = true;
        let next = submit_terminal(&typed(&state, "1001"));
        assert_eq!(next.level2.wire.active, WireTarget::None);
        assert!(next.terminal.open);
        assert_eq!(next.terminal.message, text::TERMINAL_ROBOT_CODE);

        let next = submit_terminal(&typed(&state, "10001"));
        assert_eq!(next.level2.wire.active, WireTarget::Barrier);
    }

    #[test]
    fn test_level2_invalid_code() {
        for target in [TerminalTarget::Robot, TerminalTarget::Barrier] {
            let next = submit_terminal(&typed(&level2_with(target), "111"));
            assert_eq!(next.terminal.message, text::TERMINAL_INVALID_CODE);
            assert_eq!(next.terminal.message_kind, MessageKind::Error);
            assert_eq!(next.level2.wire.active, WireTarget::None);
        }
    }

    #[test]
    fn test_level2_without_target_is_ignored() {
        let mut state = level2_with(TerminalTarget::Robot);
        state.level2.terminal_target = None;
        let state = typed(&state, "1001");
        assert_eq!(submit_terminal(&state), state);
    }

    #[test]
    fn test_open_requires_proximity_and_ready() {
        let world = WorldLayout::standard();
        let mut state = ready(Level::One);
        assert!(!can_open_terminal(&state, &world));
        assert_eq!(open_terminal(&state, &world), state);

        state.player.pos = standing_at(&world, world.level1.terminal.left());
        let opened = open_terminal(&state, &world);
        assert!(opened.terminal.open);

        state.spawn.phase = SpawnPhase::Materialize;
        assert!(!can_open_terminal(&state, &world));
    }

    #[test]
    fn test_level1_terminal_stays_shut_after_success() {
        let world = WorldLayout::standard();
        let mut state = ready(Level::One);
        state.player.pos = standing_at(&world, world.level1.terminal.left());
        state.level1.robot_disabled = true;
        assert!(!can_open_terminal(&state, &world));
    }

    #[test]
    fn test_level2_open_picks_target() {
        let world = WorldLayout::standard();
        let mut state = ready(Level::Two);
        state.player.pos = standing_at(&world, world.level2.terminal.left());

        let opened = open_terminal(&state, &world);
        assert_eq!(opened.level2.terminal_target, Some(TerminalTarget::Robot));

        state.level2.combat_robot_disabled = true;
        let opened = open_terminal(&state, &world);
        assert_eq!(opened.level2.terminal_target, Some(TerminalTarget::Barrier));

        state.level2.barrier_active = false;
        assert!(!can_open_terminal(&state, &world));

        state.level2.barrier_active = true;
        state.level2.player_dead = true;
        assert!(!can_open_terminal(&state, &world));
    }

    #[test]
    fn test_open_clears_message_and_close_clears_input() {
        let world = WorldLayout::standard();
        let mut state = ready(Level::One);
        state.player.pos = standing_at(&world, world.level1.terminal.left());
        state.terminal.message = text::TERMINAL_WRONG.to_string();
        state.terminal.message_kind = MessageKind::Error;

        let opened = open_terminal(&state, &world);
        assert!(opened.terminal.message.is_empty());
        assert_eq!(opened.terminal.message_kind, MessageKind::None);

        let closed = close_terminal(&set_terminal_input(&opened, "101"));
        assert!(!closed.terminal.open);
        assert!(closed.terminal.input.is_empty());
    }

    #[test]
    fn test_far_player_cannot_reach_terminal() {
        let world = WorldLayout::standard();
        let mut state = ready(Level::One);
        let terminal = world.level1.terminal.center();
        state.player.pos = Vec2::new(terminal.x + INTERACTION_DISTANCE, world.ground_y - PLAYER_HEIGHT);
        assert!(!is_near_terminal(&state, &world));
    }

    #[test]
    fn test_toggle_task_panel() {
        let state = ready(Level::One);
        let toggled = toggle_task_panel(&state);
        assert_eq!(toggled.task_panel_expanded, !state.task_panel_expanded);
        assert_eq!(toggle_task_panel(&toggled), state);
    }
}
