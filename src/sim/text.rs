//! Player-facing strings written into the state (goal line, narrator, terminal)

pub const GOAL_LEVEL1_START: &str = "Disable the robot using the terminal";
pub const GOAL_REACH_EXIT: &str = "Reach the exit";
pub const GOAL_LEVEL2_START: &str = "Disable the combat robot";
pub const GOAL_DISABLE_BARRIER: &str = "Now disable the barrier (blue wire)";
pub const GOAL_LEVEL2_EXIT: &str = "Reach the exit!";

pub const NARRATOR_INTRO: &str = "WARNING! The combat robot has detected a threat! I switched on a \
     protective barrier, but it will not hold for long. Look at the displays: the numbers and \
     the wire colours tell you what to do!";
pub const NARRATOR_ROBOT_DOWN: &str =
    "Great! The robot is offline. Now disable the barrier before it fades away!";
pub const NARRATOR_PATH_CLEAR: &str = "Barrier deactivated. The way is clear!";

pub const TERMINAL_WRONG: &str = "Wrong, try again";
pub const TERMINAL_INVALID_CODE: &str = "Invalid code! Check the numbers on the displays.";
pub const TERMINAL_ROBOT_CODE: &str = "That is the robot's code, not the barrier's!";

pub const DEATH_BULLET: &str = "You were hit by the combat robot's bullet!";
