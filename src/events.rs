//! Event and command types shared between tasks

use defmt::Format;

/// Classification of a single pop
#[derive(Clone, Copy, Debug, PartialEq, Eq, Format)]
pub enum Outcome {
    /// Correct button pressed inside the window
    Hit,
    /// Wrong button pressed inside the window
    Miss,
    /// Window expired with no press
    Late,
}

impl Outcome {
    /// Wire spelling used in telemetry frames
    pub fn as_wire(&self) -> &'static str {
        match self {
            Outcome::Hit => "hit",
            Outcome::Miss => "miss",
            Outcome::Late => "late",
        }
    }
}

/// Events produced by the game task and consumed by telemetry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Format)]
pub enum GameEvent {
    SessionStart,
    PopResult {
        /// Logical mole index (0-7)
        mole: u8,
        outcome: Outcome,
        /// Multiple of the 5 ms poll interval; equals the pop window when late
        reaction_ms: u16,
        /// Lives remaining after this pop
        lives: u8,
        /// 1-based level
        level: u8,
        /// 1-based pop index within the level
        pop: u8,
        pops_total: u8,
    },
    LevelComplete {
        level: u8,
    },
    SessionEnd {
        won: bool,
    },
}

/// Commands routed from the serial link to the game task
#[derive(Clone, Copy, Debug, PartialEq, Eq, Format)]
pub enum Command {
    /// Jump to a level (1-8)
    SetLevel(u8),
    /// Abort the current session
    Reset,
    /// Start a session from Idle
    Start,
}
