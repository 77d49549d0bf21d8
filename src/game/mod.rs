//! Game state machine and the board port it drives
//!
//! The automaton is written against the [`Board`] trait so the same
//! code runs on the expander hardware and, in tests, on a simulated
//! board with virtual time.

mod engine;


pub use engine::Game;

use defmt::Format;

use crate::error::Error;
use crate::events::{Command, GameEvent};

/// Everything the game task needs from the outside world.
///
/// `read_buttons` returns the raw active-low input-port byte;
/// `write_leds` takes the raw output-port byte. Command polling and
/// event emission are non-blocking: commands arrive at the game's own
/// pace and events are best-effort (a full queue drops the event
/// without disturbing gameplay).
#[allow(async_fn_in_trait)]
pub trait Board {
    async fn read_buttons(&mut self) -> Result<u8, Error>;
    async fn write_leds(&mut self, pattern: u8) -> Result<(), Error>;
    async fn delay_ms(&mut self, ms: u32);
    fn poll_command(&mut self) -> Option<Command>;
    fn emit(&mut self, event: GameEvent);
}

/// How a session ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Format)]
pub enum SessionOutcome {
    /// All levels cleared
    Won,
    /// Ran out of lives
    Lost,
    /// Aborted by a reset command; skip the inter-session rest
    Reset,
}
