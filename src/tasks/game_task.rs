//! Game task: the automaton bound to the expander board

use defmt::{info, warn};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Receiver, Sender};
use embassy_time::Timer;

use crate::config::{CMD_QUEUE_LEN, EVENT_QUEUE_LEN};
use crate::error::Error;
use crate::events::{Command, GameEvent};
use crate::game::{Board, Game};
use crate::hardware::IoExpander;

use super::pause_task::PauseGate;

/// Error backoff while the expander is unreachable in Idle
const IDLE_RETRY_MS: u64 = 500;

/// The real board behind the game automaton.
///
/// Every delay and I/O call first waits on the pause gate, so a pause
/// freezes the game wherever it happens to be without the automaton
/// knowing. Event emission is non-blocking and drops on a full queue;
/// command polling never blocks.
pub struct ExpanderBoard {
    io: IoExpander,
    commands: Receiver<'static, CriticalSectionRawMutex, Command, CMD_QUEUE_LEN>,
    events: Sender<'static, CriticalSectionRawMutex, GameEvent, EVENT_QUEUE_LEN>,
    gate: &'static PauseGate,
}

impl ExpanderBoard {
    pub fn new(
        io: IoExpander,
        commands: Receiver<'static, CriticalSectionRawMutex, Command, CMD_QUEUE_LEN>,
        events: Sender<'static, CriticalSectionRawMutex, GameEvent, EVENT_QUEUE_LEN>,
        gate: &'static PauseGate,
    ) -> Self {
        Self {
            io,
            commands,
            events,
            gate,
        }
    }
}

impl Board for ExpanderBoard {
    async fn read_buttons(&mut self) -> Result<u8, Error> {
        self.gate.ready().await;
        self.io.read_buttons().await
    }

    async fn write_leds(&mut self, pattern: u8) -> Result<(), Error> {
        self.gate.ready().await;
        self.io.write_leds(pattern).await
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.gate.ready().await;
        Timer::after_millis(ms as u64).await;
    }

    fn poll_command(&mut self) -> Option<Command> {
        self.commands.try_receive().ok()
    }

    fn emit(&mut self, event: GameEvent) {
        // Telemetry is best effort; gameplay never waits for it
        if self.events.try_send(event).is_err() {
            warn!("{}, dropped event {}", Error::QueueFull, event);
        }
    }
}

#[embassy_executor::task]
pub async fn game_task(board: ExpanderBoard) -> ! {
    info!("Game task started");

    let mut game = Game::new(board);
    loop {
        if let Err(e) = game.await_start().await {
            warn!("Idle I/O failed: {}, retrying", e);
            Timer::after_millis(IDLE_RETRY_MS).await;
            continue;
        }
        info!("Session starting");
        let outcome = game.run_session().await;
        info!("Session over: {}", outcome);
    }
}
