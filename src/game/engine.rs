//! The Whac-A-Mole automaton: Idle loader, levels, pops, feedback

use crate::config::*;
use crate::error::Error;
use crate::events::{Command, GameEvent, Outcome};
use crate::pinmap;
use crate::utils::XorShift32;

use super::{Board, SessionOutcome};

/// Command intent observed at cooperative checkpoints.
///
/// The dispatcher queues commands at interrupt pace; the game drains
/// them here and latches them as pending flags, acting on them only at
/// well-defined points in its control flow.
struct Pending {
    /// 0-based level requested by the last SetLevel
    level_idx: u8,
    level_change: bool,
    reset: bool,
    start: bool,
}

impl Pending {
    const fn new() -> Self {
        Self {
            level_idx: 0,
            level_change: false,
            reset: false,
            start: false,
        }
    }

    /// Pull every queued command and fold it into the pending flags.
    /// A reset wipes the other intents.
    fn drain<B: Board>(&mut self, board: &mut B) {
        while let Some(cmd) = board.poll_command() {
            match cmd {
                Command::Reset => {
                    self.reset = true;
                    self.level_change = false;
                    self.start = false;
                }
                Command::Start => self.start = true,
                Command::SetLevel(n) => {
                    self.level_idx = n.clamp(1, LVLS) - 1;
                    self.level_change = true;
                }
            }
        }
    }

    fn take_reset(&mut self) -> bool {
        let was = self.reset;
        self.reset = false;
        was
    }

    fn take_start(&mut self) -> bool {
        let was = self.start;
        self.start = false;
        was
    }
}

/// What a checkpoint decided
enum Checkpoint {
    Continue,
    Abort,
    Switch(u8),
}

/// Why a level returned early
enum LevelExit {
    Complete,
    Aborted,
    Dead,
    Switch(u8),
}

pub struct Game<B: Board> {
    board: B,
    lives: u8,
    rng: XorShift32,
    pending: Pending,
}

impl<B: Board> Game<B> {
    pub fn new(board: B) -> Self {
        Self {
            board,
            lives: LIVES,
            rng: XorShift32::new(RNG_SEED),
            pending: Pending::new(),
        }
    }

    /// Idle state: sweep a single-LED loader across the panel until a
    /// start condition fires.
    ///
    /// Exit conditions per slice, in priority order: a pending reset is
    /// consumed and the loader keeps running; a pending start enters a
    /// session; any physical button press enters a session. I²C errors
    /// in Idle propagate to the caller.
    pub async fn await_start(&mut self) -> Result<(), Error> {
        loop {
            let mut pattern = pinmap::LEDS_OFF;
            for led in 0..pinmap::LED_COUNT {
                pinmap::led_on(led, &mut pattern);
                self.board.write_leds(pattern).await?;

                for _ in 0..IDLE_SLICES_PER_LED {
                    self.board.delay_ms(IDLE_SLICE_MS).await;
                    self.pending.drain(&mut self.board);
                    if self.pending.take_reset() {
                        continue;
                    }
                    if self.pending.take_start() {
                        self.board.write_leds(pinmap::LEDS_OFF).await?;
                        return Ok(());
                    }
                    let raw = self.board.read_buttons().await?;
                    if pinmap::any_pressed(raw) {
                        self.board.write_leds(pinmap::LEDS_OFF).await?;
                        return Ok(());
                    }
                }

                pinmap::led_off(led, &mut pattern);
            }
            self.board.write_leds(pattern).await?;
        }
    }

    /// Run one session: levels until the eighth completes, lives run
    /// out, or a reset aborts. Ends with the inter-session rest unless
    /// the session was reset.
    pub async fn run_session(&mut self) -> SessionOutcome {
        self.lives = LIVES;
        self.rng = XorShift32::new(RNG_SEED);
        self.pending.drain(&mut self.board);

        // Session starts on whatever level was last requested
        let mut lvl_idx = self.pending.level_idx.min(LVLS - 1);
        self.pending.level_change = false;
        self.pending.start = false;
        self.pending.reset = false;

        self.board.emit(GameEvent::SessionStart);

        let outcome = loop {
            match self.run_level(lvl_idx).await {
                LevelExit::Aborted => {
                    self.board.emit(GameEvent::SessionEnd { won: false });
                    break SessionOutcome::Reset;
                }
                LevelExit::Dead => {
                    self.board.emit(GameEvent::SessionEnd { won: false });
                    self.board.delay_ms(SESSION_END_PAUSE_MS).await;
                    self.flash(0xFF, GAME_OVER_FLASHES, GAME_OVER_FLASH_MS).await;
                    break SessionOutcome::Lost;
                }
                LevelExit::Switch(next) => lvl_idx = next,
                LevelExit::Complete => match self.checkpoint(lvl_idx) {
                    Checkpoint::Abort => {
                        self.board.emit(GameEvent::SessionEnd { won: false });
                        break SessionOutcome::Reset;
                    }
                    Checkpoint::Switch(next) => lvl_idx = next,
                    Checkpoint::Continue => {
                        lvl_idx += 1;
                        if lvl_idx == LVLS {
                            self.board.emit(GameEvent::SessionEnd { won: true });
                            self.board.delay_ms(SESSION_END_PAUSE_MS).await;
                            self.flash(0xFF, WIN_FLASHES, WIN_FLASH_MS).await;
                            break SessionOutcome::Won;
                        }
                    }
                },
            }
        };

        if outcome != SessionOutcome::Reset {
            self.board.delay_ms(SESSION_REST_MS).await;
        }
        outcome
    }

    async fn run_level(&mut self, lvl_idx: u8) -> LevelExit {
        self.level_intro(lvl_idx).await;

        let pops = POPS_PER_LVL[lvl_idx as usize];
        for pop in 1..=pops {
            match self.checkpoint(lvl_idx) {
                Checkpoint::Abort => return LevelExit::Aborted,
                Checkpoint::Switch(next) => return LevelExit::Switch(next),
                Checkpoint::Continue => {}
            }

            let wait = POP_DELAY_MIN_MS + self.rng.next() % POP_DELAY_SPAN_MS;
            self.board.delay_ms(wait).await;

            match self.checkpoint(lvl_idx) {
                Checkpoint::Abort => return LevelExit::Aborted,
                Checkpoint::Switch(next) => return LevelExit::Switch(next),
                Checkpoint::Continue => {}
            }

            let (mole, outcome, reaction_ms) = self.pop(lvl_idx).await;
            if outcome != Outcome::Hit {
                self.lives -= 1;
            }
            self.board.emit(GameEvent::PopResult {
                mole,
                outcome,
                reaction_ms,
                lives: self.lives,
                level: lvl_idx + 1,
                pop,
                pops_total: pops,
            });
            if outcome != Outcome::Hit {
                self.flash(0xFF, 1, MISS_FLASH_MS).await;
                if self.lives == 0 {
                    return LevelExit::Dead;
                }
            }

            match self.checkpoint(lvl_idx) {
                Checkpoint::Abort => return LevelExit::Aborted,
                Checkpoint::Switch(next) => return LevelExit::Switch(next),
                Checkpoint::Continue => {}
            }
        }

        self.board.emit(GameEvent::LevelComplete { level: lvl_idx + 1 });
        LevelExit::Complete
    }

    /// One mole appearance: debounce, light the target, poll for a
    /// press, classify.
    async fn pop(&mut self, lvl_idx: u8) -> (u8, Outcome, u16) {
        let duration_ms = POP_DURATIONS[lvl_idx as usize];
        let target = (self.rng.next() % pinmap::LED_COUNT as u32) as u8;

        // Wait out a held button from the previous pop, bounded
        let mut waited = 0;
        loop {
            let raw = self.read_buttons_or_released().await;
            if !pinmap::any_pressed(raw) || waited >= DEBOUNCE_LIMIT_MS {
                break;
            }
            self.board.delay_ms(DEBOUNCE_POLL_MS).await;
            waited += DEBOUNCE_POLL_MS;
        }

        let mut pattern = pinmap::LEDS_OFF;
        pinmap::led_on(target, &mut pattern);
        let _ = self.board.write_leds(pattern).await;

        // Elapsed time is counted in poll slices, not wall clock, so a
        // suspended interval never inflates the reaction time
        let mut elapsed: u16 = 0;
        let (outcome, reaction_ms) = loop {
            if elapsed >= duration_ms {
                break (Outcome::Late, duration_ms);
            }
            let raw = self.read_buttons_or_released().await;
            if pinmap::any_pressed(raw) {
                let outcome = if pinmap::is_pressed(target, raw) {
                    Outcome::Hit
                } else {
                    Outcome::Miss
                };
                break (outcome, elapsed);
            }
            self.board.delay_ms(POP_POLL_MS).await;
            elapsed += POP_POLL_MS as u16;
        };

        let _ = self.board.write_leds(pinmap::LEDS_OFF).await;
        (target, outcome, reaction_ms)
    }

    /// Light `level + 1` LEDs, hold, flash them, settle
    async fn level_intro(&mut self, lvl_idx: u8) {
        let pattern = pinmap::leds_up_to(lvl_idx + 1);
        let _ = self.board.write_leds(pattern).await;
        self.board.delay_ms(LEVEL_INTRO_HOLD_MS).await;
        self.flash(pattern, LEVEL_INTRO_FLASHES, LEVEL_INTRO_FLASH_MS).await;
        self.board.delay_ms(LEVEL_INTRO_SETTLE_MS).await;
    }

    async fn flash(&mut self, pattern: u8, times: u8, ms: u32) {
        for _ in 0..times {
            let _ = self.board.write_leds(pattern).await;
            self.board.delay_ms(ms).await;
            let _ = self.board.write_leds(pinmap::LEDS_OFF).await;
            self.board.delay_ms(ms).await;
        }
    }

    /// Cooperative checkpoint: observe queued commands and decide
    /// whether to keep going, abort the session, or switch level.
    fn checkpoint(&mut self, lvl_idx: u8) -> Checkpoint {
        self.pending.drain(&mut self.board);
        if self.pending.take_reset() {
            return Checkpoint::Abort;
        }
        if self.pending.level_change {
            self.pending.level_change = false;
            if self.pending.level_idx != lvl_idx {
                return Checkpoint::Switch(self.pending.level_idx);
            }
        }
        // A start request mid-session is meaningless
        self.pending.start = false;
        Checkpoint::Continue
    }

    /// Runtime read failures are treated as "nothing pressed"; a pop
    /// with a dead bus therefore ends Late rather than wedging the game
    async fn read_buttons_or_released(&mut self) -> u8 {
        self.board
            .read_buttons()
            .await
            .unwrap_or(pinmap::BTNS_RELEASED)
    }

    #[cfg(test)]
    pub(super) fn into_board(self) -> B {
        self.board
    }
}
