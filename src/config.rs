//! Configuration constants for the Whac-A-Mole console
//!
//! This module contains all the magic numbers and tuning values used
//! throughout the system, making them easy to find and modify.

// Game Tuning
/// Number of levels in a session
pub const LVLS: u8 = 8;

/// Lives at the start of a session
pub const LIVES: u8 = 5;

/// Fixed xorshift seed, reseeded on every session start
pub const RNG_SEED: u32 = 0xDEAD_BEEF;

/// Pop window per level index (ms). Canonical values, do not retune.
pub const POP_DURATIONS: [u16; LVLS as usize] = [1500, 1250, 1000, 750, 600, 500, 350, 275];

/// Pops per level index
pub const POPS_PER_LVL: [u8; LVLS as usize] = [10; LVLS as usize];

/// Inter-pop delay is `MIN + rng % SPAN`, i.e. 250..=1000 ms
pub const POP_DELAY_MIN_MS: u32 = 250;
pub const POP_DELAY_SPAN_MS: u32 = 751;

// Polling Cadence
/// Button poll interval while a mole is up
pub const POP_POLL_MS: u32 = 5;

/// Debounce poll interval and cap before a pop starts
pub const DEBOUNCE_POLL_MS: u32 = 10;
pub const DEBOUNCE_LIMIT_MS: u32 = 50;

/// Idle loader animation: each LED holds 50 slices of 10 ms
pub const IDLE_SLICE_MS: u32 = 10;
pub const IDLE_SLICES_PER_LED: u32 = 50;

// Animations & Feedback
/// Level intro: hold the level pattern, flash it, settle
pub const LEVEL_INTRO_HOLD_MS: u32 = 1000;
pub const LEVEL_INTRO_FLASHES: u8 = 3;
pub const LEVEL_INTRO_FLASH_MS: u32 = 500;
pub const LEVEL_INTRO_SETTLE_MS: u32 = 500;

/// Single all-LED blink after a miss or late pop
pub const MISS_FLASH_MS: u32 = 100;

/// Delay between the session-end event and its feedback animation
pub const SESSION_END_PAUSE_MS: u32 = 500;

pub const GAME_OVER_FLASHES: u8 = 3;
pub const GAME_OVER_FLASH_MS: u32 = 500;

pub const WIN_FLASHES: u8 = 100;
pub const WIN_FLASH_MS: u32 = 50;

/// Rest in Idle after a finished (non-reset) session
pub const SESSION_REST_MS: u32 = 2000;

// Communication
/// Channel capacities
pub const EVENT_QUEUE_LEN: usize = 32;
pub const CMD_QUEUE_LEN: usize = 8;

/// Offline event buffer capacity
pub const RING_CAPACITY: usize = 100;

/// Drop the link when no command byte arrives for this long
pub const AGENT_TIMEOUT_MS: u32 = 60_000;

/// Telemetry loop: per-event queue wait and idle sleep
pub const EVENT_RECV_TIMEOUT_MS: u64 = 10;
pub const TELEMETRY_IDLE_MS: u64 = 10;

// Hardware
/// I²C addresses of the port expander (input port = buttons, output = LEDs)
pub const BTN_ADDR: u8 = 0x68;
pub const LED_ADDR: u8 = 0x58;

/// On-board flash size, needed to read the factory unique id
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

// Pin Mapping Documentation
// Pin assignments for the RP2040
//
// Serial link to the host bridge (UART0):
// - PIN_0: TX (JSONL telemetry out)
// - PIN_1: RX (single-byte commands in)
//
// Port expander (I2C0, standard mode):
// - PIN_4: SDA
// - PIN_5: SCL
//
// The expander fans out to 8 active-low buttons (input port) and
// 8 LEDs (output port); logical-to-physical pin maps live in `pinmap`.
