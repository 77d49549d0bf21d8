//! Host-link state: connectivity flags and the offline event buffer
//!
//! The command dispatcher and the telemetry task share three word-sized
//! flags. All accesses are relaxed loads and stores; the only race that
//! can occur is a one-tick-stale read of `last_command_tick`, which the
//! 60 s timeout tolerates.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering::Relaxed};

use crate::config::{AGENT_TIMEOUT_MS, RING_CAPACITY};
use crate::events::GameEvent;
use crate::ring_buffer::RingBuffer;

/// Flags written by the command dispatcher and read by telemetry
pub struct ConnectionFlags {
    connected: AtomicBool,
    identify_requested: AtomicBool,
    /// Millisecond tick of the last received command byte
    last_command_tick: AtomicU32,
}

impl ConnectionFlags {
    pub const fn new() -> Self {
        Self {
            connected: AtomicBool::new(false),
            identify_requested: AtomicBool::new(false),
            last_command_tick: AtomicU32::new(0),
        }
    }

    /// A command byte arrived; restart the connectivity window
    pub fn refresh(&self, now_ms: u32) {
        self.last_command_tick.store(now_ms, Relaxed);
    }

    /// Host sent `D`: force offline buffering
    pub fn mark_disconnected(&self) {
        self.connected.store(false, Relaxed);
    }

    /// Host sent `I`: ask telemetry to run the handshake
    pub fn request_identify(&self) {
        self.identify_requested.store(true, Relaxed);
    }

    /// Consume a pending identify request
    pub fn take_identify(&self) -> bool {
        if self.identify_requested.load(Relaxed) {
            self.identify_requested.store(false, Relaxed);
            return true;
        }
        false
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Relaxed)
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Relaxed);
    }

    pub fn last_tick(&self) -> u32 {
        self.last_command_tick.load(Relaxed)
    }

    /// Has the link been silent for longer than the agent timeout?
    ///
    /// Wrapping arithmetic keeps this correct across the 49-day tick
    /// rollover.
    pub fn timed_out(&self, now_ms: u32) -> bool {
        self.is_connected() && now_ms.wrapping_sub(self.last_tick()) > AGENT_TIMEOUT_MS
    }
}

impl Default for ConnectionFlags {
    fn default() -> Self {
        Self::new()
    }
}

/// Where an event should go this iteration
#[derive(Debug, PartialEq, Eq)]
pub enum Route {
    /// Link is up: send the frame now
    Transmit(GameEvent),
    /// Link is down: the event went into the ring. `evicted` reports
    /// whether the oldest buffered event was discarded to make room.
    Buffered { evicted: bool },
}

/// Offline-tolerance layer owned by the telemetry task.
///
/// While the host relay is reachable every event is transmitted
/// immediately; while it is not, events accumulate in the ring and are
/// replayed in FIFO order on the next identify handshake. Events are
/// never silently dropped here; only ring overflow discards, oldest
/// first, which is the policy the host expects.
pub struct AgentLink {
    ring: RingBuffer<GameEvent, RING_CAPACITY>,
}

impl AgentLink {
    pub fn new() -> Self {
        Self {
            ring: RingBuffer::new(),
        }
    }

    /// Step 1 of the telemetry loop: drop the link after prolonged
    /// silence. Returns `true` when the link was dropped this call.
    pub fn check_timeout(&mut self, flags: &ConnectionFlags, now_ms: u32) -> bool {
        if flags.timed_out(now_ms) {
            flags.set_connected(false);
            return true;
        }
        false
    }

    /// Identify handshake: mark the link up and restart its window.
    /// The caller sends the identify frame first, then drains
    /// [`pop_buffered`](Self::pop_buffered) until empty.
    pub fn begin_identify(&mut self, flags: &ConnectionFlags, now_ms: u32) {
        flags.set_connected(true);
        flags.refresh(now_ms);
    }

    /// Route one dequeued event: transmit when connected, buffer when not
    pub fn route(&mut self, flags: &ConnectionFlags, event: GameEvent) -> Route {
        if flags.is_connected() {
            Route::Transmit(event)
        } else {
            let evicted = self.ring.push(event);
            Route::Buffered { evicted }
        }
    }

    /// Oldest buffered event, if any
    pub fn pop_buffered(&mut self) -> Option<GameEvent> {
        self.ring.pop()
    }

    /// Is there anything to replay on the next identify?
    pub fn has_backlog(&self) -> bool {
        !self.ring.is_empty()
    }

    pub fn buffered_len(&self) -> usize {
        self.ring.len()
    }
}

impl Default for AgentLink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Outcome;

    fn pop(n: u16) -> GameEvent {
        GameEvent::PopResult {
            mole: (n % 8) as u8,
            outcome: Outcome::Hit,
            reaction_ms: n,
            lives: 5,
            level: 1,
            pop: 1,
            pops_total: 10,
        }
    }

    #[test]
    fn events_buffer_while_offline_and_replay_in_order() {
        let flags = ConnectionFlags::new();
        let mut link = AgentLink::new();

        // S2: three events while disconnected, nothing transmitted
        assert!(!link.has_backlog());
        for n in 0..3 {
            assert_eq!(link.route(&flags, pop(n)), Route::Buffered { evicted: false });
        }
        assert_eq!(link.buffered_len(), 3);
        assert!(link.has_backlog());

        link.begin_identify(&flags, 1_000);
        assert!(flags.is_connected());
        let replayed: Vec<GameEvent> = core::iter::from_fn(|| link.pop_buffered()).collect();
        assert_eq!(replayed, [pop(0), pop(1), pop(2)]);
        assert!(!link.has_backlog());

        // Once connected, events pass straight through
        assert_eq!(link.route(&flags, pop(9)), Route::Transmit(pop(9)));
        assert_eq!(link.buffered_len(), 0);
    }

    #[test]
    fn overflow_keeps_the_last_hundred() {
        let flags = ConnectionFlags::new();
        let mut link = AgentLink::new();

        // S3: 150 events offline, only the newest 100 survive; each
        // push past capacity reports the eviction
        for n in 0..150 {
            let route = link.route(&flags, pop(n));
            let expected_eviction = usize::from(n) >= RING_CAPACITY;
            assert_eq!(
                route,
                Route::Buffered {
                    evicted: expected_eviction
                }
            );
        }
        assert_eq!(link.buffered_len(), RING_CAPACITY);

        link.begin_identify(&flags, 0);
        let replayed: Vec<GameEvent> = core::iter::from_fn(|| link.pop_buffered()).collect();
        assert_eq!(replayed.len(), RING_CAPACITY);
        assert_eq!(replayed.first(), Some(&pop(50)));
        assert_eq!(replayed.last(), Some(&pop(149)));
    }

    #[test]
    fn identify_is_idempotent() {
        let flags = ConnectionFlags::new();
        let mut link = AgentLink::new();

        link.begin_identify(&flags, 10);
        assert_eq!(link.pop_buffered(), None);
        link.begin_identify(&flags, 20);
        assert_eq!(link.pop_buffered(), None);
        assert!(flags.is_connected());
        assert_eq!(flags.last_tick(), 20);
    }

    #[test]
    fn identify_request_is_consumed_once() {
        let flags = ConnectionFlags::new();
        assert!(!flags.take_identify());
        flags.request_identify();
        assert!(flags.take_identify());
        assert!(!flags.take_identify());
    }

    #[test]
    fn silence_past_the_timeout_drops_the_link() {
        let flags = ConnectionFlags::new();
        let mut link = AgentLink::new();
        flags.set_connected(true);
        flags.refresh(1_000);

        // Exactly at the boundary the link survives
        assert!(!link.check_timeout(&flags, 1_000 + AGENT_TIMEOUT_MS));
        assert!(flags.is_connected());

        // One past it the link drops and events start buffering
        assert!(link.check_timeout(&flags, 1_001 + AGENT_TIMEOUT_MS));
        assert!(!flags.is_connected());
        assert_eq!(link.route(&flags, pop(0)), Route::Buffered { evicted: false });
    }

    #[test]
    fn timeout_survives_tick_rollover() {
        let flags = ConnectionFlags::new();
        flags.set_connected(true);
        flags.refresh(u32::MAX - 5_000);

        // 6 s of wall time spanning the wrap: still inside the window
        assert!(!flags.timed_out(1_000));
        // 61 s spanning the wrap: timed out
        assert!(flags.timed_out(AGENT_TIMEOUT_MS.wrapping_add(u32::MAX - 5_000).wrapping_add(1)));
    }

    #[test]
    fn disconnect_hint_forces_buffering() {
        let flags = ConnectionFlags::new();
        let mut link = AgentLink::new();
        flags.set_connected(true);
        assert_eq!(link.route(&flags, pop(1)), Route::Transmit(pop(1)));

        flags.mark_disconnected();
        assert_eq!(link.route(&flags, pop(2)), Route::Buffered { evicted: false });
        assert_eq!(link.buffered_len(), 1);
    }
}
