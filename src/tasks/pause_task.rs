//! Pause controller: suspends and resumes the game at the host's whim
//!
//! The dispatcher signals this task on every `P` byte. It runs above
//! the game's priority, so the toggle lands before the game's next
//! slice. Suspension itself is a gate the game's board adapter awaits
//! in front of every delay and I/O call; while the gate is closed the
//! game cannot produce events, and its in-pop elapsed counter does not
//! advance.

use core::sync::atomic::{AtomicBool, Ordering::Relaxed};

use defmt::info;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Lock-free suspend/resume gate for the game task
pub struct PauseGate {
    paused: AtomicBool,
    resumed: Signal<CriticalSectionRawMutex, ()>,
}

impl PauseGate {
    pub const fn new() -> Self {
        Self {
            paused: AtomicBool::new(false),
            resumed: Signal::new(),
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Relaxed)
    }

    /// Block here while paused. The re-check loop covers a pause that
    /// lands between the signal and the wakeup.
    pub async fn ready(&self) {
        while self.paused.load(Relaxed) {
            self.resumed.wait().await;
        }
    }

    fn suspend(&self) {
        self.paused.store(true, Relaxed);
    }

    fn resume(&self) {
        self.paused.store(false, Relaxed);
        self.resumed.signal(());
    }
}

impl Default for PauseGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Waits for pause notifications and toggles the gate. Notifications
/// coalesce; one pending wake is enough.
#[embassy_executor::task]
pub async fn pause_task(
    gate: &'static PauseGate,
    notify: &'static Signal<CriticalSectionRawMutex, ()>,
) -> ! {
    info!("Pause controller started");

    loop {
        notify.wait().await;
        if gate.is_paused() {
            gate.resume();
            info!("Game resumed");
        } else {
            gate.suspend();
            info!("Game suspended");
        }
    }
}
