//! Command dispatcher: serial RX bytes to task-level intents
//!
//! Replaces the RX-threshold ISR of the reference hardware. The UART
//! interrupt wakes this task, which drains the FIFO byte by byte and
//! defers all real work: pause goes to the pause controller's signal,
//! game commands to the bounded command queue, identify and disconnect
//! to the shared link flags. It runs on the high-priority executor so a
//! pause byte preempts gameplay.

use defmt::{info, warn};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{Async, UartRx};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Sender;
use embassy_sync::signal::Signal;
use embassy_time::Instant;

use crate::agent::ConnectionFlags;
use crate::config::CMD_QUEUE_LEN;
use crate::error::Error;
use crate::events::Command;
use crate::protocol::{parse_command_byte, refreshes_link, SerialCommand};

#[embassy_executor::task]
pub async fn command_dispatcher_task(
    mut rx: UartRx<'static, UART0, Async>,
    commands: Sender<'static, CriticalSectionRawMutex, Command, CMD_QUEUE_LEN>,
    pause_notify: &'static Signal<CriticalSectionRawMutex, ()>,
    flags: &'static ConnectionFlags,
) -> ! {
    info!("Command dispatcher started");

    let mut byte = [0u8; 1];
    loop {
        if rx.read(&mut byte).await.is_err() {
            warn!("UART RX error, dropping byte");
            continue;
        }
        let byte = byte[0];

        // Every byte except the disconnect hint restarts the
        // connectivity window, unknown bytes included
        if refreshes_link(byte) {
            flags.refresh(Instant::now().as_millis() as u32);
        }

        match parse_command_byte(byte) {
            Some(SerialCommand::Pause) => pause_notify.signal(()),
            Some(SerialCommand::Game(cmd)) => {
                // Commands are user-driven and rare; a full queue just
                // drops the byte
                if commands.try_send(cmd).is_err() {
                    warn!("{}, dropped command {}", Error::QueueFull, cmd);
                }
            }
            Some(SerialCommand::Identify) => flags.request_identify(),
            Some(SerialCommand::Disconnect) => flags.mark_disconnected(),
            None => {}
        }
    }
}
