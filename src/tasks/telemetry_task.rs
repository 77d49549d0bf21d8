//! Telemetry task: events out as JSONL, offline buffering, identify
//!
//! Lowest-priority real task. Each iteration drops a stale link, runs a
//! pending identify handshake (identify frame first, then the buffered
//! backlog in FIFO order), drains the event queue with a short per-pop
//! wait, and sleeps a slice.

use defmt::{info, warn};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{Async, UartTx};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Receiver;
use embassy_time::{with_timeout, Duration, Instant, Timer};

use crate::agent::{AgentLink, ConnectionFlags, Route};
use crate::config::{EVENT_QUEUE_LEN, EVENT_RECV_TIMEOUT_MS, TELEMETRY_IDLE_MS};
use crate::error::Error;
use crate::events::GameEvent;
use crate::protocol::{event_frame, identify_frame, Frame};

async fn send(tx: &mut UartTx<'static, UART0, Async>, frame: &Frame) {
    if tx.write(frame.as_bytes()).await.is_err() {
        warn!("UART TX error, frame lost");
    }
}

#[embassy_executor::task]
pub async fn telemetry_task(
    mut tx: UartTx<'static, UART0, Async>,
    events: Receiver<'static, CriticalSectionRawMutex, GameEvent, EVENT_QUEUE_LEN>,
    flags: &'static ConnectionFlags,
    device_id: &'static str,
) -> ! {
    info!("Telemetry task started, device id {}", device_id);

    let mut link = AgentLink::new();
    loop {
        let now = Instant::now().as_millis() as u32;

        if link.check_timeout(flags, now) {
            info!("Agent link timed out, buffering events");
        }

        if flags.take_identify() {
            link.begin_identify(flags, now);
            send(&mut tx, &identify_frame(device_id)).await;
            if link.has_backlog() {
                info!("Identify: replaying {} buffered events", link.buffered_len());
                while let Some(event) = link.pop_buffered() {
                    send(&mut tx, &event_frame(&event)).await;
                }
            }
        }

        while let Ok(event) =
            with_timeout(Duration::from_millis(EVENT_RECV_TIMEOUT_MS), events.receive()).await
        {
            match link.route(flags, event) {
                Route::Transmit(event) => send(&mut tx, &event_frame(&event)).await,
                Route::Buffered { evicted } => {
                    if evicted {
                        warn!("{}, oldest buffered event discarded", Error::BufferOverflow);
                    }
                }
            }
        }

        Timer::after_millis(TELEMETRY_IDLE_MS).await;
    }
}
