//! Firmware entry point: bring up the board, wire the tasks, go
//!
//! Priority layout (high to low):
//! - hardware IRQs (UART, I²C, DMA)
//! - SWI_IRQ_1 executor: pause controller + command dispatcher
//! - SWI_IRQ_0 executor: game task
//! - thread-mode executor: telemetry, then idle
//!
//! A pause byte therefore preempts gameplay, and gameplay preempts
//! telemetry, matching the reference priority scheme.

#![cfg_attr(all(target_arch = "arm", target_os = "none"), no_std)]
#![cfg_attr(all(target_arch = "arm", target_os = "none"), no_main)]

#[cfg(all(target_arch = "arm", target_os = "none"))]
mod firmware {
    use defmt::{error, info};
    use embassy_executor::{InterruptExecutor, Spawner};
    use embassy_rp::flash::{Blocking, Flash};
    use embassy_rp::interrupt;
    use embassy_rp::interrupt::{InterruptExt, Priority};
    use embassy_rp::peripherals::{I2C0, UART0};
    use embassy_rp::{bind_interrupts, i2c, uart};
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use embassy_sync::channel::Channel;
    use embassy_sync::signal::Signal;
    use static_cell::StaticCell;
    use {defmt_rtt as _, panic_probe as _};

    use whacbox::agent::ConnectionFlags;
    use whacbox::config::{CMD_QUEUE_LEN, EVENT_QUEUE_LEN, FLASH_SIZE};
    use whacbox::events::{Command, GameEvent};
    use whacbox::hardware::IoExpander;
    use whacbox::tasks::{
        command_dispatcher_task, game_task, pause_task, telemetry_task, ExpanderBoard, PauseGate,
    };
    use whacbox::utils::device_id_from_serial;

    bind_interrupts!(struct Irqs {
        UART0_IRQ => uart::InterruptHandler<UART0>;
        I2C0_IRQ => i2c::InterruptHandler<I2C0>;
    });

    static EVENT_CHANNEL: Channel<CriticalSectionRawMutex, GameEvent, EVENT_QUEUE_LEN> =
        Channel::new();
    static CMD_CHANNEL: Channel<CriticalSectionRawMutex, Command, CMD_QUEUE_LEN> = Channel::new();
    static PAUSE_NOTIFY: Signal<CriticalSectionRawMutex, ()> = Signal::new();
    static PAUSE_GATE: PauseGate = PauseGate::new();
    static LINK_FLAGS: ConnectionFlags = ConnectionFlags::new();
    static DEVICE_ID: StaticCell<heapless::String<10>> = StaticCell::new();

    static EXECUTOR_CTRL: InterruptExecutor = InterruptExecutor::new();
    static EXECUTOR_GAME: InterruptExecutor = InterruptExecutor::new();

    #[interrupt]
    unsafe fn SWI_IRQ_1() {
        EXECUTOR_CTRL.on_interrupt()
    }

    #[interrupt]
    unsafe fn SWI_IRQ_0() {
        EXECUTOR_GAME.on_interrupt()
    }

    #[embassy_executor::main]
    async fn main(spawner: Spawner) {
        let p = embassy_rp::init(Default::default());
        info!("whacbox booting");

        // Stable device id from the factory flash serial
        let mut flash = Flash::<_, Blocking, FLASH_SIZE>::new_blocking(p.FLASH);
        let mut serial = [0u8; 8];
        if let Err(e) = flash.blocking_unique_id(&mut serial) {
            error!("Unique id read failed: {}", e);
            core::panic!("flash unique id unavailable");
        }
        let device_id: &'static str = DEVICE_ID.init(device_id_from_serial(&serial)).as_str();
        info!("Device id: {}", device_id);

        // The expander must come up before any task touches the panel
        let i2c = i2c::I2c::new_async(p.I2C0, p.PIN_5, p.PIN_4, Irqs, i2c::Config::default());
        let mut io = IoExpander::new(i2c);
        if let Err(e) = io.init().await {
            error!("Expander init failed: {}", e);
            core::panic!("hardware init failed");
        }

        // Serial link to the host bridge; the bit rate is whatever the
        // host configured, 115200 by convention
        let mut uart_config = uart::Config::default();
        uart_config.baudrate = 115_200;
        let uart_bus = uart::Uart::new(
            p.UART0,
            p.PIN_0,
            p.PIN_1,
            Irqs,
            p.DMA_CH0,
            p.DMA_CH1,
            uart_config,
        );
        let (uart_tx, uart_rx) = uart_bus.split();

        // Telemetry shares the thread-mode executor with the idle loop
        spawner.must_spawn(telemetry_task(
            uart_tx,
            EVENT_CHANNEL.receiver(),
            &LINK_FLAGS,
            device_id,
        ));

        // Game gets its own mid-priority executor
        interrupt::SWI_IRQ_0.set_priority(Priority::P3);
        let game_spawner = EXECUTOR_GAME.start(interrupt::SWI_IRQ_0);
        let board = ExpanderBoard::new(
            io,
            CMD_CHANNEL.receiver(),
            EVENT_CHANNEL.sender(),
            &PAUSE_GATE,
        );
        game_spawner.must_spawn(game_task(board));

        // Command path last, once everything it wakes exists
        interrupt::SWI_IRQ_1.set_priority(Priority::P2);
        let ctrl_spawner = EXECUTOR_CTRL.start(interrupt::SWI_IRQ_1);
        ctrl_spawner.must_spawn(pause_task(&PAUSE_GATE, &PAUSE_NOTIFY));
        ctrl_spawner.must_spawn(command_dispatcher_task(
            uart_rx,
            CMD_CHANNEL.sender(),
            &PAUSE_NOTIFY,
            &LINK_FLAGS,
        ));

        info!("All tasks running");
    }
}

// Host builds only compile the library; the firmware entry above is
// target-gated so `cargo test` works off-target.
#[cfg(not(all(target_arch = "arm", target_os = "none")))]
fn main() {}
