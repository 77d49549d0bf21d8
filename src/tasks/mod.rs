//! Embassy tasks wiring the core to the RP2040

pub mod command_task;
pub mod game_task;
pub mod pause_task;
pub mod telemetry_task;

pub use command_task::command_dispatcher_task;
pub use game_task::{game_task, ExpanderBoard};
pub use pause_task::{pause_task, PauseGate};
pub use telemetry_task::telemetry_task;
