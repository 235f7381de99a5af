//! Embassy async tasks
//!
//! Each task runs independently and communicates via signals and the
//! shared light reading.

pub mod button;
pub mod display;
pub mod light;
pub mod tick;

pub use button::button_task;
pub use display::{display_task, DisplayBus};
pub use light::{light_task, RpAdc};
pub use tick::tick_task;
