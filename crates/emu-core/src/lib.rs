//! Core traits and types shared by the CPU and machine crates.
//!
//! The CPU never owns memory. A machine owns a [`Bus`] and lends it to the
//! CPU for each instruction, so peripherals can sit behind the same bus.

mod bus;
mod clock;
mod cpu;
mod observable;
mod ticks;

pub use bus::{Bus, SimpleBus};
pub use clock::MasterClock;
pub use cpu::{Cpu, Step};
pub use observable::{Observable, Value};
pub use ticks::Ticks;
