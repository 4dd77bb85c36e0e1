//! Space Invaders cabinet emulator.
//!
//! The cabinet is an Intel 8080 at 2 MHz with 16K of address space in use,
//! a 16-bit shift register on ports 2-4, and bit-mapped controls, DIP
//! switches, sound latches and a watchdog on the remaining ports. The
//! video hardware interrupts the CPU twice a frame: RST 1 when the beam
//! reaches the middle of the screen and RST 2 at vertical blank.
//!
//! Presentation (window, framebuffer conversion, audio samples) is left to
//! the host; [`Invaders::vram`] exposes the 1bpp video RAM.

mod bus;
mod config;
mod error;
mod invaders;
mod pacer;
mod ports;
mod shifter;

pub use bus::InvadersBus;
pub use config::{InterruptCadence, InvadersConfig};
pub use error::InvadersError;
pub use invaders::{FrameOutcome, Invaders, VRAM_END, VRAM_START};
pub use pacer::Pacer;
pub use ports::{Button, CabinetPorts, PortDevice};
pub use shifter::Shifter;
