//! Intel 8080 CPU emulator.
//!
//! Each call to `step()` executes exactly one instruction and reports the
//! number of clock cycles it took. Dispatch goes through a 256-entry opcode
//! table; see [`OPCODES`].

mod alu;
mod cpu;
mod error;
mod flags;
mod opcodes;
mod registers;

pub use cpu::{I8080, UndefinedPolicy};
pub use error::CpuError;
pub use flags::{parity, Flags, AF, CF, PF, SF, SZP, ZF};
pub use opcodes::{disassemble, Opcode, OPCODES};
pub use registers::Registers;
