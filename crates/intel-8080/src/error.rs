//! CPU fault type.

use thiserror::Error;

/// A condition that stops the CPU from executing further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CpuError {
    /// An opcode with no documented 8080 meaning was fetched while the CPU
    /// runs under [`UndefinedPolicy::Fault`](crate::UndefinedPolicy::Fault).
    /// PC still points at the offending byte.
    #[error("undefined opcode {opcode:#04X} at {pc:#06X}")]
    UndefinedOpcode { opcode: u8, pc: u16 },
}
