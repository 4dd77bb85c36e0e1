//! CPU core trait.

use crate::Bus;

/// Outcome of one [`Cpu::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// One instruction ran to completion and took `cycles` clock cycles.
    Executed { cycles: u32 },
    /// The CPU is halted. `cycles` is the cost of the halting instruction,
    /// or of one idle cycle group if it was already halted.
    Halted { cycles: u32 },
}

impl Step {
    /// Cycles consumed by this step, whatever the outcome.
    #[must_use]
    pub const fn cycles(self) -> u32 {
        match self {
            Self::Executed { cycles } | Self::Halted { cycles } => cycles,
        }
    }

    #[must_use]
    pub const fn is_halted(self) -> bool {
        matches!(self, Self::Halted { .. })
    }
}

/// A CPU core that executes whole instructions.
///
/// The bus is passed in, not owned, so it can be shared with the
/// peripherals that sit behind it. Interrupts are sampled between steps,
/// never in the middle of an instruction.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Error raised when an instruction cannot be executed.
    type Error;

    /// Execute exactly one instruction.
    fn step<B: Bus>(&mut self, bus: &mut B) -> Result<Step, Self::Error>;

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Returns true if the CPU is halted.
    fn is_halted(&self) -> bool;

    /// Request a vectored interrupt. Returns true if it was accepted.
    fn interrupt<B: Bus>(&mut self, bus: &mut B, vector: u8) -> bool;

    /// Reset the CPU to its power-on state.
    fn reset(&mut self);
}
