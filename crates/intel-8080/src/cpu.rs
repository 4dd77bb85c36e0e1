//! 8080 CPU core with per-instruction execution.

use emu_core::{Bus, Cpu, Observable, Step, Ticks, Value};

use crate::error::CpuError;
use crate::opcodes::{disassemble, OPCODES};
use crate::registers::Registers;

/// Cycles reported by each `step()` taken while the CPU sits halted.
const HALT_IDLE_CYCLES: u32 = 4;

/// What to do when an undefined opcode is fetched.
///
/// One policy applies to all twelve undefined opcodes of an instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UndefinedPolicy {
    /// Stop with [`CpuError::UndefinedOpcode`]. PC is left on the opcode.
    #[default]
    Fault,
    /// Execute as a one-byte, four-cycle NOP.
    Nop,
}

/// How a handler wants PC to move once it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    /// Fall through to the next instruction.
    Next,
    /// Jump to an explicit target at the base cycle cost.
    Jump(u16),
    /// A conditional CALL or RET was taken: jump and charge the taken cost.
    Branch(u16),
    /// HLT.
    Halt,
    /// The opcode has no documented meaning.
    Undefined,
}

/// Intel 8080 CPU.
///
/// The CPU does not own memory. The bus is passed to `step()` for every
/// instruction so the machine can put peripherals behind it.
pub struct I8080 {
    pub(crate) regs: Registers,
    policy: UndefinedPolicy,
    /// Total cycles executed since creation or reset.
    total_cycles: Ticks,
    /// Total instructions executed since creation or reset.
    instructions: u64,
}

impl I8080 {
    /// Create a new 8080 in its power-on state, faulting on undefined opcodes.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(UndefinedPolicy::Fault)
    }

    /// Create a new 8080 with the given undefined-opcode policy.
    #[must_use]
    pub fn with_policy(policy: UndefinedPolicy) -> Self {
        Self {
            regs: Registers::default(),
            policy,
            total_cycles: Ticks::ZERO,
            instructions: 0,
        }
    }

    #[must_use]
    pub const fn policy(&self) -> UndefinedPolicy {
        self.policy
    }

    /// Total cycles executed since creation or reset.
    #[must_use]
    pub const fn total_cycles(&self) -> Ticks {
        self.total_cycles
    }

    /// Total instructions executed since creation or reset.
    #[must_use]
    pub const fn instructions(&self) -> u64 {
        self.instructions
    }

    /// Whether the interrupt enable latch is set.
    #[must_use]
    pub const fn interrupts_enabled(&self) -> bool {
        self.regs.inte
    }

    /// Set the program counter, e.g. to a program's load address.
    pub fn set_pc(&mut self, value: u16) {
        self.regs.pc = value;
    }

    /// Set the stack pointer.
    ///
    /// Only available in test builds.
    #[cfg(feature = "test-utils")]
    pub fn set_sp(&mut self, value: u16) {
        self.regs.sp = value;
    }

    /// Mutable access to every register.
    ///
    /// Only available in test builds.
    #[cfg(feature = "test-utils")]
    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    /// Force a return from a subroutine call.
    ///
    /// Pops the return address from the stack and sets PC. Used by test
    /// harnesses to return from trapped CP/M BDOS calls.
    /// Only available in test builds.
    #[cfg(feature = "test-utils")]
    pub fn force_ret<B: Bus>(&mut self, bus: &mut B) {
        self.regs.pc = self.pop(bus);
    }

    /// Execute one instruction, fetching from PC.
    fn execute<B: Bus>(&mut self, bus: &mut B) -> Result<Step, CpuError> {
        if self.regs.halted {
            self.total_cycles += Ticks::from(HALT_IDLE_CYCLES);
            return Ok(Step::Halted {
                cycles: HALT_IDLE_CYCLES,
            });
        }

        let pc = self.regs.pc;
        let opcode = bus.read(pc);
        let row = &OPCODES[usize::from(opcode)];

        if log::log_enabled!(log::Level::Trace) {
            let bytes = [
                opcode,
                bus.read(pc.wrapping_add(1)),
                bus.read(pc.wrapping_add(2)),
            ];
            let (text, _) = disassemble(&bytes[..usize::from(row.len)]);
            log::trace!(
                "{pc:04X}  {text:<14} A={:02X} BC={:04X} DE={:04X} HL={:04X} SP={:04X} F={:02X}",
                self.regs.a,
                self.regs.bc(),
                self.regs.de(),
                self.regs.hl(),
                self.regs.sp,
                self.regs.flags.to_psw()
            );
        }

        let cycles = match (row.exec)(self, &mut *bus, opcode) {
            Flow::Next => {
                self.regs.pc = pc.wrapping_add(u16::from(row.len));
                row.cycles
            }
            Flow::Jump(target) => {
                self.regs.pc = target;
                row.cycles
            }
            Flow::Branch(target) => {
                self.regs.pc = target;
                row.cycles_taken
            }
            Flow::Halt => {
                self.regs.pc = pc.wrapping_add(1);
                self.regs.halted = true;
                self.account(row.cycles);
                log::debug!("HLT at {pc:#06X}");
                return Ok(Step::Halted {
                    cycles: u32::from(row.cycles),
                });
            }
            Flow::Undefined => match self.policy {
                UndefinedPolicy::Fault => {
                    return Err(CpuError::UndefinedOpcode { opcode, pc });
                }
                UndefinedPolicy::Nop => {
                    log::debug!("undefined opcode {opcode:#04X} at {pc:#06X} executed as NOP");
                    self.regs.pc = pc.wrapping_add(1);
                    row.cycles
                }
            },
        };

        self.account(cycles);
        Ok(Step::Executed {
            cycles: u32::from(cycles),
        })
    }

    fn account(&mut self, cycles: u8) {
        self.total_cycles += Ticks::from(u32::from(cycles));
        self.instructions += 1;
    }
}

impl Default for I8080 {
    fn default() -> Self {
        Self::new()
    }
}

impl I8080 {
    /// Get register by 3-bit encoding (bits 5-3 or 2-0). 6 is M, the byte
    /// at HL.
    pub(crate) fn get_reg8(&self, bus: &mut dyn Bus, r: u8) -> u8 {
        match r & 7 {
            0 => self.regs.b,
            1 => self.regs.c,
            2 => self.regs.d,
            3 => self.regs.e,
            4 => self.regs.h,
            5 => self.regs.l,
            6 => bus.read(self.regs.hl()),
            7 => self.regs.a,
            _ => unreachable!(),
        }
    }

    /// Set register by 3-bit encoding. 6 is M, the byte at HL.
    pub(crate) fn set_reg8(&mut self, bus: &mut dyn Bus, r: u8, value: u8) {
        match r & 7 {
            0 => self.regs.b = value,
            1 => self.regs.c = value,
            2 => self.regs.d = value,
            3 => self.regs.e = value,
            4 => self.regs.h = value,
            5 => self.regs.l = value,
            6 => bus.write(self.regs.hl(), value),
            7 => self.regs.a = value,
            _ => unreachable!(),
        }
    }

    /// Get register pair by 2-bit encoding (bits 5-4): BC, DE, HL, SP.
    pub(crate) fn get_reg16(&self, rp: u8) -> u16 {
        match rp & 3 {
            0 => self.regs.bc(),
            1 => self.regs.de(),
            2 => self.regs.hl(),
            3 => self.regs.sp,
            _ => unreachable!(),
        }
    }

    /// Set register pair by 2-bit encoding.
    pub(crate) fn set_reg16(&mut self, rp: u8, value: u16) {
        match rp & 3 {
            0 => self.regs.set_bc(value),
            1 => self.regs.set_de(value),
            2 => self.regs.set_hl(value),
            3 => self.regs.sp = value,
            _ => unreachable!(),
        }
    }

    /// Evaluate a condition code (bits 5-3 of the opcode).
    pub(crate) fn condition(&self, cc: u8) -> bool {
        let f = self.regs.flags;
        match cc & 7 {
            0 => !f.z,  // NZ
            1 => f.z,   // Z
            2 => !f.cy, // NC
            3 => f.cy,  // C
            4 => !f.p,  // PO
            5 => f.p,   // PE
            6 => !f.s,  // P
            7 => f.s,   // M
            _ => unreachable!(),
        }
    }

    /// Immediate byte following the opcode.
    pub(crate) fn imm8(&self, bus: &mut dyn Bus) -> u8 {
        bus.read(self.regs.pc.wrapping_add(1))
    }

    /// Immediate little-endian word following the opcode.
    pub(crate) fn imm16(&self, bus: &mut dyn Bus) -> u16 {
        let lo = bus.read(self.regs.pc.wrapping_add(1));
        let hi = bus.read(self.regs.pc.wrapping_add(2));
        u16::from_le_bytes([lo, hi])
    }

    /// Push a word: high byte at SP-1, low byte at SP-2.
    pub(crate) fn push(&mut self, bus: &mut dyn Bus, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write(self.regs.sp, hi);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write(self.regs.sp, lo);
    }

    /// Pop a word pushed by [`I8080::push`].
    pub(crate) fn pop(&mut self, bus: &mut dyn Bus) -> u16 {
        let lo = bus.read(self.regs.sp);
        let hi = bus.read(self.regs.sp.wrapping_add(1));
        self.regs.sp = self.regs.sp.wrapping_add(2);
        u16::from_le_bytes([lo, hi])
    }
}

// Instruction handlers split into a separate file for readability
mod execute;

impl Cpu for I8080 {
    type Registers = Registers;
    type Error = CpuError;

    fn step<B: Bus>(&mut self, bus: &mut B) -> Result<Step, CpuError> {
        self.execute(bus)
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn registers(&self) -> Self::Registers {
        self.regs
    }

    fn is_halted(&self) -> bool {
        self.regs.halted
    }

    /// Accept an interrupt by executing `RST vector`.
    ///
    /// Ignored unless INTE is set. Accepting pushes PC, jumps to
    /// `vector * 8`, clears INTE (the handler re-enables with EI) and
    /// wakes the CPU from HLT.
    fn interrupt<B: Bus>(&mut self, bus: &mut B, vector: u8) -> bool {
        if !self.regs.inte {
            return false;
        }
        self.regs.inte = false;
        self.regs.halted = false;

        let pc = self.regs.pc;
        self.push(bus, pc);
        self.regs.pc = u16::from(vector & 7) * 8;
        log::debug!("interrupt RST {} from {pc:#06X}", vector & 7);
        true
    }

    fn reset(&mut self) {
        self.regs = Registers::default();
        self.total_cycles = Ticks::ZERO;
        self.instructions = 0;
    }
}

/// All query paths supported by the 8080.
const I8080_QUERY_PATHS: &[&str] = &[
    // Registers
    "a", "b", "c", "d", "e", "h", "l",
    // Register pairs
    "bc", "de", "hl", "psw",
    // Pointers
    "sp", "pc",
    // Flags
    "flags", "flags.s", "flags.z", "flags.ac", "flags.p", "flags.cy",
    // CPU state
    "inte", "halted", "cycles", "instructions",
];

impl Observable for I8080 {
    fn query(&self, path: &str) -> Option<Value> {
        let f = self.regs.flags;
        match path {
            "a" => Some(self.regs.a.into()),
            "b" => Some(self.regs.b.into()),
            "c" => Some(self.regs.c.into()),
            "d" => Some(self.regs.d.into()),
            "e" => Some(self.regs.e.into()),
            "h" => Some(self.regs.h.into()),
            "l" => Some(self.regs.l.into()),

            "bc" => Some(self.regs.bc().into()),
            "de" => Some(self.regs.de().into()),
            "hl" => Some(self.regs.hl().into()),
            "psw" => Some(self.regs.psw().into()),

            "sp" => Some(self.regs.sp.into()),
            "pc" => Some(self.regs.pc.into()),

            "flags" => Some(f.to_psw().into()),
            "flags.s" => Some(f.s.into()),
            "flags.z" => Some(f.z.into()),
            "flags.ac" => Some(f.ac.into()),
            "flags.p" => Some(f.p.into()),
            "flags.cy" => Some(f.cy.into()),

            "inte" => Some(self.regs.inte.into()),
            "halted" => Some(self.regs.halted.into()),
            "cycles" => Some(self.total_cycles.get().into()),
            "instructions" => Some(self.instructions.into()),

            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        I8080_QUERY_PATHS
    }
}
