//! 8080 register set.

use crate::flags::Flags;

/// 8080 registers snapshot for observation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,

    pub sp: u16,
    pub pc: u16,

    pub flags: Flags,

    /// Interrupt enable latch (INTE). Set by EI, cleared by DI and by
    /// accepting an interrupt.
    pub inte: bool,

    /// Set by HLT, cleared by an accepted interrupt.
    pub halted: bool,
}

impl Registers {
    /// Get BC register pair.
    #[must_use]
    pub const fn bc(&self) -> u16 {
        (self.b as u16) << 8 | self.c as u16
    }

    /// Get DE register pair.
    #[must_use]
    pub const fn de(&self) -> u16 {
        (self.d as u16) << 8 | self.e as u16
    }

    /// Get HL register pair.
    #[must_use]
    pub const fn hl(&self) -> u16 {
        (self.h as u16) << 8 | self.l as u16
    }

    /// Get the program status word: A in the high byte, flags in the low.
    #[must_use]
    pub const fn psw(&self) -> u16 {
        (self.a as u16) << 8 | self.flags.to_psw() as u16
    }

    /// Set BC register pair.
    pub fn set_bc(&mut self, value: u16) {
        self.b = (value >> 8) as u8;
        self.c = value as u8;
    }

    /// Set DE register pair.
    pub fn set_de(&mut self, value: u16) {
        self.d = (value >> 8) as u8;
        self.e = value as u8;
    }

    /// Set HL register pair.
    pub fn set_hl(&mut self, value: u16) {
        self.h = (value >> 8) as u8;
        self.l = value as u8;
    }

    /// Set the program status word.
    pub fn set_psw(&mut self, value: u16) {
        self.a = (value >> 8) as u8;
        self.flags = Flags::from_psw(value as u8);
    }
}
