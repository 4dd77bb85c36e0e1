//! 8080 status flags.
//!
//! The flags live as named booleans. The packed byte only exists on the
//! stack, via `PUSH PSW` / `POP PSW`, and uses the 8080 status layout:
//!
//! | Bit | 7 | 6 | 5 | 4  | 3 | 2 | 1 | 0  |
//! |-----|---|---|---|----|---|---|---|----|
//! |     | S | Z | 0 | AC | 0 | P | 1 | CY |

/// Sign flag (bit 7) - copy of bit 7 of the result.
pub const SF: u8 = 0b1000_0000;

/// Zero flag (bit 6) - set if the result is zero.
pub const ZF: u8 = 0b0100_0000;

/// Auxiliary carry flag (bit 4) - carry out of bit 3.
pub const AF: u8 = 0b0001_0000;

/// Parity flag (bit 2) - set if the result has an even number of 1 bits.
pub const PF: u8 = 0b0000_0100;

/// Bit 1 of the status byte always reads as 1.
const ONE: u8 = 0b0000_0010;

/// Carry flag (bit 0) - carry out of bit 7, or borrow.
pub const CF: u8 = 0b0000_0001;

/// Sign, zero and parity: the flags every 8-bit ALU result sets.
pub const SZP: u8 = SF | ZF | PF;

/// Compute parity of a byte (true if even number of 1 bits).
#[must_use]
pub const fn parity(value: u8) -> bool {
    value.count_ones().is_multiple_of(2)
}

/// The 8080 flag set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    /// Sign.
    pub s: bool,
    /// Zero.
    pub z: bool,
    /// Auxiliary carry.
    pub ac: bool,
    /// Parity (true = even).
    pub p: bool,
    /// Carry.
    pub cy: bool,
}

impl Flags {
    /// Update the flags selected by `mask` from an untruncated result.
    ///
    /// Sign, zero and parity look at the low 8 bits. Carry is set when the
    /// result does not fit in 8 bits; callers that need borrow or rotate
    /// semantics write `cy` themselves. Auxiliary carry is never touched
    /// here because it depends on the operands, not the result.
    pub fn update(&mut self, result: u16, mask: u8) {
        let value = result as u8;
        if mask & SF != 0 {
            self.s = value & 0x80 != 0;
        }
        if mask & ZF != 0 {
            self.z = value == 0;
        }
        if mask & PF != 0 {
            self.p = parity(value);
        }
        if mask & CF != 0 {
            self.cy = result > 0xFF;
        }
    }

    /// Set sign, zero and parity from an 8-bit result.
    pub fn set_szp(&mut self, value: u8) {
        self.update(u16::from(value), SZP);
    }

    /// Pack into the status byte pushed by `PUSH PSW`.
    #[must_use]
    pub const fn to_psw(self) -> u8 {
        let mut f = ONE;
        if self.s {
            f |= SF;
        }
        if self.z {
            f |= ZF;
        }
        if self.ac {
            f |= AF;
        }
        if self.p {
            f |= PF;
        }
        if self.cy {
            f |= CF;
        }
        f
    }

    /// Unpack a status byte popped by `POP PSW`. Bits 1, 3 and 5 are ignored.
    #[must_use]
    pub const fn from_psw(f: u8) -> Self {
        Self {
            s: f & SF != 0,
            z: f & ZF != 0,
            ac: f & AF != 0,
            p: f & PF != 0,
            cy: f & CF != 0,
        }
    }
}
