//! ALU operations for the 8080.
//!
//! Each operation takes the flag set it updates and returns the 8-bit
//! result. Results are computed at 16-bit precision and handed to
//! [`Flags::update`] before truncation.

use crate::flags::{CF, Flags, SZP};

/// Add with optional carry in (ADD, ADC, ADI, ACI).
pub fn add(flags: &mut Flags, a: u8, b: u8, carry_in: bool) -> u8 {
    let c = u8::from(carry_in);
    let result = u16::from(a) + u16::from(b) + u16::from(c);
    flags.update(result, SZP | CF);
    flags.ac = (a & 0x0F) + (b & 0x0F) + c > 0x0F;
    result as u8
}

/// Subtract with optional borrow in (SUB, SBB, SUI, SBI, CMP, CPI).
///
/// Carry is the borrow out of bit 7. The 8080 subtracts by adding the
/// one's complement with an inverted carry in, and the auxiliary carry is
/// the carry out of bit 3 of that addition.
pub fn sub(flags: &mut Flags, a: u8, b: u8, borrow_in: bool) -> u8 {
    let c = u8::from(borrow_in);
    let result = u16::from(a).wrapping_sub(u16::from(b)).wrapping_sub(u16::from(c));
    flags.update(result, SZP);
    flags.cy = u16::from(a) < u16::from(b) + u16::from(c);
    flags.ac = (a & 0x0F) + (!b & 0x0F) + (1 - c) > 0x0F;
    result as u8
}

/// AND (ANA, ANI). Clears carry; AC is the OR of bit 3 of both operands.
pub fn and(flags: &mut Flags, a: u8, b: u8) -> u8 {
    let result = a & b;
    flags.set_szp(result);
    flags.cy = false;
    flags.ac = (a | b) & 0x08 != 0;
    result
}

/// Exclusive OR (XRA, XRI). Clears carry and auxiliary carry.
pub fn xor(flags: &mut Flags, a: u8, b: u8) -> u8 {
    let result = a ^ b;
    flags.set_szp(result);
    flags.cy = false;
    flags.ac = false;
    result
}

/// OR (ORA, ORI). Clears carry and auxiliary carry.
pub fn or(flags: &mut Flags, a: u8, b: u8) -> u8 {
    let result = a | b;
    flags.set_szp(result);
    flags.cy = false;
    flags.ac = false;
    result
}

/// Increment (INR). Carry is unaffected.
pub fn inc(flags: &mut Flags, value: u8) -> u8 {
    let result = value.wrapping_add(1);
    flags.set_szp(result);
    flags.ac = value & 0x0F == 0x0F;
    result
}

/// Decrement (DCR). Carry is unaffected.
pub fn dec(flags: &mut Flags, value: u8) -> u8 {
    let result = value.wrapping_sub(1);
    flags.set_szp(result);
    flags.ac = value & 0x0F != 0;
    result
}

/// Decimal adjust accumulator (DAA).
pub fn daa(flags: &mut Flags, a: u8) -> u8 {
    let lo = a & 0x0F;
    let hi = a >> 4;
    let mut correction = 0;
    let mut carry = flags.cy;

    if flags.ac || lo > 9 {
        correction |= 0x06;
    }
    if flags.cy || hi > 9 || (hi >= 9 && lo > 9) {
        correction |= 0x60;
        carry = true;
    }

    let result = add(flags, a, correction, false);
    flags.cy = carry;
    result
}

/// 16-bit add (DAD). Only carry changes.
pub fn dad(flags: &mut Flags, hl: u16, rp: u16) -> u16 {
    let result = u32::from(hl) + u32::from(rp);
    flags.cy = result > 0xFFFF;
    result as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sets_carry_and_aux() {
        let mut f = Flags::default();
        assert_eq!(add(&mut f, 0xFF, 0x01, false), 0x00);
        assert!(f.z && f.cy && f.ac && f.p && !f.s);

        let mut f = Flags::default();
        assert_eq!(add(&mut f, 0x05, 0x03, false), 0x08);
        assert!(!f.z && !f.cy && !f.ac && !f.p && !f.s);
    }

    #[test]
    fn adc_uses_carry_in() {
        let mut f = Flags::default();
        assert_eq!(add(&mut f, 0x3D, 0x42, true), 0x80);
        assert!(f.s);
        assert!(!f.cy);
        assert!(f.ac);
    }

    #[test]
    fn sub_borrows() {
        let mut f = Flags::default();
        assert_eq!(sub(&mut f, 0x02, 0x05, false), 0xFD);
        assert!(f.cy);
        assert!(f.s);

        let mut f = Flags::default();
        assert_eq!(sub(&mut f, 0x3E, 0x3E, false), 0x00);
        assert!(f.z);
        assert!(!f.cy);
        // No borrow from bit 4 sets AC on the 8080.
        assert!(f.ac);
    }

    #[test]
    fn sbb_borrow_in_can_cause_borrow_out() {
        let mut f = Flags::default();
        assert_eq!(sub(&mut f, 0x05, 0x05, true), 0xFF);
        assert!(f.cy);
    }

    #[test]
    fn logic_ops_clear_carry() {
        let mut f = Flags { cy: true, ..Flags::default() };
        assert_eq!(and(&mut f, 0xFC, 0x0F), 0x0C);
        assert!(!f.cy);
        assert!(f.ac);

        let mut f = Flags { cy: true, ac: true, ..Flags::default() };
        assert_eq!(xor(&mut f, 0x5C, 0x5C), 0x00);
        assert!(f.z && !f.cy && !f.ac);

        let mut f = Flags { cy: true, ..Flags::default() };
        assert_eq!(or(&mut f, 0x33, 0x0F), 0x3F);
        assert!(!f.cy);
        assert!(f.p);
    }

    #[test]
    fn inc_dec_leave_carry() {
        let mut f = Flags { cy: true, ..Flags::default() };
        assert_eq!(inc(&mut f, 0xFF), 0x00);
        assert!(f.z && f.cy && f.ac);

        let mut f = Flags::default();
        assert_eq!(dec(&mut f, 0x00), 0xFF);
        assert!(f.s && !f.cy && !f.ac);
    }

    #[test]
    fn daa_adjusts_bcd_addition() {
        // 0x19 + 0x28 = 0x41, adjusted to BCD 47.
        let mut f = Flags::default();
        let sum = add(&mut f, 0x19, 0x28, false);
        assert_eq!(sum, 0x41);
        assert!(f.ac);
        assert_eq!(daa(&mut f, sum), 0x47);
        assert!(!f.cy);

        // 0x99 + 0x01 = 0x9A, adjusted to 00 with carry.
        let mut f = Flags::default();
        let sum = add(&mut f, 0x99, 0x01, false);
        assert_eq!(daa(&mut f, sum), 0x00);
        assert!(f.cy);
        assert!(f.z);
    }

    #[test]
    fn dad_only_touches_carry() {
        let mut f = Flags { z: true, s: true, ..Flags::default() };
        assert_eq!(dad(&mut f, 0xFFFF, 0x0002), 0x0001);
        assert!(f.cy && f.z && f.s);
        assert_eq!(dad(&mut f, 0x1000, 0x1234), 0x2234);
        assert!(!f.cy);
    }
}
