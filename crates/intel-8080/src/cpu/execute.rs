//! Instruction handlers for the 8080.
//!
//! Handlers are referenced from the opcode table, so they all share one
//! signature: `(cpu, bus, opcode) -> Flow`. PC still points at the opcode
//! while a handler runs; `step()` moves it afterwards according to the
//! returned [`Flow`].

use emu_core::Bus;

use crate::alu;

use super::{Flow, I8080};

impl I8080 {
    // =========================================================================
    // Miscellaneous
    // =========================================================================

    pub(crate) fn nop(&mut self, _bus: &mut dyn Bus, _op: u8) -> Flow {
        Flow::Next
    }

    pub(crate) fn undefined(&mut self, _bus: &mut dyn Bus, _op: u8) -> Flow {
        Flow::Undefined
    }

    pub(crate) fn hlt(&mut self, _bus: &mut dyn Bus, _op: u8) -> Flow {
        Flow::Halt
    }

    pub(crate) fn di(&mut self, _bus: &mut dyn Bus, _op: u8) -> Flow {
        self.regs.inte = false;
        Flow::Next
    }

    pub(crate) fn ei(&mut self, _bus: &mut dyn Bus, _op: u8) -> Flow {
        self.regs.inte = true;
        Flow::Next
    }

    // =========================================================================
    // Data transfer
    // =========================================================================

    /// MOV r1, r2 (40-7F except 76)
    pub(crate) fn mov(&mut self, bus: &mut dyn Bus, op: u8) -> Flow {
        let value = self.get_reg8(bus, op);
        self.set_reg8(bus, op >> 3, value);
        Flow::Next
    }

    /// MVI r, d8 (06, 0E, 16, 1E, 26, 2E, 36, 3E)
    pub(crate) fn mvi(&mut self, bus: &mut dyn Bus, op: u8) -> Flow {
        let value = self.imm8(bus);
        self.set_reg8(bus, op >> 3, value);
        Flow::Next
    }

    /// LXI rp, d16 (01=BC, 11=DE, 21=HL, 31=SP)
    pub(crate) fn lxi(&mut self, bus: &mut dyn Bus, op: u8) -> Flow {
        let value = self.imm16(bus);
        self.set_reg16(op >> 4, value);
        Flow::Next
    }

    /// STAX B / STAX D
    pub(crate) fn stax(&mut self, bus: &mut dyn Bus, op: u8) -> Flow {
        let addr = self.get_reg16(op >> 4);
        bus.write(addr, self.regs.a);
        Flow::Next
    }

    /// LDAX B / LDAX D
    pub(crate) fn ldax(&mut self, bus: &mut dyn Bus, op: u8) -> Flow {
        let addr = self.get_reg16(op >> 4);
        self.regs.a = bus.read(addr);
        Flow::Next
    }

    /// STA a16
    pub(crate) fn sta(&mut self, bus: &mut dyn Bus, _op: u8) -> Flow {
        let addr = self.imm16(bus);
        bus.write(addr, self.regs.a);
        Flow::Next
    }

    /// LDA a16
    pub(crate) fn lda(&mut self, bus: &mut dyn Bus, _op: u8) -> Flow {
        let addr = self.imm16(bus);
        self.regs.a = bus.read(addr);
        Flow::Next
    }

    /// SHLD a16 - L to (a16), H to (a16 + 1)
    pub(crate) fn shld(&mut self, bus: &mut dyn Bus, _op: u8) -> Flow {
        let addr = self.imm16(bus);
        bus.write(addr, self.regs.l);
        bus.write(addr.wrapping_add(1), self.regs.h);
        Flow::Next
    }

    /// LHLD a16
    pub(crate) fn lhld(&mut self, bus: &mut dyn Bus, _op: u8) -> Flow {
        let addr = self.imm16(bus);
        self.regs.l = bus.read(addr);
        self.regs.h = bus.read(addr.wrapping_add(1));
        Flow::Next
    }

    /// XCHG - swap DE and HL
    pub(crate) fn xchg(&mut self, _bus: &mut dyn Bus, _op: u8) -> Flow {
        std::mem::swap(&mut self.regs.d, &mut self.regs.h);
        std::mem::swap(&mut self.regs.e, &mut self.regs.l);
        Flow::Next
    }

    // =========================================================================
    // 8-bit arithmetic and logic
    // =========================================================================

    /// ADD/ADC/SUB/SBB/ANA/XRA/ORA/CMP r (80-BF)
    pub(crate) fn alu_reg(&mut self, bus: &mut dyn Bus, op: u8) -> Flow {
        let value = self.get_reg8(bus, op);
        self.alu_a(op >> 3, value);
        Flow::Next
    }

    /// ADI/ACI/SUI/SBI/ANI/XRI/ORI/CPI d8
    pub(crate) fn alu_imm(&mut self, bus: &mut dyn Bus, op: u8) -> Flow {
        let value = self.imm8(bus);
        self.alu_a(op >> 3, value);
        Flow::Next
    }

    /// Apply ALU operation `kind` (bits 5-3 of the opcode) to A and `value`.
    fn alu_a(&mut self, kind: u8, value: u8) {
        let a = self.regs.a;
        let flags = &mut self.regs.flags;
        match kind & 7 {
            0 => self.regs.a = alu::add(flags, a, value, false),
            1 => {
                let carry = flags.cy;
                self.regs.a = alu::add(flags, a, value, carry);
            }
            2 => self.regs.a = alu::sub(flags, a, value, false),
            3 => {
                let borrow = flags.cy;
                self.regs.a = alu::sub(flags, a, value, borrow);
            }
            4 => self.regs.a = alu::and(flags, a, value),
            5 => self.regs.a = alu::xor(flags, a, value),
            6 => self.regs.a = alu::or(flags, a, value),
            7 => {
                // CMP: flags as SUB, result discarded
                alu::sub(flags, a, value, false);
            }
            _ => unreachable!(),
        }
    }

    /// INR r (04, 0C, ... 3C; 34 is INR M)
    pub(crate) fn inr(&mut self, bus: &mut dyn Bus, op: u8) -> Flow {
        let value = self.get_reg8(bus, op >> 3);
        let result = alu::inc(&mut self.regs.flags, value);
        self.set_reg8(bus, op >> 3, result);
        Flow::Next
    }

    /// DCR r (05, 0D, ... 3D; 35 is DCR M)
    pub(crate) fn dcr(&mut self, bus: &mut dyn Bus, op: u8) -> Flow {
        let value = self.get_reg8(bus, op >> 3);
        let result = alu::dec(&mut self.regs.flags, value);
        self.set_reg8(bus, op >> 3, result);
        Flow::Next
    }

    /// DAA
    pub(crate) fn daa(&mut self, _bus: &mut dyn Bus, _op: u8) -> Flow {
        self.regs.a = alu::daa(&mut self.regs.flags, self.regs.a);
        Flow::Next
    }

    /// CMA - complement A, no flags
    pub(crate) fn cma(&mut self, _bus: &mut dyn Bus, _op: u8) -> Flow {
        self.regs.a = !self.regs.a;
        Flow::Next
    }

    /// STC
    pub(crate) fn stc(&mut self, _bus: &mut dyn Bus, _op: u8) -> Flow {
        self.regs.flags.cy = true;
        Flow::Next
    }

    /// CMC
    pub(crate) fn cmc(&mut self, _bus: &mut dyn Bus, _op: u8) -> Flow {
        self.regs.flags.cy = !self.regs.flags.cy;
        Flow::Next
    }

    // =========================================================================
    // Rotates
    //
    // Carry always takes the bit shifted out of A.
    // =========================================================================

    /// RLC - bit 7 to carry and bit 0
    pub(crate) fn rlc(&mut self, _bus: &mut dyn Bus, _op: u8) -> Flow {
        let a = self.regs.a;
        self.regs.flags.cy = a & 0x80 != 0;
        self.regs.a = a.rotate_left(1);
        Flow::Next
    }

    /// RRC - bit 0 to carry and bit 7
    pub(crate) fn rrc(&mut self, _bus: &mut dyn Bus, _op: u8) -> Flow {
        let a = self.regs.a;
        self.regs.flags.cy = a & 0x01 != 0;
        self.regs.a = a.rotate_right(1);
        Flow::Next
    }

    /// RAL - rotate left through carry
    pub(crate) fn ral(&mut self, _bus: &mut dyn Bus, _op: u8) -> Flow {
        let a = self.regs.a;
        let old_carry = u8::from(self.regs.flags.cy);
        self.regs.flags.cy = a & 0x80 != 0;
        self.regs.a = (a << 1) | old_carry;
        Flow::Next
    }

    /// RAR - rotate right through carry
    pub(crate) fn rar(&mut self, _bus: &mut dyn Bus, _op: u8) -> Flow {
        let a = self.regs.a;
        let old_carry = u8::from(self.regs.flags.cy);
        self.regs.flags.cy = a & 0x01 != 0;
        self.regs.a = (a >> 1) | (old_carry << 7);
        Flow::Next
    }

    // =========================================================================
    // 16-bit arithmetic
    // =========================================================================

    /// INX rp - no flags
    pub(crate) fn inx(&mut self, _bus: &mut dyn Bus, op: u8) -> Flow {
        let rp = op >> 4;
        let value = self.get_reg16(rp).wrapping_add(1);
        self.set_reg16(rp, value);
        Flow::Next
    }

    /// DCX rp - no flags
    pub(crate) fn dcx(&mut self, _bus: &mut dyn Bus, op: u8) -> Flow {
        let rp = op >> 4;
        let value = self.get_reg16(rp).wrapping_sub(1);
        self.set_reg16(rp, value);
        Flow::Next
    }

    /// DAD rp - HL += rp, carry only
    pub(crate) fn dad(&mut self, _bus: &mut dyn Bus, op: u8) -> Flow {
        let rp = self.get_reg16(op >> 4);
        let hl = self.regs.hl();
        let hl = alu::dad(&mut self.regs.flags, hl, rp);
        self.regs.set_hl(hl);
        Flow::Next
    }

    // =========================================================================
    // Stack
    // =========================================================================

    /// PUSH B/D/H/PSW
    pub(crate) fn push_rp(&mut self, bus: &mut dyn Bus, op: u8) -> Flow {
        let rp = (op >> 4) & 3;
        let value = if rp == 3 {
            self.regs.psw()
        } else {
            self.get_reg16(rp)
        };
        self.push(bus, value);
        Flow::Next
    }

    /// POP B/D/H/PSW
    pub(crate) fn pop_rp(&mut self, bus: &mut dyn Bus, op: u8) -> Flow {
        let rp = (op >> 4) & 3;
        let value = self.pop(bus);
        if rp == 3 {
            self.regs.set_psw(value);
        } else {
            self.set_reg16(rp, value);
        }
        Flow::Next
    }

    /// XTHL - exchange HL with the word on top of the stack
    pub(crate) fn xthl(&mut self, bus: &mut dyn Bus, _op: u8) -> Flow {
        let sp = self.regs.sp;
        let lo = bus.read(sp);
        let hi = bus.read(sp.wrapping_add(1));
        bus.write(sp, self.regs.l);
        bus.write(sp.wrapping_add(1), self.regs.h);
        self.regs.l = lo;
        self.regs.h = hi;
        Flow::Next
    }

    /// SPHL
    pub(crate) fn sphl(&mut self, _bus: &mut dyn Bus, _op: u8) -> Flow {
        self.regs.sp = self.regs.hl();
        Flow::Next
    }

    // =========================================================================
    // Control flow
    // =========================================================================

    /// JMP a16
    pub(crate) fn jmp(&mut self, bus: &mut dyn Bus, _op: u8) -> Flow {
        Flow::Jump(self.imm16(bus))
    }

    /// Jcc a16 - same cost taken or not
    pub(crate) fn jmp_cond(&mut self, bus: &mut dyn Bus, op: u8) -> Flow {
        let target = self.imm16(bus);
        if self.condition(op >> 3) {
            Flow::Jump(target)
        } else {
            Flow::Next
        }
    }

    /// CALL a16
    pub(crate) fn call(&mut self, bus: &mut dyn Bus, _op: u8) -> Flow {
        let target = self.imm16(bus);
        let ret = self.regs.pc.wrapping_add(3);
        self.push(bus, ret);
        Flow::Jump(target)
    }

    /// Ccc a16
    pub(crate) fn call_cond(&mut self, bus: &mut dyn Bus, op: u8) -> Flow {
        let target = self.imm16(bus);
        if self.condition(op >> 3) {
            let ret = self.regs.pc.wrapping_add(3);
            self.push(bus, ret);
            Flow::Branch(target)
        } else {
            Flow::Next
        }
    }

    /// RET
    pub(crate) fn ret(&mut self, bus: &mut dyn Bus, _op: u8) -> Flow {
        Flow::Jump(self.pop(bus))
    }

    /// Rcc
    pub(crate) fn ret_cond(&mut self, bus: &mut dyn Bus, op: u8) -> Flow {
        if self.condition(op >> 3) {
            Flow::Branch(self.pop(bus))
        } else {
            Flow::Next
        }
    }

    /// RST n - call n * 8
    pub(crate) fn rst(&mut self, bus: &mut dyn Bus, op: u8) -> Flow {
        let ret = self.regs.pc.wrapping_add(1);
        self.push(bus, ret);
        Flow::Jump(u16::from(op & 0x38))
    }

    /// PCHL
    pub(crate) fn pchl(&mut self, _bus: &mut dyn Bus, _op: u8) -> Flow {
        Flow::Jump(self.regs.hl())
    }

    // =========================================================================
    // I/O
    // =========================================================================

    /// OUT d8
    pub(crate) fn out(&mut self, bus: &mut dyn Bus, _op: u8) -> Flow {
        let port = self.imm8(bus);
        bus.io_write(port, self.regs.a);
        Flow::Next
    }

    /// IN d8
    pub(crate) fn input(&mut self, bus: &mut dyn Bus, _op: u8) -> Flow {
        let port = self.imm8(bus);
        self.regs.a = bus.io_read(port);
        Flow::Next
    }
}
