//! The 8080 opcode table.
//!
//! Every one of the 256 opcode bytes has a row holding its mnemonic,
//! length, cycle cost and handler. `step()` indexes the table directly with
//! the fetched byte, so there is no decode cascade at run time.
//!
//! Operand placeholders in mnemonics: `d8` is an immediate byte, `d16` an
//! immediate word and `a16` an absolute address. Undefined opcodes use the
//! mnemonic `???`.

use emu_core::Bus;

use crate::cpu::{Flow, I8080};

/// An opcode handler. Receives the opcode byte so one handler can serve a
/// whole register-encoded family.
pub(crate) type Handler = fn(&mut I8080, &mut dyn Bus, u8) -> Flow;

/// One row of the opcode table.
#[derive(Clone, Copy)]
pub struct Opcode {
    /// Assembler mnemonic with operand placeholders.
    pub mnemonic: &'static str,
    /// Instruction length in bytes, including the opcode.
    pub len: u8,
    /// Cycle cost. For conditional CALL and RET this is the not-taken cost.
    pub cycles: u8,
    /// Cycle cost when a conditional CALL or RET is taken. Equal to
    /// `cycles` for every other opcode.
    pub cycles_taken: u8,
    pub(crate) exec: Handler,
}

impl Opcode {
    /// Whether the opcode is part of the documented 8080 instruction set.
    #[must_use]
    pub fn is_defined(&self) -> bool {
        self.mnemonic != UNDEFINED
    }
}

impl std::fmt::Debug for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Opcode")
            .field("mnemonic", &self.mnemonic)
            .field("len", &self.len)
            .field("cycles", &self.cycles)
            .field("cycles_taken", &self.cycles_taken)
            .finish_non_exhaustive()
    }
}

const UNDEFINED: &str = "???";

#[rustfmt::skip]
const MNEMONICS: [&str; 256] = [
    // 0x00
    "NOP", "LXI B,d16", "STAX B", "INX B", "INR B", "DCR B", "MVI B,d8", "RLC",
    "???", "DAD B", "LDAX B", "DCX B", "INR C", "DCR C", "MVI C,d8", "RRC",
    // 0x10
    "???", "LXI D,d16", "STAX D", "INX D", "INR D", "DCR D", "MVI D,d8", "RAL",
    "???", "DAD D", "LDAX D", "DCX D", "INR E", "DCR E", "MVI E,d8", "RAR",
    // 0x20
    "???", "LXI H,d16", "SHLD a16", "INX H", "INR H", "DCR H", "MVI H,d8", "DAA",
    "???", "DAD H", "LHLD a16", "DCX H", "INR L", "DCR L", "MVI L,d8", "CMA",
    // 0x30
    "???", "LXI SP,d16", "STA a16", "INX SP", "INR M", "DCR M", "MVI M,d8", "STC",
    "???", "DAD SP", "LDA a16", "DCX SP", "INR A", "DCR A", "MVI A,d8", "CMC",
    // 0x40
    "MOV B,B", "MOV B,C", "MOV B,D", "MOV B,E", "MOV B,H", "MOV B,L", "MOV B,M", "MOV B,A",
    "MOV C,B", "MOV C,C", "MOV C,D", "MOV C,E", "MOV C,H", "MOV C,L", "MOV C,M", "MOV C,A",
    // 0x50
    "MOV D,B", "MOV D,C", "MOV D,D", "MOV D,E", "MOV D,H", "MOV D,L", "MOV D,M", "MOV D,A",
    "MOV E,B", "MOV E,C", "MOV E,D", "MOV E,E", "MOV E,H", "MOV E,L", "MOV E,M", "MOV E,A",
    // 0x60
    "MOV H,B", "MOV H,C", "MOV H,D", "MOV H,E", "MOV H,H", "MOV H,L", "MOV H,M", "MOV H,A",
    "MOV L,B", "MOV L,C", "MOV L,D", "MOV L,E", "MOV L,H", "MOV L,L", "MOV L,M", "MOV L,A",
    // 0x70
    "MOV M,B", "MOV M,C", "MOV M,D", "MOV M,E", "MOV M,H", "MOV M,L", "HLT", "MOV M,A",
    "MOV A,B", "MOV A,C", "MOV A,D", "MOV A,E", "MOV A,H", "MOV A,L", "MOV A,M", "MOV A,A",
    // 0x80
    "ADD B", "ADD C", "ADD D", "ADD E", "ADD H", "ADD L", "ADD M", "ADD A",
    "ADC B", "ADC C", "ADC D", "ADC E", "ADC H", "ADC L", "ADC M", "ADC A",
    // 0x90
    "SUB B", "SUB C", "SUB D", "SUB E", "SUB H", "SUB L", "SUB M", "SUB A",
    "SBB B", "SBB C", "SBB D", "SBB E", "SBB H", "SBB L", "SBB M", "SBB A",
    // 0xA0
    "ANA B", "ANA C", "ANA D", "ANA E", "ANA H", "ANA L", "ANA M", "ANA A",
    "XRA B", "XRA C", "XRA D", "XRA E", "XRA H", "XRA L", "XRA M", "XRA A",
    // 0xB0
    "ORA B", "ORA C", "ORA D", "ORA E", "ORA H", "ORA L", "ORA M", "ORA A",
    "CMP B", "CMP C", "CMP D", "CMP E", "CMP H", "CMP L", "CMP M", "CMP A",
    // 0xC0
    "RNZ", "POP B", "JNZ a16", "JMP a16", "CNZ a16", "PUSH B", "ADI d8", "RST 0",
    "RZ", "RET", "JZ a16", "???", "CZ a16", "CALL a16", "ACI d8", "RST 1",
    // 0xD0
    "RNC", "POP D", "JNC a16", "OUT d8", "CNC a16", "PUSH D", "SUI d8", "RST 2",
    "RC", "???", "JC a16", "IN d8", "CC a16", "???", "SBI d8", "RST 3",
    // 0xE0
    "RPO", "POP H", "JPO a16", "XTHL", "CPO a16", "PUSH H", "ANI d8", "RST 4",
    "RPE", "PCHL", "JPE a16", "XCHG", "CPE a16", "???", "XRI d8", "RST 5",
    // 0xF0
    "RP", "POP PSW", "JP a16", "DI", "CP a16", "PUSH PSW", "ORI d8", "RST 6",
    "RM", "SPHL", "JM a16", "EI", "CM a16", "???", "CPI d8", "RST 7",
];

/// Base cycle cost per opcode. Undefined opcodes cost 4, the price of the
/// NOP they execute as under [`UndefinedPolicy::Nop`](crate::UndefinedPolicy::Nop).
#[rustfmt::skip]
const CYCLES: [u8; 256] = [
    4, 10,  7,  5,  5,  5,  7,  4,  4, 10,  7,  5,  5,  5,  7,  4, // 0x00
    4, 10,  7,  5,  5,  5,  7,  4,  4, 10,  7,  5,  5,  5,  7,  4, // 0x10
    4, 10, 16,  5,  5,  5,  7,  4,  4, 10, 16,  5,  5,  5,  7,  4, // 0x20
    4, 10, 13,  5, 10, 10, 10,  4,  4, 10, 13,  5,  5,  5,  7,  4, // 0x30
    5,  5,  5,  5,  5,  5,  7,  5,  5,  5,  5,  5,  5,  5,  7,  5, // 0x40
    5,  5,  5,  5,  5,  5,  7,  5,  5,  5,  5,  5,  5,  5,  7,  5, // 0x50
    5,  5,  5,  5,  5,  5,  7,  5,  5,  5,  5,  5,  5,  5,  7,  5, // 0x60
    7,  7,  7,  7,  7,  7,  7,  7,  5,  5,  5,  5,  5,  5,  7,  5, // 0x70
    4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 0x80
    4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 0x90
    4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 0xA0
    4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 0xB0
    5, 10, 10, 10, 11, 11,  7, 11,  5, 10, 10,  4, 11, 17,  7, 11, // 0xC0
    5, 10, 10, 10, 11, 11,  7, 11,  5,  4, 10, 10, 11,  4,  7, 11, // 0xD0
    5, 10, 10, 18, 11, 11,  7, 11,  5,  5, 10,  4, 11,  4,  7, 11, // 0xE0
    5, 10, 10,  4, 11, 11,  7, 11,  5,  5, 10,  4, 11,  4,  7, 11, // 0xF0
];

/// Taken cost of a conditional CALL.
const CALL_TAKEN: u8 = 17;

/// Taken cost of a conditional RET.
const RET_TAKEN: u8 = 11;

/// The complete opcode table, indexed by opcode byte.
pub static OPCODES: [Opcode; 256] = build_table();

const fn build_table() -> [Opcode; 256] {
    let mut table = [Opcode {
        mnemonic: UNDEFINED,
        len: 1,
        cycles: 4,
        cycles_taken: 4,
        exec: I8080::undefined,
    }; 256];

    let mut i = 0;
    while i < 256 {
        let op = i as u8;
        let cycles = CYCLES[i];
        table[i] = Opcode {
            mnemonic: MNEMONICS[i],
            len: length(op),
            cycles,
            cycles_taken: match op & 0xC7 {
                0xC4 => CALL_TAKEN,
                0xC0 => RET_TAKEN,
                _ => cycles,
            },
            exec: handler(op),
        };
        i += 1;
    }
    table
}

/// Instruction length in bytes.
const fn length(op: u8) -> u8 {
    match op {
        // MVI r, d8 and the immediate ALU forms, IN and OUT
        0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => 2,
        0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => 2,
        0xD3 | 0xDB => 2,
        // LXI, SHLD/LHLD, STA/LDA
        0x01 | 0x11 | 0x21 | 0x31 | 0x22 | 0x2A | 0x32 | 0x3A => 3,
        // JMP, CALL and their conditional forms
        0xC3 | 0xCD => 3,
        _ if op & 0xC7 == 0xC2 || op & 0xC7 == 0xC4 => 3,
        _ => 1,
    }
}

const fn handler(op: u8) -> Handler {
    match op {
        0x00 => I8080::nop,
        0x08 | 0x10 | 0x18 | 0x20 | 0x28 | 0x30 | 0x38 => I8080::undefined,
        0xCB | 0xD9 | 0xDD | 0xED | 0xFD => I8080::undefined,

        0x01 | 0x11 | 0x21 | 0x31 => I8080::lxi,
        0x02 | 0x12 => I8080::stax,
        0x0A | 0x1A => I8080::ldax,
        0x03 | 0x13 | 0x23 | 0x33 => I8080::inx,
        0x0B | 0x1B | 0x2B | 0x3B => I8080::dcx,
        0x09 | 0x19 | 0x29 | 0x39 => I8080::dad,
        0x22 => I8080::shld,
        0x2A => I8080::lhld,
        0x32 => I8080::sta,
        0x3A => I8080::lda,

        0x07 => I8080::rlc,
        0x0F => I8080::rrc,
        0x17 => I8080::ral,
        0x1F => I8080::rar,
        0x27 => I8080::daa,
        0x2F => I8080::cma,
        0x37 => I8080::stc,
        0x3F => I8080::cmc,

        0x76 => I8080::hlt,
        0x40..=0x7F => I8080::mov,
        0x80..=0xBF => I8080::alu_reg,

        0xC3 => I8080::jmp,
        0xC9 => I8080::ret,
        0xCD => I8080::call,
        0xD3 => I8080::out,
        0xDB => I8080::input,
        0xE3 => I8080::xthl,
        0xE9 => I8080::pchl,
        0xEB => I8080::xchg,
        0xF3 => I8080::di,
        0xF9 => I8080::sphl,
        0xFB => I8080::ei,

        _ => match op & 0xC7 {
            0x04 => I8080::inr,
            0x05 => I8080::dcr,
            0x06 => I8080::mvi,
            0xC0 => I8080::ret_cond,
            0xC2 => I8080::jmp_cond,
            0xC4 => I8080::call_cond,
            0xC6 => I8080::alu_imm,
            0xC7 => I8080::rst,
            _ => match op & 0xCF {
                0xC1 => I8080::pop_rp,
                0xC5 => I8080::push_rp,
                _ => I8080::undefined,
            },
        },
    }
}

/// Disassemble the instruction at the start of `bytes`.
///
/// Returns the text and the instruction length. Missing operand bytes
/// (a truncated slice) read as zero.
#[must_use]
pub fn disassemble(bytes: &[u8]) -> (String, u8) {
    let Some(&op) = bytes.first() else {
        return (String::new(), 0);
    };
    let row = &OPCODES[usize::from(op)];
    let lo = bytes.get(1).copied().unwrap_or(0);
    let hi = bytes.get(2).copied().unwrap_or(0);

    let text = if row.mnemonic.ends_with("d16") || row.mnemonic.ends_with("a16") {
        let stem = &row.mnemonic[..row.mnemonic.len() - 3];
        format!("{stem}${:04X}", u16::from_le_bytes([lo, hi]))
    } else if row.mnemonic.ends_with("d8") {
        let stem = &row.mnemonic[..row.mnemonic.len() - 2];
        format!("{stem}${lo:02X}")
    } else {
        row.mnemonic.to_string()
    };
    (text, row.len)
}
