//! Table-driven ALU checks loaded from `tests/data/alu_cases.json`.
//!
//! Each case loads A, B and the carry flag, executes one opcode and compares
//! A and the packed status byte afterwards. Every flag other than carry
//! starts clear.

use emu_core::{Cpu, SimpleBus};
use intel_8080::I8080;
use serde::Deserialize;

#[derive(Deserialize)]
struct AluCase {
    name: String,
    opcode: u8,
    a: u8,
    b: u8,
    carry: bool,
    result: u8,
    status: u8,
}

fn load_cases() -> Vec<AluCase> {
    let text = std::fs::read_to_string("tests/data/alu_cases.json")
        .expect("tests/data/alu_cases.json not found");
    serde_json::from_str(&text).expect("malformed ALU case file")
}

#[test]
fn alu_cases() {
    let cases = load_cases();
    assert!(!cases.is_empty());

    let mut failures = Vec::new();
    for case in &cases {
        let mut bus = SimpleBus::new();
        bus.load(0x0000, &[case.opcode]);
        let mut cpu = I8080::new();
        let regs = cpu.registers_mut();
        regs.a = case.a;
        regs.b = case.b;
        regs.flags.cy = case.carry;

        cpu.step(&mut bus).expect("undefined opcode in case file");

        let regs = cpu.registers();
        let status = regs.flags.to_psw();
        if regs.a != case.result || status != case.status {
            failures.push(format!(
                "{}: got A={:02X} F={:02X}, expected A={:02X} F={:02X}",
                case.name, regs.a, status, case.result, case.status
            ));
        }
    }

    assert!(failures.is_empty(), "{}", failures.join("\n"));
}
