//! Integration tests for the cabinet: interrupt cadence, shift register and
//! ports driven by real 8080 programs.
//!
//! Tests that need the original ROM are `#[ignore]`d; put the concatenated
//! `invaders.h/g/f/e` image at `tests/data/invaders.rom` to run them.

use std::cell::RefCell;
use std::rc::Rc;

use emu_core::{Cpu, Observable, Value};
use emu_invaders::{
    Button, FrameOutcome, InterruptCadence, Invaders, InvadersConfig, InvadersError, PortDevice,
};
use intel_8080::{CpuError, UndefinedPolicy};

/// Build a cabinet from a program loaded at 0x0000.
fn cabinet(program: &[u8]) -> Invaders {
    Invaders::new(&InvadersConfig::with_rom(program.to_vec())).expect("valid config")
}

/// A program whose RST 1 and RST 2 handlers append 1 and 2 to a log at
/// 0x2100. The log pointer lives at 0x20F0.
fn interrupt_logger() -> Vec<u8> {
    let mut rom = vec![0u8; 0x140];
    rom[0x00..0x03].copy_from_slice(&[0xC3, 0x40, 0x00]); // JMP 0040
    rom[0x08..0x0B].copy_from_slice(&[0xC3, 0x00, 0x01]); // RST 1: JMP 0100
    rom[0x10..0x13].copy_from_slice(&[0xC3, 0x20, 0x01]); // RST 2: JMP 0120
    rom[0x40..0x4D].copy_from_slice(&[
        0x31, 0x00, 0x24, // LXI SP,2400
        0x21, 0x00, 0x21, // LXI H,2100
        0x22, 0xF0, 0x20, // SHLD 20F0
        0xFB,             // EI
        0xC3, 0x4A, 0x00, // JMP 004A
    ]);
    for (base, tag) in [(0x100, 0x01), (0x120, 0x02)] {
        rom[base..base + 11].copy_from_slice(&[
            0x2A, 0xF0, 0x20, // LHLD 20F0
            0x36, tag,        // MVI M,tag
            0x23,             // INX H
            0x22, 0xF0, 0x20, // SHLD 20F0
            0xFB,             // EI
            0xC9,             // RET
        ]);
    }
    rom
}

fn interrupt_log(invaders: &Invaders, len: u16) -> Vec<u8> {
    (0..len).map(|i| invaders.bus().peek(0x2100 + i)).collect()
}

#[test]
fn frame_is_33333_cycles_at_2mhz() {
    let mut invaders = cabinet(&[0x00]);
    assert_eq!(invaders.cycles_per_frame(), 33_333);

    assert_eq!(invaders.run_frame().unwrap(), FrameOutcome::Completed);
    assert_eq!(invaders.frame_count(), 1);
    // NOPs are 4 cycles, so the frame ends one NOP past the boundary.
    assert_eq!(invaders.total_cycles().get(), 33_336);
}

#[test]
fn mid_frame_then_end_of_frame_interrupts() {
    let mut invaders = cabinet(&interrupt_logger());

    invaders.run_frame().unwrap();
    // RST 2 was accepted at the end of the frame; its handler has not run.
    assert_eq!(invaders.cpu().pc(), 0x0010);
    assert_eq!(interrupt_log(&invaders, 2), [0x01, 0x00]);

    invaders.run_frame().unwrap();
    assert_eq!(interrupt_log(&invaders, 4), [0x01, 0x02, 0x01, 0x00]);
    assert_eq!(invaders.frame_count(), 2);
}

#[test]
fn full_frame_cadence_only_raises_rst2() {
    let config = InvadersConfig {
        cadence: InterruptCadence::FullFrameOnly,
        ..InvadersConfig::with_rom(interrupt_logger())
    };
    let mut invaders = Invaders::new(&config).unwrap();

    for _ in 0..3 {
        invaders.run_frame().unwrap();
    }
    assert_eq!(interrupt_log(&invaders, 3), [0x02, 0x02, 0x00]);
}

#[test]
fn interrupts_are_dropped_while_disabled() {
    // LXI SP,2400; JMP 0003
    let mut invaders = cabinet(&[0x31, 0x00, 0x24, 0xC3, 0x03, 0x00]);

    invaders.run_frame().unwrap();

    assert_eq!(invaders.cpu().pc(), 0x0003);
    assert_eq!(invaders.cpu().registers().sp, 0x2400);
    assert_eq!(invaders.frame_count(), 1);
}

#[test]
fn overshoot_is_paid_back_next_slice() {
    let mut invaders = cabinet(&[0x00]);

    invaders.run_cycles(10).unwrap();
    assert_eq!(invaders.total_cycles().get(), 12);

    invaders.run_cycles(10).unwrap();
    assert_eq!(invaders.total_cycles().get(), 20);

    invaders.run_cycles(0).unwrap();
    assert_eq!(invaders.total_cycles().get(), 20);
}

#[test]
fn hlt_stops_the_run_loop() {
    let mut invaders = cabinet(&[0x00, 0x76]);

    assert_eq!(
        invaders.run_frame().unwrap(),
        FrameOutcome::Halted { pc: 0x0002 }
    );
    assert!(invaders.cpu().is_halted());
    assert_eq!(invaders.frame_count(), 0);
    // NOP + HLT still move the beam.
    assert_eq!(invaders.query("frame.cycles"), Some(Value::U32(11)));
    assert_eq!(invaders.total_cycles().get(), 11);
}

#[test]
fn hlt_crossing_mid_frame_is_woken_by_rst1() {
    let mut program = vec![0xC3, 0x40, 0x00]; // JMP 0040
    program.resize(0x08, 0x00);
    program.push(0x76); // RST 1 handler: HLT
    program.resize(0x40, 0x00);
    program.extend_from_slice(&[0x31, 0x00, 0x24, 0xFB]); // LXI SP,2400; EI
    // 24 cycles so far; 4159 NOPs leave the beam 6 cycles short of 16_666.
    program.extend(std::iter::repeat_n(0x00, 4159));
    program.push(0x76); // HLT at 0x1083 crosses the midpoint
    let mut invaders = cabinet(&program);

    assert_eq!(
        invaders.run_frame().unwrap(),
        FrameOutcome::Halted { pc: 0x0009 }
    );
    // Return address pushed by RST 1 is the byte after the first HLT.
    assert_eq!(invaders.bus().peek(0x23FE), 0x84);
    assert_eq!(invaders.bus().peek(0x23FF), 0x10);
    assert_eq!(invaders.query("frame.cycles"), Some(Value::U32(16_674)));
}

#[test]
fn cpu_and_bus_can_be_patched_between_runs() {
    let mut invaders = cabinet(&[0x76]);
    invaders.bus_mut().load(0x0100, &[0x3E, 0x07, 0x76]); // MVI A,7; HLT
    invaders.cpu_mut().set_pc(0x0100);

    assert_eq!(
        invaders.run_frame().unwrap(),
        FrameOutcome::Halted { pc: 0x0103 }
    );
    assert_eq!(invaders.cpu().registers().a, 0x07);
}

#[test]
fn undefined_opcode_faults_with_location() {
    let mut invaders = cabinet(&[0x00, 0x08]);

    let err = invaders.run_frame().unwrap_err();
    assert!(matches!(
        err,
        InvadersError::Cpu(CpuError::UndefinedOpcode { opcode: 0x08, pc: 0x0001 })
    ));
    assert_eq!(err.to_string(), "undefined opcode 0x08 at 0x0001");
    assert_eq!(invaders.cpu().pc(), 0x0001);
}

#[test]
fn undefined_opcode_runs_as_nop_when_configured() {
    let config = InvadersConfig {
        undefined_policy: UndefinedPolicy::Nop,
        ..InvadersConfig::with_rom(vec![0x08, 0x10, 0x18, 0x20])
    };
    let mut invaders = Invaders::new(&config).unwrap();

    assert_eq!(invaders.run_frame().unwrap(), FrameOutcome::Completed);
}

#[test]
fn shift_register_through_the_cpu() {
    let mut invaders = cabinet(&[
        0x3E, 0x12, // MVI A,12
        0xD3, 0x04, // OUT 4
        0x3E, 0x34, // MVI A,34
        0xD3, 0x04, // OUT 4
        0xDB, 0x03, // IN 3
        0x47,       // MOV B,A
        0x3E, 0x04, // MVI A,4
        0xD3, 0x02, // OUT 2
        0xDB, 0x03, // IN 3
        0x76,       // HLT
    ]);

    assert!(matches!(invaders.run_frame(), Ok(FrameOutcome::Halted { .. })));

    let regs = invaders.cpu().registers();
    assert_eq!(regs.b, 0x34);
    assert_eq!(regs.a, 0x41);
    assert_eq!(invaders.query("shifter.value"), Some(Value::U16(0x3412)));
    assert_eq!(invaders.query("shifter.offset"), Some(Value::U8(4)));
}

#[test]
fn buttons_and_dip_switches_reach_input_ports() {
    // IN 1; MOV B,A; IN 2; HLT
    let config = InvadersConfig {
        dip_switches: 0x03,
        ..InvadersConfig::with_rom(vec![0xDB, 0x01, 0x47, 0xDB, 0x02, 0x76])
    };
    let mut invaders = Invaders::new(&config).unwrap();
    invaders.press(Button::Coin);
    invaders.press(Button::P2Right);
    invaders.press(Button::P1Start);
    invaders.release(Button::P1Start);

    invaders.run_frame().unwrap();

    let regs = invaders.cpu().registers();
    assert_eq!(regs.b, 0x09);
    assert_eq!(regs.a, 0x43);
}

#[test]
fn sound_and_watchdog_writes_are_latched() {
    let mut invaders = cabinet(&[
        0x3E, 0x22, // MVI A,22
        0xD3, 0x03, // OUT 3
        0xD3, 0x05, // OUT 5
        0xD3, 0x06, // OUT 6
        0x76,       // HLT
    ]);

    invaders.run_frame().unwrap();

    assert_eq!(invaders.query("ports.sound1"), Some(Value::U8(0x22)));
    assert_eq!(invaders.query("ports.sound2"), Some(Value::U8(0x22)));
    assert_eq!(invaders.query("ports.watchdog"), Some(Value::U64(1)));
}

/// Records every port access it sees.
#[derive(Clone, Default)]
struct RecordingPorts {
    log: Rc<RefCell<Vec<(char, u8, u8)>>>,
}

impl PortDevice for RecordingPorts {
    fn read(&mut self, port: u8) -> u8 {
        self.log.borrow_mut().push(('r', port, 0xA5));
        0xA5
    }

    fn write(&mut self, port: u8, value: u8) {
        self.log.borrow_mut().push(('w', port, value));
    }
}

#[test]
fn shifter_ports_never_reach_the_port_device() {
    let ports = RecordingPorts::default();
    let log = Rc::clone(&ports.log);
    let config = InvadersConfig::with_rom(vec![
        0x3E, 0x07, // MVI A,7
        0xD3, 0x02, // OUT 2
        0xD3, 0x04, // OUT 4
        0xDB, 0x03, // IN 3
        0xD3, 0x07, // OUT 7
        0xDB, 0x00, // IN 0
        0x76,       // HLT
    ]);
    let mut invaders = Invaders::with_ports(&config, Box::new(ports)).unwrap();

    invaders.run_frame().unwrap();

    // IN 3 with offset 7 on 0x0700 gives 0x80, which OUT 7 passes on.
    assert_eq!(*log.borrow(), vec![('w', 7, 0x80), ('r', 0, 0xA5)]);
    assert_eq!(invaders.cpu().registers().a, 0xA5);
}

#[test]
fn vram_covers_2400_to_3fff() {
    // MVI A,FF; STA 2400; STA 3FFF; HLT
    let mut invaders = cabinet(&[0x3E, 0xFF, 0x32, 0x00, 0x24, 0x32, 0xFF, 0x3F, 0x76]);

    invaders.run_frame().unwrap();

    let vram = invaders.vram();
    assert_eq!(vram.len(), 0x1C00);
    assert_eq!(vram[0], 0xFF);
    assert_eq!(vram[0x1BFF], 0xFF);
    assert_eq!(vram.iter().filter(|&&b| b != 0).count(), 2);
}

#[test]
fn rom_loads_at_configured_address() {
    let config = InvadersConfig {
        load_address: 0x0100,
        ..InvadersConfig::with_rom(vec![0x3E, 0x5A, 0x76]) // MVI A,5A; HLT
    };
    let mut invaders = Invaders::new(&config).unwrap();
    assert_eq!(invaders.cpu().pc(), 0x0100);

    invaders.run_frame().unwrap();
    assert_eq!(invaders.cpu().registers().a, 0x5A);
    assert_eq!(invaders.query("memory.0x0100"), Some(Value::U8(0x3E)));
}

#[test]
fn empty_rom_is_rejected() {
    assert!(matches!(
        Invaders::new(&InvadersConfig::default()),
        Err(InvadersError::EmptyRom)
    ));
}

#[test]
fn missing_rom_file_is_reported() {
    let path = std::env::temp_dir().join("emu-invaders-no-such-rom.bin");
    let err = Invaders::from_rom_file(&path, InvadersConfig::default()).err();
    assert!(matches!(err, Some(InvadersError::RomRead { .. })));
}

#[test]
fn empty_rom_file_is_rejected() {
    let path = std::env::temp_dir().join(format!("emu-invaders-empty-{}.bin", std::process::id()));
    std::fs::write(&path, b"").unwrap();
    let err = Invaders::from_rom_file(&path, InvadersConfig::default()).err();
    std::fs::remove_file(&path).ok();
    assert!(matches!(err, Some(InvadersError::EmptyRom)));
}

#[test]
fn observable_paths_delegate_to_cpu() {
    let mut invaders = cabinet(&[0x3E, 0x42, 0x76]);
    invaders.run_frame().unwrap();

    assert_eq!(invaders.query("cpu.a"), Some(Value::U8(0x42)));
    assert_eq!(invaders.query("cpu.halted"), Some(Value::Bool(true)));
    assert_eq!(invaders.query("frame"), Some(Value::U64(0)));
    assert_eq!(invaders.query("bogus"), None);
}

#[test]
#[ignore]
fn invaders_rom_runs_attract_mode() {
    let rom_path = std::path::Path::new("tests/data/invaders.rom");
    let mut invaders = Invaders::from_rom_file(rom_path, InvadersConfig::default())
        .expect("tests/data/invaders.rom not found");

    for _ in 0..600 {
        assert_eq!(invaders.run_frame().unwrap(), FrameOutcome::Completed);
    }

    assert!(invaders.vram().iter().any(|&b| b != 0), "screen is blank");
    assert!(
        matches!(invaders.query("ports.watchdog"), Some(Value::U64(n)) if n > 0),
        "watchdog never kicked"
    );
}
