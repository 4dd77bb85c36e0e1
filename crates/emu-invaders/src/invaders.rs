//! Top-level cabinet system.
//!
//! The 8080 runs at 2 MHz and the video hardware refreshes at 60 Hz, so a
//! frame is 33,333 CPU cycles. The beam raises RST 1 when it reaches the
//! middle of the screen (cycle 16,666 of the frame) and RST 2 at the start
//! of vertical blank. The game draws the top half of the screen from the
//! RST 1 handler and the bottom half from RST 2.
//!
//! # Run loop
//!
//! `run_cycles()` executes whole instructions until the budget is spent,
//! checking the interrupt points after each one. An instruction that runs
//! past the budget is paid back from the next call, so the long-run cycle
//! rate is exact.

use std::path::Path;

use emu_core::{Cpu, MasterClock, Observable, Step, Ticks, Value};
use intel_8080::I8080;

use crate::bus::InvadersBus;
use crate::config::{InterruptCadence, InvadersConfig};
use crate::error::InvadersError;
use crate::pacer::Pacer;
use crate::ports::{Button, CabinetPorts, PortDevice};

/// First byte of video RAM.
pub const VRAM_START: u16 = 0x2400;

/// One past the last byte of video RAM. 224 columns of 32 bytes, each byte
/// eight vertical pixels, bit 0 lowest on screen.
pub const VRAM_END: u16 = 0x4000;

const MID_FRAME_VECTOR: u8 = 1;
const END_FRAME_VECTOR: u8 = 2;

/// How a call to [`Invaders::run_cycles`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The budget was spent.
    Completed,
    /// The CPU executed HLT. PC is the address after the HLT.
    Halted { pc: u16 },
}

/// Space Invaders cabinet.
pub struct Invaders {
    cpu: I8080,
    bus: InvadersBus,
    cadence: InterruptCadence,
    clock_hz: u64,
    frames_per_second: u64,
    cycles_per_frame: u32,
    /// Cycles executed in the current frame.
    frame_cycles: u32,
    /// Whether RST 1 has been raised this frame.
    mid_frame_done: bool,
    /// Cycles executed beyond the previous budget.
    overshoot: u32,
    /// Completed frame counter.
    frame_count: u64,
}

impl Invaders {
    /// Create a cabinet with the standard port hardware.
    pub fn new(config: &InvadersConfig) -> Result<Self, InvadersError> {
        let ports = CabinetPorts::new(config.dip_switches);
        Self::with_ports(config, Box::new(ports))
    }

    /// Create a cabinet with a custom device behind the non-shifter ports.
    pub fn with_ports(
        config: &InvadersConfig,
        ports: Box<dyn PortDevice>,
    ) -> Result<Self, InvadersError> {
        config.validate()?;

        let mut bus = InvadersBus::new(ports);
        bus.load(config.load_address, &config.rom);

        let mut cpu = I8080::with_policy(config.undefined_policy);
        cpu.set_pc(config.load_address);

        let cycles_per_frame = MasterClock::new(config.clock_hz)
            .ticks_per_frame(config.frames_per_second)
            .get();

        log::debug!(
            "loaded {} byte ROM at {:#06X}, {cycles_per_frame} cycles per frame",
            config.rom.len(),
            config.load_address
        );

        Ok(Self {
            cpu,
            bus,
            cadence: config.cadence,
            clock_hz: config.clock_hz,
            frames_per_second: config.frames_per_second,
            cycles_per_frame: u32::try_from(cycles_per_frame).unwrap_or(u32::MAX),
            frame_cycles: 0,
            mid_frame_done: false,
            overshoot: 0,
            frame_count: 0,
        })
    }

    /// Read a ROM image from disk and build a cabinet around it.
    pub fn from_rom_file(path: &Path, mut config: InvadersConfig) -> Result<Self, InvadersError> {
        config.rom = std::fs::read(path).map_err(|source| InvadersError::RomRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(&config)
    }

    /// Run whole instructions until `budget` cycles have elapsed, raising
    /// the video interrupts on the way.
    ///
    /// Stops early on HLT or an undefined opcode. After a fault the CPU is
    /// left on the offending opcode.
    pub fn run_cycles(&mut self, budget: u32) -> Result<FrameOutcome, InvadersError> {
        let target = budget.saturating_sub(self.overshoot);
        self.overshoot = self.overshoot.saturating_sub(budget);

        let mut executed = 0;
        while executed < target {
            match self.cpu.step(&mut self.bus)? {
                Step::Executed { cycles } => {
                    executed += cycles;
                    self.advance(cycles);
                }
                Step::Halted { cycles } => {
                    executed += cycles;
                    self.advance(cycles);
                    // An interrupt raised on the way may have woken it.
                    if self.cpu.is_halted() {
                        let pc = self.cpu.pc();
                        log::warn!("CPU halted at {pc:#06X}");
                        return Ok(FrameOutcome::Halted { pc });
                    }
                }
            }
        }

        self.overshoot += executed - target;
        Ok(FrameOutcome::Completed)
    }

    /// Run one frame's worth of cycles.
    pub fn run_frame(&mut self) -> Result<FrameOutcome, InvadersError> {
        self.run_cycles(self.cycles_per_frame)
    }

    /// Move the beam forward and raise whichever interrupts it passes.
    fn advance(&mut self, cycles: u32) {
        self.frame_cycles += cycles;

        if !self.mid_frame_done && self.frame_cycles >= self.cycles_per_frame / 2 {
            self.mid_frame_done = true;
            if self.cadence == InterruptCadence::HalfAndFullFrame {
                self.raise(MID_FRAME_VECTOR);
            }
        }

        if self.frame_cycles >= self.cycles_per_frame {
            self.frame_cycles -= self.cycles_per_frame;
            self.mid_frame_done = false;
            self.frame_count += 1;
            self.raise(END_FRAME_VECTOR);
        }
    }

    fn raise(&mut self, vector: u8) {
        if !self.cpu.interrupt(&mut self.bus, vector) {
            log::trace!("RST {vector} dropped, interrupts disabled");
        }
    }

    /// A pacer for this cabinet's clock and frame rate, starting now.
    #[must_use]
    pub fn pacer(&self) -> Pacer {
        Pacer::new(self.clock_hz, self.frames_per_second)
    }

    /// Video RAM, 0x2400..0x4000.
    #[must_use]
    pub fn vram(&self) -> &[u8] {
        self.bus.slice(VRAM_START, VRAM_END)
    }

    /// Press a cabinet control (stays pressed until released).
    pub fn press(&mut self, button: Button) {
        self.bus.ports.set_button(button, true);
    }

    /// Release a cabinet control.
    pub fn release(&mut self, button: Button) {
        self.bus.ports.set_button(button, false);
    }

    /// Reference to the CPU.
    #[must_use]
    pub fn cpu(&self) -> &I8080 {
        &self.cpu
    }

    /// Mutable reference to the CPU.
    pub fn cpu_mut(&mut self) -> &mut I8080 {
        &mut self.cpu
    }

    /// Reference to the bus.
    #[must_use]
    pub fn bus(&self) -> &InvadersBus {
        &self.bus
    }

    /// Mutable reference to the bus.
    pub fn bus_mut(&mut self) -> &mut InvadersBus {
        &mut self.bus
    }

    /// Completed frame count.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Cycles per frame at the configured clock and frame rate.
    #[must_use]
    pub fn cycles_per_frame(&self) -> u32 {
        self.cycles_per_frame
    }

    /// Total CPU cycles since power-on.
    #[must_use]
    pub fn total_cycles(&self) -> Ticks {
        self.cpu.total_cycles()
    }
}

/// All query paths supported by the cabinet.
const INVADERS_QUERY_PATHS: &[&str] = &[
    "cpu.<path>",
    "shifter.value",
    "shifter.offset",
    "shifter.result",
    "ports.sound1",
    "ports.sound2",
    "ports.watchdog",
    "ports.dip",
    "frame",
    "frame.cycles",
    "memory.<address>",
];

impl Observable for Invaders {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(cpu_path) = path.strip_prefix("cpu.") {
            return self.cpu.query(cpu_path);
        }
        if let Some(port_path) = path.strip_prefix("ports.") {
            return self.bus.ports.query(port_path);
        }
        if let Some(addr_str) = path.strip_prefix("memory.") {
            let addr = if let Some(hex) = addr_str
                .strip_prefix("0x")
                .or_else(|| addr_str.strip_prefix('$'))
            {
                u16::from_str_radix(hex, 16).ok()
            } else {
                addr_str.parse().ok()
            };
            return addr.map(|a| self.bus.peek(a).into());
        }

        match path {
            "shifter.value" => Some(self.bus.shifter.value().into()),
            "shifter.offset" => Some(self.bus.shifter.offset().into()),
            "shifter.result" => Some(self.bus.shifter.result().into()),
            "frame" => Some(self.frame_count.into()),
            "frame.cycles" => Some(self.frame_cycles.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        INVADERS_QUERY_PATHS
    }
}
