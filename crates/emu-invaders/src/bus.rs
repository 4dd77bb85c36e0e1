//! Cabinet bus: memory and I/O routing.
//!
//! Memory is a flat 64K array; the board only decodes 16K (8K ROM, 1K work
//! RAM, 7K video RAM) but programs never stray outside it, so no mirroring
//! is modelled. Ports 2, 3 and 4 go to the shift register and every other
//! port to the [`PortDevice`].

use emu_core::Bus;

use crate::ports::PortDevice;
use crate::shifter::Shifter;

/// The cabinet bus, implementing `emu_core::Bus`.
pub struct InvadersBus {
    memory: Box<[u8; 0x1_0000]>,
    pub shifter: Shifter,
    pub ports: Box<dyn PortDevice>,
}

impl InvadersBus {
    #[must_use]
    pub fn new(ports: Box<dyn PortDevice>) -> Self {
        Self {
            memory: Box::new([0; 0x1_0000]),
            shifter: Shifter::new(),
            ports,
        }
    }

    /// Copy `data` into memory starting at `address`, wrapping at the top
    /// of the address space.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        let mut addr = address;
        for &byte in data {
            self.memory[usize::from(addr)] = byte;
            addr = addr.wrapping_add(1);
        }
    }

    /// Read memory without side effects.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.memory[usize::from(address)]
    }

    /// A range of memory.
    #[must_use]
    pub fn slice(&self, start: u16, end: u16) -> &[u8] {
        &self.memory[usize::from(start)..usize::from(end)]
    }
}

impl Bus for InvadersBus {
    fn read(&mut self, address: u16) -> u8 {
        self.memory[usize::from(address)]
    }

    fn write(&mut self, address: u16, value: u8) {
        self.memory[usize::from(address)] = value;
    }

    fn io_read(&mut self, port: u8) -> u8 {
        if port == Shifter::RESULT_PORT {
            self.shifter.result()
        } else {
            self.ports.read(port)
        }
    }

    fn io_write(&mut self, port: u8, value: u8) {
        match port {
            Shifter::OFFSET_PORT => self.shifter.set_offset(value),
            Shifter::DATA_PORT => self.shifter.push(value),
            _ => self.ports.write(port, value),
        }
    }
}
